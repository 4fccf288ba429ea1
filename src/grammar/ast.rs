//! The generic parse tree produced by the query-string parser.
//!
//! Nodes carry surface text only; name resolution, typing, and literal
//! classification happen in the compiler layer, so this tree stays a
//! replaceable front end.

/// A parsed options block: the whole query string, or the body of one
/// `(...)` block attached to an expand segment.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct QueryNode {
    pub options: Vec<OptionNode>,
}

/// One `$keyword=value` option.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionNode {
    Top(u64),
    Skip(u64),
    Count(bool),
    Select(Vec<Vec<SegmentNode>>),
    Expand(Vec<ExpandItemNode>),
    Filter(ExprNode),
    OrderBy(Vec<OrderByNode>),
    Format(String),
    /// An option keyword the grammar does not know; the compiler rejects it.
    Unknown(String),
}

/// One comma-separated `$expand` entry: a navigation path whose segments may
/// each carry nested option blocks.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpandItemNode {
    pub segments: Vec<ExpandSegmentNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExpandSegmentNode {
    pub name: String,
    /// Every `(...)` block attached to this segment. More than one is a
    /// compile-time error, so the parser keeps them all.
    pub subqueries: Vec<QueryNode>,
}

/// One `$orderby` entry.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderByNode {
    pub path: Vec<SegmentNode>,
    pub direction: SortDir,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDir {
    #[default]
    Asc,
    Desc,
}

/// One step of a member chain: a name, optionally applied to parenthesized
/// arguments (a function call or an identified segment — the compiler
/// decides which), optionally followed by array indexes.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentNode {
    pub name: String,
    pub args: Option<Vec<ExprNode>>,
    pub indexes: Vec<i64>,
}

impl SegmentNode {
    pub fn plain(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: None,
            indexes: Vec::new(),
        }
    }

    /// Whether this segment uses identified-path syntax.
    pub fn is_identified(&self) -> bool {
        self.args.is_some() || !self.indexes.is_empty()
    }
}

/// A literal as it appeared on the wire.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralNode {
    Bool(bool),
    Null,
    /// An undisambiguated numeric token.
    Number(String),
    /// A single-quoted string, unescaped.
    Str(String),
    /// A bare ISO date, time, date-time, or `start/end` interval.
    Temporal(String),
    /// The body of a `duration'...'` literal.
    Duration(String),
    /// The body of a `geography'...'` literal.
    Geography(String),
}

/// An infix operator keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Or,
    And,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

/// A filter/orderby expression node.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprNode {
    Literal(LiteralNode),
    /// A `/`-separated member chain: a property path, or a function call
    /// when the single segment's name is a known function.
    Member(Vec<SegmentNode>),
    Not(Box<ExprNode>),
    Negate(Box<ExprNode>),
    /// An n-ary chain of same-precedence infix applications, kept flat; the
    /// compiler folds it pairwise into binary functions.
    Chain {
        first: Box<ExprNode>,
        rest: Vec<(BinOp, ExprNode)>,
    },
}

impl ExprNode {
    /// Collapse a parsed precedence level into a node.
    pub fn chain(first: ExprNode, rest: Vec<(BinOp, ExprNode)>) -> ExprNode {
        if rest.is_empty() {
            first
        } else {
            ExprNode::Chain {
                first: Box::new(first),
                rest,
            }
        }
    }
}
