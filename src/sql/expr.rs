//! Expression AST - the SQL-level output of field compilation.
//!
//! This module provides a strongly-typed AST for SQL field expressions and
//! conditions with exhaustive pattern matching enforced by the compiler.
//! Every variant must be handled in `to_tokens()`.

use super::dialect::{CastType, Dialect, SqlDialect};
use super::token::{Token, TokenStream};

// =============================================================================
// Expression AST
// =============================================================================

/// A SQL expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Column reference: optional_table.column
    Column {
        table: Option<String>,
        column: String,
    },

    /// Literal values
    Literal(Literal),

    /// Binary operation: (left op right)
    BinaryOp {
        left: Box<Expr>,
        op: BinaryOperator,
        right: Box<Expr>,
    },

    /// Unary operation
    UnaryOp { op: UnaryOperator, expr: Box<Expr> },

    /// Function call: name(args...)
    Function { name: String, args: Vec<Expr> },

    /// CAST(expr AS type)
    Cast { expr: Box<Expr>, target: CastType },

    /// EXTRACT(part FROM expr)
    Extract { part: &'static str, expr: Box<Expr> },

    /// POSITION(needle IN haystack)
    Position {
        needle: Box<Expr>,
        haystack: Box<Expr>,
    },

    /// Parenthesized expression
    Paren(Box<Expr>),
}

/// Literal values.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(i64),
    Float(f64),
    String(String),
    Bool(bool),
    Null,
    /// `YYYY-MM-DD`
    Date(String),
    /// `hh:mm:ss`
    Time(String),
    /// RFC 3339 timestamp
    Timestamp(String),
    /// ISO-8601 duration
    Duration(String),
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    // Comparison
    Eq,
    Ne,
    Lt,
    Gt,
    Lte,
    Gte,
    // Logical
    And,
    Or,
    // Arithmetic
    Plus,
    Minus,
    Mul,
    Div,
    Mod,
    // String
    Concat,
    Like,
    // jsonb
    JsonGet,
    JsonGetText,
    JsonContains,
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Not,
    Minus,
    IsNull,
    IsNotNull,
}

// =============================================================================
// Builder helpers
// =============================================================================

/// Column reference without a table qualifier.
pub fn col(name: impl Into<String>) -> Expr {
    Expr::Column {
        table: None,
        column: name.into(),
    }
}

/// Column reference with a table qualifier.
pub fn table_col(table: impl Into<String>, column: impl Into<String>) -> Expr {
    Expr::Column {
        table: Some(table.into()),
        column: column.into(),
    }
}

pub fn lit_int(n: i64) -> Expr {
    Expr::Literal(Literal::Int(n))
}

pub fn lit_str(s: impl Into<String>) -> Expr {
    Expr::Literal(Literal::String(s.into()))
}

pub fn lit_bool(b: bool) -> Expr {
    Expr::Literal(Literal::Bool(b))
}

pub fn func(name: impl Into<String>, args: Vec<Expr>) -> Expr {
    Expr::Function {
        name: name.into(),
        args,
    }
}

impl Expr {
    pub fn binary(left: Expr, op: BinaryOperator, right: Expr) -> Expr {
        Expr::BinaryOp {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }

    pub fn eq(self, other: Expr) -> Expr {
        Expr::binary(self, BinaryOperator::Eq, other)
    }

    pub fn and(self, other: Expr) -> Expr {
        Expr::binary(self, BinaryOperator::And, other)
    }

    pub fn or(self, other: Expr) -> Expr {
        Expr::binary(self, BinaryOperator::Or, other)
    }

    pub fn cast(self, target: CastType) -> Expr {
        Expr::Cast {
            expr: Box::new(self),
            target,
        }
    }

    /// Convert to a token stream for the given dialect.
    pub fn to_tokens(&self, dialect: Dialect) -> TokenStream {
        let mut ts = TokenStream::new();
        self.write_tokens(dialect, &mut ts);
        ts
    }

    /// Serialize directly to SQL text.
    pub fn to_sql(&self, dialect: Dialect) -> String {
        self.to_tokens(dialect).serialize(dialect)
    }

    fn write_tokens(&self, dialect: Dialect, ts: &mut TokenStream) {
        match self {
            Expr::Column { table, column } => {
                if let Some(table) = table {
                    ts.push(Token::Ident(table.clone())).push(Token::Dot);
                }
                ts.push(Token::Ident(column.clone()));
            }
            Expr::Literal(lit) => {
                ts.push(match lit {
                    Literal::Int(n) => Token::LitInt(*n),
                    Literal::Float(f) => Token::LitFloat(*f),
                    Literal::String(s) => Token::LitString(s.clone()),
                    Literal::Bool(b) => Token::LitBool(*b),
                    Literal::Null => Token::Null,
                    Literal::Date(d) => Token::LitDate(d.clone()),
                    Literal::Time(t) => Token::LitTime(t.clone()),
                    Literal::Timestamp(t) => Token::LitTimestamp(t.clone()),
                    Literal::Duration(d) => Token::LitDuration(d.clone()),
                });
            }
            Expr::BinaryOp { left, op, right } => {
                // Concat becomes a function call where `||` means OR.
                if *op == BinaryOperator::Concat && !dialect.supports_concat_operator() {
                    ts.push(Token::FunctionName("CONCAT".into())).lparen();
                    left.write_tokens(dialect, ts);
                    ts.comma().space();
                    right.write_tokens(dialect, ts);
                    ts.rparen();
                    return;
                }
                // Nested operations always parenthesize; precedence bugs are
                // not worth the prettier output.
                ts.lparen();
                left.write_tokens(dialect, ts);
                ts.space();
                ts.push(match op {
                    BinaryOperator::Eq => Token::Eq,
                    BinaryOperator::Ne => Token::Ne,
                    BinaryOperator::Lt => Token::Lt,
                    BinaryOperator::Gt => Token::Gt,
                    BinaryOperator::Lte => Token::Lte,
                    BinaryOperator::Gte => Token::Gte,
                    BinaryOperator::And => Token::And,
                    BinaryOperator::Or => Token::Or,
                    BinaryOperator::Plus => Token::Plus,
                    BinaryOperator::Minus => Token::Minus,
                    BinaryOperator::Mul => Token::Mul,
                    BinaryOperator::Div => Token::Div,
                    BinaryOperator::Mod => Token::Mod,
                    BinaryOperator::Concat => Token::Concat,
                    BinaryOperator::Like => Token::Like,
                    BinaryOperator::JsonGet => Token::JsonGet,
                    BinaryOperator::JsonGetText => Token::JsonGetText,
                    BinaryOperator::JsonContains => Token::JsonContains,
                });
                ts.space();
                right.write_tokens(dialect, ts);
                ts.rparen();
            }
            Expr::UnaryOp { op, expr } => match op {
                UnaryOperator::Not => {
                    ts.push(Token::Not).space().lparen();
                    expr.write_tokens(dialect, ts);
                    ts.rparen();
                }
                UnaryOperator::Minus => {
                    ts.push(Token::Minus).lparen();
                    expr.write_tokens(dialect, ts);
                    ts.rparen();
                }
                UnaryOperator::IsNull => {
                    ts.lparen();
                    expr.write_tokens(dialect, ts);
                    ts.space().push(Token::IsNull).rparen();
                }
                UnaryOperator::IsNotNull => {
                    ts.lparen();
                    expr.write_tokens(dialect, ts);
                    ts.space().push(Token::IsNotNull).rparen();
                }
            },
            Expr::Function { name, args } => {
                ts.push(Token::FunctionName(name.clone())).lparen();
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        ts.comma().space();
                    }
                    arg.write_tokens(dialect, ts);
                }
                ts.rparen();
            }
            Expr::Cast { expr, target } => {
                ts.push(Token::Cast).lparen();
                expr.write_tokens(dialect, ts);
                ts.space()
                    .push(Token::As)
                    .space()
                    .push(Token::TypeName(dialect.cast_type_name(*target)))
                    .rparen();
            }
            Expr::Extract { part, expr } => {
                ts.push(Token::FunctionName("EXTRACT".into()))
                    .lparen()
                    .push(Token::DatePart(part))
                    .space()
                    .push(Token::From)
                    .space();
                expr.write_tokens(dialect, ts);
                ts.rparen();
            }
            Expr::Position { needle, haystack } => {
                ts.push(Token::FunctionName("POSITION".into())).lparen();
                needle.write_tokens(dialect, ts);
                ts.space().push(Token::In).space();
                haystack.write_tokens(dialect, ts);
                ts.rparen();
            }
            Expr::Paren(inner) => {
                ts.lparen();
                inner.write_tokens(dialect, ts);
                ts.rparen();
            }
        }
    }
}
