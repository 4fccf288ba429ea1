//! Compiles parse-tree expressions into typed expressions.
//!
//! Three jobs happen here: property paths are resolved against the entity
//! model, bare literals are classified by their surface form, and function
//! applications are overload-resolved by intersecting the operator's
//! declared type bindings with the admissible result types propagated from
//! the enclosing context (`None` meaning "any").

use crate::error::{Error, Result};
use crate::expr::{
    Constant, DurationValue, Expression, GeometryValue, Op, Path, PathSegment, TypeBinding,
};
use crate::expr::types::ExprType;
use crate::grammar::{BinOp, ExprNode, LiteralNode, SegmentNode};
use crate::model::{CustomProperty, CustomStep, EntityType, Model, Property};

/// Compiles `$filter`/`$orderby` parse trees against one root entity type.
pub struct ExpressionCompiler<'a> {
    model: &'a Model,
    root: &'a EntityType,
}

impl<'a> ExpressionCompiler<'a> {
    pub fn new(model: &'a Model, root: &'a EntityType) -> Self {
        Self { model, root }
    }

    /// Compile an expression node. `hint` lists the admissible result types
    /// propagated from the enclosing context; `None` admits anything.
    pub fn compile(&self, node: &ExprNode, hint: Option<&[ExprType]>) -> Result<Expression> {
        match node {
            ExprNode::Literal(lit) => self.compile_literal(lit),
            ExprNode::Member(segments) => self.compile_member(segments, hint),
            ExprNode::Not(child) => self.apply(Op::Not, &[child.as_ref()], hint),
            ExprNode::Negate(child) => self.compile_negate(child, hint),
            ExprNode::Chain { first, rest } => self.compile_chain(first, rest, hint),
        }
    }

    /// Resolve a member chain: a function call when the single segment names
    /// a known function, a property path otherwise.
    fn compile_member(
        &self,
        segments: &[SegmentNode],
        hint: Option<&[ExprType]>,
    ) -> Result<Expression> {
        if let [seg] = segments {
            if let Some(args) = &seg.args {
                if seg.indexes.is_empty() {
                    if let Some(op) = Op::from_function_name(&seg.name) {
                        let nodes: Vec<&ExprNode> = args.iter().collect();
                        return self.apply(op, &nodes, hint);
                    }
                    // Call syntax on a name that is neither a function nor a
                    // property is a function typo, not a path problem.
                    if self.root.property(&seg.name).is_none() {
                        return Err(Error::UnknownFunction {
                            name: seg.name.clone(),
                        });
                    }
                }
            }
        }
        self.compile_path(segments, true).map(Expression::Path)
    }

    /// Resolve a `/`-separated segment chain into a value path: identifier
    /// syntax is only legal when `allow_identified`, and the path must end
    /// on something with columns behind it.
    pub fn compile_path(&self, segments: &[SegmentNode], allow_identified: bool) -> Result<Path> {
        let path = self.resolve_segments(segments, allow_identified)?;
        if path.final_property().is_navigation() {
            return Err(Error::invalid_path("a value path cannot end on a relation"));
        }
        Ok(path)
    }

    /// Resolve a `$select` path: identifier syntax is illegal, but ending on
    /// a navigation property is fine (it selects the link).
    pub fn compile_select_path(&self, segments: &[SegmentNode]) -> Result<Path> {
        self.resolve_segments(segments, false)
    }

    fn resolve_segments(&self, segments: &[SegmentNode], allow_identified: bool) -> Result<Path> {
        let mut out: Vec<PathSegment> = Vec::new();
        // Some(entity type) while navigating entities, None once the path
        // has stepped inside an embedded document.
        let mut current: Option<&EntityType> = Some(self.root);

        for seg in segments {
            if !allow_identified && seg.is_identified() {
                return Err(Error::IdentifiedPathNotAllowed {
                    segment: seg.name.clone(),
                });
            }
            match current {
                Some(ty) => {
                    let property = ty
                        .property(&seg.name)
                        .ok_or_else(|| Error::UnknownProperty {
                            entity_type: ty.name.clone(),
                            name: seg.name.clone(),
                        })?
                        .clone();
                    match &property {
                        Property::Navigation(nav) => {
                            if !seg.indexes.is_empty() {
                                return Err(Error::invalid_path(format!(
                                    "'{}' is a relation and takes no array index",
                                    seg.name
                                )));
                            }
                            let id = seg
                                .args
                                .as_ref()
                                .map(|args| parse_segment_id(args, &seg.name))
                                .transpose()?;
                            let target = self.model.entity_type(&nav.target)?;
                            out.push(PathSegment { property, id });
                            current = Some(target);
                        }
                        Property::Entity(p) => {
                            if seg.args.is_some() {
                                return Err(Error::invalid_path(format!(
                                    "'{}' does not take an identifier",
                                    seg.name
                                )));
                            }
                            if !seg.indexes.is_empty() && !p.has_custom {
                                return Err(Error::invalid_path(format!(
                                    "'{}' carries no document to index into",
                                    seg.name
                                )));
                            }
                            out.push(PathSegment::new(property));
                            push_index_steps(&mut out, &seg.indexes);
                            current = None;
                        }
                        Property::Custom(_) => unreachable!("models hold no custom steps"),
                    }
                }
                None => {
                    // A named step below the previous segment.
                    let prev = out.last().expect("document state implies a segment");
                    if !prev.property.allows_custom() {
                        return Err(Error::invalid_path(format!(
                            "'{}' does not allow sub-properties",
                            prev.property.name()
                        )));
                    }
                    if seg.args.is_some() {
                        return Err(Error::invalid_path(format!(
                            "'{}' is a document member and takes no identifier",
                            seg.name
                        )));
                    }
                    out.push(PathSegment::new(Property::Custom(CustomProperty {
                        step: CustomStep::Named(seg.name.clone()),
                    })));
                    push_index_steps(&mut out, &seg.indexes);
                }
            }
        }
        if out.is_empty() {
            return Err(Error::invalid_path("empty property path"));
        }
        Ok(Path::new(out))
    }

    fn compile_literal(&self, lit: &LiteralNode) -> Result<Expression> {
        let constant = match lit {
            LiteralNode::Bool(b) => Constant::Bool(*b),
            LiteralNode::Null => Constant::Null,
            LiteralNode::Str(s) => Constant::String(s.clone()),
            LiteralNode::Number(s) => parse_number(s)?,
            LiteralNode::Temporal(s) => Constant::parse_temporal(s)?
                .ok_or_else(|| Error::invalid_literal(s, "unrecognized temporal form"))?,
            LiteralNode::Duration(s) => Constant::Duration(DurationValue::parse_iso(s)?),
            LiteralNode::Geography(s) => Constant::Geometry(GeometryValue::from_wkt(s)?),
        };
        Ok(Expression::Constant(constant))
    }

    fn compile_negate(&self, child: &ExprNode, hint: Option<&[ExprType]>) -> Result<Expression> {
        let candidates = self.candidate_bindings(Op::Negate, 1, hint)?;
        let child_hint = param_hint(&candidates, 0);
        let inner = self.compile(child, Some(&child_hint))?;
        // Fold negated literals so `-5` is the constant it reads as.
        if let Expression::Constant(c) = &inner {
            let folded = match c {
                Constant::Int(n) => Some(Constant::Int(-n)),
                Constant::Double(d) => Some(Constant::Double(-d)),
                Constant::Duration(d) => Some(Constant::Duration(d.negated())),
                _ => None,
            };
            if let Some(c) = folded {
                return Ok(Expression::Constant(c));
            }
        }
        self.resolve(Op::Negate, vec![inner])
    }

    fn compile_chain(
        &self,
        first: &ExprNode,
        rest: &[(BinOp, ExprNode)],
        hint: Option<&[ExprType]>,
    ) -> Result<Expression> {
        // The surface chain is n-ary; the tree is always binary. Folding
        // left preserves left-to-right evaluation order.
        let Some(first_pair) = rest.first() else {
            return self.compile(first, hint);
        };
        let first_op = binop_to_op(first_pair.0);
        let first_outer = if rest.len() == 1 { hint } else { None };
        let first_hint = self.operand_hint(first_op, 0, first_outer)?;
        let mut acc = self.compile(first, Some(&first_hint))?;
        for (i, (bin_op, node)) in rest.iter().enumerate() {
            let op = binop_to_op(*bin_op);
            let outer = if i + 1 == rest.len() { hint } else { None };
            let rhs_hint = self.operand_hint(op, 1, outer)?;
            let rhs = self.compile(node, Some(&rhs_hint))?;
            acc = self.resolve(op, vec![acc, rhs])?;
        }
        Ok(acc)
    }

    /// Compile `nodes` as the operands of `op` and resolve the application.
    fn apply(&self, op: Op, nodes: &[&ExprNode], hint: Option<&[ExprType]>) -> Result<Expression> {
        if !op.accepts_arity(nodes.len()) {
            return Err(Error::type_mismatch(
                op.name(),
                format!("takes no {} argument(s)", nodes.len()),
            ));
        }
        let candidates = self.candidate_bindings(op, nodes.len(), hint)?;
        let mut args = Vec::with_capacity(nodes.len());
        for (i, node) in nodes.iter().enumerate() {
            let child_hint = param_hint(&candidates, i);
            args.push(self.compile(node, Some(&child_hint))?);
        }
        self.resolve(op, args)
    }

    /// Select the binding matching the operands' actual types.
    fn resolve(&self, op: Op, args: Vec<Expression>) -> Result<Expression> {
        let actual: Vec<ExprType> = args.iter().map(Expression::expr_type).collect();
        for binding in op.bindings() {
            if binding.params.len() == actual.len()
                && binding
                    .params
                    .iter()
                    .zip(&actual)
                    .all(|(p, a)| p.accepts(*a))
            {
                return Ok(Expression::function(op, args, binding.ret));
            }
        }
        let shapes: Vec<String> = actual.iter().map(ExprType::to_string).collect();
        Err(Error::type_mismatch(
            op.name(),
            format!("no binding accepts ({})", shapes.join(", ")),
        ))
    }

    /// Bindings of `op` surviving the arity and result-type constraints.
    fn candidate_bindings(
        &self,
        op: Op,
        argc: usize,
        hint: Option<&[ExprType]>,
    ) -> Result<Vec<&'static TypeBinding>> {
        let candidates: Vec<&'static TypeBinding> = op
            .bindings()
            .iter()
            .filter(|b| b.params.len() == argc)
            .filter(|b| match hint {
                None => true,
                Some(admissible) => admissible.iter().any(|h| h.accepts(b.ret)),
            })
            .collect();
        if candidates.is_empty() {
            return Err(Error::type_mismatch(
                op.name(),
                "no overload produces a type allowed here",
            ));
        }
        Ok(candidates)
    }

    /// Admissible types for operand `index` of `op` under `hint`.
    fn operand_hint(
        &self,
        op: Op,
        index: usize,
        hint: Option<&[ExprType]>,
    ) -> Result<Vec<ExprType>> {
        let candidates = self.candidate_bindings(op, 2, hint)?;
        Ok(param_hint(&candidates, index))
    }
}

/// Union of the types candidate bindings allow at parameter `index`.
fn param_hint(candidates: &[&'static TypeBinding], index: usize) -> Vec<ExprType> {
    let mut types = Vec::new();
    for binding in candidates {
        if let Some(ty) = binding.params.get(index) {
            if !types.contains(ty) {
                types.push(*ty);
            }
        }
    }
    types
}

fn binop_to_op(op: BinOp) -> Op {
    match op {
        BinOp::Or => Op::Or,
        BinOp::And => Op::And,
        BinOp::Eq => Op::Equal,
        BinOp::Ne => Op::NotEqual,
        BinOp::Lt => Op::LessThan,
        BinOp::Le => Op::LessEqual,
        BinOp::Gt => Op::GreaterThan,
        BinOp::Ge => Op::GreaterEqual,
        BinOp::Add => Op::Add,
        BinOp::Sub => Op::Subtract,
        BinOp::Mul => Op::Multiply,
        BinOp::Div => Op::Divide,
        BinOp::Mod => Op::Modulo,
    }
}

fn parse_number(s: &str) -> Result<Constant> {
    if !s.contains(['.', 'e', 'E']) {
        if let Ok(n) = s.parse::<i64>() {
            return Ok(Constant::Int(n));
        }
    }
    s.parse::<f64>()
        .map(Constant::Double)
        .map_err(|_| Error::invalid_literal(s, "not a number"))
}

fn parse_segment_id(args: &[ExprNode], segment: &str) -> Result<i64> {
    if let [ExprNode::Literal(LiteralNode::Number(n))] = args {
        if let Ok(id) = n.parse::<i64>() {
            return Ok(id);
        }
    }
    Err(Error::invalid_path(format!(
        "identifier on '{}' must be a single integer",
        segment
    )))
}

fn push_index_steps(out: &mut Vec<PathSegment>, indexes: &[i64]) {
    for ix in indexes {
        out.push(PathSegment::new(Property::Custom(CustomProperty {
            step: CustomStep::Index(*ix),
        })));
    }
}
