//! Parser for the query-string grammar using chumsky.
//!
//! Transforms a token stream from the lexer into the generic parse tree in
//! [`crate::grammar::ast`]. The parser resolves nothing: names, literals and
//! option keywords it does not understand flow through for the compiler to
//! judge.

use chumsky::input::ValueInput;
use chumsky::prelude::*;

use super::ast::*;
use super::lexer::Token;

/// Whether a raw option keyword (with or without `$`, any case) means `name`.
pub fn matches_option(raw: &str, name: &str) -> bool {
    let trimmed = raw.strip_prefix('$').unwrap_or(raw);
    trimmed.eq_ignore_ascii_case(name)
}

fn is_known_option(raw: &str) -> bool {
    const KNOWN: &[&str] = &[
        "top",
        "skip",
        "count",
        "select",
        "expand",
        "filter",
        "orderby",
        "resultformat",
    ];
    KNOWN.iter().any(|name| matches_option(raw, name))
}

/// Resolve `''` escapes in a string-literal body.
fn unescape(s: &str) -> String {
    s.replace("''", "'")
}

/// Parse one specific option keyword.
fn option_key<'tokens, 'src: 'tokens, I>(
    name: &'static str,
) -> impl Parser<'tokens, I, (), extra::Err<Rich<'tokens, Token<'src>, SimpleSpan>>> + Clone
where
    I: ValueInput<'tokens, Token = Token<'src>, Span = SimpleSpan>,
{
    select! { Token::Ident(s) => s }
        .filter(move |s: &&str| matches_option(s, name))
        .ignored()
}

/// Create the main parser for a query-option string.
pub fn parser<'tokens, 'src: 'tokens, I>(
) -> impl Parser<'tokens, I, QueryNode, extra::Err<Rich<'tokens, Token<'src>, SimpleSpan>>>
where
    I: ValueInput<'tokens, Token = Token<'src>, Span = SimpleSpan>,
{
    // ==========================================================================
    // Basic token parsers
    // ==========================================================================

    let ident = select! {
        Token::Ident(s) => s.to_string(),
    }
    .labelled("identifier");

    let uint = select! { Token::Number(s) => s }.try_map(|s: &str, span| {
        s.parse::<u64>()
            .map_err(|_| Rich::custom(span, "expected a non-negative integer"))
    });

    let int = select! { Token::Number(s) => s }.try_map(|s: &str, span| {
        s.parse::<i64>()
            .map_err(|_| Rich::custom(span, "expected an integer"))
    });

    // ==========================================================================
    // Expressions ($filter)
    // ==========================================================================

    let expr = recursive(|expr| {
        let literal = select! {
            Token::True => LiteralNode::Bool(true),
            Token::False => LiteralNode::Bool(false),
            Token::Null => LiteralNode::Null,
            Token::Number(s) => LiteralNode::Number(s.to_string()),
            Token::Temporal(s) => LiteralNode::Temporal(s.to_string()),
            Token::Str(s) => LiteralNode::Str(unescape(s)),
        }
        .map(ExprNode::Literal)
        .labelled("literal");

        // duration'P1D' / geography'POINT (30 10)'
        let wrapped = select! { Token::Ident(s) => s }
            .then(select! { Token::Str(s) => s })
            .try_map(|(kw, body): (&str, &str), span| {
                match kw.to_ascii_lowercase().as_str() {
                    "duration" => Ok(ExprNode::Literal(LiteralNode::Duration(body.to_string()))),
                    "geography" => Ok(ExprNode::Literal(LiteralNode::Geography(unescape(body)))),
                    _ => Err(Rich::custom(
                        span,
                        format!("'{}' cannot prefix a string literal", kw),
                    )),
                }
            });

        let index = int
            .clone()
            .delimited_by(just(Token::LBracket), just(Token::RBracket))
            .labelled("array index");

        let args = expr
            .clone()
            .separated_by(just(Token::Comma))
            .collect::<Vec<_>>()
            .delimited_by(just(Token::LParen), just(Token::RParen));

        let segment = ident
            .clone()
            .then(args.or_not())
            .then(index.repeated().collect::<Vec<_>>())
            .map(|((name, args), indexes)| SegmentNode {
                name,
                args,
                indexes,
            });

        let member = segment
            .separated_by(just(Token::Slash))
            .at_least(1)
            .collect::<Vec<_>>()
            .map(ExprNode::Member);

        let primary = choice((
            wrapped,
            literal,
            member,
            expr.clone()
                .delimited_by(just(Token::LParen), just(Token::RParen)),
        ));

        let unary = recursive(|unary| {
            choice((
                just(Token::Not)
                    .ignore_then(unary.clone())
                    .map(|e| ExprNode::Not(Box::new(e))),
                just(Token::Minus)
                    .ignore_then(unary)
                    .map(|e| ExprNode::Negate(Box::new(e))),
                primary,
            ))
        });

        let mul_op = select! {
            Token::Mul => BinOp::Mul,
            Token::Div => BinOp::Div,
            Token::Mod => BinOp::Mod,
        };
        let mul = unary
            .clone()
            .then(mul_op.then(unary).repeated().collect::<Vec<_>>())
            .map(|(first, rest)| ExprNode::chain(first, rest));

        let add_op = select! {
            Token::Add => BinOp::Add,
            Token::Sub => BinOp::Sub,
        };
        let add = mul
            .clone()
            .then(add_op.then(mul).repeated().collect::<Vec<_>>())
            .map(|(first, rest)| ExprNode::chain(first, rest));

        let cmp_op = select! {
            Token::Eq => BinOp::Eq,
            Token::Ne => BinOp::Ne,
            Token::Lt => BinOp::Lt,
            Token::Le => BinOp::Le,
            Token::Gt => BinOp::Gt,
            Token::Ge => BinOp::Ge,
        };
        let cmp = add
            .clone()
            .then(cmp_op.then(add).repeated().collect::<Vec<_>>())
            .map(|(first, rest)| ExprNode::chain(first, rest));

        let and = cmp
            .clone()
            .then(
                just(Token::And)
                    .to(BinOp::And)
                    .then(cmp)
                    .repeated()
                    .collect::<Vec<_>>(),
            )
            .map(|(first, rest)| ExprNode::chain(first, rest));

        and.clone()
            .then(
                just(Token::Or)
                    .to(BinOp::Or)
                    .then(and)
                    .repeated()
                    .collect::<Vec<_>>(),
            )
            .map(|(first, rest)| ExprNode::chain(first, rest))
    });

    // ==========================================================================
    // Paths ($select / $orderby)
    // ==========================================================================

    let path_index = int.delimited_by(just(Token::LBracket), just(Token::RBracket));

    let path_args = expr
        .clone()
        .separated_by(just(Token::Comma))
        .collect::<Vec<_>>()
        .delimited_by(just(Token::LParen), just(Token::RParen));

    let path_segment = ident
        .clone()
        .then(path_args.or_not())
        .then(path_index.repeated().collect::<Vec<_>>())
        .map(|((name, args), indexes)| SegmentNode {
            name,
            args,
            indexes,
        });

    let path = path_segment
        .separated_by(just(Token::Slash))
        .at_least(1)
        .collect::<Vec<_>>();

    let orderby_entry = path
        .clone()
        .then(
            select! {
                Token::Asc => SortDir::Asc,
                Token::Desc => SortDir::Desc,
            }
            .or_not(),
        )
        .map(|(path, dir)| OrderByNode {
            path,
            direction: dir.unwrap_or_default(),
        });

    // ==========================================================================
    // Options
    // ==========================================================================

    let query = recursive(|query| {
        let subquery = query.delimited_by(just(Token::LParen), just(Token::RParen));

        let expand_segment = ident
            .clone()
            .then(subquery.repeated().collect::<Vec<_>>())
            .map(|(name, subqueries)| ExpandSegmentNode { name, subqueries });

        let expand_item = expand_segment
            .separated_by(just(Token::Slash))
            .at_least(1)
            .collect::<Vec<_>>()
            .map(|segments| ExpandItemNode { segments });

        let top_opt = option_key("top")
            .ignore_then(just(Token::EqSign))
            .ignore_then(uint.clone())
            .map(OptionNode::Top);

        let skip_opt = option_key("skip")
            .ignore_then(just(Token::EqSign))
            .ignore_then(uint.clone())
            .map(OptionNode::Skip);

        let count_opt = option_key("count")
            .ignore_then(just(Token::EqSign))
            .ignore_then(select! {
                Token::True => true,
                Token::False => false,
            })
            .map(OptionNode::Count);

        let select_opt = option_key("select")
            .ignore_then(just(Token::EqSign))
            .ignore_then(
                path.clone()
                    .separated_by(just(Token::Comma))
                    .at_least(1)
                    .collect::<Vec<_>>(),
            )
            .map(OptionNode::Select);

        let expand_opt = option_key("expand")
            .ignore_then(just(Token::EqSign))
            .ignore_then(
                expand_item
                    .separated_by(just(Token::Comma))
                    .at_least(1)
                    .collect::<Vec<_>>(),
            )
            .map(OptionNode::Expand);

        let filter_opt = option_key("filter")
            .ignore_then(just(Token::EqSign))
            .ignore_then(expr.clone())
            .map(OptionNode::Filter);

        let orderby_opt = option_key("orderby")
            .ignore_then(just(Token::EqSign))
            .ignore_then(
                orderby_entry
                    .clone()
                    .separated_by(just(Token::Comma))
                    .at_least(1)
                    .collect::<Vec<_>>(),
            )
            .map(OptionNode::OrderBy);

        let format_value = select! {
            Token::Ident(s) => s.to_string(),
            Token::Str(s) => unescape(s),
            Token::Number(s) => s.to_string(),
        };
        let format_opt = option_key("resultformat")
            .ignore_then(just(Token::EqSign))
            .ignore_then(format_value)
            .map(OptionNode::Format);

        // Unrecognized keywords parse through; the compiler rejects them by
        // name, which gives a better error than a syntax failure here.
        let unknown_opt = select! { Token::Ident(s) => s }
            .filter(|s: &&str| !is_known_option(s))
            .then_ignore(just(Token::EqSign))
            .then_ignore(
                any()
                    .filter(|t: &Token| {
                        !matches!(t, Token::Amp | Token::Semicolon | Token::RParen)
                    })
                    .repeated(),
            )
            .map(|s: &str| OptionNode::Unknown(s.to_string()));

        let option = choice((
            top_opt,
            skip_opt,
            count_opt,
            select_opt,
            expand_opt,
            filter_opt,
            orderby_opt,
            format_opt,
            unknown_opt,
        ));

        // `&` separates top-level options, `;` nested ones; accepting either
        // in both positions costs nothing.
        let separator = choice((just(Token::Amp), just(Token::Semicolon)));

        option
            .separated_by(separator)
            .collect::<Vec<_>>()
            .map(|options| QueryNode { options })
    });

    query.then_ignore(end())
}
