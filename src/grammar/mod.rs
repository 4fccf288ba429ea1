//! Query-string grammar: lexer + parser producing a generic parse tree.
//!
//! The input is the URL-decoded query-option string of a request, e.g.
//!
//! ```text
//! $filter=result gt 10&$orderby=phenomenonTime desc&$top=20
//! ```
//!
//! [`parse`] runs lexical analysis and parsing and returns the parse tree.
//! Nothing is resolved against an entity model here; that is the compiler
//! layer's job, which also means every name-related error (unknown
//! properties, unknown options, illegal nesting) is reported there, with
//! only genuine syntax failures reported as [`Error::Parse`].

pub mod ast;
pub mod lexer;
pub mod parser;

pub use ast::{
    BinOp, ExpandItemNode, ExpandSegmentNode, ExprNode, LiteralNode, OptionNode, OrderByNode,
    QueryNode, SegmentNode, SortDir,
};
pub use parser::matches_option;

use crate::error::{Error, Result};

/// Parse a query-option string into a parse tree.
///
/// A leading `?` is tolerated and ignored.
pub fn parse(source: &str) -> Result<QueryNode> {
    use chumsky::error::Rich;
    use chumsky::input::Input;
    use chumsky::span::SimpleSpan;
    use chumsky::Parser as _;

    let source = source.trim().trim_start_matches('?');

    // Step 1: lexical analysis
    let (tokens, lex_errs) = lexer::lexer().parse(source).into_output_errors();
    if let Some(err) = lex_errs.first() {
        return Err(rich_to_error(err));
    }
    let tokens: Vec<(lexer::Token<'_>, SimpleSpan)> = tokens.unwrap_or_default();

    // Step 2: parsing
    let len = source.len();
    let eoi: SimpleSpan = (len..len).into();
    let token_stream = tokens
        .as_slice()
        .map(eoi, |(tok, span): &(lexer::Token<'_>, SimpleSpan)| {
            (tok, span)
        });

    let (tree, parse_errs) = parser::parser().parse(token_stream).into_output_errors();
    if let Some(err) = parse_errs.first() {
        return Err(Error::Parse {
            message: err.to_string(),
            offset: err.span().start,
        });
    }
    tree.ok_or_else(|| Error::Parse {
        message: "empty parse result".into(),
        offset: 0,
    })
}

fn rich_to_error<T: std::fmt::Display>(err: &chumsky::error::Rich<'_, T>) -> Error {
    Error::Parse {
        message: err.to_string(),
        offset: err.span().start,
    }
}
