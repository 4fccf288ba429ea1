//! Lexer for the query-string grammar.
//!
//! Converts a (URL-decoded) query string into tokens with span information.
//! Temporal literals are recognized lexically so that `2024-01-01T00:00:00Z`
//! is one token rather than an arithmetic accident.

use chumsky::prelude::*;

/// A token in the query-string grammar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Token<'src> {
    // ========================================================================
    // Operator Keywords
    // ========================================================================
    And,
    Or,
    Not,
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

    // ========================================================================
    // Other Keywords
    // ========================================================================
    Asc,
    Desc,
    True,
    False,
    Null,

    // ========================================================================
    // Literals
    // ========================================================================
    /// An identifier: property, entity set, function, or option keyword
    /// (`result`, `Observations`, `$top`, `@iot.id`, `geo.distance`).
    Ident(&'src str),
    /// A single-quoted string body, with `''` escapes intact.
    Str(&'src str),
    /// An integer or floating-point number.
    Number(&'src str),
    /// A bare ISO date, time-of-day, date-time, or `start/end` interval.
    Temporal(&'src str),

    // ========================================================================
    // Symbols
    // ========================================================================
    /// `&`
    Amp,
    /// `;`
    Semicolon,
    /// `,`
    Comma,
    /// `/`
    Slash,
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// `=`
    EqSign,
    /// `-`
    Minus,
}

impl<'src> std::fmt::Display for Token<'src> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::And => write!(f, "and"),
            Token::Or => write!(f, "or"),
            Token::Not => write!(f, "not"),
            Token::Eq => write!(f, "eq"),
            Token::Ne => write!(f, "ne"),
            Token::Lt => write!(f, "lt"),
            Token::Le => write!(f, "le"),
            Token::Gt => write!(f, "gt"),
            Token::Ge => write!(f, "ge"),
            Token::Add => write!(f, "add"),
            Token::Sub => write!(f, "sub"),
            Token::Mul => write!(f, "mul"),
            Token::Div => write!(f, "div"),
            Token::Mod => write!(f, "mod"),
            Token::Asc => write!(f, "asc"),
            Token::Desc => write!(f, "desc"),
            Token::True => write!(f, "true"),
            Token::False => write!(f, "false"),
            Token::Null => write!(f, "null"),
            Token::Ident(s) => write!(f, "{}", s),
            Token::Str(s) => write!(f, "'{}'", s),
            Token::Number(s) => write!(f, "{}", s),
            Token::Temporal(s) => write!(f, "{}", s),
            Token::Amp => write!(f, "&"),
            Token::Semicolon => write!(f, ";"),
            Token::Comma => write!(f, ","),
            Token::Slash => write!(f, "/"),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::LBracket => write!(f, "["),
            Token::RBracket => write!(f, "]"),
            Token::EqSign => write!(f, "="),
            Token::Minus => write!(f, "-"),
        }
    }
}

/// Map an identifier string to a keyword token or return Ident.
///
/// Operator keywords are lower-case only; `$filter=Not eq 'Not'` keeps a
/// property named `Not` addressable.
fn keyword_or_ident(s: &str) -> Token<'_> {
    match s {
        "and" => Token::And,
        "or" => Token::Or,
        "not" => Token::Not,
        "eq" => Token::Eq,
        "ne" => Token::Ne,
        "lt" => Token::Lt,
        "le" => Token::Le,
        "gt" => Token::Gt,
        "ge" => Token::Ge,
        "add" => Token::Add,
        "sub" => Token::Sub,
        "mul" => Token::Mul,
        "div" => Token::Div,
        "mod" => Token::Mod,
        "asc" => Token::Asc,
        "desc" => Token::Desc,
        "true" => Token::True,
        "false" => Token::False,
        "null" => Token::Null,
        _ => Token::Ident(s),
    }
}

/// Create a lexer for the query-string grammar.
pub fn lexer<'src>(
) -> impl Parser<'src, &'src str, Vec<(Token<'src>, SimpleSpan)>, extra::Err<Rich<'src, char>>> {
    // Identifiers: start with a letter, `_`, `$` (option keywords) or `@`
    // (well-known aliases); dots continue an identifier so `@iot.id` and
    // `geo.distance` stay single tokens.
    let ident = any()
        .filter(|c: &char| c.is_ascii_alphabetic() || *c == '_' || *c == '$' || *c == '@')
        .then(
            any()
                .filter(|c: &char| c.is_ascii_alphanumeric() || *c == '_' || *c == '.')
                .repeated(),
        )
        .to_slice()
        .map(keyword_or_ident);

    // String literals: '...' with '' escaping; the body keeps escapes.
    let string_lit = just('\'')
        .ignore_then(
            choice((just("''").ignored(), none_of('\'').ignored()))
                .repeated()
                .to_slice(),
        )
        .then_ignore(just('\''))
        .map(Token::Str);

    // Digit runs of a fixed width, reused by the temporal shapes.
    let digits = |n: usize| {
        any()
            .filter(|c: &char| c.is_ascii_digit())
            .repeated()
            .exactly(n)
    };
    let frac = just('.').then(
        any()
            .filter(|c: &char| c.is_ascii_digit())
            .repeated()
            .at_least(1),
    );

    // hh:mm[:ss[.fff]]
    let clock = digits(2)
        .then(just(':'))
        .then(digits(2))
        .then(just(':').then(digits(2)).then(frac.clone().or_not()).or_not());

    // Z or +hh:mm / -hh:mm
    let offset = choice((
        just('Z').ignored(),
        one_of("+-")
            .then(digits(2))
            .then(just(':'))
            .then(digits(2))
            .ignored(),
    ));

    // yyyy-mm-dd[Thh:mm[:ss[.fff]][offset]]
    let date_time = digits(4)
        .then(just('-'))
        .then(digits(2))
        .then(just('-'))
        .then(digits(2))
        .then(just('T').then(clock.clone()).then(offset.or_not()).or_not());

    // A date-time optionally extended into a start/end interval, or a bare
    // time of day.
    let temporal = choice((
        date_time
            .clone()
            .then(just('/').then(date_time).or_not())
            .to_slice(),
        clock.to_slice(),
    ))
    .map(Token::Temporal);

    // Numbers: integers, decimals, exponent forms. The sign lives in the
    // grammar (unary minus), not the token.
    let number = text::digits(10)
        .then(just('.').then(text::digits(10)).or_not())
        .then(
            one_of("eE")
                .then(one_of("+-").or_not())
                .then(text::digits(10))
                .or_not(),
        )
        .to_slice()
        .map(Token::Number);

    let symbol = choice((
        just('&').to(Token::Amp),
        just(';').to(Token::Semicolon),
        just(',').to(Token::Comma),
        just('/').to(Token::Slash),
        just('(').to(Token::LParen),
        just(')').to(Token::RParen),
        just('[').to(Token::LBracket),
        just(']').to(Token::RBracket),
        just('=').to(Token::EqSign),
        just('-').to(Token::Minus),
    ));

    // Temporal shapes start with digits, so they must win over plain numbers.
    let token = choice((temporal, number, ident, string_lit, symbol))
        .map_with(|tok, e| (tok, e.span()));

    token
        .padded()
        .repeated()
        .collect()
        .padded()
        .then_ignore(end())
}

/// Lex a query string into tokens.
pub fn lex(source: &str) -> Result<Vec<(Token<'_>, SimpleSpan)>, Vec<Rich<'_, char>>> {
    let (tokens, errs) = lexer().parse(source).into_output_errors();
    if errs.is_empty() {
        Ok(tokens.unwrap_or_default())
    } else {
        Err(errs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Helper to extract just the tokens (without spans) for easier testing.
    fn tokens_only(source: &str) -> Vec<Token<'_>> {
        lex(source)
            .expect("lexing should succeed")
            .into_iter()
            .map(|(t, _)| t)
            .collect()
    }

    #[test]
    fn test_lex_keywords() {
        assert_eq!(
            tokens_only("and or not eq ne lt le gt ge add sub mul div mod"),
            vec![
                Token::And,
                Token::Or,
                Token::Not,
                Token::Eq,
                Token::Ne,
                Token::Lt,
                Token::Le,
                Token::Gt,
                Token::Ge,
                Token::Add,
                Token::Sub,
                Token::Mul,
                Token::Div,
                Token::Mod,
            ]
        );
    }

    #[test]
    fn test_lex_keywords_are_case_sensitive() {
        assert_eq!(tokens_only("AND"), vec![Token::Ident("AND")]);
    }

    #[test]
    fn test_lex_idents() {
        assert_eq!(
            tokens_only("result $top @iot.id geo.distance _x"),
            vec![
                Token::Ident("result"),
                Token::Ident("$top"),
                Token::Ident("@iot.id"),
                Token::Ident("geo.distance"),
                Token::Ident("_x"),
            ]
        );
    }

    #[test]
    fn test_lex_numbers() {
        assert_eq!(
            tokens_only("5 3.25 1e6 2.5E-3"),
            vec![
                Token::Number("5"),
                Token::Number("3.25"),
                Token::Number("1e6"),
                Token::Number("2.5E-3"),
            ]
        );
    }

    #[test]
    fn test_lex_strings() {
        assert_eq!(
            tokens_only("'hello' 'it''s'"),
            vec![Token::Str("hello"), Token::Str("it''s")]
        );
    }

    #[test]
    fn test_lex_temporal() {
        assert_eq!(
            tokens_only("2024-06-01 2024-06-01T12:30:00Z 13:45:00"),
            vec![
                Token::Temporal("2024-06-01"),
                Token::Temporal("2024-06-01T12:30:00Z"),
                Token::Temporal("13:45:00"),
            ]
        );
    }

    #[test]
    fn test_lex_interval_is_one_token() {
        assert_eq!(
            tokens_only("2024-06-01T00:00:00Z/2024-07-01T00:00:00+02:00"),
            vec![Token::Temporal(
                "2024-06-01T00:00:00Z/2024-07-01T00:00:00+02:00"
            )]
        );
    }

    #[test]
    fn test_lex_duration_splits_into_ident_and_string() {
        assert_eq!(
            tokens_only("duration'P1DT2H'"),
            vec![Token::Ident("duration"), Token::Str("P1DT2H")]
        );
    }

    #[test]
    fn test_lex_symbols() {
        assert_eq!(
            tokens_only("& ; , / ( ) [ ] = -"),
            vec![
                Token::Amp,
                Token::Semicolon,
                Token::Comma,
                Token::Slash,
                Token::LParen,
                Token::RParen,
                Token::LBracket,
                Token::RBracket,
                Token::EqSign,
                Token::Minus,
            ]
        );
    }

    #[test]
    fn test_lex_full_option_string() {
        assert_eq!(
            tokens_only("$filter=result gt 10&$top=5"),
            vec![
                Token::Ident("$filter"),
                Token::EqSign,
                Token::Ident("result"),
                Token::Gt,
                Token::Number("10"),
                Token::Amp,
                Token::Ident("$top"),
                Token::EqSign,
                Token::Number("5"),
            ]
        );
    }

    #[test]
    fn test_lex_path_slash_is_separate() {
        assert_eq!(
            tokens_only("Datastream/name"),
            vec![
                Token::Ident("Datastream"),
                Token::Slash,
                Token::Ident("name"),
            ]
        );
    }

    #[test]
    fn test_lex_spans() {
        let result = lex("$top=5").expect("lexing should succeed");
        assert_eq!(result.len(), 3);
        assert_eq!(result[0].0, Token::Ident("$top"));
        assert_eq!(result[0].1.start, 0);
        assert_eq!(result[0].1.end, 4);
        assert_eq!(result[2].1.start, 5);
    }

    #[test]
    fn test_lex_empty_input() {
        assert!(tokens_only("").is_empty());
    }
}
