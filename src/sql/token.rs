//! SQL Tokens - the atomic units of SQL output.
//!
//! Tokens are dialect-agnostic representations that serialize
//! to dialect-specific strings.

use super::dialect::{Dialect, SqlDialect};

/// SQL Token - every element a compiled field or condition can contain.
///
/// Adding a new variant here will cause compile errors everywhere
/// it needs to be handled (exhaustive matching).
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // === Keywords ===
    And,
    Or,
    Not,
    In,
    From,
    For,
    As,
    Cast,
    Like,
    Between,
    IsNull,
    IsNotNull,
    Null,
    True,
    False,
    Interval,

    // === Punctuation ===
    Comma,
    Dot,
    LParen,
    RParen,

    // === Operators ===
    Eq,
    Ne,
    Lt,
    Gt,
    Lte,
    Gte,
    Plus,
    Minus,
    Mul,
    Div,
    Mod,
    Concat,
    /// jsonb path extraction: `#>`
    JsonGet,
    /// jsonb path extraction as text: `#>>`
    JsonGetText,
    /// jsonb containment: `@>`
    JsonContains,

    // === Whitespace ===
    Space,

    // === Dynamic Content ===
    /// Simple identifier (table, column, alias)
    Ident(String),
    /// Integer literal
    LitInt(i64),
    /// Float literal
    LitFloat(f64),
    /// String literal
    LitString(String),
    /// Boolean literal
    LitBool(bool),
    /// Date literal, `YYYY-MM-DD`
    LitDate(String),
    /// Time-of-day literal
    LitTime(String),
    /// Timestamp-with-offset literal
    LitTimestamp(String),
    /// ISO-8601 duration literal
    LitDuration(String),

    // === Function Names ===
    /// Function name - rendered upper-case, with dialect remapping
    FunctionName(String),
    /// A date-part keyword inside EXTRACT (`YEAR`, `SECOND`, ...)
    DatePart(&'static str),

    /// SQL type name in a CAST, dialect-resolved
    TypeName(&'static str),
}

impl Token {
    /// Serialize this token to a string for the given dialect.
    pub fn serialize(&self, dialect: Dialect) -> String {
        match self {
            // Keywords
            Token::And => "AND".into(),
            Token::Or => "OR".into(),
            Token::Not => "NOT".into(),
            Token::In => "IN".into(),
            Token::From => "FROM".into(),
            Token::For => "FOR".into(),
            Token::As => "AS".into(),
            Token::Cast => "CAST".into(),
            Token::Like => "LIKE".into(),
            Token::Between => "BETWEEN".into(),
            Token::IsNull => "IS NULL".into(),
            Token::IsNotNull => "IS NOT NULL".into(),
            Token::Null => "NULL".into(),
            Token::True => "TRUE".into(),
            Token::False => "FALSE".into(),
            Token::Interval => "INTERVAL".into(),

            // Punctuation
            Token::Comma => ",".into(),
            Token::Dot => ".".into(),
            Token::LParen => "(".into(),
            Token::RParen => ")".into(),

            // Operators
            Token::Eq => "=".into(),
            Token::Ne => "<>".into(),
            Token::Lt => "<".into(),
            Token::Gt => ">".into(),
            Token::Lte => "<=".into(),
            Token::Gte => ">=".into(),
            Token::Plus => "+".into(),
            Token::Minus => "-".into(),
            Token::Mul => "*".into(),
            Token::Div => "/".into(),
            Token::Mod => "%".into(),
            Token::Concat => dialect.concat_operator().into(),
            Token::JsonGet => "#>".into(),
            Token::JsonGetText => "#>>".into(),
            Token::JsonContains => "@>".into(),

            // Whitespace
            Token::Space => " ".into(),

            // Dynamic - dialect-specific formatting
            Token::Ident(name) => dialect.quote_identifier(name),
            Token::LitInt(n) => n.to_string(),
            Token::LitFloat(f) => {
                if f.is_nan() {
                    panic!("Cannot serialize NaN to SQL")
                }
                if f.is_infinite() {
                    panic!("Cannot serialize Infinity to SQL")
                }
                // Use ryu for fast, accurate float formatting
                let mut buffer = ryu::Buffer::new();
                buffer.format(*f).to_string()
            }
            Token::LitString(s) => dialect.quote_string(s),
            Token::LitBool(b) => dialect.format_bool(*b).into(),
            Token::LitDate(d) => dialect.format_date_literal(d),
            Token::LitTime(t) => dialect.format_time_literal(t),
            Token::LitTimestamp(ts) => dialect.format_timestamp_literal(ts),
            Token::LitDuration(iso) => dialect.format_duration_literal(iso),

            // Function names with dialect-specific remapping
            Token::FunctionName(name) => match dialect.remap_function(name) {
                Some(remapped) => remapped.to_uppercase(),
                None => name.to_uppercase(),
            },
            Token::DatePart(part) => (*part).into(),
            Token::TypeName(name) => (*name).into(),
        }
    }
}

/// A stream of tokens that can be serialized to SQL.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TokenStream {
    tokens: Vec<Token>,
}

impl TokenStream {
    /// Create an empty token stream.
    pub fn new() -> Self {
        Self { tokens: vec![] }
    }

    /// Push a single token.
    pub fn push(&mut self, token: Token) -> &mut Self {
        self.tokens.push(token);
        self
    }

    /// Extend with multiple tokens.
    pub fn extend(&mut self, tokens: impl IntoIterator<Item = Token>) -> &mut Self {
        self.tokens.extend(tokens);
        self
    }

    /// Append another token stream.
    pub fn append(&mut self, other: &TokenStream) -> &mut Self {
        self.tokens.extend(other.tokens.iter().cloned());
        self
    }

    /// Serialize all tokens to a SQL string.
    pub fn serialize(&self, dialect: Dialect) -> String {
        self.tokens.iter().map(|t| t.serialize(dialect)).collect()
    }

    // Convenience methods for common tokens
    pub fn space(&mut self) -> &mut Self {
        self.push(Token::Space)
    }
    pub fn comma(&mut self) -> &mut Self {
        self.push(Token::Comma)
    }
    pub fn lparen(&mut self) -> &mut Self {
        self.push(Token::LParen)
    }
    pub fn rparen(&mut self) -> &mut Self {
        self.push(Token::RParen)
    }
}
