//! MySQL dialect.
//!
//! Exercises the quoting/boolean/concat differences. jsonb operators and
//! ISO-8601 interval literals do not exist here, so the field compiler
//! rejects JSON and duration operations for this dialect.

use super::{CastType, SqlDialect};

#[derive(Debug, Clone, Copy, Default)]
pub struct MySql;

impl SqlDialect for MySql {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        format!("`{}`", ident.replace('`', "``"))
    }

    fn format_bool(&self, b: bool) -> &'static str {
        if b {
            "1"
        } else {
            "0"
        }
    }

    fn format_timestamp_literal(&self, ts: &str) -> String {
        format!("TIMESTAMP '{}'", ts)
    }

    /// `||` is logical OR by default; the compiler emits CONCAT() instead.
    fn supports_concat_operator(&self) -> bool {
        false
    }

    fn cast_type_name(&self, target: CastType) -> &'static str {
        match target {
            CastType::Text => "CHAR",
            CastType::Numeric => "DECIMAL(65,30)",
            CastType::Boolean => "UNSIGNED",
            CastType::BigInt => "SIGNED",
            CastType::Double => "DOUBLE",
            CastType::Jsonb => "JSON",
            CastType::Date => "DATE",
            CastType::Time => "TIME",
            CastType::Timestamp => "DATETIME",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quoting() {
        assert_eq!(MySql.quote_identifier("result"), "`result`");
        assert_eq!(MySql.format_bool(true), "1");
    }

    #[test]
    fn test_capabilities() {
        assert!(!MySql.supports_jsonb());
        assert!(!MySql.supports_iso_duration());
        assert!(!MySql.supports_concat_operator());
    }
}
