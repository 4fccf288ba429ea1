//! PostgreSQL dialect.
//!
//! The primary dialect: jsonb operators, ISO-8601 interval input, and
//! timestamptz literals are all native.

use super::SqlDialect;

#[derive(Debug, Clone, Copy, Default)]
pub struct Postgres;

impl SqlDialect for Postgres {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        format!("\"{}\"", ident.replace('"', "\"\""))
    }

    fn format_bool(&self, b: bool) -> &'static str {
        if b {
            "true"
        } else {
            "false"
        }
    }

    fn format_timestamp_literal(&self, ts: &str) -> String {
        format!("TIMESTAMPTZ '{}'", ts)
    }

    fn supports_jsonb(&self) -> bool {
        true
    }

    fn supports_iso_duration(&self) -> bool {
        true
    }
}
