//! SQL Dialect definitions and formatting rules.
//!
//! This module provides a trait-based abstraction for SQL dialect
//! differences. Each dialect implements `SqlDialect`:
//!
//! - Identifier quoting: `"` (ANSI/PostgreSQL), `` ` `` (MySQL)
//! - Literal formats for timestamps, dates, times, durations
//! - jsonb support (the JSON field machinery is PostgreSQL-shaped; dialects
//!   without jsonb reject those operations at compile time)
//! - Function name remapping

mod mysql;
mod postgres;

pub use mysql::MySql;
pub use postgres::Postgres;

/// SQL dialect trait - defines how SQL constructs are rendered.
///
/// Default implementations follow ANSI SQL where possible.
pub trait SqlDialect: std::fmt::Debug {
    /// Dialect name for display/logging.
    fn name(&self) -> &'static str;

    // =========================================================================
    // Identifier and Literal Quoting
    // =========================================================================

    /// Quote an identifier (table, column, alias).
    fn quote_identifier(&self, ident: &str) -> String;

    /// Quote a string literal.
    ///
    /// All dialects use single quotes with `''` for escaping.
    fn quote_string(&self, s: &str) -> String {
        format!("'{}'", s.replace('\'', "''"))
    }

    /// Format a boolean literal.
    fn format_bool(&self, b: bool) -> &'static str;

    /// Format a date literal.
    fn format_date_literal(&self, date: &str) -> String {
        format!("DATE '{}'", date)
    }

    /// Format a time-of-day literal.
    fn format_time_literal(&self, time: &str) -> String {
        format!("TIME '{}'", time)
    }

    /// Format a timestamp-with-offset literal.
    fn format_timestamp_literal(&self, ts: &str) -> String;

    /// Format an ISO-8601 duration literal.
    fn format_duration_literal(&self, iso: &str) -> String {
        format!("INTERVAL '{}'", iso)
    }

    // =========================================================================
    // Capabilities
    // =========================================================================

    /// Whether this dialect supports the `||` concat operator.
    fn supports_concat_operator(&self) -> bool {
        true
    }

    /// String concatenation operator.
    fn concat_operator(&self) -> &'static str {
        "||"
    }

    /// Whether jsonb extraction/containment operators and `to_jsonb` exist.
    fn supports_jsonb(&self) -> bool {
        false
    }

    /// Whether `INTERVAL '<iso-8601>'` literals parse.
    fn supports_iso_duration(&self) -> bool {
        false
    }

    // =========================================================================
    // Casts and Functions
    // =========================================================================

    /// The type name used for a logical cast target.
    fn cast_type_name(&self, target: CastType) -> &'static str {
        match target {
            CastType::Text => "TEXT",
            CastType::Numeric => "NUMERIC",
            CastType::Boolean => "BOOLEAN",
            CastType::BigInt => "BIGINT",
            CastType::Double => "DOUBLE PRECISION",
            CastType::Jsonb => "JSONB",
            CastType::Date => "DATE",
            CastType::Time => "TIME",
            CastType::Timestamp => "TIMESTAMP WITH TIME ZONE",
        }
    }

    /// Remap a function name for this dialect.
    ///
    /// Returns `Some(new_name)` if the function should be remapped, `None`
    /// to keep the original. The input is matched case-insensitively.
    fn remap_function(&self, name: &str) -> Option<&'static str> {
        let _ = name;
        None
    }
}

/// Cast targets the field compiler can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CastType {
    Text,
    Numeric,
    Boolean,
    BigInt,
    Double,
    Jsonb,
    Date,
    Time,
    Timestamp,
}

/// Supported SQL dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dialect {
    #[default]
    Postgres,
    MySql,
}

impl Dialect {
    /// Get the dialect implementation.
    pub fn dialect(&self) -> &'static dyn SqlDialect {
        match self {
            Dialect::Postgres => &Postgres,
            Dialect::MySql => &MySql,
        }
    }
}

// Implement SqlDialect for Dialect enum by delegating to concrete types
impl SqlDialect for Dialect {
    fn name(&self) -> &'static str {
        self.dialect().name()
    }

    fn quote_identifier(&self, ident: &str) -> String {
        self.dialect().quote_identifier(ident)
    }

    fn quote_string(&self, s: &str) -> String {
        self.dialect().quote_string(s)
    }

    fn format_bool(&self, b: bool) -> &'static str {
        self.dialect().format_bool(b)
    }

    fn format_date_literal(&self, date: &str) -> String {
        self.dialect().format_date_literal(date)
    }

    fn format_time_literal(&self, time: &str) -> String {
        self.dialect().format_time_literal(time)
    }

    fn format_timestamp_literal(&self, ts: &str) -> String {
        self.dialect().format_timestamp_literal(ts)
    }

    fn format_duration_literal(&self, iso: &str) -> String {
        self.dialect().format_duration_literal(iso)
    }

    fn supports_concat_operator(&self) -> bool {
        self.dialect().supports_concat_operator()
    }

    fn concat_operator(&self) -> &'static str {
        self.dialect().concat_operator()
    }

    fn supports_jsonb(&self) -> bool {
        self.dialect().supports_jsonb()
    }

    fn supports_iso_duration(&self) -> bool {
        self.dialect().supports_iso_duration()
    }

    fn cast_type_name(&self, target: CastType) -> &'static str {
        self.dialect().cast_type_name(target)
    }

    fn remap_function(&self, name: &str) -> Option<&'static str> {
        self.dialect().remap_function(name)
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.dialect().name())
    }
}
