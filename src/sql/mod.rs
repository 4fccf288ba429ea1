//! SQL generation module.
//!
//! This module turns compiled queries into dialect-safe SQL fragments:
//!
//! - [`token`] - Token types for SQL serialization
//! - [`dialect`] - SQL dialect implementations (PostgreSQL, MySQL)
//! - [`expr`] - SQL expression AST
//! - [`wrapper`] - Field wrappers: the SQL-level representatives of
//!   expression nodes, including the temporal interval algebra and the
//!   JSON coercion rules
//! - [`compile`] - The field compiler driving wrapper dispatch
//!
//! The output is fields and conditions; statement assembly and execution
//! live in the persistence layer.

pub mod compile;
pub mod dialect;
pub mod expr;
pub mod token;
pub mod wrapper;

pub use compile::FieldCompiler;
pub use dialect::{CastType, Dialect, MySql, Postgres, SqlDialect};
pub use expr::{col, func, lit_bool, lit_int, lit_str, table_col, BinaryOperator, Expr, Literal, UnaryOperator};
pub use token::{Token, TokenStream};
pub use wrapper::{FieldWrapper, JsonFields, JsonWrapper, TimeOperand};
