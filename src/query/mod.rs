//! Query gateway
//!
//! - `engine`: classifies submitted SQL and dispatches it to the read or write path
//! - `encoder`: turns engine-native row values into transport-safe ones

pub mod encoder;
pub mod engine;

pub use encoder::{encode_value, Row, RowValue};
pub use engine::{classify, ExecSummary, QueryEngine, QueryResult, StatementKind};
