//! Small helpers shared across layers.
//!
//! - [`db_error`] - Constraint-name parsing for database error mapping

pub mod db_error;
