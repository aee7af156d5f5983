//! liftos - Progressive overload training log
//!
//! Sets go into a header + string-cell sheet; analytics, recovery tracking and
//! a persona-switched AI coach are computed from it on demand.

pub mod coach;
pub mod db;
pub mod error;
pub mod exercises;
pub mod llm;
pub mod ml;
pub mod session;
pub mod tips;
pub mod tui;

pub use db::Database;
pub use error::{LiftError, Result};
