//! Output formatting for CLI results

pub mod csv;
pub mod formatters;
pub mod table;
