//! View components for the LinDash application.

pub mod canvas;
pub mod dashboard;
pub mod metric;
