//! CLI subcommand implementations

pub mod predict;
pub mod train;
pub mod weights;
