// Public library interface for the sunburst chart engine.
// This allows the debug CLI tool to use the core modules.

pub mod anim;
pub mod chart;
pub mod config;
pub mod data;
pub mod error;
pub mod labels;
pub mod layout;
pub mod render;
pub mod tree;
pub mod ui;

pub use chart::Chart;
pub use config::ChartConfig;
pub use data::{DataView, RowIdentity, SourceRow};
pub use error::ChartError;
