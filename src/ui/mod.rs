pub mod input;
pub mod legend;
pub mod selection;
pub mod tooltip;
