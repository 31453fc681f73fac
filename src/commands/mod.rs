//! Command implementations for the prodlens CLI

mod generate;
mod misc;

pub use generate::*;
pub use misc::*;
