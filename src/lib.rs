pub mod agent;
pub mod assistant;
pub mod cache;
pub mod cli;
pub mod compare;
pub mod competitors;
pub mod config;
pub mod document;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod narrative;
pub mod product;
pub mod profile;
pub mod structured;

pub use error::{ProdlensError, Result};
