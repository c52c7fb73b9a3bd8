pub mod chart;
pub mod dataset;
pub mod error;
pub mod metrics;
pub mod model;
pub mod pipeline;
pub mod scaffold;
pub mod split;
pub mod subcommands;
pub mod utils;

pub use error::{Error, Result};
