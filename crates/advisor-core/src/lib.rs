pub mod config;
pub mod error;
pub mod types;

pub use config::AdvisorConfig;
pub use error::{AdvisorError, Result};
pub use types::*;
