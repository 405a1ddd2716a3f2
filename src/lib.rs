pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod output;
pub mod process;
pub mod provider;
pub mod shutdown;

pub use crate::core::*;
pub use error::*;
pub use provider::{ProviderKind, SwipeProvider};
