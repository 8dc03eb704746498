//! # judgeloops-provider
//!
//! The "prompt in, text out" capability that both the generator and the
//! judge are built on, plus the process-backed implementation.

mod command;
mod output;
mod spawner;
mod traits;

pub use command::{split_args, CommandProvider};
pub use output::ProviderOutput;
pub use spawner::ProcessSpawner;
pub use traits::{Provider, ProviderConfig, ProviderError};
