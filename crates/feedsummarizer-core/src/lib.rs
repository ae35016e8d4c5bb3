pub mod ai;
pub mod config;
pub mod delivery;
pub mod digest;
pub mod error;
pub mod feed;
pub mod pipeline;

pub use config::AppConfig;
pub use error::{Error, Result};
pub use pipeline::{DigestPipeline, PipelineOptions, RunOutcome};
