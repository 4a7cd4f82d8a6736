pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::app::job::run_job;
#[cfg(feature = "cli")]
pub use crate::config::CliConfig;

pub use crate::adapters::http::DohResolver;
pub use crate::adapters::storage::{GcsAuth, GcsStorage, LocalStorage, TokenSource};
pub use crate::app::pipelines::EmailHostPipeline;
pub use crate::core::etl::EtlEngine;
pub use crate::domain::services::ProviderRules;
pub use crate::utils::error::{EtlError, Result};
