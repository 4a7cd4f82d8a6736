#[cfg(feature = "cli")]
pub mod job;
pub mod pipelines;
