pub mod email_host_pipeline;

pub use email_host_pipeline::EmailHostPipeline;
