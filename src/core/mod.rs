pub mod etl;

pub use crate::domain::model::{CsvTable, RunReport, TransformResult};
pub use crate::domain::ports::{ConfigProvider, MxResolver, Pipeline, Storage};
pub use crate::utils::error::Result;
