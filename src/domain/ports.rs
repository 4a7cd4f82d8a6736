use crate::domain::model::{CsvTable, MxRecord, TransformResult};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    /// Human readable location of `path`, used in logs and the run report.
    fn location(&self, path: &str) -> String;

    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

#[async_trait]
pub trait MxResolver: Send + Sync {
    async fn lookup(&self, domain: &str) -> Result<Vec<MxRecord>>;
}

pub trait ConfigProvider: Send + Sync {
    fn input_key(&self) -> &str;
    fn output_key(&self) -> String;
    fn email_column(&self) -> &str;
    fn host_column(&self) -> &str;
    fn concurrency(&self) -> usize;
    fn show_progress(&self) -> bool;
    fn write_summary(&self) -> bool;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<CsvTable>;
    async fn transform(&self, table: CsvTable) -> Result<TransformResult>;
    async fn load(&self, result: TransformResult) -> Result<String>;
}
