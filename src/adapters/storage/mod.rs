pub mod gcs;
pub mod gcs_auth;
pub mod local;

pub use gcs::{GcsStorage, DEFAULT_STORAGE_ENDPOINT};
pub use gcs_auth::{GcsAuth, ServiceAccountKey, TokenSource};
pub use local::LocalStorage;
