// Adapters layer: concrete implementations for external systems (CSV codec, storage, DNS over HTTP).

pub mod csv;
pub mod http;
pub mod storage;
