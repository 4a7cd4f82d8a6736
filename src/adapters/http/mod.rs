pub mod doh;

pub use doh::{DohResolver, DEFAULT_RESOLVER_URL};
