pub mod classifier;
pub mod email;

pub use classifier::{ProviderRule, ProviderRules};
pub use email::extract_domain;
