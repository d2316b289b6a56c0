pub mod cache;
pub mod rules;
pub mod validator;

pub use cache::{CacheStats, ValidationCache};
pub use rules::{BlobValidationConfig, RuleError};
pub use validator::{BlobValidator, ValidationResult};
