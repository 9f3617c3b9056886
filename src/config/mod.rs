pub mod loader;
pub mod schema;

pub use loader::{load_from_path, load_from_str, resolve_config_path, ConfigError, CONFIG_ENV};
pub use schema::{Config, FilesConfig, GrammarConfig, ValidationError, ValidationIssue};
