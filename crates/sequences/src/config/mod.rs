mod loader;
mod schema;

pub use loader::{from_env, load_from_file, load_from_str, validate, LoadError};
pub use schema::{DatabaseConfig, SequencesConfig};
