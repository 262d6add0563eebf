pub mod loader;
pub mod types;

pub use loader::ConfigLoader;
pub use types::{
    ConfigError, Endpoints, FilterConfig, GOLDEN_API_URL, ReplayConfig, TESTING_API_URL,
    resolve_env_vars,
};
