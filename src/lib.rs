pub mod config;
pub mod error;
pub mod filter;
pub mod logger;
pub mod parser;
pub mod utils;

// Re-export commonly used types
pub use error::{ReplayError, Result};
pub use filter::{Exclude, ExcludeParser, Response, ResponseFilter, filter_data, filter_response};
pub use parser::{Headers, Request, parse_requests};
