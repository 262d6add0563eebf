pub mod discovery;
pub mod grammar;
pub mod http_file;
pub mod txt_file;
pub mod types;

// Re-export commonly used types
pub use discovery::{discover_request_files, scenario_name};
pub use grammar::{RequestGrammar, parse_requests, parse_requests_str};
pub use http_file::HttpFileParser;
pub use txt_file::TxtFileParser;
pub use types::{GrammarError, HOST_PLACEHOLDER, Headers, ParseError, ParseResult, Request};
