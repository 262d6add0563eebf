pub mod formatter;

pub use formatter::{RequestFormat, RequestFormatter, format_response, request_files_table};
