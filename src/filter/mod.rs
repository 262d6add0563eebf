// 对比 golden / testing 响应前的过滤
// 排除表达式只编译一次，树中不存在的路径直接跳过

pub mod exclude;
pub mod response;

pub use exclude::{DEFAULT_MAX_DEPTH, Exclude, ExcludeError, ExcludeParser, parse_excludes};
pub use response::{Response, ResponseFilter, filter_data, filter_response};
