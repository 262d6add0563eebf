use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReplayError {
    #[error("请求文件解析错误: {0}")]
    Parse(#[from] crate::parser::ParseError),

    #[error("排除表达式错误: {0}")]
    Exclude(#[from] crate::filter::ExcludeError),

    #[error("配置错误: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error("IO 错误: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON 解析错误: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

// Add conversion from anyhow::Error
impl From<anyhow::Error> for ReplayError {
    fn from(err: anyhow::Error) -> Self {
        ReplayError::Other(err.to_string())
    }
}

/// Result type for rureplay crate
pub type Result<T> = std::result::Result<T, ReplayError>;
