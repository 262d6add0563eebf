use crate::parser::http_file::HttpFileParser;
use crate::parser::txt_file::TxtFileParser;
use crate::parser::types::{GrammarError, ParseError, ParseResult, Request};
use std::path::Path;
use tracing::info;

/// 请求文件格式，由扩展名决定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestGrammar {
    /// `.txt`：每行一个 URL
    Txt,
    /// `.http`：`###` 分隔的请求块
    Http,
}

impl RequestGrammar {
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("txt") => Some(RequestGrammar::Txt),
            Some("http") => Some(RequestGrammar::Http),
            _ => None,
        }
    }

    pub fn parse(self, content: &str) -> Result<Vec<Request>, GrammarError> {
        match self {
            RequestGrammar::Txt => Ok(TxtFileParser::parse_content(content)),
            RequestGrammar::Http => HttpFileParser::parse_content(content),
        }
    }
}

/// 从文件路径解析请求
pub fn parse_requests<P: AsRef<Path>>(path: P) -> ParseResult<Vec<Request>> {
    let path = path.as_ref();
    let grammar = grammar_for(path)?;

    let content = std::fs::read_to_string(path).map_err(|source| ParseError::Io {
        file: path.to_path_buf(),
        source,
    })?;

    parse_with(grammar, path, &content)
}

/// 从已读取的内容解析，`path` 只用于选择语法和报告错误
pub fn parse_requests_str<P: AsRef<Path>>(path: P, content: &str) -> ParseResult<Vec<Request>> {
    let path = path.as_ref();
    let grammar = grammar_for(path)?;
    parse_with(grammar, path, content)
}

fn grammar_for(path: &Path) -> ParseResult<RequestGrammar> {
    RequestGrammar::from_path(path).ok_or_else(|| ParseError::UnsupportedFormat {
        file: path.to_path_buf(),
    })
}

fn parse_with(grammar: RequestGrammar, path: &Path, content: &str) -> ParseResult<Vec<Request>> {
    let requests = grammar
        .parse(content)
        .map_err(|error| ParseError::from_grammar(path, error))?;

    info!(
        file = %path.display(),
        count = requests.len(),
        "Parsed request file"
    );

    Ok(requests)
}
