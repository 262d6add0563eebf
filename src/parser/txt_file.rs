use crate::parser::types::Request;

/// `.txt` 文件解析器：每个非空行是一个 GET 请求的 URL
pub struct TxtFileParser;

impl TxtFileParser {
    pub fn parse_content(content: &str) -> Vec<Request> {
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);

        content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| Request::new("GET", line))
            .collect()
    }
}
