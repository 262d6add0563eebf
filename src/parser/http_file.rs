use crate::parser::types::{GrammarError, HOST_PLACEHOLDER, Headers, Request};
use tracing::debug;

const DELIMITER: &str = "###";

/// `.http` 文件解析器
///
/// 文件由若干请求块组成：
///
/// ```text
/// ### 可选注释
/// METHOD http(s)://{{host}}/path?query
/// Header-Name: value
/// {"json": "body"}
/// ```
pub struct HttpFileParser;

/// 逐行游标，行号从 1 开始
struct LineCursor<'a> {
    lines: Vec<&'a str>,
    position: usize,
}

impl<'a> LineCursor<'a> {
    fn new(content: &'a str) -> Self {
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);
        Self {
            lines: content.lines().collect(),
            position: 0,
        }
    }

    fn peek(&self) -> Option<(usize, &'a str)> {
        self.lines
            .get(self.position)
            .map(|line| (self.position + 1, *line))
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    fn skip_blank(&mut self) {
        while let Some((_, line)) = self.peek() {
            if !line.trim().is_empty() {
                break;
            }
            self.advance();
        }
    }

    /// 当前块是否结束（文件末尾或下一个分隔符）
    fn at_block_end(&self) -> bool {
        match self.peek() {
            Some((_, line)) => line.starts_with(DELIMITER),
            None => true,
        }
    }
}

impl HttpFileParser {
    /// 从字符串内容解析，全部成功或整体失败
    pub fn parse_content(content: &str) -> Result<Vec<Request>, GrammarError> {
        let mut cursor = LineCursor::new(content);
        let mut requests = Vec::new();

        cursor.skip_blank();
        while let Some((line_number, line)) = cursor.peek() {
            let comment = Self::parse_delimiter(line, line_number)?;
            cursor.advance();

            let request = Self::parse_block(comment, line_number, &mut cursor)?;
            debug!(
                line = line_number,
                method = request.method(),
                path = request.path(),
                "Parsed request block"
            );
            requests.push(request);

            cursor.skip_blank();
        }

        if requests.is_empty() {
            return Err(GrammarError::NoRequests);
        }

        Ok(requests)
    }

    /// 解析 `### comment` 行，返回注释
    fn parse_delimiter(line: &str, line_number: usize) -> Result<String, GrammarError> {
        let comment = line
            .strip_prefix(DELIMITER)
            .ok_or(GrammarError::MissingDelimiter { line: line_number })?;

        Ok(comment.trim_start_matches(' ').to_string())
    }

    /// 解析分隔符之后的请求行、Headers 和 Body
    fn parse_block(
        comment: String,
        delimiter_line: usize,
        cursor: &mut LineCursor<'_>,
    ) -> Result<Request, GrammarError> {
        cursor.skip_blank();
        if cursor.at_block_end() {
            return Err(GrammarError::MissingRequestLine {
                line: delimiter_line,
            });
        }

        let (line_number, line) = cursor
            .peek()
            .ok_or(GrammarError::MissingRequestLine {
                line: delimiter_line,
            })?;
        let (method, url) = Self::parse_request_line(line, line_number)?;
        cursor.advance();

        let mut request = Request::new(method, url).with_comment(comment);
        let mut headers = Headers::new();

        loop {
            cursor.skip_blank();
            if cursor.at_block_end() {
                break;
            }

            let Some((line_number, line)) = cursor.peek() else {
                break;
            };

            if Self::is_body_start(line) {
                let body = Self::parse_body(cursor)?;
                request = request.with_json_body(body);
                break;
            }

            let (name, value) =
                Self::parse_header(line).ok_or(GrammarError::InvalidHeader { line: line_number })?;
            headers.insert(name, value);
            cursor.advance();
        }

        Ok(request.with_headers(headers))
    }

    /// 解析请求行（方法 + URL）
    fn parse_request_line(line: &str, line_number: usize) -> Result<(&str, &str), GrammarError> {
        let line = line.trim_start();
        let method_len = line
            .find(|c: char| !c.is_ascii_uppercase())
            .unwrap_or(line.len());
        let (method, rest) = line.split_at(method_len);

        if method.is_empty() || !rest.starts_with(char::is_whitespace) {
            let found = line.split_whitespace().next().unwrap_or_default();
            return Err(GrammarError::InvalidMethod {
                found: found.to_string(),
                line: line_number,
            });
        }

        let url = rest.trim_start();
        let after_scheme = url
            .strip_prefix("https://")
            .or_else(|| url.strip_prefix("http://"))
            .ok_or(GrammarError::InvalidUrl { line: line_number })?;

        if !after_scheme.starts_with(HOST_PLACEHOLDER) {
            return Err(GrammarError::InvalidUrl { line: line_number });
        }

        Ok((method, url))
    }

    /// 解析 header 行，名称只允许字母和 '-'
    fn parse_header(line: &str) -> Option<(&str, &str)> {
        let (name, value) = line.split_once(':')?;
        let name = name.trim();
        let value = value.trim_start();

        let valid_name = !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_alphabetic() || c == '-');

        if valid_name && !value.is_empty() {
            Some((name, value))
        } else {
            None
        }
    }

    fn is_body_start(line: &str) -> bool {
        let line = line.trim_start();
        line.starts_with('{') || line.starts_with('[')
    }

    /// 读取连续的非空行作为 JSON body，去掉换行后解析
    fn parse_body(cursor: &mut LineCursor<'_>) -> Result<serde_json::Value, GrammarError> {
        let start_line = cursor.peek().map(|(n, _)| n).unwrap_or_default();
        let mut raw = String::new();

        while let Some((_, line)) = cursor.peek() {
            if line.trim().is_empty() || line.starts_with(DELIMITER) {
                break;
            }
            raw.push_str(line);
            cursor.advance();
        }

        serde_json::from_str(&raw).map_err(|source| GrammarError::InvalidJsonBody {
            line: start_line,
            source,
        })
    }
}
