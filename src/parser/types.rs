use regex::{NoExpand, Regex};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use std::path::PathBuf;
use std::sync::OnceLock;

/// URL 模板中的主机占位符
pub const HOST_PLACEHOLDER: &str = "{{host}}";

/// 有序的 Header 映射
///
/// 保持源文件中的出现顺序；名称区分大小写。
/// 重复插入同名 Header 时，在原位置覆盖旧值。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: Vec<(String, String)>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    /// 插入 Header，返回被覆盖的旧值
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let name = name.into();
        let value = value.into();

        match self.entries.iter_mut().find(|(key, _)| *key == name) {
            Some((_, existing)) => Some(std::mem::replace(existing, value)),
            None => {
                self.entries.push((name, value));
                None
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// 按名称精确删除
    pub fn remove(&mut self, name: &str) -> Option<String> {
        let index = self.entries.iter().position(|(key, _)| key == name)?;
        Some(self.entries.remove(index).1)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Headers {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Headers::new();
        for (name, value) in iter {
            headers.insert(name, value);
        }
        headers
    }
}

impl Serialize for Headers {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Headers {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct HeadersVisitor;

        impl<'de> Visitor<'de> for HeadersVisitor {
            type Value = Headers;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a map of header names to string values")
            }

            // 逐项读取以保留源顺序
            fn visit_map<A>(self, mut access: A) -> Result<Headers, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut headers = Headers::new();
                while let Some((key, value)) = access.next_entry::<String, String>()? {
                    headers.insert(key, value);
                }
                Ok(headers)
            }
        }

        deserializer.deserialize_map(HeadersVisitor)
    }
}

/// 单个解析后的请求描述
///
/// 解析后不可变；需要具体主机时通过 [`Request::specify_host`] 生成新值。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Request {
    comment: String,
    method: String,
    url_template: String,
    path: String,
    headers: Headers,
    json_body: Option<Value>,
}

impl Request {
    /// 创建请求，path 在此时从 URL 模板中提取
    pub fn new(method: impl Into<String>, url_template: impl Into<String>) -> Self {
        let url_template = url_template.into();
        let path = extract_path(&url_template);

        Self {
            comment: String::new(),
            method: method.into(),
            url_template,
            path,
            headers: Headers::new(),
            json_body: None,
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    pub fn with_headers(mut self, headers: Headers) -> Self {
        self.headers = headers;
        self
    }

    pub fn with_json_body(mut self, body: Value) -> Self {
        self.json_body = Some(body);
        self
    }

    pub fn comment(&self) -> &str {
        &self.comment
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn url_template(&self) -> &str {
        &self.url_template
    }

    /// URL 的 path + query 部分
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn json_body(&self) -> Option<&Value> {
        self.json_body.as_ref()
    }

    /// 生成替换了 `{{host}}` 的新请求，原请求保持不变
    ///
    /// `host` 可以是纯主机（`golden.app:8080`），也可以带 scheme
    /// （`https://golden.app`）；带 scheme 时替换模板自身的 scheme。
    pub fn specify_host(&self, host: &str) -> Request {
        static HOST_REGEX: OnceLock<Regex> = OnceLock::new();
        let re = HOST_REGEX.get_or_init(|| Regex::new(r"\{\{\s*host\s*\}\}").unwrap());

        let url = match host.split_once("://") {
            Some((scheme, authority)) => {
                let authority = authority.trim_end_matches('/');
                match strip_scheme(&self.url_template) {
                    Some(rest) if rest.starts_with(HOST_PLACEHOLDER) => format!(
                        "{}://{}{}",
                        scheme,
                        authority,
                        &rest[HOST_PLACEHOLDER.len()..]
                    ),
                    _ => re.replace_all(&self.url_template, NoExpand(host)).to_string(),
                }
            }
            None => re.replace_all(&self.url_template, NoExpand(host)).to_string(),
        };

        Request {
            url_template: url,
            ..self.clone()
        }
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} {}", self.method, self.url_template)?;

        for (key, value) in self.headers.iter() {
            writeln!(f, "{}: {}", key, value)?;
        }

        if let Some(body) = &self.json_body {
            writeln!(f, "{}", body)?;
        }

        Ok(())
    }
}

fn strip_scheme(url: &str) -> Option<&str> {
    url.strip_prefix("http://")
        .or_else(|| url.strip_prefix("https://"))
}

/// 从 URL 模板中提取 path + query
///
/// 按原文切分：去掉 scheme 和主机（含 `{{host}}`）以及 `#` 之后的片段，
/// 不做百分号编码，也不归一化 `..`。
pub fn extract_path(url_template: &str) -> String {
    let url = url_template.split('#').next().unwrap_or_default();

    let rest = match url.split_once("://") {
        Some((_, after_scheme)) => match after_scheme.find(['/', '?']) {
            Some(index) => &after_scheme[index..],
            None => "",
        },
        None => url,
    };

    if rest.is_empty() || rest.starts_with('?') {
        format!("/{}", rest)
    } else {
        rest.to_string()
    }
}

/// 语法层错误，携带行号（行号从 1 开始）
#[derive(Debug, thiserror::Error)]
pub enum GrammarError {
    /// 空文件或没有找到请求块
    #[error("No requests found: expected at least one block starting with '###'")]
    NoRequests,

    #[error("Expected a delimiter string with the format '### comment' at line {line}")]
    MissingDelimiter { line: usize },

    #[error("Missing request line after the delimiter at line {line}")]
    MissingRequestLine { line: usize },

    #[error("Invalid http method '{found}' at line {line}: expected upper-case letters")]
    InvalidMethod { found: String, line: usize },

    #[error("Invalid request uri at line {line}: expected the format http(s)://{{{{host}}}}/...")]
    InvalidUrl { line: usize },

    #[error("Invalid header format at line {line}: expected 'Name: value'")]
    InvalidHeader { line: usize },

    #[error("Invalid json body starting at line {line}: {source}")]
    InvalidJsonBody {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// 文件层错误，始终带上文件名
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("File format {} not supported", .file.display())]
    UnsupportedFormat { file: PathBuf },

    #[error("Failed to process file contents {}: {source}", .file.display())]
    MalformedRequestFile {
        file: PathBuf,
        #[source]
        source: GrammarError,
    },

    #[error("Failed to process the json body in the file {} at line {line}: {source}", .file.display())]
    MalformedRequestBody {
        file: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("The directory with requests: {} was not found", .dir.display())]
    DirectoryNotFound { dir: PathBuf },

    #[error("Failed to read {}: {source}", .file.display())]
    Io {
        file: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ParseError {
    /// 将语法错误归属到具体文件
    pub fn from_grammar(file: impl Into<PathBuf>, error: GrammarError) -> Self {
        let file = file.into();
        match error {
            GrammarError::InvalidJsonBody { line, source } => {
                ParseError::MalformedRequestBody { file, line, source }
            }
            other => ParseError::MalformedRequestFile {
                file,
                source: other,
            },
        }
    }
}

/// 解析结果类型别名
pub type ParseResult<T> = Result<T, ParseError>;
