use regex::Regex;
use serde_json::Value;
use std::fmt;
use tracing::{debug, trace};

/// 单条表达式允许的最大路径段数，同时限制递归深度
pub const DEFAULT_MAX_DEPTH: usize = 64;

const PATH_SEPARATOR: char = '.';
const PATTERN_SEPARATOR: char = ':';
const WILDCARD: &str = "*";

/// 排除表达式编译错误
#[derive(Debug, thiserror::Error)]
pub enum ExcludeError {
    #[error("Malformed exclude expression '{expression}': {reason}")]
    MalformedExcludeExpression { expression: String, reason: String },

    #[error("Invalid regular expression in exclude expression '{expression}': {source}")]
    InvalidPattern {
        expression: String,
        #[source]
        source: regex::Error,
    },
}

impl ExcludeError {
    fn malformed(expression: &str, reason: impl Into<String>) -> Self {
        ExcludeError::MalformedExcludeExpression {
            expression: expression.to_string(),
            reason: reason.into(),
        }
    }
}

/// 编译后的排除规则
///
/// `data.*.id` 删除 `data` 数组中每个元素的 `id` 字段；
/// `data.token:\w{4}` 把 `token` 截断为正则的第一个匹配。
/// 规则本身无状态，可在多棵树、多个线程间复用。
#[derive(Debug, Clone)]
pub struct Exclude {
    path_segments: Vec<String>,
    pattern: Option<Regex>,
}

impl Exclude {
    /// 使用默认限制编译一条表达式
    pub fn parse(raw: &str) -> Result<Self, ExcludeError> {
        ExcludeParser::default().parse(raw)
    }

    pub fn path_segments(&self) -> &[String] {
        &self.path_segments
    }

    pub fn pattern(&self) -> Option<&Regex> {
        self.pattern.as_ref()
    }

    /// 在原地对数据树执行规则；路径不存在时什么也不做
    pub fn execute(&self, data: &mut Value) {
        self.exclude(data, &self.path_segments);
    }

    fn exclude(&self, data: &mut Value, path: &[String]) {
        let Some((current, rest)) = path.split_first() else {
            return;
        };

        if rest.is_empty() {
            self.exclude_target(data, current);
            return;
        }

        match data {
            Value::Array(items) if current == WILDCARD => {
                for item in items.iter_mut() {
                    self.exclude(item, rest);
                }
            }
            Value::Object(map) => match map.get_mut(current.as_str()) {
                Some(child) => self.exclude(child, rest),
                None => trace!(rule = %self, segment = %current, "Path segment not found"),
            },
            _ => trace!(rule = %self, segment = %current, "Path segment does not apply"),
        }
    }

    fn exclude_target(&self, data: &mut Value, target: &str) {
        match data {
            Value::Object(map) => match &self.pattern {
                None => {
                    map.remove(target);
                }
                Some(pattern) => {
                    if let Some(Value::String(text)) = map.get_mut(target) {
                        let matched = pattern.find(text).map(|m| m.as_str().to_string());
                        // 空匹配视为没有匹配
                        if let Some(matched) = matched.filter(|m| !m.is_empty()) {
                            *text = matched;
                        }
                    }
                }
            },
            Value::Array(items) => {
                if let Some(index) = parse_index(target)
                    && index < items.len()
                {
                    items.remove(index);
                }
            }
            _ => trace!(rule = %self, segment = %target, "Target does not apply"),
        }
    }
}

impl fmt::Display for Exclude {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path_segments.join("."))?;
        if let Some(pattern) = &self.pattern {
            write!(f, "{}{}", PATTERN_SEPARATOR, pattern.as_str())?;
        }
        Ok(())
    }
}

/// 只接受非负十进制整数，`-1`、`+1` 都不是下标
fn parse_index(segment: &str) -> Option<usize> {
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    segment.parse().ok()
}

/// 排除表达式解析器
///
/// 语法：`segment ('.' segment)* [':' regex]`。
/// 第一个 `:` 分隔路径和正则，之后的 `:` 都属于正则。
#[derive(Debug, Clone)]
pub struct ExcludeParser {
    max_depth: usize,
}

impl Default for ExcludeParser {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ExcludeParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn parse(&self, raw: &str) -> Result<Exclude, ExcludeError> {
        let (path, pattern) = match raw.split_once(PATTERN_SEPARATOR) {
            Some((path, pattern)) => (path, Some(pattern)),
            None => (raw, None),
        };

        if path.is_empty() {
            return Err(ExcludeError::malformed(raw, "path is empty"));
        }

        let path_segments: Vec<String> = path.split(PATH_SEPARATOR).map(str::to_string).collect();

        if path_segments.iter().any(|segment| segment.is_empty()) {
            return Err(ExcludeError::malformed(raw, "path contains an empty segment"));
        }

        if path_segments.len() > self.max_depth {
            return Err(ExcludeError::malformed(
                raw,
                format!(
                    "path has {} segments, the limit is {}",
                    path_segments.len(),
                    self.max_depth
                ),
            ));
        }

        // `path:` 没有正则，按删除处理
        let pattern = match pattern.filter(|p| !p.is_empty()) {
            Some(pattern) => Some(Regex::new(pattern).map_err(|source| {
                ExcludeError::InvalidPattern {
                    expression: raw.to_string(),
                    source,
                }
            })?),
            None => None,
        };

        let exclude = Exclude {
            path_segments,
            pattern,
        };
        debug!(rule = %exclude, "Compiled exclude rule");
        Ok(exclude)
    }

    /// 编译整个列表，遇到第一个错误即中止
    pub fn parse_all<S: AsRef<str>>(&self, raw_excludes: &[S]) -> Result<Vec<Exclude>, ExcludeError> {
        raw_excludes
            .iter()
            .map(|raw| self.parse(raw.as_ref()))
            .collect()
    }
}

/// 使用默认限制编译排除列表
pub fn parse_excludes<S: AsRef<str>>(raw_excludes: &[S]) -> Result<Vec<Exclude>, ExcludeError> {
    ExcludeParser::default().parse_all(raw_excludes)
}
