use crate::filter::{DEFAULT_MAX_DEPTH, ExcludeError, ExcludeParser, ResponseFilter};
use crate::parser::Request;
use regex::{Captures, Regex};
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::OnceLock;

/// 覆盖配置文件中 golden 地址的环境变量
pub const GOLDEN_API_URL: &str = "GOLDEN_API_URL";
/// 覆盖配置文件中 testing 地址的环境变量
pub const TESTING_API_URL: &str = "TESTING_API_URL";

/// 配置错误
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("The {0} endpoint is not configured, set it in rureplay.toml or via {1}")]
    MissingEndpoint(&'static str, &'static str),
}

/// 完整的配置文件 `rureplay.toml`
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReplayConfig {
    /// 请求文件目录
    pub requests_dir: PathBuf,

    pub endpoints: Endpoints,

    pub filter: FilterConfig,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            requests_dir: PathBuf::from("requests"),
            endpoints: Endpoints::default(),
            filter: FilterConfig::default(),
        }
    }
}

impl ReplayConfig {
    /// 编译 `[filter]` 段为可复用的过滤器
    pub fn response_filter(&self) -> Result<ResponseFilter, ExcludeError> {
        self.filter.response_filter()
    }
}

/// 两个对比目标
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub golden: Option<String>,
    pub testing: Option<String>,
}

impl Endpoints {
    /// 应用环境变量覆盖并展开 `${VAR}`
    pub fn resolve(&self) -> Endpoints {
        Endpoints {
            golden: resolve_endpoint(self.golden.as_deref(), GOLDEN_API_URL),
            testing: resolve_endpoint(self.testing.as_deref(), TESTING_API_URL),
        }
    }

    /// 为同一个请求生成 golden / testing 两个具体请求
    pub fn specify(&self, request: &Request) -> Result<(Request, Request), ConfigError> {
        let golden = self
            .golden
            .as_deref()
            .ok_or(ConfigError::MissingEndpoint("golden", GOLDEN_API_URL))?;
        let testing = self
            .testing
            .as_deref()
            .ok_or(ConfigError::MissingEndpoint("testing", TESTING_API_URL))?;

        Ok((request.specify_host(golden), request.specify_host(testing)))
    }
}

fn resolve_endpoint(configured: Option<&str>, env_name: &str) -> Option<String> {
    std::env::var(env_name)
        .ok()
        .filter(|value| !value.is_empty())
        .or_else(|| configured.map(resolve_env_vars))
}

/// `[filter]` 段
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// 按名称精确删除的响应 Header
    pub exclude_headers: Vec<String>,

    /// body 排除表达式
    pub exclude_body: Vec<String>,

    /// 单条表达式的最大路径段数
    pub max_depth: usize,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            exclude_headers: Vec::new(),
            exclude_body: Vec::new(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl FilterConfig {
    pub fn response_filter(&self) -> Result<ResponseFilter, ExcludeError> {
        let parser = ExcludeParser::new().with_max_depth(self.max_depth);
        ResponseFilter::with_parser(
            &parser,
            self.exclude_headers.as_slice(),
            self.exclude_body.as_slice(),
        )
    }
}

/// 替换系统环境变量 `${VAR}`，未定义的保持原样
pub fn resolve_env_vars(text: &str) -> String {
    static ENV_REGEX: OnceLock<Regex> = OnceLock::new();
    let re = ENV_REGEX.get_or_init(|| Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").unwrap());

    re.replace_all(text, |caps: &Captures| {
        let env_name = &caps[1];
        std::env::var(env_name).unwrap_or_else(|_| caps[0].to_string())
    })
    .to_string()
}
