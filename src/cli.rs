use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use rureplay::config::{ConfigLoader, FilterConfig, ReplayConfig};
use rureplay::parser::{Request, discover_request_files, parse_requests};
use rureplay::utils::{RequestFormat, RequestFormatter, format_response, request_files_table};
use rureplay::{Response, ResponseFilter, Result};
use tracing::info;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// 配置文件路径，默认向上查找 rureplay.toml
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 解析请求文件并打印请求
    Parse {
        /// `.txt` 或 `.http` 请求文件
        file: PathBuf,

        /// 以 JSON 输出
        #[arg(long)]
        json: bool,

        /// 关闭颜色
        #[arg(long)]
        no_color: bool,

        /// 用指定主机替换 {{host}}
        #[arg(long, conflicts_with = "target")]
        host: Option<String>,

        /// 用配置中的 golden / testing 地址替换 {{host}}
        #[arg(long, value_enum)]
        target: Option<Target>,
    },

    /// 列出请求目录下的所有请求文件
    List {
        /// 默认使用配置中的 requests_dir
        #[arg(long)]
        requests_dir: Option<PathBuf>,
    },

    /// 过滤一个响应文档 `{"status", "headers", "body"}` 并打印结果
    Filter {
        response: PathBuf,

        /// 按名称删除的 Header，追加在配置列表之后
        #[arg(long = "exclude-header")]
        exclude_headers: Vec<String>,

        /// body 排除表达式，追加在配置列表之后
        #[arg(long = "exclude-body")]
        exclude_body: Vec<String>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Target {
    Golden,
    Testing,
}

pub fn run(cli: Cli) -> Result<()> {
    let config = ConfigLoader::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Parse {
            file,
            json,
            no_color,
            host,
            target,
        } => {
            let requests = parse_requests(&file)?;
            let requests = specialize(&config, requests, host.as_deref(), target)?;

            let format = if json {
                RequestFormat::Json
            } else {
                RequestFormat::Text
            };
            let formatter = RequestFormatter::new(format).with_color(!no_color);
            println!("{}", formatter.format(&requests)?);
        }
        Commands::List { requests_dir } => {
            let dir = requests_dir.unwrap_or_else(|| config.requests_dir.clone());
            list_requests(&dir)?;
        }
        Commands::Filter {
            response,
            exclude_headers,
            exclude_body,
        } => {
            let filter = build_filter(&config.filter, exclude_headers, exclude_body)?;
            let content = std::fs::read_to_string(&response)?;
            let mut response: Response = serde_json::from_str(&content)?;

            filter.apply(&mut response);
            println!("{}", format_response(&response)?);
        }
    }

    Ok(())
}

fn specialize(
    config: &ReplayConfig,
    requests: Vec<Request>,
    host: Option<&str>,
    target: Option<Target>,
) -> Result<Vec<Request>> {
    if let Some(host) = host {
        return Ok(requests.iter().map(|r| r.specify_host(host)).collect());
    }

    let Some(target) = target else {
        return Ok(requests);
    };

    let endpoints = config.endpoints.resolve();
    requests
        .iter()
        .map(|request| -> Result<Request> {
            let (golden, testing) = endpoints.specify(request)?;
            Ok(match target {
                Target::Golden => golden,
                Target::Testing => testing,
            })
        })
        .collect()
}

fn list_requests(dir: &Path) -> Result<()> {
    let files = discover_request_files(dir)?;
    info!(dir = %dir.display(), count = files.len(), "Listing request files");

    let entries: Vec<_> = files
        .into_iter()
        .map(|path| {
            let parsed = parse_requests(&path).map_err(|e| e.to_string());
            (path, parsed)
        })
        .collect();

    println!("{}", request_files_table(&entries));
    Ok(())
}

/// 配置中的列表在前，命令行追加的在后
fn build_filter(
    config: &FilterConfig,
    exclude_headers: Vec<String>,
    exclude_body: Vec<String>,
) -> Result<ResponseFilter> {
    let mut merged = config.clone();
    merged.exclude_headers.extend(exclude_headers);
    merged.exclude_body.extend(exclude_body);
    Ok(merged.response_filter()?)
}
