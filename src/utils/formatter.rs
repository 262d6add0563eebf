use crate::Result;
use crate::filter::Response;
use crate::parser::{Request, scenario_name};
use colored::*;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, Table};
use std::path::PathBuf;

pub enum RequestFormat {
    /// 与 `Request` 的 Display 一致的纯文本
    Text,
    /// 每个请求一个 JSON 对象组成的数组
    Json,
}

pub struct RequestFormatter {
    format: RequestFormat,
    color: bool,
}

impl RequestFormatter {
    pub fn new(format: RequestFormat) -> Self {
        Self {
            format,
            color: true,
        }
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    pub fn format(&self, requests: &[Request]) -> Result<String> {
        match self.format {
            RequestFormat::Text => Ok(self.format_text(requests)),
            RequestFormat::Json => Ok(serde_json::to_string_pretty(requests)?),
        }
    }

    fn format_text(&self, requests: &[Request]) -> String {
        let mut output = Vec::new();

        for request in requests {
            let delimiter = format!("### {}", request.comment());
            let request_line = format!("{} {}", request.method(), request.url_template());

            if self.color {
                output.push(delimiter.dimmed().to_string());
                output.push(format!(
                    "{} {}",
                    request.method().cyan().bold(),
                    request.url_template()
                ));
            } else {
                output.push(delimiter);
                output.push(request_line);
            }

            for (key, value) in request.headers().iter() {
                if self.color {
                    output.push(format!("{}: {}", key.blue(), value));
                } else {
                    output.push(format!("{}: {}", key, value));
                }
            }

            if let Some(body) = request.json_body() {
                let body = serde_json::to_string_pretty(body).unwrap_or_else(|_| body.to_string());
                output.push(body);
            }

            output.push(String::new());
        }

        output.join("\n")
    }
}

/// 过滤后的响应，按 JSON 文档输出
pub fn format_response(response: &Response) -> Result<String> {
    Ok(serde_json::to_string_pretty(response)?)
}

/// 请求文件概览表格；解析失败的文件显示错误
pub fn request_files_table(entries: &[(PathBuf, std::result::Result<Vec<Request>, String>)]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["File", "Scenario", "Requests", "Methods", "First path"]);

    for (path, parsed) in entries {
        match parsed {
            Ok(requests) => {
                let mut methods: Vec<&str> = requests.iter().map(|r| r.method()).collect();
                methods.sort_unstable();
                methods.dedup();

                table.add_row(vec![
                    Cell::new(path.display()),
                    Cell::new(scenario_name(path)),
                    Cell::new(requests.len()).fg(Color::Green),
                    Cell::new(methods.join(", ")),
                    Cell::new(requests.first().map(|r| r.path()).unwrap_or("-"))
                        .add_attribute(Attribute::Dim),
                ]);
            }
            Err(message) => {
                table.add_row(vec![
                    Cell::new(path.display()),
                    Cell::new(scenario_name(path)),
                    Cell::new("error").fg(Color::Red),
                    Cell::new(message).fg(Color::Red),
                    Cell::new("-"),
                ]);
            }
        }
    }

    table
}
