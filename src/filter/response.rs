use crate::filter::exclude::{Exclude, ExcludeError, ExcludeParser, parse_excludes};
use crate::parser::Headers;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use tracing::debug;

/// 捕获到的响应，过滤在原地进行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub status: u16,

    #[serde(default)]
    pub headers: Headers,

    /// JSON body；multipart 响应为每个 part 组成的数组
    #[serde(default)]
    pub body: Value,

    #[serde(default)]
    pub request_url: String,
}

impl Response {
    pub fn new(status: u16, headers: Headers, body: Value, request_url: impl Into<String>) -> Self {
        Self {
            status,
            headers,
            body,
            request_url: request_url.into(),
        }
    }

    /// 从 JSON 文本构建
    pub fn json(
        status: u16,
        headers: Headers,
        text: &str,
        request_url: impl Into<String>,
    ) -> Result<Self, serde_json::Error> {
        let body = serde_json::from_str(text)?;
        Ok(Self::new(status, headers, body, request_url))
    }

    /// 从已拆分的 multipart 各部分文本构建，每个部分按 JSON 解析
    pub fn multipart<S: AsRef<str>>(
        status: u16,
        headers: Headers,
        parts: &[S],
        request_url: impl Into<String>,
    ) -> Result<Self, serde_json::Error> {
        let body = parts
            .iter()
            .map(|part| serde_json::from_str(part.as_ref()))
            .collect::<Result<Vec<Value>, _>>()?;
        Ok(Self::new(status, headers, Value::Array(body), request_url))
    }

    pub fn is_multipart(&self) -> bool {
        self.body.is_array()
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "REQUEST: {}", self.request_url)?;
        write!(f, "STATUS CODE: {}", self.status)
    }
}

/// 预编译的响应过滤器
///
/// Header 按名称精确删除；body 使用路径表达式。
#[derive(Debug, Clone, Default)]
pub struct ResponseFilter {
    exclude_headers: Vec<String>,
    exclude_body: Vec<Exclude>,
}

impl ResponseFilter {
    pub fn new<H, B>(exclude_headers: &[H], exclude_body: &[B]) -> Result<Self, ExcludeError>
    where
        H: AsRef<str>,
        B: AsRef<str>,
    {
        Self::with_parser(&ExcludeParser::default(), exclude_headers, exclude_body)
    }

    pub fn with_parser<H, B>(
        parser: &ExcludeParser,
        exclude_headers: &[H],
        exclude_body: &[B],
    ) -> Result<Self, ExcludeError>
    where
        H: AsRef<str>,
        B: AsRef<str>,
    {
        Ok(Self {
            exclude_headers: exclude_headers
                .iter()
                .map(|name| name.as_ref().to_string())
                .collect(),
            exclude_body: parser.parse_all(exclude_body)?,
        })
    }

    pub fn exclude_headers(&self) -> &[String] {
        &self.exclude_headers
    }

    pub fn exclude_body(&self) -> &[Exclude] {
        &self.exclude_body
    }

    /// 过滤 headers 和 body，返回同一个响应以便链式调用
    pub fn apply<'a>(&self, response: &'a mut Response) -> &'a mut Response {
        self.filter_headers(&mut response.headers);

        match &mut response.body {
            Value::Array(parts) => {
                for part in parts.iter_mut() {
                    self.filter_body(part);
                }
            }
            body => self.filter_body(body),
        }

        debug!(
            url = %response.request_url,
            headers = self.exclude_headers.len(),
            rules = self.exclude_body.len(),
            "Filtered response"
        );
        response
    }

    pub fn filter_headers(&self, headers: &mut Headers) {
        for name in &self.exclude_headers {
            headers.remove(name);
        }
    }

    /// 按顺序执行所有规则，后面的规则看到前面规则的结果
    pub fn filter_body(&self, body: &mut Value) {
        for exclude in &self.exclude_body {
            exclude.execute(body);
        }
    }
}

/// 编译排除列表并作用于一棵数据树
pub fn filter_data<S: AsRef<str>>(raw_excludes: &[S], data: &mut Value) -> Result<(), ExcludeError> {
    for exclude in parse_excludes(raw_excludes)? {
        exclude.execute(data);
    }
    Ok(())
}

/// 一次性过滤响应；需要复用时使用 [`ResponseFilter`]
pub fn filter_response<'a, H, B>(
    response: &'a mut Response,
    exclude_headers: &[H],
    exclude_body: &[B],
) -> Result<&'a mut Response, ExcludeError>
where
    H: AsRef<str>,
    B: AsRef<str>,
{
    let filter = ResponseFilter::new(exclude_headers, exclude_body)?;
    Ok(filter.apply(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn create_test_response(body: Value) -> Response {
        let headers: Headers = [
            ("Content-Type", "application/json"),
            ("Date", "Mon, 01 Jan 2024 10:00:00 GMT"),
            ("X-Request-Id", "abc"),
        ]
        .into_iter()
        .collect();
        Response::new(200, headers, body, "http://golden.app/users")
    }

    #[test]
    fn test_filter_headers_exact_name() {
        let mut response = create_test_response(json!({}));
        filter_response(&mut response, &["Date", "x-request-id"], &[] as &[&str]).unwrap();

        let names: Vec<_> = response.headers.iter().map(|(k, _)| k).collect();
        assert_eq!(names, vec!["Content-Type", "X-Request-Id"]);
    }

    #[test]
    fn test_header_names_are_not_path_expressions() {
        let mut response = create_test_response(json!({}));
        filter_response(&mut response, &["Date:\\w+", "X-*"], &[] as &[&str]).unwrap();
        assert_eq!(response.headers.len(), 3);
    }

    #[test]
    fn test_filter_body() {
        let mut response = create_test_response(json!({"id": 1, "ts": 1700000000}));
        let filtered = filter_response(&mut response, &[] as &[&str], &["ts"]).unwrap();
        assert_eq!(filtered.body, json!({"id": 1}));
    }

    #[test]
    fn test_multipart_parts_filtered_independently() {
        let mut response = Response::multipart(
            200,
            Headers::new(),
            &[r#"{"id": 1, "rand": 5}"#, r#"{"id": 2, "rand": 9, "extra": true}"#],
            "http://golden.app/batch",
        )
        .unwrap();
        assert!(response.is_multipart());

        let filter = ResponseFilter::new(&[] as &[&str], &["rand", "extra"]).unwrap();
        filter.apply(&mut response);

        assert_eq!(response.body, json!([{"id": 1}, {"id": 2}]));
    }

    #[test]
    fn test_array_body_index_rule_applies_per_part() {
        let mut response = create_test_response(json!([{"items": [1, 2]}, {"items": [3]}]));
        filter_response(&mut response, &[] as &[&str], &["items.0"]).unwrap();
        assert_eq!(response.body, json!([{"items": [2]}, {"items": []}]));
    }

    #[test]
    fn test_invalid_body_expression_aborts() {
        let mut response = create_test_response(json!({"id": 1}));
        let result = filter_response(&mut response, &["Date"], &["id", "bad..path"]);
        assert!(result.is_err());
        // 编译失败时不做任何修改
        assert_eq!(response.headers.len(), 3);
        assert_eq!(response.body, json!({"id": 1}));
    }

    #[test]
    fn test_filter_reused_across_responses() {
        let filter = ResponseFilter::new(&["Date"], &["data.*.rand_index"]).unwrap();

        let mut golden = create_test_response(json!({"data": [{"rand_index": 1, "id": 1}]}));
        let mut testing = create_test_response(json!({"data": [{"rand_index": 7, "id": 1}]}));
        filter.apply(&mut golden);
        filter.apply(&mut testing);

        assert_eq!(golden.body, testing.body);
        assert_eq!(golden.headers, testing.headers);
    }

    #[test]
    fn test_json_constructor() {
        let response = Response::json(404, Headers::new(), r#"{"error": "nope"}"#, "u").unwrap();
        assert_eq!(response.body, json!({"error": "nope"}));
        assert!(!response.is_multipart());
        assert!(Response::json(200, Headers::new(), "not json", "u").is_err());
    }

    #[test]
    fn test_display() {
        let response = create_test_response(json!(null));
        assert_eq!(
            response.to_string(),
            "REQUEST: http://golden.app/users\nSTATUS CODE: 200"
        );
    }

    #[test]
    fn test_deserialize_response_document() {
        let response: Response = serde_json::from_str(
            r#"{"status": 200, "headers": {"B": "1", "A": "2"}, "body": {"id": 1}}"#,
        )
        .unwrap();
        assert_eq!(response.headers.iter().next(), Some(("B", "1")));
        assert_eq!(response.request_url, "");
    }
}
