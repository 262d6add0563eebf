use rureplay::filter::ExcludeError;
use rureplay::parser::{ParseError, parse_requests_str};
use rureplay::{Exclude, ReplayError, Result};

#[test]
fn test_parse_error_conversion() {
    let err: ReplayError = parse_requests_str("requests.csv", "").unwrap_err().into();
    assert!(matches!(err, ReplayError::Parse(ParseError::UnsupportedFormat { .. })));
    assert_eq!(
        err.to_string(),
        "请求文件解析错误: File format requests.csv not supported"
    );
}

#[test]
fn test_exclude_error_conversion() {
    let err: ReplayError = Exclude::parse("").unwrap_err().into();
    assert!(matches!(
        err,
        ReplayError::Exclude(ExcludeError::MalformedExcludeExpression { .. })
    ));
    assert!(err.to_string().starts_with("排除表达式错误: "));
}

#[test]
fn test_error_conversion_from_anyhow() {
    let anyhow_err = anyhow::anyhow!("test anyhow error");
    let replay_err: ReplayError = anyhow_err.into();
    assert!(replay_err.to_string().contains("test anyhow error"));
}

#[test]
fn test_result_type() {
    fn returns_error() -> Result<()> {
        let _ = parse_requests_str("empty.http", "")?;
        Ok(())
    }

    match returns_error() {
        Err(ReplayError::Parse(ParseError::MalformedRequestFile { file, .. })) => {
            assert_eq!(file.to_str(), Some("empty.http"))
        }
        other => panic!("Expected MalformedRequestFile, got {:?}", other),
    }
}
