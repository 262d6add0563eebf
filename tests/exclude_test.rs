use rureplay::filter::{ExcludeError, ResponseFilter, filter_data, parse_excludes};
use rureplay::{Headers, Response, filter_response};
use serde_json::{Value, json};

fn check(mut data: Value, excludes: &[&str], expected: Value) {
    filter_data(excludes, &mut data).unwrap();
    assert_eq!(data, expected, "excludes: {:?}", excludes);
}

#[test]
fn test_single_path_cutting() {
    check(json!({"data": 1, "random": 2}), &["random"], json!({"data": 1}));
}

#[test]
fn test_cutting_in_more_than_one_path() {
    check(
        json!({"data": {"rand_index": 5, "id": 123}}),
        &["data.rand_index"],
        json!({"data": {"id": 123}}),
    );
}

#[test]
fn test_cutting_by_list_items() {
    check(
        json!({"data": [{"rand_index": 1, "id": 123}, {"rand_index": 8, "id": 124}]}),
        &["data.*.rand_index"],
        json!({"data": [{"id": 123}, {"id": 124}]}),
    );
}

#[test]
fn test_cutting_out_a_value_by_a_regular_expression() {
    check(
        json!({"data": "2_liu23hdl823hdo823hd"}),
        &[r"data:\d+"],
        json!({"data": "2"}),
    );
}

#[test]
fn test_cutting_by_a_non_existent_single_path() {
    check(json!({"data": 1}), &["item"], json!({"data": 1}));
}

#[test]
fn test_cutting_by_non_existent_more_than_one_path() {
    check(json!({"data": 1}), &["data.id"], json!({"data": 1}));
}

#[test]
fn test_cutting_out_a_non_string_value_by_a_regular_expression() {
    check(json!({"data": 1}), &[r"data:\d+"], json!({"data": 1}));
}

#[test]
fn test_cutting_out_a_value_by_a_regular_expression_without_matches() {
    check(json!({"data": "1"}), &[r"data:\D*"], json!({"data": "1"}));
    check(json!({"data": "abc"}), &[r"data:\d+"], json!({"data": "abc"}));
}

#[test]
fn test_cutting_list_item_by_index() {
    check(
        json!({"data": [{"id": 123}, {"id": 124}]}),
        &["data.1"],
        json!({"data": [{"id": 123}]}),
    );
}

#[test]
fn test_cutting_list_item_by_negative_index() {
    check(
        json!({"data": [{"id": 123}, {"id": 124}]}),
        &["data.-1"],
        json!({"data": [{"id": 123}, {"id": 124}]}),
    );
}

#[test]
fn test_cutting_list_item_by_non_existent_index() {
    check(
        json!({"data": [{"id": 123}, {"id": 124}]}),
        &["data.2"],
        json!({"data": [{"id": 123}, {"id": 124}]}),
    );
}

#[test]
fn test_cutting_list_item_by_not_numeric_index() {
    check(
        json!({"data": [{"id": 123}, {"id": 124}]}),
        &["data.id"],
        json!({"data": [{"id": 123}, {"id": 124}]}),
    );
}

#[test]
fn test_rules_applied_in_order() {
    // 第一条删除下标 0 后，第二条看到的是新的下标 0
    check(
        json!({"data": ["a", "b", "c"]}),
        &["data.0", "data.0"],
        json!({"data": ["c"]}),
    );
    check(
        json!({"data": {"token": "abcd1234"}}),
        &[r"data.token:\d+", "data.token"],
        json!({"data": {}}),
    );
}

#[test]
fn test_applying_twice_is_idempotent() {
    let excludes = ["data.*.rand_index", "random", r"stamp:\d{4}", "items.5"];
    let original = json!({
        "data": [{"rand_index": 1, "id": 1}, {"rand_index": 2, "id": 2}],
        "random": 42,
        "stamp": "2024-05-01",
        "items": [0, 1, 2]
    });

    let mut once = original.clone();
    filter_data(&excludes, &mut once).unwrap();

    let mut twice = once.clone();
    filter_data(&excludes, &mut twice).unwrap();

    assert_eq!(once, twice);
    assert_eq!(
        once,
        json!({"data": [{"id": 1}, {"id": 2}], "stamp": "2024", "items": [0, 1, 2]})
    );
}

#[test]
fn test_compiled_rules_reusable_across_trees() {
    let rules = parse_excludes(&["meta.request_id"]).unwrap();
    let mut first = json!({"meta": {"request_id": "a", "page": 1}});
    let mut second = json!({"items": []});

    for rule in &rules {
        rule.execute(&mut first);
        rule.execute(&mut second);
    }

    assert_eq!(first, json!({"meta": {"page": 1}}));
    assert_eq!(second, json!({"items": []}));
}

#[test]
fn test_malformed_expression_aborts_whole_list() {
    let mut data = json!({"data": 1, "random": 2});
    let result = filter_data(&["random", ":\\d+"], &mut data);

    assert!(matches!(
        result,
        Err(ExcludeError::MalformedExcludeExpression { .. })
    ));
    assert_eq!(data, json!({"data": 1, "random": 2}));
}

#[test]
fn test_filter_golden_and_testing_responses() {
    let filter = ResponseFilter::new(&["Date"], &["data.*.created_at", r"trace:[a-z]+"]).unwrap();

    let mut golden = Response::json(
        200,
        [("Date", "Mon"), ("Content-Type", "application/json")]
            .into_iter()
            .collect(),
        r#"{"data": [{"id": 1, "created_at": "t1"}], "trace": "abc-111"}"#,
        "https://golden.app/users",
    )
    .unwrap();
    let mut testing = Response::json(
        200,
        [("Date", "Tue"), ("Content-Type", "application/json")]
            .into_iter()
            .collect(),
        r#"{"data": [{"id": 1, "created_at": "t2"}], "trace": "abc-222"}"#,
        "https://testing.app/users",
    )
    .unwrap();

    filter.apply(&mut golden);
    filter.apply(&mut testing);

    assert_eq!(golden.headers, testing.headers);
    assert_eq!(golden.body, testing.body);
    assert_eq!(golden.body, json!({"data": [{"id": 1}], "trace": "abc"}));
}

#[test]
fn test_filter_response_returns_same_response() {
    let mut response = Response::multipart(
        200,
        Headers::new(),
        &[r#"{"part": 1, "ts": 1}"#, r#"{"part": 2, "ts": 2}"#],
        "https://golden.app/multipart",
    )
    .unwrap();

    let status = filter_response(&mut response, &[] as &[&str], &["ts"])
        .unwrap()
        .status;

    assert_eq!(status, 200);
    assert_eq!(response.body, json!([{"part": 1}, {"part": 2}]));
}
