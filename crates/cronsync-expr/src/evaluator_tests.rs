use super::*;
use crate::clock::FixedClock;
use chrono::{TimeZone, Utc};

fn evaluator_at(year: i32, month: u32, day: u32) -> DateExpressionEvaluator {
    let now = Utc.with_ymd_and_hms(year, month, day, 10, 0, 0).unwrap();
    DateExpressionEvaluator::new().with_clock(Arc::new(FixedClock(now)))
}

fn eval_one(evaluator: &DateExpressionEvaluator, placeholder: &str) -> String {
    let values = evaluator.evaluate(placeholder, false).unwrap();
    values.get(placeholder).cloned().unwrap()
}

#[test]
fn test_today_default_format() {
    let evaluator = evaluator_at(2024, 3, 15);
    assert_eq!(eval_one(&evaluator, "${TODAY}"), "2024-03-15");
}

#[test]
fn test_today_plus_one_month() {
    let evaluator = evaluator_at(2024, 3, 15);
    assert_eq!(eval_one(&evaluator, "${TODAY+1M}"), "2024-04-15");
}

#[test]
fn test_year_with_pattern() {
    let evaluator = evaluator_at(2024, 3, 15);
    assert_eq!(eval_one(&evaluator, "${YEAR:yyyy}"), "2024");
    assert_eq!(eval_one(&evaluator, "${YEAR}"), "2024");
}

#[test]
fn test_month_and_yesterday_defaults() {
    let evaluator = evaluator_at(2024, 3, 15);
    assert_eq!(eval_one(&evaluator, "${MONTH}"), "2024-03");
    assert_eq!(eval_one(&evaluator, "${YESTERDAY}"), "2024-03-14");
}

#[test]
fn test_yesterday_crosses_year_boundary() {
    let evaluator = evaluator_at(2024, 1, 1);
    assert_eq!(eval_one(&evaluator, "${YESTERDAY}"), "2023-12-31");
}

#[test]
fn test_unrecognized_name_falls_back_to_today() {
    let evaluator = evaluator_at(2024, 3, 15);
    assert_eq!(eval_one(&evaluator, "${NOW}"), "2024-03-15");
    assert_eq!(eval_one(&evaluator, "${FOO-1D}"), "2024-03-14");
}

#[test]
fn test_names_are_case_insensitive() {
    let evaluator = evaluator_at(2024, 3, 15);
    assert_eq!(eval_one(&evaluator, "${today-1d}"), "2024-03-14");
    assert_eq!(eval_one(&evaluator, "${Month-1m}"), "2024-02");
}

#[test]
fn test_parenthesized_expression_with_whitespace() {
    let evaluator = evaluator_at(2024, 3, 15);
    assert_eq!(eval_one(&evaluator, "${(TODAY + 1W):yyyyMMdd}"), "20240322");
    assert_eq!(eval_one(&evaluator, "${(YESTERDAY - 2D) : yyyy/MM/dd}"), "2024/03/12");
}

#[test]
fn test_offsets_apply_left_to_right() {
    let evaluator = evaluator_at(2024, 3, 15);
    assert_eq!(eval_one(&evaluator, "${TODAY+1M-1D}"), "2024-04-14");
    assert_eq!(eval_one(&evaluator, "${YEAR-1Y}"), "2023");
    assert_eq!(eval_one(&evaluator, "${TODAY-10D}"), "2024-03-05");
}

#[test]
fn test_month_offset_clamps_to_month_end() {
    let evaluator = evaluator_at(2024, 1, 31);
    assert_eq!(eval_one(&evaluator, "${TODAY+1M}"), "2024-02-29");
    assert_eq!(eval_one(&evaluator, "${TODAY+1Y+1M}"), "2025-02-28");
}

#[test]
fn test_unknown_unit_is_an_error() {
    let evaluator = evaluator_at(2024, 3, 15);
    let err = evaluator.evaluate("${TODAY+1Q}", false).unwrap_err();
    assert_eq!(err, ExprError::UnknownUnit('Q'));
}

#[test]
fn test_time_pattern_is_an_error() {
    let evaluator = evaluator_at(2024, 3, 15);
    let err = evaluator.evaluate("${TODAY:yyyyMMddHH}", false).unwrap_err();
    assert!(matches!(err, ExprError::UnsupportedPattern { letter: 'H', .. }));
}

#[test]
fn test_evaluate_with_result_key() {
    let evaluator = evaluator_at(2024, 3, 15);
    let values = evaluator
        .evaluate("from=${YESTERDAY}&to=${TODAY}&m=${MONTH:yyyyMM}", true)
        .unwrap();
    assert_eq!(values.len(), 4);
    assert_eq!(values["${YESTERDAY}"], "2024-03-14");
    assert_eq!(values["${MONTH:yyyyMM}"], "202403");
    assert_eq!(values[RESULT_KEY], "from=2024-03-14&to=2024-03-15&m=202403");
}

#[test]
fn test_repeated_placeholder_substituted_everywhere() {
    let evaluator = evaluator_at(2024, 3, 15);
    let values = evaluator.evaluate("${TODAY}/${TODAY}", true).unwrap();
    assert_eq!(values.len(), 2);
    assert_eq!(values[RESULT_KEY], "2024-03-15/2024-03-15");
}

#[test]
fn test_non_date_placeholders_left_untouched() {
    let evaluator = evaluator_at(2024, 3, 15);
    let values = evaluator
        .evaluate("http://a.com/?key=${api_key}&d=${TODAY}", true)
        .unwrap();
    assert_eq!(values[RESULT_KEY], "http://a.com/?key=${api_key}&d=2024-03-15");
    assert!(!values.contains_key("${api_key}"));
}

#[test]
fn test_today_follows_configured_offset() {
    let now = Utc.with_ymd_and_hms(2024, 3, 15, 20, 0, 0).unwrap();
    let evaluator = DateExpressionEvaluator::new()
        .with_clock(Arc::new(FixedClock(now)))
        .with_utc_offset(FixedOffset::east_opt(8 * 3600).unwrap());
    assert_eq!(eval_one(&evaluator, "${TODAY}"), "2024-03-16");
}

#[test]
fn test_normalize_strips_prefix_and_substitutes() {
    let evaluator = evaluator_at(2024, 3, 15);
    let url = evaluator
        .normalize("uri://http://1.2.3.4/api?x=${YESTERDAY}")
        .unwrap();
    assert_eq!(url, "http://1.2.3.4/api?x=2024-03-14");
}

#[test]
fn test_rewrite_leaves_ip_literal_untouched() {
    let evaluator = evaluator_at(2024, 3, 15)
        .with_rewrite(ProxyRewrite::enabled("http://proxy.internal:8080"));
    let url = evaluator
        .normalize("uri://http://1.2.3.4/api?x=${YESTERDAY}")
        .unwrap();
    assert_eq!(evaluator.rewrite(&url, ApiFormat::Json), url);
}

#[test]
fn test_rewrite_domain_through_proxy() {
    let evaluator = evaluator_at(2024, 3, 15)
        .with_rewrite(ProxyRewrite::enabled("http://proxy.internal:8080/"));
    let rewritten = evaluator
        .normalize_and_rewrite("uri://http://example.com/a?d=${TODAY}", ApiFormat::Json)
        .unwrap();
    assert_eq!(
        rewritten,
        "http://proxy.internal:8080/api/json/fetchApi/aHR0cDovL2V4YW1wbGUuY29tL2E_ZD0yMDI0LTAzLTE1"
    );
}

#[test]
fn test_rewrite_uses_lowercase_format() {
    let evaluator = evaluator_at(2024, 3, 15)
        .with_rewrite(ProxyRewrite::enabled("http://proxy"));
    let rewritten = evaluator.rewrite("https://example.com/report?x=1", ApiFormat::Csv);
    assert_eq!(
        rewritten,
        "http://proxy/api/csv/fetchApi/aHR0cHM6Ly9leGFtcGxlLmNvbS9yZXBvcnQ_eD0x"
    );
}

#[test]
fn test_rewrite_normalize_identity_when_disabled() {
    let evaluator = evaluator_at(2024, 3, 15);
    let url = "http://example.com/data?page=1";
    let once = evaluator.rewrite(&evaluator.normalize(url).unwrap(), ApiFormat::Json);
    let twice = evaluator.rewrite(&evaluator.normalize(&once).unwrap(), ApiFormat::Json);
    assert_eq!(once, url);
    assert_eq!(twice, url);
}

#[test]
fn test_protocol_classification() {
    let evaluator = evaluator_at(2024, 3, 15);
    assert_eq!(evaluator.protocol("file:///tmp/a.csv"), ApiProtocol::File);
    assert_eq!(evaluator.protocol("hdfs://nn/data"), ApiProtocol::Hdfs);
    assert_eq!(evaluator.protocol("http://example.com"), ApiProtocol::Uri);
}

#[test]
fn test_date_token_from_name() {
    assert_eq!(DateToken::from_name("yesterday"), DateToken::Yesterday);
    assert_eq!(DateToken::from_name("YEAR"), DateToken::Year);
    assert_eq!(DateToken::from_name("WEEK"), DateToken::Today);
}
