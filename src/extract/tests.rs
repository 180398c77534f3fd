use super::*;
use crate::dto::UserIn;
use crate::models::{Item, User};
use crate::schema::{FieldSpec, FieldType, Schema};
use axum::http::HeaderValue;
use serde_json::json;

fn param(source: Source, field: FieldSpec) -> ParamSpec {
    ParamSpec::new(source, field)
}

fn run(
    params: &[ParamSpec],
    captures: &[(&str, &str)],
    query: Option<&str>,
    headers: &HeaderMap,
    body: &[u8],
) -> Result<Params, ValidationErrors> {
    let captures: HashMap<String, String> = captures
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    extract(
        params,
        RawInput {
            captures: &captures,
            query,
            headers,
            body,
        },
    )
}

fn locs(errors: &ValidationErrors) -> Vec<String> {
    errors.iter().map(|e| e.loc().to_string()).collect()
}

#[test]
fn test_query_list_collects_repeated_keys() {
    let params = [param(
        Source::Query,
        FieldSpec::optional("q", FieldType::list(FieldType::Str)).with_default(json!(["foo", "bar"])),
    )];
    let headers = HeaderMap::new();

    let extracted = run(&params, &[], Some("q=a&q=b"), &headers, b"").unwrap();
    assert_eq!(extracted.get::<Vec<String>>("q").unwrap(), vec!["a", "b"]);

    let defaulted = run(&params, &[], None, &headers, b"").unwrap();
    assert_eq!(defaulted.get::<Vec<String>>("q").unwrap(), vec!["foo", "bar"]);
}

#[test]
fn test_scalar_query_takes_last_value() {
    let params = [param(Source::Query, FieldSpec::optional("q", FieldType::Str))];
    let headers = HeaderMap::new();
    let extracted = run(&params, &[], Some("q=first&q=last"), &headers, b"").unwrap();
    assert_eq!(extracted.get::<Option<String>>("q").unwrap().as_deref(), Some("last"));
}

#[test]
fn test_absent_optional_reads_as_none() {
    let params = [param(Source::Query, FieldSpec::optional("q", FieldType::Str))];
    let headers = HeaderMap::new();
    let extracted = run(&params, &[], None, &headers, b"").unwrap();
    assert_eq!(extracted.get::<Option<String>>("q").unwrap(), None);
    assert!(extracted.raw("q").is_none());
}

#[test]
fn test_header_name_uses_hyphens() {
    let params = [param(Source::Header, FieldSpec::optional("user_agent", FieldType::Str))];
    let mut headers = HeaderMap::new();
    headers.insert("User-Agent", HeaderValue::from_static("curl/8.0"));
    let extracted = run(&params, &[], None, &headers, b"").unwrap();
    assert_eq!(extracted.get::<String>("user_agent").unwrap(), "curl/8.0");
}

#[test]
fn test_path_and_query_errors_are_aggregated() {
    let params = [
        param(Source::Path, FieldSpec::required("item_id", FieldType::Int).ge(0.0).le(1000.0)),
        param(Source::Query, FieldSpec::optional("short", FieldType::Bool).with_default(json!(false))),
        param(Source::Query, FieldSpec::required("page", FieldType::Int)),
    ];
    let headers = HeaderMap::new();
    let errors = run(&params, &[("item_id", "1001")], Some("short=maybe"), &headers, b"").unwrap_err();
    assert_eq!(locs(&errors), vec!["path.item_id", "query.short", "query.page"]);
    let codes: Vec<&str> = errors.iter().map(|e| e.code()).collect();
    assert_eq!(codes, vec!["less_than_equal", "bool_parsing", "missing"]);
}

#[test]
fn test_whole_body_record() {
    let params = [param(Source::Body, FieldSpec::required("item", FieldType::Record(Item::shape())))];
    let headers = HeaderMap::new();
    let body = br#"{"name": "Foo", "price": 35.4, "color": "red"}"#;
    let extracted = run(&params, &[], None, &headers, body).unwrap();

    let item: Item = extracted.get("item").unwrap();
    assert_eq!(item.name.as_deref(), Some("Foo"));
    assert_eq!(item.tags, Vec::<String>::new());
    assert!(extracted.raw("item").unwrap().get("color").is_none());

    let supplied: Vec<&str> = extracted.body_fields_set().unwrap().iter().map(String::as_str).collect();
    assert_eq!(supplied, vec!["name", "price"]);
}

#[test]
fn test_missing_optional_body_is_absent() {
    let params = [param(Source::Body, FieldSpec::optional("item", FieldType::Record(Item::shape())))];
    let headers = HeaderMap::new();
    let extracted = run(&params, &[], None, &headers, b"").unwrap();
    assert_eq!(extracted.get::<Option<Item>>("item").unwrap(), None);
}

#[test]
fn test_invalid_json_is_reported_at_body() {
    let params = [param(Source::Body, FieldSpec::required("item", FieldType::Record(Item::shape())))];
    let headers = HeaderMap::new();
    let errors = run(&params, &[], None, &headers, b"{\"name\": ").unwrap_err();
    assert_eq!(errors.len(), 1);
    assert_eq!(locs(&errors), vec!["body"]);
    assert_eq!(errors.iter().next().unwrap().code(), "json_invalid");
}

#[test]
fn test_several_body_params_read_top_level_keys() {
    let params = [
        param(Source::Body, FieldSpec::required("bodyitem", FieldType::Record(Item::shape()))),
        param(Source::Body, FieldSpec::required("user", FieldType::Record(User::shape()))),
        param(Source::Body, FieldSpec::required("importance", FieldType::Int)),
    ];
    let headers = HeaderMap::new();
    let body = br#"{"bodyitem": {"name": "Foo"}, "user": {"username": "dave"}, "importance": 5}"#;
    let extracted = run(&params, &[], None, &headers, body).unwrap();
    assert_eq!(extracted.get::<i64>("importance").unwrap(), 5);
    assert_eq!(extracted.get::<User>("user").unwrap().username, "dave");

    let errors = run(&params, &[], None, &headers, br#"{"bodyitem": {}, "user": {}}"#).unwrap_err();
    assert_eq!(locs(&errors), vec!["body.user.username", "body.importance"]);
}

#[test]
fn test_embedded_single_body_param() {
    let params = [ParamSpec {
        embed: true,
        ..param(Source::Body, FieldSpec::required("item", FieldType::Record(Item::shape())))
    }];
    let headers = HeaderMap::new();
    let extracted = run(&params, &[], None, &headers, br#"{"item": {"name": "Foo"}}"#).unwrap();
    assert_eq!(extracted.get::<Item>("item").unwrap().name.as_deref(), Some("Foo"));
}

#[test]
fn test_form_fields() {
    let params = [
        param(Source::Form, FieldSpec::required("username", FieldType::Str)),
        param(Source::Form, FieldSpec::required("password", FieldType::Str)),
    ];
    let headers = HeaderMap::new();
    let extracted = run(&params, &[], None, &headers, b"username=johndoe&password=secret").unwrap();
    assert_eq!(extracted.get::<String>("username").unwrap(), "johndoe");

    let errors = run(&params, &[], None, &headers, b"username=johndoe").unwrap_err();
    assert_eq!(locs(&errors), vec!["body.password"]);
}

#[test]
fn test_user_in_email_is_checked() {
    let params = [param(Source::Body, FieldSpec::required("user", FieldType::Record(UserIn::shape())))];
    let headers = HeaderMap::new();
    let body = br#"{"username": "john", "password": "pw", "email": "not-an-email"}"#;
    let errors = run(&params, &[], None, &headers, body).unwrap_err();
    assert_eq!(locs(&errors), vec!["body.email"]);
}

#[test]
fn test_handler_type_mismatch_is_internal() {
    let params = Params::new(serde_json::Map::from_iter([("q".to_string(), json!("text"))]));
    assert!(matches!(params.get::<i64>("q"), Err(ApiError::Internal(_))));
}
