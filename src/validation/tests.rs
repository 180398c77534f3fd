use super::*;
use crate::models::{Image, Item, ModelName};
use crate::schema::{ClosedEnum, Schema};

fn path_loc(name: &str) -> Location {
    Location::root("path").key(name)
}

fn item_id_bounds() -> Bounds {
    Bounds {
        ge: Some(0.0),
        le: Some(1000.0),
        ..Bounds::default()
    }
}

#[test]
fn test_location_display_and_serialization() {
    let loc = Location::root("body").key("images").index(1).key("url");
    assert_eq!(loc.to_string(), "body.images.1.url");
    assert_eq!(serde_json::to_value(&loc).unwrap(), json!(["body", "images", 1, "url"]));
}

#[test]
fn test_coerce_int_within_bounds() {
    let mut errors = ValidationErrors::new();
    let value = coerce_text("42", &FieldType::Int, &item_id_bounds(), &path_loc("item_id"), &mut errors);
    assert_eq!(value, Some(json!(42)));
    assert!(errors.is_empty());
}

#[test]
fn test_coerce_int_below_lower_bound() {
    let mut errors = ValidationErrors::new();
    let value = coerce_text("-1", &FieldType::Int, &item_id_bounds(), &path_loc("item_id"), &mut errors);
    assert!(value.is_none());
    assert_eq!(errors.len(), 1);
    let error = errors.iter().next().unwrap();
    assert!(matches!(error, FieldError::ParameterCoercion { reason: Reason::GreaterThanEqual(_), .. }));
    assert_eq!(error.message(), "Input should be greater than or equal to 0");
}

#[test]
fn test_coerce_int_above_upper_bound() {
    let mut errors = ValidationErrors::new();
    let value = coerce_text("1001", &FieldType::Int, &item_id_bounds(), &path_loc("item_id"), &mut errors);
    assert!(value.is_none());
    assert_eq!(errors.iter().next().unwrap().code(), "less_than_equal");
}

#[test]
fn test_coerce_int_rejects_text() {
    let mut errors = ValidationErrors::new();
    let value = coerce_text("foo", &FieldType::Int, &Bounds::default(), &path_loc("item_id"), &mut errors);
    assert!(value.is_none());
    assert_eq!(errors.iter().next().unwrap().code(), "int_parsing");
}

#[test]
fn test_coerce_bool_variants() {
    let loc = Location::root("query").key("short");
    for (raw, expected) in [("true", true), ("1", true), ("Yes", true), ("off", false), ("0", false)] {
        let mut errors = ValidationErrors::new();
        let value = coerce_text(raw, &FieldType::Bool, &Bounds::default(), &loc, &mut errors);
        assert_eq!(value, Some(Value::Bool(expected)), "raw value {}", raw);
    }

    let mut errors = ValidationErrors::new();
    assert!(coerce_text("maybe", &FieldType::Bool, &Bounds::default(), &loc, &mut errors).is_none());
    assert_eq!(errors.iter().next().unwrap().code(), "bool_parsing");
}

#[test]
fn test_enum_mismatch_names_allowed_set() {
    let mut errors = ValidationErrors::new();
    let ty = FieldType::Choice(ModelName::choices());
    let value = coerce_text("AlexNet", &ty, &Bounds::default(), &path_loc("model_name"), &mut errors);
    assert!(value.is_none());

    let error = errors.iter().next().unwrap();
    match error {
        FieldError::EnumMismatch { allowed, .. } => {
            assert_eq!(allowed, &vec!["alexnet".to_string(), "resnet".to_string(), "lenet".to_string()]);
        }
        other => panic!("Expected EnumMismatch, got {:?}", other),
    }
    assert_eq!(error.message(), "Input should be 'alexnet', 'resnet' or 'lenet'");
    assert_eq!(error.to_detail()["ctx"]["expected"], json!(["alexnet", "resnet", "lenet"]));
}

#[test]
fn test_enum_accepts_exact_variant() {
    let mut errors = ValidationErrors::new();
    let ty = FieldType::Choice(ModelName::choices());
    let value = coerce_text("lenet", &ty, &Bounds::default(), &path_loc("model_name"), &mut errors);
    assert_eq!(value, Some(json!("lenet")));
}

#[test]
fn test_coerce_many_collects_list_in_order() {
    let mut errors = ValidationErrors::new();
    let loc = Location::root("query").key("q");
    let value = coerce_many(&["a", "b", "c"], &FieldType::list(FieldType::Str), &Bounds::default(), &loc, &mut errors);
    assert_eq!(value, Some(json!(["a", "b", "c"])));
}

#[test]
fn test_coerce_many_scalar_takes_last_value() {
    let mut errors = ValidationErrors::new();
    let loc = Location::root("query").key("q");
    let value = coerce_many(&["first", "second"], &FieldType::Str, &Bounds::default(), &loc, &mut errors);
    assert_eq!(value, Some(json!("second")));
}

#[test]
fn test_coerce_many_reports_each_bad_list_entry() {
    let mut errors = ValidationErrors::new();
    let loc = Location::root("query").key("ids");
    let value = coerce_many(&["1", "x", "y"], &FieldType::list(FieldType::Int), &Bounds::default(), &loc, &mut errors);
    assert!(value.is_none());
    assert_eq!(errors.len(), 2);
    let locs: Vec<String> = errors.iter().map(|e| e.loc().to_string()).collect();
    assert_eq!(locs, vec!["query.ids.1", "query.ids.2"]);
}

#[test]
fn test_validate_record_applies_defaults_and_drops_unknown_fields() {
    let mut errors = ValidationErrors::new();
    let body = json!({"name": "Foo", "price": 35.4, "colour": "red"});
    let checked = validate_record(&body, &Item::shape(), &Location::root("body"), &mut errors).unwrap();

    assert!(errors.is_empty());
    assert_eq!(checked.get("name"), Some(&json!("Foo")));
    assert_eq!(checked.get("tags"), Some(&json!([])));
    assert!(!checked.contains_key("colour"));
    assert!(!checked.contains_key("description"));
}

#[test]
fn test_validate_record_reports_missing_required_field() {
    let mut errors = ValidationErrors::new();
    let body = json!({"url": "https://example.com/baz.jpg"});
    let checked = validate_record(&body, &Image::shape(), &Location::root("body"), &mut errors);

    assert!(checked.is_none());
    let error = errors.iter().next().unwrap();
    assert!(matches!(error, FieldError::BodyValidation { reason: Reason::Missing, .. }));
    assert_eq!(error.loc().to_string(), "body.name");
}

#[test]
fn test_validate_record_aggregates_every_failure() {
    let mut errors = ValidationErrors::new();
    let body = json!({
        "name": 5,
        "price": "cheap",
        "tags": ["ok", 3],
        "images": [{"url": "not a url", "name": "x"}, {"url": "https://example.com/a.png"}]
    });
    let checked = validate_record(&body, &Item::shape(), &Location::root("body"), &mut errors);

    assert!(checked.is_none());
    let locs: Vec<String> = errors.iter().map(|e| e.loc().to_string()).collect();
    assert_eq!(
        locs,
        vec!["body.name", "body.price", "body.tags.1", "body.images.0.url", "body.images.1.name"]
    );
}

#[test]
fn test_validate_record_rejects_non_object() {
    let mut errors = ValidationErrors::new();
    assert!(validate_record(&json!([1, 2]), &Item::shape(), &Location::root("body"), &mut errors).is_none());
    assert_eq!(errors.iter().next().unwrap().code(), "dict_type");
}

#[test]
fn test_validate_value_keeps_float_representation() {
    let mut errors = ValidationErrors::new();
    let loc = Location::root("body").key("price");
    assert_eq!(validate_value(&json!(62), &FieldType::Float, &Bounds::default(), &loc, &mut errors), Some(json!(62)));
    assert_eq!(validate_value(&json!("50.5"), &FieldType::Float, &Bounds::default(), &loc, &mut errors), Some(json!(50.5)));
    assert!(errors.is_empty());
}

#[test]
fn test_validate_value_converts_integral_float_to_int() {
    let mut errors = ValidationErrors::new();
    let loc = Location::root("body").key("importance");
    assert_eq!(validate_value(&json!(5.0), &FieldType::Int, &Bounds::default(), &loc, &mut errors), Some(json!(5)));
    assert!(validate_value(&json!(5.5), &FieldType::Int, &Bounds::default(), &loc, &mut errors).is_none());
    assert_eq!(errors.len(), 1);
}

#[test]
fn test_optional_field_accepts_null() {
    let mut errors = ValidationErrors::new();
    let checked = validate_record(&json!({"description": null}), &Item::shape(), &Location::root("body"), &mut errors).unwrap();
    assert_eq!(checked.get("description"), Some(&Value::Null));
}

#[test]
fn test_required_field_rejects_null() {
    let mut errors = ValidationErrors::new();
    let body = json!({"url": null, "name": "x"});
    assert!(validate_record(&body, &Image::shape(), &Location::root("body"), &mut errors).is_none());
    assert_eq!(errors.iter().next().unwrap().code(), "string_type");
}

#[test]
fn test_email_and_url_checks() {
    let mut errors = ValidationErrors::new();
    let loc = Location::root("body").key("email");
    assert!(validate_value(&json!("john@example.com"), &FieldType::Email, &Bounds::default(), &loc, &mut errors).is_some());
    assert!(validate_value(&json!("john.example.com"), &FieldType::Email, &Bounds::default(), &loc, &mut errors).is_none());
    assert!(validate_value(&json!("ftp://example.com"), &FieldType::Url, &Bounds::default(), &loc, &mut errors).is_none());
    assert_eq!(errors.len(), 2);
}

#[test]
fn test_plain_text_lists_one_line_per_error() {
    let mut errors = ValidationErrors::new();
    errors.reject(Location::root("path").key("item_id"), Reason::IntParsing);
    errors.reject(Location::root("body").key("name"), Reason::Missing);
    assert_eq!(
        errors.to_plain_text(),
        "path.item_id: Input should be a valid integer\nbody.name: Field required"
    );
}

#[test]
fn test_field_error_category_follows_location_root() {
    assert!(matches!(
        FieldError::at(Location::root("query").key("q"), Reason::Missing),
        FieldError::ParameterCoercion { .. }
    ));
    assert!(matches!(
        FieldError::at(Location::root("body").key("q"), Reason::Missing),
        FieldError::BodyValidation { .. }
    ));
}

#[test]
fn test_detail_carries_bound_context() {
    let mut errors = ValidationErrors::new();
    errors.reject(path_loc("item_id"), Reason::LessThanEqual(1000.0));
    let detail = errors.to_detail();
    assert_eq!(detail[0]["type"], "less_than_equal");
    assert_eq!(detail[0]["loc"], json!(["path", "item_id"]));
    assert_eq!(detail[0]["ctx"]["limit"], json!(1000.0));
}

#[test]
fn test_null_rejected_where_default_is_not_null() {
    let mut errors = ValidationErrors::new();
    let body = json!({"name": "Foo", "description": null, "tags": null});
    let checked = validate_record(&body, &Item::shape(), &Location::root("body"), &mut errors);

    assert!(checked.is_none());
    assert_eq!(errors.len(), 1);
    assert_eq!(errors.iter().next().unwrap().loc().to_string(), "body.tags");
    assert_eq!(errors.to_detail()[0]["type"], "list_type");
}

#[test]
fn test_null_accepted_for_nullable_optional_field() {
    let mut errors = ValidationErrors::new();
    let body = json!({"name": "Foo", "description": null});
    let checked = validate_record(&body, &Item::shape(), &Location::root("body"), &mut errors).unwrap();

    assert!(errors.is_empty());
    assert_eq!(checked.get("description"), Some(&Value::Null));
    let item: Item = serde_json::from_value(Value::Object(checked)).unwrap();
    assert!(item.description.is_none());
}

#[test]
fn test_int_outside_i64_is_rejected() {
    let mut errors = ValidationErrors::new();
    let loc = Location::root("body").key("importance");
    let huge: Value = serde_json::from_str("18446744073709551615").unwrap();

    assert!(validate_value(&huge, &FieldType::Int, &Bounds::default(), &loc, &mut errors).is_none());
    assert_eq!(errors.to_detail()[0]["type"], "int_parsing");

    let max = json!(i64::MAX);
    assert_eq!(validate_value(&max, &FieldType::Int, &Bounds::default(), &loc, &mut errors), Some(max));
}
