//! Argument extraction and decoding.
//!
//! Extraction walks an operation's declared parameters in order and pulls
//! each argument out of the matched request, producing one JSON value per
//! parameter. Route and query values arrive as strings; typed coercion is
//! deferred to the dispatch table's decode step so the extraction stage
//! stays free of type knowledge.

use crate::request::ServerRequest;
use keryx_core::casing::{normalize_keys, to_snake_case};
use keryx_core::{BindingKind, Fault, FaultResult, OperationDescriptor};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Extracts the argument vector for one operation from a matched request.
///
/// Arguments come back in declared parameter order, ready to hand to the
/// contract's dispatch table:
///
/// - route parameters as strings, missing one is a `BadRequest`
/// - scalar query parameters as strings (name match ignores ASCII case),
///   absent ones as `null`
/// - composite query parameters as an object of all query pairs, keys folded
///   to `snake_case`
/// - body parameters as parsed JSON with keys folded, malformed JSON is a
///   `BadRequest`, an empty body is `null`
/// - unbound parameters as `null`
pub fn extract_arguments(
    operation: &OperationDescriptor,
    request: &ServerRequest,
) -> FaultResult<Vec<Value>> {
    let query_pairs = request.query_pairs();
    let mut args = Vec::with_capacity(operation.parameters().len());

    for spec in operation.parameters() {
        let value = match spec.kind {
            BindingKind::Route => {
                let raw = request.route().get(&spec.name).ok_or_else(|| {
                    Fault::bad_request(format!("route parameter '{}' is missing", spec.name))
                })?;
                Value::String(raw.to_string())
            }
            BindingKind::Query if spec.composite => composite_query_object(&query_pairs),
            BindingKind::Query => query_pairs
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(&spec.name))
                .map_or(Value::Null, |(_, value)| Value::String(value.clone())),
            BindingKind::Body => parse_body(request)?,
            BindingKind::Unbound => Value::Null,
        };
        args.push(value);
    }

    Ok(args)
}

/// Collapses all query pairs into one object with folded keys.
///
/// A repeated key keeps its first occurrence.
fn composite_query_object(pairs: &[(String, String)]) -> Value {
    let mut object = Map::new();
    for (name, value) in pairs {
        object
            .entry(to_snake_case(name))
            .or_insert_with(|| Value::String(value.clone()));
    }
    Value::Object(object)
}

fn parse_body(request: &ServerRequest) -> FaultResult<Value> {
    if request.body().is_empty() {
        return Ok(Value::Null);
    }
    let value: Value = serde_json::from_slice(request.body())
        .map_err(|e| Fault::bad_request(format!("request body is not valid JSON: {e}")))?;
    Ok(normalize_keys(value))
}

/// Decodes one extracted argument into its declared Rust type.
///
/// Route and query scalars arrive as strings, so a string that fails direct
/// deserialization gets a second chance as a bare JSON literal; `"42"`
/// decodes into an integer parameter, `"true"` into a bool.
pub fn decode_arg<T: DeserializeOwned>(value: Value) -> FaultResult<T> {
    match serde_json::from_value(value.clone()) {
        Ok(decoded) => Ok(decoded),
        Err(direct_err) => {
            if let Value::String(raw) = &value {
                if let Ok(decoded) = serde_json::from_str(raw) {
                    return Ok(decoded);
                }
            }
            Err(Fault::bad_request(format!(
                "argument could not be decoded: {direct_err}"
            )))
        }
    }
}

/// Decodes a composite query argument into its declared struct type.
///
/// The folded key/value object is re-encoded as a query string and decoded
/// through `serde_urlencoded`, which coerces string values into the target's
/// numeric and boolean fields.
pub fn decode_query_arg<T: DeserializeOwned>(value: &Value) -> FaultResult<T> {
    let pairs: Vec<(String, String)> = match value {
        Value::Null => Vec::new(),
        Value::Object(fields) => fields
            .iter()
            .map(|(name, field)| {
                let rendered = match field {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (name.clone(), rendered)
            })
            .collect(),
        _ => {
            return Err(Fault::bad_request(
                "composite query argument must be an object",
            ))
        }
    };
    let encoded = serde_urlencoded::to_string(&pairs)
        .map_err(|e| Fault::internal_with_source("failed to re-encode query argument", e))?;
    serde_urlencoded::from_str(&encoded)
        .map_err(|e| Fault::bad_request(format!("query parameters could not be decoded: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Method;
    use keryx_core::{Params, ParameterSpec, Verb};
    use serde::Deserialize;
    use serde_json::json;

    fn operation(specs: Vec<ParameterSpec>) -> OperationDescriptor {
        let mut builder = OperationDescriptor::builder("Op").verb(Verb::Get).path("/op");
        for spec in specs {
            builder = builder.parameter(spec);
        }
        builder.build()
    }

    #[test]
    fn route_values_extract_as_strings() {
        let op = operation(vec![ParameterSpec::route("id")]);
        let mut params = Params::new();
        params.push("id", "42");
        let request = ServerRequest::new(Method::GET, "/item/42").with_route_params(params);

        let args = extract_arguments(&op, &request).expect("extract");
        assert_eq!(args, vec![json!("42")]);
    }

    #[test]
    fn missing_route_value_is_bad_request() {
        let op = operation(vec![ParameterSpec::route("id")]);
        let request = ServerRequest::new(Method::GET, "/item");
        let err = extract_arguments(&op, &request).expect_err("must fail");
        assert_eq!(err.kind(), keryx_core::FaultKind::BadRequest);
    }

    #[test]
    fn scalar_query_matches_name_case_insensitively() {
        let op = operation(vec![ParameterSpec::query("page")]);
        let request = ServerRequest::new(Method::GET, "/items?Page=3");
        let args = extract_arguments(&op, &request).expect("extract");
        assert_eq!(args, vec![json!("3")]);
    }

    #[test]
    fn absent_scalar_query_is_null() {
        let op = operation(vec![ParameterSpec::query("page")]);
        let request = ServerRequest::new(Method::GET, "/items");
        let args = extract_arguments(&op, &request).expect("extract");
        assert_eq!(args, vec![Value::Null]);
    }

    #[test]
    fn composite_query_folds_keys() {
        let op = operation(vec![ParameterSpec::query_object("filter")]);
        let request = ServerRequest::new(Method::GET, "/items?Page=3&SortOrder=asc");
        let args = extract_arguments(&op, &request).expect("extract");
        assert_eq!(args, vec![json!({"page": "3", "sort_order": "asc"})]);
    }

    #[test]
    fn body_parses_and_folds_keys() {
        let op = operation(vec![ParameterSpec::body("item")]);
        let request = ServerRequest::new(Method::POST, "/items")
            .with_body(&br#"{"DisplayName":"Widget"}"#[..]);
        let args = extract_arguments(&op, &request).expect("extract");
        assert_eq!(args, vec![json!({"display_name": "Widget"})]);
    }

    #[test]
    fn malformed_body_is_bad_request() {
        let op = operation(vec![ParameterSpec::body("item")]);
        let request = ServerRequest::new(Method::POST, "/items").with_body(&b"{not json"[..]);
        let err = extract_arguments(&op, &request).expect_err("must fail");
        assert_eq!(err.kind(), keryx_core::FaultKind::BadRequest);
    }

    #[test]
    fn decode_arg_coerces_string_scalars() {
        let id: u64 = decode_arg(json!("42")).expect("decode");
        assert_eq!(id, 42);

        let flag: bool = decode_arg(json!("true")).expect("decode");
        assert!(flag);

        let name: String = decode_arg(json!("widget")).expect("decode");
        assert_eq!(name, "widget");
    }

    #[test]
    fn decode_arg_rejects_undecodable_values() {
        let err = decode_arg::<u64>(json!("not a number")).expect_err("must fail");
        assert_eq!(err.kind(), keryx_core::FaultKind::BadRequest);
    }

    #[test]
    fn decode_query_arg_coerces_field_types() {
        #[derive(Debug, Deserialize, PartialEq)]
        struct Filter {
            #[serde(default)]
            page: u32,
            #[serde(default)]
            archived: bool,
            #[serde(default)]
            search: String,
        }

        let filter: Filter =
            decode_query_arg(&json!({"page": "3", "archived": "true"})).expect("decode");
        assert_eq!(
            filter,
            Filter {
                page: 3,
                archived: true,
                search: String::new()
            }
        );
    }
}
