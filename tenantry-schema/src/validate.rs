use serde::de::DeserializeOwned;
use serde_json::Value;
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

use crate::SchemaErrors;

fn friendly_message(code: &str) -> Option<&'static str> {
    match code {
        "required" => Some("is required"),
        "email" => Some("must be a valid email"),
        "length" => Some("has invalid length"),
        "range" => Some("is out of range"),
        "regex" => Some("has an invalid format"),
        _ => None,
    }
}

fn join_path(prefix: &str, field: &str) -> String {
    if prefix.is_empty() {
        field.to_string()
    } else {
        format!("{prefix}.{field}")
    }
}

fn push_validation_errors(out: &mut SchemaErrors, prefix: &str, errs: &ValidationErrors) {
    for (field, kind) in errs.errors() {
        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                let key = join_path(prefix, field);
                for e in field_errors {
                    let msg = e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .or_else(|| friendly_message(&e.code).map(|m| m.to_string()))
                        .unwrap_or_else(|| e.code.to_string());
                    out.push_field(&key, msg);
                }
            }
            ValidationErrorsKind::Struct(nested) => {
                push_validation_errors(out, &join_path(prefix, field), nested.as_ref());
            }
            ValidationErrorsKind::List(items) => {
                let base = join_path(prefix, field);
                for (idx, nested) in items {
                    push_validation_errors(out, &format!("{base}[{idx}]"), nested.as_ref());
                }
            }
        }
    }
}

/// serde reports one problem at a time, keyed by the path where it failed.
///
/// A missing or null required field becomes `{field: ["is required"]}`; a
/// wrong type is reported under the field with serde's message. Only
/// problems with no path land under `_schema`.
fn push_serde_error(out: &mut SchemaErrors, err: &serde_path_to_error::Error<serde_json::Error>) {
    let path = err.path().to_string();
    let at = (path != ".").then_some(path.as_str()).unwrap_or("");
    let text = err.inner().to_string();

    if let Some(field) = text
        .strip_prefix("missing field `")
        .and_then(|rest| rest.split('`').next())
    {
        out.push_field(&join_path(at, field), "is required");
    } else if at.is_empty() {
        out.push_schema(text);
    } else if text.starts_with("invalid type: null") {
        out.push_field(at, "is required");
    } else {
        out.push_field(at, text);
    }
}

/// Deserialize `data` into `T` and run its `validator` rules.
pub fn validate<T>(data: &Value, error_message: &str) -> anyhow::Result<T>
where
    T: DeserializeOwned + Validate,
{
    if !data.is_object() {
        let mut errs = SchemaErrors::default();
        errs.push_schema("expected a JSON object");
        return Err(errs.into_unprocessable_anyhow(error_message));
    }

    let parsed: T = serde_path_to_error::deserialize(data.clone()).map_err(|e| {
        let mut errs = SchemaErrors::default();
        push_serde_error(&mut errs, &e);
        errs.into_unprocessable_anyhow(error_message)
    })?;

    parsed.validate().map_err(|e| {
        let mut errs = SchemaErrors::default();
        push_validation_errors(&mut errs, "", &e);
        errs.into_unprocessable_anyhow(error_message)
    })?;

    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use serde_json::json;
    use tenantry_core::errors::TenantryError;
    use validator::Validate;

    use super::validate;

    #[derive(Debug, Deserialize, Validate)]
    struct Member {
        #[validate(length(min = 1, message = "must not be empty"))]
        name: String,
        #[validate(email)]
        email: Option<String>,
    }

    #[derive(Debug, Deserialize, Validate)]
    struct Batch {
        #[validate(nested)]
        members: Vec<Member>,
    }

    fn errors_of(err: &anyhow::Error) -> serde_json::Value {
        let e = TenantryError::from_anyhow(err).expect("must be TenantryError");
        assert_eq!(e.code(), 422);
        e.errors.clone().unwrap()
    }

    #[test]
    fn missing_required_field_is_reported_by_name() {
        let err = validate::<Member>(&json!({"email": "a@b.io"}), "Members schema validation failed")
            .unwrap_err();
        assert_eq!(errors_of(&err)["name"][0], "is required");
    }

    #[test]
    fn null_for_a_required_field_is_reported_by_name() {
        let err = validate::<Member>(&json!({"name": null}), "Members schema validation failed").unwrap_err();
        let errors = errors_of(&err);
        assert_eq!(errors["name"][0], "is required");
        assert!(errors.get("_schema").is_none());
    }

    #[test]
    fn wrong_types_are_reported_under_their_path() {
        let err = validate::<Member>(&json!({"name": 5}), "Members schema validation failed").unwrap_err();
        let msg = errors_of(&err)["name"][0].as_str().unwrap().to_string();
        assert!(msg.starts_with("invalid type: integer `5`"), "{msg}");

        let data = json!({"members": [{"name": "ok"}, {"name": "x", "email": 7}]});
        let err = validate::<Batch>(&data, "Batch schema validation failed").unwrap_err();
        assert!(errors_of(&err)["members[1].email"].is_array());

        let err = validate::<Batch>(&json!({"members": [{"email": "a@b.io"}]}), "unused").unwrap_err();
        assert_eq!(errors_of(&err)["members[0].name"][0], "is required");
    }

    #[test]
    fn rule_failures_use_messages_or_friendly_defaults() {
        let err = validate::<Member>(&json!({"name": "", "email": "nope"}), "Members schema validation failed")
            .unwrap_err();
        let errors = errors_of(&err);
        assert_eq!(errors["name"][0], "must not be empty");
        assert_eq!(errors["email"][0], "must be a valid email");
    }

    #[test]
    fn nested_list_errors_are_flattened_with_paths() {
        let data = json!({"members": [{"name": "ok"}, {"name": "x", "email": "bad"}]});
        let err = validate::<Batch>(&data, "Batch schema validation failed").unwrap_err();
        assert_eq!(errors_of(&err)["members[1].email"][0], "must be a valid email");
    }

    #[test]
    fn non_object_payload_is_rejected() {
        let err = validate::<Member>(&json!([1, 2]), "Members schema validation failed").unwrap_err();
        assert!(errors_of(&err)["_schema"].is_array());
    }

    #[test]
    fn valid_payload_parses() {
        let m = validate::<Member>(&json!({"name": "Ada", "email": null}), "unused").unwrap();
        assert_eq!(m.name, "Ada");
        assert!(m.email.is_none());
    }
}
