//! Flattening of `validator` errors into problem-document field maps.

use validator::{Validate, ValidationErrors, ValidationErrorsKind};

use crate::error::{AppError, FieldErrors};

/// Key `validator` uses for struct-level (schema) errors.
const SCHEMA_KEY: &str = "__all__";

/// Flatten `errors` into `field -> messages`.
///
/// Field names are rendered in camelCase to match the JSON payloads. Nested
/// fields are keyed `courses[0].title`. Struct-level errors are keyed by the
/// enclosing path, or by `object_name` at the top level.
pub fn field_errors(errors: &ValidationErrors, object_name: &str) -> FieldErrors {
    let mut flat = FieldErrors::new();
    collect(errors, "", object_name, &mut flat);
    flat
}

fn collect(errors: &ValidationErrors, prefix: &str, object_name: &str, out: &mut FieldErrors) {
    for (field, kind) in errors.errors() {
        let field = field.to_string();
        let field = if field == SCHEMA_KEY {
            field
        } else {
            json_name(&field)
        };
        let key = match (field == SCHEMA_KEY, prefix.is_empty()) {
            (true, true) => object_name.to_string(),
            (true, false) => prefix.to_string(),
            (false, true) => field,
            (false, false) => format!("{prefix}.{field}"),
        };

        match kind {
            ValidationErrorsKind::Field(list) => {
                let messages = out.entry(key).or_default();
                for error in list {
                    let message = error
                        .message
                        .as_ref()
                        .map(|message| message.to_string())
                        .unwrap_or_else(|| format!("The field is invalid ({}).", error.code));
                    messages.push(message);
                }
            }
            ValidationErrorsKind::Struct(inner) => collect(inner, &key, object_name, out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    collect(inner, &format!("{key}[{index}]"), object_name, out);
                }
            }
        }
    }
}

/// `first_name` -> `firstName`
fn json_name(field: &str) -> String {
    let mut name = String::with_capacity(field.len());
    let mut upper = false;
    for ch in field.chars() {
        if ch == '_' {
            upper = !name.is_empty();
        } else if upper {
            name.extend(ch.to_uppercase());
            upper = false;
        } else {
            name.push(ch);
        }
    }
    name
}

/// Run `validator` rules and merge the result into `errors`.
pub fn validate_into<T: Validate>(value: &T, object_name: &str, errors: &mut FieldErrors) {
    if let Err(found) = value.validate() {
        for (key, mut messages) in field_errors(&found, object_name) {
            errors.entry(key).or_default().append(&mut messages);
        }
    }
}

/// Validate every element of a list payload, keying errors `[index].field`.
pub fn validate_list<T: Validate>(items: &[T], object_name: &str) -> FieldErrors {
    let mut errors = FieldErrors::new();
    for (index, item) in items.iter().enumerate() {
        if let Err(found) = item.validate() {
            for (key, messages) in field_errors(&found, object_name) {
                let key = if key == object_name {
                    format!("[{index}]")
                } else {
                    format!("[{index}].{key}")
                };
                errors.entry(key).or_default().extend(messages);
            }
        }
    }
    errors
}

/// Validate `value`, turning any failure into a 422 problem for `instance`.
pub fn validate_payload<T: Validate>(
    value: &T,
    object_name: &str,
    instance: &str,
) -> Result<(), AppError> {
    let mut errors = FieldErrors::new();
    validate_into(value, object_name, &mut errors);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::validation_problem(instance, errors))
    }
}
