//! Field-level patch operations against [`CourseForUpsert`].

use courselib_http::FieldErrors;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::models::{CourseForUpsert, COURSE_FOR_UPSERT};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatchOp {
    Add,
    Remove,
    Replace,
    Move,
    Copy,
    Test,
}

/// One entry of a patch document: `{"op": "replace", "path": "/title", "value": "..."}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatchOperation {
    pub op: PatchOp,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Title,
    Description,
}

impl Field {
    fn parse(path: &str) -> Option<Self> {
        let name = path.strip_prefix('/')?;
        if name.eq_ignore_ascii_case("title") {
            Some(Self::Title)
        } else if name.eq_ignore_ascii_case("description") {
            Some(Self::Description)
        } else {
            None
        }
    }

    fn slot(self, course: &mut CourseForUpsert) -> &mut Option<String> {
        match self {
            Self::Title => &mut course.title,
            Self::Description => &mut course.description,
        }
    }
}

fn string_value(value: Option<&Value>) -> Result<Option<String>, String> {
    match value {
        Some(Value::String(text)) => Ok(Some(text.clone())),
        Some(Value::Null) => Ok(None),
        Some(other) => Err(format!("The value '{other}' is invalid for target location.")),
        None => Err("The 'value' property is required for this operation.".to_string()),
    }
}

fn target(path: &str) -> Result<Field, String> {
    Field::parse(path)
        .ok_or_else(|| format!("The target location specified by path '{path}' was not found."))
}

fn apply_one(operation: &PatchOperation, course: &mut CourseForUpsert) -> Result<(), String> {
    let field = target(&operation.path)?;

    match operation.op {
        PatchOp::Add | PatchOp::Replace => {
            *field.slot(course) = string_value(operation.value.as_ref())?;
        }
        PatchOp::Remove => {
            *field.slot(course) = None;
        }
        PatchOp::Move | PatchOp::Copy => {
            let from_path = operation
                .from
                .as_deref()
                .ok_or_else(|| "The 'from' property is required for this operation.".to_string())?;
            let source = target(from_path)?;
            let value = source.slot(course).clone();
            if operation.op == PatchOp::Move && source != field {
                *source.slot(course) = None;
            }
            *field.slot(course) = value;
        }
        PatchOp::Test => {
            let expected = string_value(operation.value.as_ref())?;
            if *field.slot(course) != expected {
                return Err(format!(
                    "The current value at path '{}' is not equal to the test value.",
                    operation.path
                ));
            }
        }
    }
    Ok(())
}

/// Apply `operations` in order. Failed operations are recorded under the
/// object name and leave `course` as it was before that operation; the
/// remaining operations still run.
pub fn apply_patch(
    operations: &[PatchOperation],
    course: &mut CourseForUpsert,
    errors: &mut FieldErrors,
) {
    for operation in operations {
        if let Err(message) = apply_one(operation, course) {
            tracing::debug!(op = ?operation.op, path = %operation.path, %message, "patch operation rejected");
            errors
                .entry(COURSE_FOR_UPSERT.to_string())
                .or_default()
                .push(message);
        }
    }
}
