use serde_json::{Map, Value};

use crate::catalog::{ErrorCode, ErrorRecord, render};
use crate::types::AdditionalInformation;

/// Reply to operations that create or associate a contact.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ContactConfirmation {
    pub message: String,
    pub contact_id: i64,
}

/// Reply to operations whose remote call returns a bare value.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct CallConfirmation {
    pub message: String,
    pub value: Value,
}

/// Launch reference attached to a transactional send.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(untagged)]
pub enum LaunchReference {
    Id(i64),
    Text(String),
}

impl LaunchReference {
    pub(crate) fn to_options(reference: Option<&Self>) -> Value {
        match reference {
            Some(reference) => serde_json::json!({ "launch_reference": reference }),
            None => Value::Object(Map::new()),
        }
    }
}

pub fn is_email_shaped(candidate: &str) -> bool {
    candidate.contains('@') && candidate.contains('.')
}

pub(crate) fn invalid_input(code: ErrorCode, value: impl std::fmt::Display) -> ErrorRecord {
    render(
        code,
        Some(&AdditionalInformation::Text(format!("Input value: {value}"))),
    )
}

/// Identifiers are server-assigned and always positive.
pub(crate) fn check_id(id: i64, code: ErrorCode) -> Result<i64, ErrorRecord> {
    if id > 0 {
        Ok(id)
    } else {
        Err(invalid_input(code, id))
    }
}

pub(crate) fn check_email(email: &str) -> Result<&str, ErrorRecord> {
    if is_email_shaped(email) {
        Ok(email)
    } else {
        Err(invalid_input(ErrorCode::InvalidEmailAddress, email))
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f.abs() < f64::EPSILON),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

/// Prepare field data for the wire: blank values are dropped and `£` is
/// escaped as `&pound;`.
pub fn clean_contact_data(contact_data: &Map<String, Value>) -> Map<String, Value> {
    contact_data
        .iter()
        .filter(|(_, value)| !is_blank(value))
        .map(|(field, value)| {
            let value = match value {
                Value::String(s) if s.contains('\u{a3}') => {
                    Value::String(s.replace('\u{a3}', "&pound;"))
                }
                other => other.clone(),
            };
            (field.clone(), value)
        })
        .collect()
}
