use strum::IntoEnumIterator;
use wasm_bindgen::prelude::*;

use crate::catalog::{ErrorCode, render};
use crate::faults::FaultTranslator;
use crate::filter::{FilterMask, filter_results};
use crate::types::{AdditionalInformation, Fault, RemoteFailure};

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = JSON)]
    fn parse(s: &str) -> JsValue;
}

fn to_js<T: serde::Serialize>(value: &T) -> JsValue {
    match serde_json::to_string(value) {
        Ok(json_str) => parse(&json_str),
        Err(_) => JsValue::NULL,
    }
}

fn error_result(msg: &str) -> JsValue {
    to_js(&serde_json::json!({"error": msg}))
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct FailureInput {
    #[serde(default)]
    organisation: String,
    #[serde(default)]
    username: String,
    #[serde(default)]
    transport: bool,
    status: Option<u16>,
    fault_code: Option<i64>,
    #[serde(default)]
    fault_string: String,
    #[serde(default)]
    message: String,
    additional_information: Option<AdditionalInformation>,
}

/// Every catalog entry as `{code, authority, template}`.
#[wasm_bindgen]
pub fn get_error_catalog() -> JsValue {
    let entries: Vec<serde_json::Value> = ErrorCode::iter()
        .map(|code| {
            serde_json::json!({
                "code": code.code(),
                "authority": code.authority().as_ref(),
                "template": code.template(),
            })
        })
        .collect();
    to_js(&entries)
}

/// Render the catalog message for a numeric code.
#[wasm_bindgen]
pub fn render_error(code: f64, additional_information: Option<String>) -> JsValue {
    let Some(code) = ErrorCode::from_code(code as i64) else {
        return error_result("Unknown error code");
    };
    let info = additional_information.map(AdditionalInformation::Text);
    to_js(&render(code, info.as_ref()))
}

/// Translate a failure described as JSON into `{code, message}`.
#[wasm_bindgen]
pub fn translate_failure(json: &str) -> JsValue {
    let input: FailureInput = match serde_json::from_str(json) {
        Ok(v) => v,
        Err(_) => return error_result("Invalid failure JSON"),
    };
    let translator = FaultTranslator::new(input.organisation, input.username);
    let failure = if input.transport {
        RemoteFailure::Transport {
            status: input.status,
            reason: input.message,
        }
    } else {
        RemoteFailure::Fault(Fault {
            code: input.fault_code,
            fault_string: input.fault_string,
            message: input.message,
        })
    };
    to_js(&translator.translate(&failure, input.additional_information))
}

/// Project a JSON value through a JSON mask.
#[wasm_bindgen]
pub fn filter_json(value: &str, mask: &str) -> JsValue {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(value) else {
        return error_result("Invalid value JSON");
    };
    let Ok(mask) = serde_json::from_str::<FilterMask>(mask) else {
        return error_result("Invalid mask JSON");
    };
    to_js(&filter_results(&value, &mask))
}
