pub mod human;

use serde_json::{Value, json};

/// Standard JSON envelope printed by every command.
pub fn success(command: &str, data: Value) -> Value {
    json!({
        "status": "ok",
        "command": command,
        "data": data,
        "error": null
    })
}

pub fn error(command: &str, code: &str, message: &str) -> Value {
    json!({
        "status": "error",
        "command": command,
        "data": null,
        "error": {
            "code": code,
            "message": message
        }
    })
}

/// Error code for the JSON envelope, by the kind of failure.
pub fn error_code(err: &anyhow::Error) -> &'static str {
    use crate::error::ScheduleError;

    match err.downcast_ref::<ScheduleError>() {
        Some(ScheduleError::ReplaceIncomplete { .. }) => return "platform_error",
        Some(_) => return "validation_error",
        None => {}
    }
    if err.downcast_ref::<crate::core::recurrence::RecurrenceError>().is_some() {
        "validation_error"
    } else if err.downcast_ref::<crate::platform::PlatformError>().is_some() {
        "platform_error"
    } else {
        "general_error"
    }
}
