use crate::attendance;
use crate::ipc::error::HandlerErr;

pub fn get_required_str(params: &serde_json::Value, key: &str) -> Result<String, HandlerErr> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| HandlerErr::bad_params(format!("missing {}", key)))
}

pub fn get_optional_str(params: &serde_json::Value, key: &str) -> Option<String> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Form text is kept as entered apart from surrounding whitespace; an empty
/// value is allowed.
pub fn get_text(params: &serde_json::Value, key: &str) -> Result<String, HandlerErr> {
    match params.get(key) {
        Some(serde_json::Value::String(s)) => Ok(s.trim().to_string()),
        Some(serde_json::Value::Number(n)) => Ok(n.to_string()),
        _ => Err(HandlerErr::bad_params(format!("missing {}", key))),
    }
}

pub fn get_student_id(params: &serde_json::Value) -> Result<i64, HandlerErr> {
    let v = params
        .get("studentId")
        .ok_or_else(|| HandlerErr::bad_params("missing studentId"))?;
    v.as_i64()
        .or_else(|| v.as_str().and_then(|s| s.trim().parse::<i64>().ok()))
        .ok_or_else(|| HandlerErr::bad_params("studentId must be an integer"))
}

/// `date` as YYYY-MM-DD, defaulting to today's local date.
pub fn get_date_or_today(params: &serde_json::Value) -> Result<String, HandlerErr> {
    let Some(raw) = get_optional_str(params, "date") else {
        return Ok(attendance::today().format("%Y-%m-%d").to_string());
    };
    attendance::parse_date(&raw)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .ok_or_else(|| HandlerErr::bad_params("date must be YYYY-MM-DD"))
}
