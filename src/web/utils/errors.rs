use serde_json::Value;

pub const CODE_INTERNAL: &str = "VGL-CORE-500";
pub const CODE_NOT_FOUND: &str = "VGL-CORE-404";

pub const CODE_ADMIN_INTERNAL: &str = "VGL-ADM-500";
pub const CODE_ADMIN_NOT_FOUND: &str = "VGL-ADM-404";
pub const CODE_ADMIN_CONFLICT: &str = "VGL-ADM-409";

pub const CODE_INGEST_INTERNAL: &str = "VGL-ING-500";
pub const CODE_INGEST_NOT_FOUND: &str = "VGL-ING-404";

pub fn internal_error_json(details: &str) -> Value {
    error_json(CODE_INTERNAL, "Internal error", Some(details))
}

pub fn not_found_json(details: &str) -> Value {
    error_json(CODE_NOT_FOUND, "Not found", Some(details))
}

pub fn admin_internal_error_json(details: &str) -> Value {
    error_json(CODE_ADMIN_INTERNAL, "Internal error", Some(details))
}

pub fn admin_not_found_json(details: &str) -> Value {
    error_json(CODE_ADMIN_NOT_FOUND, "Not found", Some(details))
}

pub fn admin_conflict_json(details: &str) -> Value {
    error_json(CODE_ADMIN_CONFLICT, "Conflict", Some(details))
}

pub fn ingest_internal_error_json(details: &str) -> Value {
    error_json(CODE_INGEST_INTERNAL, "Internal error", Some(details))
}

pub fn ingest_not_found_json(details: &str) -> Value {
    error_json(CODE_INGEST_NOT_FOUND, "Not found", Some(details))
}

pub fn error_json(code: &str, safe_message: &str, details: Option<&str>) -> Value {
    let message = if cfg!(debug_assertions) {
        details.unwrap_or(safe_message)
    } else {
        safe_message
    };
    serde_json::json!({
        "status": "error",
        "code": code,
        "message": message
    })
}
