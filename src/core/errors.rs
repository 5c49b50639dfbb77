use spin_sdk::http::Response;
use std::fmt;

#[derive(Debug)]
pub enum ApiError {
    /// Malformed request body; carries (field, message) pairs.
    Validation(Vec<(String, String)>),
    Unauthorized,
    Forbidden(String),
    NotFound(String),
    /// Uniqueness violation. Surfaced as 400, matching the platform this
    /// API replaces.
    Conflict(String),
    InternalError(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Validation(fields) => {
                let names: Vec<&str> = fields.iter().map(|(n, _)| n.as_str()).collect();
                write!(f, "Validation failed: {}", names.join(", "))
            }
            ApiError::Unauthorized => write!(f, "Unauthorized"),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::InternalError(msg) => write!(f, "Internal Error: {}", msg),
        }
    }
}

fn json_response(status: u16, body: serde_json::Value) -> Response {
    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .body(serde_json::to_vec(&body).unwrap_or_default())
        .build()
}

impl From<ApiError> for Response {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Validation(fields) => {
                let detail: Vec<serde_json::Value> = fields
                    .into_iter()
                    .map(|(field, message)| {
                        serde_json::json!({"field": field, "message": message})
                    })
                    .collect();
                json_response(
                    422,
                    serde_json::json!({"error": "Validation failed", "fields": detail}),
                )
            }
            ApiError::Unauthorized => {
                json_response(401, serde_json::json!({"error": "Unauthorized"}))
            }
            ApiError::Forbidden(msg) => json_response(403, serde_json::json!({"error": msg})),
            ApiError::NotFound(msg) => json_response(404, serde_json::json!({"error": msg})),
            ApiError::Conflict(msg) => json_response(400, serde_json::json!({"error": msg})),
            ApiError::InternalError(msg) => json_response(500, serde_json::json!({"error": msg})),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::InternalError(err.to_string())
    }
}
