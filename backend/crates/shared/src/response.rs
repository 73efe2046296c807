//! Response Envelope
//!
//! Every endpoint answers with the same JSON shape:
//! `{"success": true, "data": ...}` or
//! `{"success": false, "error": {"code": "...", "message": "..."}}`.

use serde::Serialize;

/// Error part of a failed response
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

/// JSON response envelope
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorDetail>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

impl ApiResponse<()> {
    pub fn fail(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ErrorDetail {
                code: code.into(),
                message: message.into(),
            }),
        }
    }
}

#[cfg(feature = "axum")]
impl<T: Serialize> axum::response::IntoResponse for ApiResponse<T> {
    fn into_response(self) -> axum::response::Response {
        axum::Json(self).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_envelope() {
        let body = serde_json::to_value(ApiResponse::ok(serde_json::json!({"status": "ok"})))
            .unwrap();
        assert_eq!(
            body,
            serde_json::json!({"success": true, "data": {"status": "ok"}})
        );
    }

    #[test]
    fn test_fail_envelope() {
        let body =
            serde_json::to_value(ApiResponse::fail("ERR_FORBIDDEN", "insufficient permissions"))
                .unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "success": false,
                "error": {"code": "ERR_FORBIDDEN", "message": "insufficient permissions"}
            })
        );
    }
}
