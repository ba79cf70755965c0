//! Success envelope shared by every route.
//!
//! ```text
//! { "success": true, "message": "Order created successfully", "order": { ... } }
//! ```
//!
//! `data` is flattened into the top level, so it must serialize as a map.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(skip)]
    pub status: StatusCode,

    #[serde(flatten)]
    pub data: T,
}

impl<T: Serialize> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Envelope {
            success: true,
            message: None,
            status: StatusCode::OK,
            data,
        }
    }

    pub fn with_message(message: impl Into<String>, data: T) -> Self {
        Envelope {
            message: Some(message.into()),
            ..Envelope::ok(data)
        }
    }

    /// 201 with a message.
    pub fn created(message: impl Into<String>, data: T) -> Self {
        Envelope {
            status: StatusCode::CREATED,
            ..Envelope::with_message(message, data)
        }
    }
}

impl Envelope<NoData> {
    pub fn message(message: impl Into<String>) -> Self {
        Envelope::with_message(message, NoData {})
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        (self.status, Json(&self)).into_response()
    }
}

/// Payload for responses that only carry a message.
#[derive(Debug, Serialize)]
pub struct NoData {}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Serialize)]
    struct Count {
        count: usize,
    }

    #[test]
    fn test_envelope_flattens_data() {
        let body = serde_json::to_value(Envelope::ok(Count { count: 3 })).unwrap();
        assert_eq!(body, json!({ "success": true, "count": 3 }));

        let body = serde_json::to_value(Envelope::message("Profile updated successfully")).unwrap();
        assert_eq!(
            body,
            json!({ "success": true, "message": "Profile updated successfully" })
        );
    }

    #[test]
    fn test_created_status() {
        let response = Envelope::created("Review added successfully", NoData {}).into_response();
        assert_eq!(response.status(), StatusCode::CREATED);
    }
}
