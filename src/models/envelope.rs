use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{ApiError, ApiResult};

pub const ALLOW_HEADERS: &str = "Origin, Authorization, Accept, Content-Type";

/// Uniform `{result, error, data}` wrapper returned by every operation.
#[derive(Debug, Clone, Serialize)]
pub struct Envelope<T = Value> {
    pub result: u8,
    pub error: String,
    pub data: T,
}

impl<T: Serialize> Envelope<T> {
    pub fn success(data: T) -> Self {
        Envelope {
            result: 1,
            error: String::new(),
            data,
        }
    }
}

impl Envelope<Value> {
    pub fn failure(message: impl Into<String>) -> Self {
        Envelope {
            result: 0,
            error: message.into(),
            data: Value::Object(Map::new()),
        }
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    /// A non-empty `error` becomes a 400 carrying the raw message, anything
    /// else is a 200 with the serialized envelope.
    fn into_response(self) -> Response {
        if !self.error.is_empty() {
            return raw_response(StatusCode::BAD_REQUEST, self.error);
        }

        match serde_json::to_string(&self) {
            Ok(body) => raw_response(StatusCode::OK, body),
            Err(e) => ApiError::Internal(anyhow::Error::new(e).context("envelope serialization"))
                .into_response(),
        }
    }
}

/// Turns an operation outcome into the transport response.
pub fn respond<T: Serialize>(outcome: ApiResult<T>) -> Response {
    match outcome {
        Ok(data) => Envelope::success(data).into_response(),
        Err(err) => {
            if err.is_domain() {
                tracing::info!(error = %err, "Request rejected");
            }
            err.into_response()
        }
    }
}

/// Builds a response with the headers every route carries.
pub fn raw_response(status: StatusCode, body: String) -> Response {
    let mut response = (status, body).into_response();
    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    response
}

/// Fixed CORS preflight answer listing the route's dispatch table.
pub fn preflight(methods: &[Method]) -> Response {
    let allowed = methods
        .iter()
        .map(Method::as_str)
        .collect::<Vec<_>>()
        .join(",");

    let mut response = raw_response(StatusCode::OK, String::new());
    let headers = response.headers_mut();
    if let Ok(value) = HeaderValue::from_str(&allowed) {
        headers.insert(header::ACCESS_CONTROL_ALLOW_METHODS, value);
    }
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOW_HEADERS),
    );
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_envelope_serialization() {
        let envelope = Envelope::success(3u64);
        let json = serde_json::to_string(&envelope).expect("Failed to serialize envelope");
        assert_eq!(json, r#"{"result":1,"error":"","data":3}"#);
    }

    #[test]
    fn test_failure_envelope_has_empty_data() {
        let envelope = Envelope::failure("Contents are blank");
        assert_eq!(
            serde_json::to_value(&envelope).unwrap(),
            json!({"result": 0, "error": "Contents are blank", "data": {}})
        );
    }

    #[test]
    fn test_failure_maps_to_bad_request_with_cors_headers() {
        let response = Envelope::failure("Message not found").into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");
        assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    }

    #[test]
    fn test_success_maps_to_ok() {
        let response = respond::<Vec<u8>>(Ok(vec![]));
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn test_preflight_lists_methods() {
        let response = preflight(&[Method::GET, Method::POST, Method::DELETE]);

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_METHODS], "GET,POST,DELETE");
        assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_HEADERS], ALLOW_HEADERS);
        assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    }
}
