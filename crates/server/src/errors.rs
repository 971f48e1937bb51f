use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use service::ServiceError;
use tracing::{error, warn};

const MAX_DIAGNOSTIC_LEN: usize = 160;

/// Caller-facing wrapper around a service error: stable kind plus message.
#[derive(Debug)]
pub struct ApiError(pub ServiceError);

impl From<ServiceError> for ApiError {
    fn from(e: ServiceError) -> Self {
        Self(e)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(ServiceError::InvalidArgument(rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self(ServiceError::InvalidArgument(rejection.body_text()))
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Backend(_) | ServiceError::Decode(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServiceError::FailedPrecondition(_) => StatusCode::PRECONDITION_FAILED,
            ServiceError::InvalidTransition(_) => StatusCode::CONFLICT,
            ServiceError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Message sent to the caller; backend and decode details are cut short.
    pub fn message(&self) -> String {
        let msg = self.0.to_string();
        match &self.0 {
            ServiceError::Backend(_) | ServiceError::Decode(_) => truncate(msg, MAX_DIAGNOSTIC_LEN),
            _ => msg,
        }
    }
}

fn truncate(mut s: String, max: usize) -> String {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    s.truncate(end);
    s.push('…');
    s
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let kind = self.0.kind();
        let msg = self.message();
        if status.is_server_error() {
            error!(%kind, error = %msg, "request failed");
        } else {
            warn!(%kind, error = %msg, "request rejected");
        }
        (status, Json(serde_json::json!({"error": kind, "message": msg}))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_kinds_to_statuses() {
        let cases = [
            (ServiceError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (ServiceError::Backend("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (ServiceError::Decode("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (ServiceError::FailedPrecondition("x".into()), StatusCode::PRECONDITION_FAILED),
            (ServiceError::InvalidTransition("x".into()), StatusCode::CONFLICT),
            (ServiceError::InvalidArgument("x".into()), StatusCode::BAD_REQUEST),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError(err).status(), status);
        }
    }

    #[tokio::test]
    async fn bad_json_body_maps_to_invalid_argument() {
        use axum::extract::FromRequest;

        let req = axum::http::Request::builder()
            .method("PUT")
            .header("content-type", "application/json")
            .body(axum::body::Body::from(r#"{"x":"nope"}"#))
            .unwrap();
        let rejection = Json::<service::Point>::from_request(req, &()).await.unwrap_err();
        let err = ApiError::from(rejection);
        assert_eq!(err.0.kind(), "INVALID_ARGUMENT");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn backend_detail_is_shortened() {
        let long = "é".repeat(400);
        let msg = ApiError(ServiceError::Backend(long.clone())).message();
        assert!(msg.len() <= MAX_DIAGNOSTIC_LEN + '…'.len_utf8());
        assert!(msg.ends_with('…'));

        // caller-facing precondition messages are kept whole
        let msg = ApiError(ServiceError::FailedPrecondition(long.clone())).message();
        assert!(msg.contains(&long));
    }
}
