use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::error;

use crate::error::Error;

/// Error body returned by every route: `{"error": "<message>"}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// Maps an operation failure, turning store and identity failures into
    /// a generic "Could not <action>." for the user to retry.
    pub fn failed(action: &'static str) -> impl Fn(Error) -> ApiError {
        move |err| match err {
            Error::Store(_) | Error::Identity(_) | Error::Entropy(_) => {
                error!(error = %err, action, "operation failed");
                ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, format!("Could not {action}."))
            }
            other => ApiError::from(other),
        }
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::NotFound(what) => ApiError::new(StatusCode::NOT_FOUND, not_found_message(what)),
            Error::Validation(message) => ApiError::new(StatusCode::BAD_REQUEST, message),
            Error::Forbidden(_) => ApiError::new(StatusCode::FORBIDDEN, err.to_string()),
            Error::NotImplemented(_) => ApiError::new(StatusCode::NOT_IMPLEMENTED, err.to_string()),
            Error::JoinCodeExhausted(_) => {
                error!(error = %err, "join code allocation gave up");
                ApiError::new(StatusCode::SERVICE_UNAVAILABLE, "Could not create study. Please try again.")
            }
            other => {
                error!(error = %other, "request failed");
                ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Something went wrong.")
            }
        }
    }
}

fn not_found_message(what: &str) -> String {
    match what {
        "study" => "Study not found. This study may have been removed or your invite link is invalid.".to_string(),
        "join code" => "This invite link is invalid or has expired.".to_string(),
        other => {
            let mut chars = other.chars();
            match chars.next() {
                Some(first) => format!("{}{} not found.", first.to_uppercase(), chars.as_str()),
                None => "Not found.".to_string(),
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(serde_json::json!({ "error": self.message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: Error) -> StatusCode {
        ApiError::from(err).into_response().status()
    }

    #[test]
    fn maps_error_kinds_to_statuses() {
        assert_eq!(status_of(Error::NotFound("study")), StatusCode::NOT_FOUND);
        assert_eq!(
            status_of(Error::Validation("Join code is required.".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(status_of(Error::Forbidden("post recaps")), StatusCode::FORBIDDEN);
        assert_eq!(
            status_of(Error::NotImplemented("Provider sign-in")),
            StatusCode::NOT_IMPLEMENTED
        );
        assert_eq!(
            status_of(Error::JoinCodeExhausted(5)),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn store_failures_name_the_action() {
        let api = ApiError::failed("join study")(Error::Identity("cookie store gone".to_string()));
        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api.message, "Could not join study.");

        let api = ApiError::failed("join study")(Error::NotFound("join code"));
        assert_eq!(api.status, StatusCode::NOT_FOUND);
        assert_eq!(api.message, "This invite link is invalid or has expired.");
    }
}
