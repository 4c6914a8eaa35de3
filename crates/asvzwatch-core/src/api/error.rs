use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Unauthorized - token may be expired")]
    Unauthorized,

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Rate limited - please wait before retrying")]
    RateLimited,

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let mut end = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
        }
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let truncated = Self::truncate_body(body);
        match status.as_u16() {
            // PocketBase answers 400 for malformed filter expressions
            400 => ApiError::BadRequest(truncated),
            401 => ApiError::Unauthorized,
            403 => ApiError::AccessDenied(truncated),
            404 => ApiError::NotFound(truncated),
            429 => ApiError::RateLimited,
            500..=599 => ApiError::ServerError(truncated),
            _ => ApiError::InvalidResponse(format!("Status {}: {}", status, truncated)),
        }
    }

    /// True if `err` wraps an `ApiError::NotFound`.
    pub fn is_not_found(err: &anyhow::Error) -> bool {
        matches!(err.downcast_ref::<ApiError>(), Some(ApiError::NotFound(_)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_from_status_maps_variants() {
        assert!(matches!(
            ApiError::from_status(StatusCode::BAD_REQUEST, "bad filter"),
            ApiError::BadRequest(_)
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::UNAUTHORIZED, ""),
            ApiError::Unauthorized
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::NOT_FOUND, "missing"),
            ApiError::NotFound(_)
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::BAD_GATEWAY, ""),
            ApiError::ServerError(_)
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::IM_A_TEAPOT, ""),
            ApiError::InvalidResponse(_)
        ));
    }

    #[test]
    fn test_long_bodies_are_truncated() {
        let body = "x".repeat(2000);
        match ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, &body) {
            ApiError::ServerError(msg) => {
                assert!(msg.contains("truncated, 2000 total bytes"));
                assert!(msg.len() < 600);
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn test_is_not_found() {
        let err: anyhow::Error = ApiError::NotFound("x".into()).into();
        assert!(ApiError::is_not_found(&err));
        let err = anyhow::anyhow!("something else");
        assert!(!ApiError::is_not_found(&err));
    }
}
