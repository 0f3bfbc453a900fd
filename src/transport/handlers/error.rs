//! Error response handling (4xx/5xx)

use reqwest::{Response, StatusCode};

use crate::errors::{KubewireError, Result};
use crate::models::Status;
use crate::transport::options::ApiOutput;

pub fn supports(status: StatusCode) -> bool {
    (400..=599).contains(&status.as_u16())
}

/// Classify the failure.
///
/// A JSON Status body becomes an API error preserving the server's
/// message and code for programmatic handling; anything else becomes a
/// transport error carrying the status line's reason phrase.
pub async fn handle(response: Response) -> Result<ApiOutput> {
    let status = response.status();
    let reason = status
        .canonical_reason()
        .unwrap_or("unknown status")
        .to_string();
    let body = response.text().await.unwrap_or_default();

    match serde_json::from_str::<Status>(&body) {
        Ok(api_status) if api_status.message.is_some() || api_status.code.is_some() => {
            Err(KubewireError::Api(api_status))
        }
        _ => Err(KubewireError::Transport {
            status: status.as_u16(),
            reason,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supports_error_range_only() {
        assert!(supports(StatusCode::BAD_REQUEST));
        assert!(supports(StatusCode::INTERNAL_SERVER_ERROR));
        assert!(supports(StatusCode::NOT_IMPLEMENTED));
        assert!(!supports(StatusCode::OK));
        assert!(!supports(StatusCode::NO_CONTENT));
        assert!(!supports(StatusCode::FOUND));
    }
}
