//! Plain 2xx response handling

use reqwest::{Response, StatusCode};

use crate::errors::Result;
use crate::transport::options::{ApiOutput, SendOptions};

use super::content_type_is;

/// Claims any 2xx response not taken by a streaming handler.
pub fn supports(status: StatusCode) -> bool {
    status.is_success()
}

/// Deserialize into the requested model when one was asked for and the
/// body is JSON; otherwise hand back the raw body string (proxy and log
/// responses).
pub async fn handle(
    response: Response,
    content_type: Option<String>,
    options: &SendOptions,
) -> Result<ApiOutput> {
    if options.expect_model && content_type_is(content_type.as_deref(), "application/json") {
        Ok(ApiOutput::Model(response.json().await?))
    } else {
        Ok(ApiOutput::Raw(response.text().await?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supports_any_success() {
        assert!(supports(StatusCode::OK));
        assert!(supports(StatusCode::CREATED));
        assert!(supports(StatusCode::NO_CONTENT));
        assert!(!supports(StatusCode::BAD_GATEWAY));
        assert!(!supports(StatusCode::MOVED_PERMANENTLY));
    }
}
