//! Shared HTTP plumbing: client construction and error classification.

use std::time::Duration;

use autoquizzer_core::error::ProviderError;

/// Retry hint used when a 429 carries no usable `retry-after`.
const DEFAULT_RETRY_AFTER_SECS: u64 = 5;

pub(crate) fn client(timeout_secs: u64, user_agent: Option<&str>) -> reqwest::Client {
    let mut builder = reqwest::Client::builder().timeout(Duration::from_secs(timeout_secs));
    if let Some(agent) = user_agent {
        builder = builder.user_agent(agent);
    }
    builder.build().unwrap_or_else(|_| reqwest::Client::new())
}

/// Map a transport failure onto [`ProviderError`].
pub(crate) fn transport_error(err: reqwest::Error, timeout_secs: u64) -> ProviderError {
    if err.is_timeout() {
        ProviderError::Timeout(timeout_secs)
    } else {
        ProviderError::NetworkError(err.to_string())
    }
}

/// Pass successful responses through; classify the rest.
///
/// `model` names the resource a 404 refers to. Without one a 404 is a plain
/// API error.
pub(crate) async fn check_status(
    response: reqwest::Response,
    model: Option<&str>,
) -> Result<reqwest::Response, ProviderError> {
    let status = response.status().as_u16();
    if status < 400 {
        return Ok(response);
    }

    let error = match (status, model) {
        (429, _) => {
            let secs = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok())
                .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
            ProviderError::RateLimited {
                retry_after_ms: secs * 1000,
            }
        }
        (401 | 403, _) => {
            ProviderError::AuthenticationFailed(response.text().await.unwrap_or_default())
        }
        (404, Some(model)) => ProviderError::ModelNotFound(model.to_string()),
        _ => ProviderError::ApiError {
            status,
            message: response.text().await.unwrap_or_default(),
        },
    };
    tracing::debug!(status, %error, "request rejected");
    Err(error)
}

/// A 2xx body that did not match the expected schema.
pub(crate) fn decode_error(err: reqwest::Error) -> ProviderError {
    ProviderError::ApiError {
        status: 0,
        message: format!("unexpected response body: {err}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// The server is returned so it outlives the response body.
    async fn respond_with(template: ResponseTemplate) -> (MockServer, reqwest::Response) {
        let server = MockServer::start().await;
        Mock::given(wiremock::matchers::any())
            .respond_with(template)
            .mount(&server)
            .await;
        let response = client(5, None).get(server.uri()).send().await.unwrap();
        (server, response)
    }

    #[tokio::test]
    async fn not_found_names_the_model() {
        let (_server, response) = respond_with(ResponseTemplate::new(404)).await;
        let err = check_status(response, Some("llama3-8b-8192"))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::ModelNotFound(m) if m == "llama3-8b-8192"));

        let (_server, response) = respond_with(ResponseTemplate::new(404)).await;
        let err = check_status(response, None).await.unwrap_err();
        assert!(matches!(err, ProviderError::ApiError { status: 404, .. }));
    }

    #[tokio::test]
    async fn rate_limit_without_hint_uses_default() {
        let (_server, response) = respond_with(ResponseTemplate::new(429)).await;
        let err = check_status(response, None).await.unwrap_err();
        assert!(matches!(
            err,
            ProviderError::RateLimited { retry_after_ms: 5000 }
        ));
    }

    #[tokio::test]
    async fn success_passes_through() {
        let (_server, response) =
            respond_with(ResponseTemplate::new(200).set_body_string("ok")).await;
        let response = check_status(response, None).await.unwrap();
        assert_eq!(response.text().await.unwrap(), "ok");
    }
}
