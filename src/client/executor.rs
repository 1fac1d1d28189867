//! Request executor with auth header injection and error mapping.

use crate::auth::AuthProvider;
use crate::config::DriveTransferConfig;
use crate::errors::{
    AuthenticationError, AuthorizationError, DriveTransferError, DriveTransferResult,
    QuotaError, RequestError, ResourceError, ResponseError, ServerError,
};
use crate::transport::{HttpMethod, HttpRequest, HttpResponse, HttpTransport, RequestBody};
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use reqwest::StatusCode;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Executes API requests: builds URLs, injects the bearer token, sends the
/// request through the transport, and maps error responses to domain errors.
pub struct RequestExecutor {
    config: DriveTransferConfig,
    transport: Arc<dyn HttpTransport>,
    auth: Arc<dyn AuthProvider>,
}

impl RequestExecutor {
    /// Creates a new request executor.
    pub fn new(
        config: DriveTransferConfig,
        transport: Arc<dyn HttpTransport>,
        auth: Arc<dyn AuthProvider>,
    ) -> Self {
        Self {
            config,
            transport,
            auth,
        }
    }

    /// Executes a request and deserializes the JSON response.
    pub async fn execute<T: DeserializeOwned>(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<RequestBody>,
    ) -> DriveTransferResult<T> {
        let url = self.build_url(path, None)?;
        let response = self.send(method, url, body).await?;

        serde_json::from_slice(&response).map_err(|e| {
            DriveTransferError::Response(ResponseError::DeserializationError(format!(
                "Failed to deserialize response: {}",
                e
            )))
        })
    }

    /// Executes a request with query parameters and deserializes the response.
    pub async fn execute_with_params<T: DeserializeOwned, P: Serialize>(
        &self,
        method: HttpMethod,
        path: &str,
        params: &P,
        body: Option<RequestBody>,
    ) -> DriveTransferResult<T> {
        let query = serde_urlencoded::to_string(params).map_err(|e| {
            DriveTransferError::Request(RequestError::InvalidParameter(format!(
                "Failed to encode query parameters: {}",
                e
            )))
        })?;

        let url = self.build_url(path, Some(&query))?;
        let response = self.send(method, url, body).await?;

        serde_json::from_slice(&response).map_err(|e| {
            DriveTransferError::Response(ResponseError::DeserializationError(format!(
                "Failed to deserialize response: {}",
                e
            )))
        })
    }

    /// Serializes a request body as JSON bytes.
    pub fn json_body<B: Serialize>(body: &B) -> DriveTransferResult<RequestBody> {
        let bytes = serde_json::to_vec(body).map_err(|e| {
            DriveTransferError::Request(RequestError::ValidationError(format!(
                "Failed to serialize request: {}",
                e
            )))
        })?;
        Ok(RequestBody::Bytes(Bytes::from(bytes)))
    }

    /// Builds a full URL from an API path and an optional encoded query.
    pub fn build_url(&self, path: &str, query: Option<&str>) -> DriveTransferResult<Url> {
        let base = self.config.base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');

        let mut url = format!("{}/{}", base, path);
        if let Some(query) = query {
            if !query.is_empty() {
                url.push('?');
                url.push_str(query);
            }
        }

        Url::parse(&url).map_err(|e| {
            DriveTransferError::Request(RequestError::InvalidParameter(format!(
                "Invalid URL: {}",
                e
            )))
        })
    }

    async fn send(
        &self,
        method: HttpMethod,
        url: Url,
        body: Option<RequestBody>,
    ) -> DriveTransferResult<Bytes> {
        let token = self
            .auth
            .get_access_token()
            .await
            .map_err(DriveTransferError::Authentication)?;

        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&token.authorization_header()).map_err(|e| {
                DriveTransferError::Request(RequestError::ValidationError(format!(
                    "Invalid auth header: {}",
                    e
                )))
            })?,
        );
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&self.config.user_agent).map_err(|e| {
                DriveTransferError::Request(RequestError::ValidationError(format!(
                    "Invalid user agent: {}",
                    e
                )))
            })?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        debug!(%method, path = url.path(), "sending drive request");

        let request = HttpRequest {
            method,
            url,
            headers,
            body,
            timeout: Some(self.config.timeout),
        };

        let response = self
            .transport
            .send(request)
            .await
            .map_err(DriveTransferError::from)?;

        if !response.status.is_success() {
            let error = self.map_error_response(response);
            warn!(%method, error = %error, "drive request failed");
            return Err(error);
        }

        Ok(response.body)
    }

    /// Maps an error response to a domain error using the status code and the
    /// structured reason the API attaches to the first error item.
    fn map_error_response(&self, response: HttpResponse) -> DriveTransferError {
        #[derive(serde::Deserialize)]
        struct ErrorResponse {
            error: ErrorDetail,
        }

        #[derive(serde::Deserialize)]
        struct ErrorDetail {
            message: String,
            errors: Option<Vec<ErrorItem>>,
        }

        #[derive(serde::Deserialize)]
        struct ErrorItem {
            reason: Option<String>,
        }

        let status = response.status;
        let detail: Option<ErrorResponse> = serde_json::from_slice(&response.body).ok();

        let (message, reason) = detail
            .map(|d| {
                let reason = d
                    .error
                    .errors
                    .as_ref()
                    .and_then(|errs| errs.first())
                    .and_then(|err| err.reason.clone());
                (d.error.message, reason)
            })
            .unwrap_or_else(|| {
                (
                    format!(
                        "HTTP {}: {}",
                        status.as_u16(),
                        String::from_utf8_lossy(&response.body)
                    ),
                    None,
                )
            });

        let retry_after = response
            .headers
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs);

        match status {
            StatusCode::BAD_REQUEST => match reason.as_deref() {
                Some("invalidParameter") => {
                    DriveTransferError::Request(RequestError::InvalidParameter(message))
                }
                _ => DriveTransferError::Request(RequestError::ValidationError(message)),
            },
            StatusCode::UNAUTHORIZED => {
                DriveTransferError::Authentication(AuthenticationError::InvalidToken(message))
            }
            StatusCode::FORBIDDEN => match reason.as_deref() {
                Some("userRateLimitExceeded") => {
                    DriveTransferError::Quota(QuotaError::UserRateLimitExceeded {
                        message,
                        retry_after,
                    })
                }
                Some("rateLimitExceeded") => {
                    DriveTransferError::Quota(QuotaError::ProjectRateLimitExceeded {
                        message,
                        retry_after,
                    })
                }
                Some("insufficientPermissions") | Some("forbidden") => {
                    DriveTransferError::Authorization(
                        AuthorizationError::InsufficientPermissions(message),
                    )
                }
                Some("domainPolicy") => {
                    DriveTransferError::Authorization(AuthorizationError::DomainPolicy(message))
                }
                _ => DriveTransferError::Authorization(AuthorizationError::Forbidden(message)),
            },
            StatusCode::NOT_FOUND => {
                DriveTransferError::Resource(ResourceError::FileNotFound(message))
            }
            StatusCode::TOO_MANY_REQUESTS => {
                DriveTransferError::Quota(QuotaError::UserRateLimitExceeded {
                    message,
                    retry_after,
                })
            }
            StatusCode::INTERNAL_SERVER_ERROR => {
                DriveTransferError::Server(ServerError::InternalError(message))
            }
            StatusCode::BAD_GATEWAY => {
                DriveTransferError::Server(ServerError::BadGateway(message))
            }
            StatusCode::SERVICE_UNAVAILABLE => {
                DriveTransferError::Server(ServerError::ServiceUnavailable {
                    message,
                    retry_after,
                })
            }
            _ => DriveTransferError::Server(ServerError::InternalError(format!(
                "HTTP {}: {}",
                status.as_u16(),
                message
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::StaticTokenProvider;
    use crate::transport::ReqwestTransport;

    fn executor() -> RequestExecutor {
        let config = DriveTransferConfig::builder()
            .auth_provider(StaticTokenProvider)
            .build()
            .unwrap();
        let transport = Arc::new(ReqwestTransport::default().unwrap());
        let auth = config.auth_provider.clone();
        RequestExecutor::new(config, transport, auth)
    }

    #[test]
    fn test_build_url() {
        let executor = executor();

        let url = executor.build_url("/files", None).unwrap();
        assert_eq!(url.as_str(), "https://www.googleapis.com/drive/v3/files");

        let url = executor.build_url("files/123", None).unwrap();
        assert_eq!(url.as_str(), "https://www.googleapis.com/drive/v3/files/123");

        let url = executor
            .build_url("/files/123/permissions", Some("pageSize=50"))
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://www.googleapis.com/drive/v3/files/123/permissions?pageSize=50"
        );
    }

    #[test]
    fn test_error_mapping_uses_reason() {
        let executor = executor();

        let body = serde_json::json!({
            "error": {
                "code": 403,
                "message": "Rate limit exceeded",
                "errors": [{"reason": "userRateLimitExceeded"}]
            }
        });
        let response = HttpResponse::new(
            StatusCode::FORBIDDEN,
            HeaderMap::new(),
            Bytes::from(serde_json::to_vec(&body).unwrap()),
        );

        let error = executor.map_error_response(response);
        assert!(matches!(
            error,
            DriveTransferError::Quota(QuotaError::UserRateLimitExceeded { .. })
        ));
    }

    #[test]
    fn test_error_mapping_not_found() {
        let executor = executor();

        let response = HttpResponse::new(
            StatusCode::NOT_FOUND,
            HeaderMap::new(),
            Bytes::from_static(b"{\"error\":{\"code\":404,\"message\":\"File not found\"}}"),
        );

        let error = executor.map_error_response(response);
        assert!(matches!(
            error,
            DriveTransferError::Resource(ResourceError::FileNotFound(_))
        ));
    }
}
