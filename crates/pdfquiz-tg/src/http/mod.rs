mod basic_ext;
mod json_ext;

use crate::prelude::*;
use async_trait::async_trait;
use metrics::histogram;
use reqwest_middleware::RequestBuilder;
use reqwest_retry::policies::ExponentialBackoff;
use reqwest_retry::RetryTransientMiddleware;
use std::time::{Duration, Instant};
use task_local_extensions::Extensions;

pub(crate) mod prelude {
    pub(crate) use super::basic_ext::RequestBuilderBasicExt as _;
    pub(crate) use super::json_ext::RequestBuilderJsonExt as _;
}

pub(crate) type Client = reqwest_middleware::ClientWithMiddleware;

const REQUEST_DURATION: &str = "http_request_duration_seconds";
const REQUEST_EFFECTIVE_DURATION: &str = "http_request_effective_duration_seconds";

/// A single retry on transient failures (connection errors, 5xx, 429)
pub(crate) fn default_retry_policy() -> ExponentialBackoff {
    ExponentialBackoff::builder()
        .retry_bounds(Duration::from_millis(500), Duration::from_secs(2))
        .build_with_max_retries(1)
}

/// Creates an HTTP client where every request times out after the given duration
pub(crate) fn create_client(timeout: Duration) -> Client {
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|err| panic!("BUG: failed to build the HTTP client: {err:#?}"));

    reqwest_middleware::ClientBuilder::new(client)
        .with(OutermostObservingMiddleware)
        .with(RetryTransientMiddleware::new_with_policy(
            default_retry_policy(),
        ))
        .with(InnermostObservingMiddleware)
        .with_init(|request_builder: RequestBuilder| {
            request_builder.header(
                reqwest::header::USER_AGENT,
                concat!("PdfQuizTelegramBot/", env!("CARGO_PKG_VERSION")),
            )
        })
        .build()
}

struct OutermostObservingMiddleware;

#[async_trait]
impl reqwest_middleware::Middleware for OutermostObservingMiddleware {
    async fn handle(
        &self,
        request: reqwest::Request,
        extensions: &mut Extensions,
        next: reqwest_middleware::Next<'_>,
    ) -> reqwest_middleware::Result<reqwest::Response> {
        // The query may contain secrets, so only the path is logged
        let span = info_span!(
            "request",
            version = ?request.version(),
            method = %request.method(),
            host = request.url().host_str(),
            path = request.url().path(),
        );
        measure_request(REQUEST_EFFECTIVE_DURATION, request, extensions, next)
            .instrument(span)
            .await
    }
}

struct InnermostObservingMiddleware;

#[async_trait]
impl reqwest_middleware::Middleware for InnermostObservingMiddleware {
    async fn handle(
        &self,
        request: reqwest::Request,
        extensions: &mut Extensions,
        next: reqwest_middleware::Next<'_>,
    ) -> reqwest_middleware::Result<reqwest::Response> {
        let (result, duration) = measure_request(REQUEST_DURATION, request, extensions, next)
            .with_duration()
            .await;

        let duration = tracing_duration(duration);

        let response = match &result {
            Ok(response) => response,
            Err(err) => {
                error!(duration, err = tracing_err(err), "Network request failed");
                return result;
            }
        };

        let status = response.status();

        let Err(err) = response.error_for_status_ref() else {
            info!(duration, %status, "Network request succeeded");
            return result;
        };

        warn!(
            err = tracing_err(&err),
            duration,
            %status,
            "Network request failed (error status)"
        );

        result
    }
}

async fn measure_request(
    histogram_name: &'static str,
    request: reqwest::Request,
    extensions: &mut Extensions,
    next: reqwest_middleware::Next<'_>,
) -> reqwest_middleware::Result<reqwest::Response> {
    let version = format!("{:?}", request.version());
    let method = request.method().to_string();
    let host = request.url().host_str().unwrap_or("{unknown}").to_owned();

    let start = Instant::now();
    let result = next.run(request, extensions).await;
    let elapsed = start.elapsed();

    let status = match &result {
        Ok(response) => response.status().as_u16().to_string(),
        Err(_) => "{fatal}".to_owned(),
    };

    histogram!(
        histogram_name,
        elapsed.as_secs_f64(),
        "version" => version,
        "method" => method,
        "host" => host,
        "status" => status,
    );

    result
}

/// Errors at the layer of the HTTP API
#[derive(Debug, thiserror::Error)]
pub(crate) enum HttpClientError {
    #[error("HTTP request failed")]
    Request { source: reqwest_middleware::Error },

    #[error("Failed to read HTTP response")]
    ReadPayload { source: reqwest_middleware::Error },

    #[error("HTTP request has failed (HTTP status code: {status}):\n{body}")]
    BadResponseStatusCode {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Received an unexpected response JSON object")]
    UnexpectedResponseJsonShape { source: serde_json::Error },
}
