//! Shared request plumbing.

use fibu_core::{GatewayError, GatewayResult};
use reqwest::{ClientBuilder, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

pub(crate) fn build_client(service: &'static str, timeout: Duration) -> GatewayResult<reqwest::Client> {
    ClientBuilder::new()
        .timeout(timeout)
        .build()
        .map_err(|e| GatewayError::unavailable(service, e.to_string()))
}

/// Joins `path` onto `base` and appends `params` as a query string.
pub(crate) fn endpoint(
    service: &'static str,
    base: &str,
    path: &str,
    params: &[(&str, &str)],
) -> GatewayResult<Url> {
    let raw = format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'));
    let url = if params.is_empty() {
        Url::parse(&raw)
    } else {
        Url::parse_with_params(&raw, params)
    };
    url.map_err(|e| GatewayError::unavailable(service, format!("bad url {raw}: {e}")))
}

/// Sends `request` and returns the raw response, mapping failures.
///
/// 404 becomes [`GatewayError::NotFound`] for `what`; any other non-success
/// status or transport error is [`GatewayError::Unavailable`].
pub(crate) async fn send(
    service: &'static str,
    what: &str,
    request: RequestBuilder,
) -> GatewayResult<reqwest::Response> {
    let resp = request
        .send()
        .await
        .map_err(|e| GatewayError::unavailable(service, e.to_string()))?;
    let status = resp.status();
    if status == StatusCode::NOT_FOUND {
        return Err(GatewayError::not_found(what));
    }
    if !status.is_success() {
        let text = resp.text().await.unwrap_or_default();
        return Err(GatewayError::unavailable(
            service,
            format!("HTTP {} error: {}", status.as_u16(), text),
        ));
    }
    debug!(service, what, status = status.as_u16(), "Gateway request succeeded");
    Ok(resp)
}

/// Like [`send`], then decodes the body as JSON.
pub(crate) async fn get_json<T: DeserializeOwned>(
    service: &'static str,
    what: &str,
    request: RequestBuilder,
) -> GatewayResult<T> {
    send(service, what, request)
        .await?
        .json()
        .await
        .map_err(|e| GatewayError::unavailable(service, format!("undecodable {what}: {e}")))
}
