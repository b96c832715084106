//! HTTP plumbing shared by the REST providers

use crate::error::PulseError;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

const CLIENT_USER_AGENT: &str = concat!("ci-pulse/", env!("CARGO_PKG_VERSION"));

/// Validate a base URL and strip any trailing slash
pub(crate) fn normalize_base_url(raw: &str) -> Result<String, PulseError> {
    let parsed = Url::parse(raw.trim()).map_err(|e| PulseError::ClientInit {
        message: format!("Invalid base URL '{raw}'"),
        source: Some(Box::new(e)),
    })?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(PulseError::client_init(format!(
            "Base URL '{raw}' must use http or https"
        )));
    }

    Ok(parsed.as_str().trim_end_matches('/').to_string())
}

/// Build a client that sends `auth_header: token` on every request
pub(crate) fn build_client(
    auth_header: HeaderName,
    auth_value: &str,
    accept: &'static str,
    timeout: Option<Duration>,
) -> Result<reqwest::Client, PulseError> {
    let mut auth = HeaderValue::from_str(auth_value).map_err(|e| PulseError::ClientInit {
        message: "Access token contains characters not allowed in an HTTP header".to_string(),
        source: Some(Box::new(e)),
    })?;
    auth.set_sensitive(true);

    let mut headers = HeaderMap::new();
    headers.insert(auth_header, auth);
    headers.insert(ACCEPT, HeaderValue::from_static(accept));
    headers.insert(USER_AGENT, HeaderValue::from_static(CLIENT_USER_AGENT));

    let mut builder = reqwest::Client::builder().default_headers(headers);
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }

    builder.build().map_err(|e| PulseError::ClientInit {
        message: "Failed to build HTTP client".to_string(),
        source: Some(Box::new(e)),
    })
}

/// Send a request and decode a JSON body, returning the response headers too
///
/// 401 and 403 become `PulseError::Auth`; every other failure is `Transport`.
pub(crate) async fn get_json<T: DeserializeOwned>(
    request: RequestBuilder,
    what: &str,
) -> Result<(T, HeaderMap), PulseError> {
    let response = request
        .send()
        .await
        .map_err(|e| PulseError::transport(format!("{what}: request failed"), e))?;

    let status = response.status();
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(PulseError::Auth {
            message: format!("{what}: {status}"),
        });
    }

    let response = response
        .error_for_status()
        .map_err(|e| PulseError::transport(format!("{what}: {status}"), e))?;

    let headers = response.headers().clone();
    let body = response
        .json::<T>()
        .await
        .map_err(|e| PulseError::transport(format!("{what}: invalid response body"), e))?;

    Ok((body, headers))
}

/// Header value as a string, if present and valid UTF-8
pub(crate) fn header_str<'h>(headers: &'h HeaderMap, name: &str) -> Option<&'h str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}
