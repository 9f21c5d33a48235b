use draftschema_core::ProxyError;
use draftschema_logging::redact_sensitive_data;
use reqwest::{Response, StatusCode};
use tracing::warn;

/// Read an upstream response into its status code and body text.
pub(crate) async fn read_body(
    provider: &str,
    response: Response,
) -> Result<(StatusCode, String), ProxyError> {
    let status = response.status();
    let body = response.text().await.map_err(|e| transport(provider, e))?;
    Ok((status, body))
}

pub(crate) fn transport(provider: &str, err: reqwest::Error) -> ProxyError {
    let message = redact_sensitive_data(&err.to_string());
    warn!(provider = %provider, error = %message, "Provider request failed");
    ProxyError::Transport {
        provider: provider.to_string(),
        message,
    }
}

/// Build the error for a non-success upstream status.
///
/// `mirror` decides whether the proxy answers with the upstream code or a
/// plain 500.
pub(crate) fn upstream_failure(
    provider: &str,
    status: StatusCode,
    body: &str,
    mirror: bool,
) -> ProxyError {
    warn!(
        provider = %provider,
        status = status.as_u16(),
        body = %redact_sensitive_data(body),
        "Provider returned an error status"
    );
    ProxyError::Upstream {
        provider: provider.to_string(),
        upstream_status: status.as_u16(),
        status: if mirror { status.as_u16() } else { 500 },
        message: status.canonical_reason().unwrap_or("error").to_string(),
        raw: draftschema_core::error::raw_payload(body),
    }
}
