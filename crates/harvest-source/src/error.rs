//! Mapping of transport failures onto domain errors

use harvest_core::DomainError;
use reqwest::StatusCode;

/// Convert a transport-level failure
pub(crate) fn map_transport_error(e: reqwest::Error) -> DomainError {
    if e.is_timeout() || e.is_connect() {
        DomainError::SourceUnavailable(e.to_string())
    } else if e.is_decode() {
        DomainError::SourceError(format!("malformed bridge response: {e}"))
    } else {
        DomainError::SourceError(e.to_string())
    }
}

/// Convert a non-success status for anything but channel lookups
pub(crate) fn map_status(status: StatusCode, what: &str) -> DomainError {
    match status {
        StatusCode::SERVICE_UNAVAILABLE | StatusCode::BAD_GATEWAY | StatusCode::GATEWAY_TIMEOUT => {
            DomainError::SourceUnavailable(format!("{what}: {status}"))
        }
        _ => DomainError::SourceError(format!("{what}: {status}")),
    }
}
