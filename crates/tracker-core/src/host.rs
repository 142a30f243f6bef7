//! Tracker host normalization.

/// Path of the tracker's event-ingestion endpoint.
pub const EVENT_API_PATH: &str = "/api/v1alpha1/event";

/// Return `host` unchanged if it starts with `http://` or `https://`,
/// otherwise prefix it with `http://`.
pub fn ensure_http_scheme(host: &str) -> String {
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("http://{host}")
    }
}

/// Full event endpoint URL for a host, normalizing the scheme first.
pub fn event_endpoint(host: &str) -> String {
    let host = ensure_http_scheme(host);
    format!("{}{}", host.trim_end_matches('/'), EVENT_API_PATH)
}
