//! Per-call HTTP client construction

use std::time::Duration;

use reqwest::{Client, Proxy};

use crate::core::errors::BackendFailure;
use crate::core::models::Session;

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Build a client bound to a single call.
///
/// Proxy configuration comes from the per-call [`Session`] and must never be
/// cached or reused across calls with different sessions, so no client is
/// ever kept. Accepts `host:port` or full-URL proxy forms (http/https/socks).
pub fn client_for(
    session: &Session,
    timeout: Duration,
    user_agent: &str,
) -> Result<Client, BackendFailure> {
    let mut builder = Client::builder().timeout(timeout).user_agent(user_agent);

    if let Some(proxy) = session
        .proxy
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
    {
        let spec = if proxy.contains("://") {
            proxy.to_string()
        } else {
            format!("http://{}", proxy)
        };
        let proxy = Proxy::all(&spec)
            .map_err(|e| BackendFailure::Transport(format!("invalid proxy configuration: {}", e)))?;
        builder = builder.proxy(proxy);
    }

    builder.build().map_err(BackendFailure::from)
}
