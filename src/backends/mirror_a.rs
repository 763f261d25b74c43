//! MirrorA backend
//!
//! Independent JSON mirror service resolving a public post URL through a
//! single form-POST endpoint. Lower metadata fidelity than Primary; callers
//! pick it (version `v2`) when the official surface is blocked or rate
//! limited. Serves public content only, so no cookie is ever attached.

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::backends::{BackendVariant, VideoBackend};
use crate::core::errors::BackendFailure;
use crate::core::models::{ContentRef, GatewayConfig, Session};
use crate::utils::network;

const RESOLVE_ENDPOINT: &str = "https://www.tikwm.com/api/";

pub struct MirrorABackend {
    config: GatewayConfig,
}

impl MirrorABackend {
    pub fn new(config: GatewayConfig) -> Self {
        Self { config }
    }

    /// The mirror resolves share links, so a bare ID is re-expanded into a
    /// canonical post URL first.
    fn target_url(content: &ContentRef) -> String {
        content
            .source_url
            .clone()
            .unwrap_or_else(|| format!("https://www.tiktok.com/@_/video/{}", content.id))
    }
}

#[async_trait]
impl VideoBackend for MirrorABackend {
    fn variant(&self) -> BackendVariant {
        BackendVariant::MirrorA
    }

    async fn fetch_video(
        &self,
        content: &ContentRef,
        session: &Session,
    ) -> Result<Value, BackendFailure> {
        let client = network::client_for(session, self.config.timeout(), &self.config.user_agent)?;
        let target = Self::target_url(content);

        debug!(id = %content.id, "mirror_a backend request");

        let response = client
            .post(RESOLVE_ENDPOINT)
            .form(&[("url", target.as_str()), ("hd", "1")])
            .send()
            .await
            .map_err(BackendFailure::from)?;

        let status = response.status();
        if !status.is_success() {
            return Err(BackendFailure::Status {
                status: status.as_u16(),
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| BackendFailure::Decode(e.to_string()))
    }
}
