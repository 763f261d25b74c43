//! MirrorB backend
//!
//! Second independent mirror service, a plain GET resolve endpoint with its
//! own payload dialect. Lowest metadata fidelity of the three variants
//! (version `v3`); public content only, no cookie ever attached.

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::backends::{BackendVariant, VideoBackend};
use crate::core::errors::BackendFailure;
use crate::core::models::{ContentRef, GatewayConfig, Session};
use crate::utils::network;

const RESOLVE_ENDPOINT: &str = "https://api.tiklydown.eu.org/api/download";

pub struct MirrorBBackend {
    config: GatewayConfig,
}

impl MirrorBBackend {
    pub fn new(config: GatewayConfig) -> Self {
        Self { config }
    }

    fn target_url(content: &ContentRef) -> String {
        content
            .source_url
            .clone()
            .unwrap_or_else(|| format!("https://www.tiktok.com/@_/video/{}", content.id))
    }
}

#[async_trait]
impl VideoBackend for MirrorBBackend {
    fn variant(&self) -> BackendVariant {
        BackendVariant::MirrorB
    }

    async fn fetch_video(
        &self,
        content: &ContentRef,
        session: &Session,
    ) -> Result<Value, BackendFailure> {
        let client = network::client_for(session, self.config.timeout(), &self.config.user_agent)?;
        let target = Self::target_url(content);

        debug!(id = %content.id, "mirror_b backend request");

        let response = client
            .get(RESOLVE_ENDPOINT)
            .query(&[("url", target.as_str())])
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
