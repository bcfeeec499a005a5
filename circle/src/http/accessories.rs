//! Accessory API client

use reqwest::Response;
use tracing::{debug, warn};

use crate::authn::session::Session;
use crate::errors::{CircleError, Result};
use crate::http::client::{decode_json, ensure_success, HttpClient};
use crate::models::Accessory;

impl HttpClient {
    /// Get a single accessory by id
    ///
    /// Any non-2xx status is reported as [`CircleError::NotFound`].
    pub async fn get_accessory(&self, session: &Session, accessory_id: &str) -> Result<Accessory> {
        let url = self.api_url(&["accessories", accessory_id])?;
        let response = self.get(session, &url).await?;

        let status = response.status();
        if !status.is_success() {
            warn!("Accessory {} not available: {}", accessory_id, status);
            return Err(CircleError::NotFound {
                url: url.to_string(),
                status,
            });
        }

        decode_json(&url, response).await
    }

    /// List every accessory on the account
    pub async fn list_accessories(&self, session: &Session) -> Result<Vec<Accessory>> {
        let url = self.api_url(&["accessories"])?;
        let response = self.get(session, &url).await?;
        let response = ensure_success(&url, response).await?;

        let accessories: Vec<Accessory> = decode_json(&url, response).await?;
        debug!("Found {} accessories", accessories.len());
        Ok(accessories)
    }

    /// Request a fresh live image from the accessory's node
    ///
    /// The returned response streams the image bytes.
    pub async fn get_snapshot(&self, session: &Session, accessory: &Accessory) -> Result<Response> {
        if accessory.node_id.is_empty() {
            return Err(CircleError::MissingNodeId(accessory.accessory_id.clone()));
        }

        let mut url = self.node_url(
            &accessory.node_id,
            &["accessories", &accessory.accessory_id, "image"],
        )?;
        url.query_pairs_mut()
            .append_pair("refresh", "true")
            .append_pair("q", "1");

        let response = self.get(session, &url).await?;
        ensure_success(&url, response).await
    }
}
