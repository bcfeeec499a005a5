//! Activity API client

use circle_api::models::{ActivitiesPageRequest, ActivitiesPageResponse, ActivityRecord};
use reqwest::Response;
use tracing::debug;

use crate::authn::session::Session;
use crate::errors::Result;
use crate::http::client::{decode_json, ensure_success, HttpClient};
use crate::models::Activity;

impl HttpClient {
    /// Fetch one page of up to `limit` activities with id at or after `cursor`
    pub async fn get_activities_page(
        &self,
        session: &Session,
        accessory_id: &str,
        cursor: &str,
        limit: u32,
    ) -> Result<Vec<ActivityRecord>> {
        let url = self.api_url(&["accessories", accessory_id, "activities"])?;
        let request = ActivitiesPageRequest::at_or_after(cursor, limit);

        let response = self.post(session, &url, &request).await?;
        let response = ensure_success(&url, response).await?;
        let page: ActivitiesPageResponse = decode_json(&url, response).await?;

        debug!(
            "Page at {} for {}: {} activities",
            cursor,
            accessory_id,
            page.activities.len()
        );
        Ok(page.activities)
    }

    /// Request the activity's video
    ///
    /// The returned response streams the MP4 bytes.
    pub async fn download_activity_mp4(
        &self,
        session: &Session,
        activity: &Activity,
    ) -> Result<Response> {
        let url = self.api_url(&[
            "accessories",
            &activity.accessory_id,
            "activities",
            &activity.activity_id,
            "mp4",
        ])?;

        let response = self.get(session, &url).await?;
        ensure_success(&url, response).await
    }
}
