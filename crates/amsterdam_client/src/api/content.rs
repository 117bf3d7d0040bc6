//! Static content endpoints. No authentication required.

use crate::api::client::AmsterdamClient;
use crate::api::models::{HistoryContent, WaterContent};
use crate::error::Result;

impl AmsterdamClient {
    /// GET /content/history
    pub async fn history_content(&self) -> Result<HistoryContent> {
        self.get_json("/content/history").await
    }

    /// GET /content/water
    pub async fn water_content(&self) -> Result<WaterContent> {
        self.get_json("/content/water").await
    }
}
