//! HTTP client for the video search API.

use chrono::DateTime;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use tracing::{debug, warn};

use super::Video;
use crate::config::VideoConfig;
use crate::error::{RelayError, Result};

const PAGE_SIZE: &str = "50";

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
    #[serde(default)]
    next_page_token: Option<String>,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    #[serde(default)]
    id: ItemId,
    #[serde(default)]
    snippet: Snippet,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ItemId {
    video_id: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct Snippet {
    #[serde(default)]
    title: String,
    #[serde(default)]
    published_at: String,
}

impl SearchItem {
    fn into_video(self) -> Option<Video> {
        let id = self.id.video_id.filter(|id| !id.is_empty())?;
        match DateTime::parse_from_rfc3339(&self.snippet.published_at) {
            Ok(published) => Some(Video::new(id, self.snippet.title, published)),
            Err(e) => {
                warn!(
                    "Failed to parse date {} for video {}: {}",
                    self.snippet.published_at, id, e
                );
                None
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct VideoClient {
    client: Client,
    search_url: String,
    api_key: String,
    channel_id: String,
}

impl VideoClient {
    pub fn new(config: &VideoConfig) -> Result<Self> {
        let client = Client::builder().build().map_err(RelayError::Transport)?;

        Ok(Self {
            client,
            search_url: format!("{}/search", config.api_base),
            api_key: config.api_key.clone(),
            channel_id: config.channel_id.clone(),
        })
    }

    fn page_url(&self, page_token: Option<&str>) -> Result<Url> {
        let mut url = Url::parse(&self.search_url).map_err(|e| {
            RelayError::Config(format!("Invalid search URL '{}': {}", self.search_url, e))
        })?;
        url.query_pairs_mut()
            .append_pair("key", &self.api_key)
            .append_pair("channelId", &self.channel_id)
            .append_pair("part", "snippet")
            .append_pair("type", "video")
            .append_pair("maxResults", PAGE_SIZE)
            .append_pair("order", "date");
        if let Some(token) = page_token {
            url.query_pairs_mut().append_pair("pageToken", token);
        }
        Ok(url)
    }

    async fn fetch_page(&self, page_token: Option<&str>) -> Result<SearchResponse> {
        let url = self.page_url(page_token)?;
        debug!("Fetching search page (token {:?})", page_token);

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(RelayError::VideoApi {
                status: status.as_u16(),
                body,
            });
        }

        let page: SearchResponse = response.json().await?;
        if let Some(error) = page.error {
            return Err(RelayError::VideoApi {
                status: status.as_u16(),
                body: error.to_string(),
            });
        }
        Ok(page)
    }

    /// Follows `nextPageToken` until the API stops returning one, or hands
    /// back the token of the page it just served.
    pub async fn fetch_all(&self) -> Result<Vec<Video>> {
        let mut videos = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let page = self.fetch_page(page_token.as_deref()).await?;
            videos.extend(page.items.into_iter().filter_map(SearchItem::into_video));

            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(token) if page_token.as_deref() == Some(token.as_str()) => {
                    warn!("Search API repeated page token {}, stopping", token);
                    break;
                }
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        Ok(videos)
    }
}
