//! Channel video report: fetch every upload from the search API, then
//! write a year-grouped markdown listing (and optionally a JSON data file).

pub mod client;
pub mod report;

use chrono::{DateTime, Datelike, FixedOffset};
use tracing::info;

use crate::config::VideoConfig;
use crate::error::Result;

pub use client::VideoClient;
pub use report::{YearGroup, group_by_year, render_json, render_markdown, sort_newest_first};

const EMBED_URL_PREFIX: &str = "https://www.youtube.com/embed/";

#[derive(Debug, Clone, PartialEq)]
pub struct Video {
    pub id: String,
    pub title: String,
    pub published: DateTime<FixedOffset>,
    pub url: String,
    pub year: i32,
}

impl Video {
    pub fn new(id: impl Into<String>, title: impl Into<String>, published: DateTime<FixedOffset>) -> Self {
        let id = id.into();
        Self {
            url: format!("{}{}", EMBED_URL_PREFIX, id),
            title: title.into(),
            year: published.year(),
            published,
            id,
        }
    }
}

/// Fetches, sorts, renders and writes the report. Returns the number of
/// videos written.
pub async fn run(config: &VideoConfig) -> Result<usize> {
    let client = VideoClient::new(config)?;
    info!("Fetching videos for channel {}", config.channel_id);

    let mut videos = client.fetch_all().await?;
    info!("Found {} videos", videos.len());

    sort_newest_first(&mut videos);
    let groups = group_by_year(videos);
    let count = groups.iter().map(|g| g.videos.len()).sum();

    let markdown = render_markdown(&groups, &config.title, &config.blurb);
    report::write_output(&config.output_path, &markdown).await?;
    info!(
        "Successfully wrote {} videos to {}",
        count,
        config.output_path.display()
    );

    if let Some(json_path) = &config.json_output_path {
        let json = render_json(&groups)?;
        report::write_output(json_path, &json).await?;
        info!("Wrote video data to {}", json_path.display());
    }

    Ok(count)
}
