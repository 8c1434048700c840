//! Sorting, grouping and rendering of the video report.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::Path;
use tokio::fs;

use super::Video;
use crate::error::Result;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Videos published in one year, newest first.
#[derive(Debug, Clone, PartialEq)]
pub struct YearGroup {
    pub year: i32,
    pub videos: Vec<Video>,
}

/// Newest first. Ties keep their fetched order.
pub fn sort_newest_first(videos: &mut [Video]) {
    videos.sort_by(|a, b| b.published.cmp(&a.published));
}

/// Groups by year, newest year first, keeping the order within each year.
pub fn group_by_year(videos: Vec<Video>) -> Vec<YearGroup> {
    let mut by_year: BTreeMap<i32, Vec<Video>> = BTreeMap::new();
    for video in videos {
        by_year.entry(video.year).or_default().push(video);
    }

    by_year
        .into_iter()
        .rev()
        .map(|(year, videos)| YearGroup { year, videos })
        .collect()
}

pub fn render_markdown(groups: &[YearGroup], title: &str, blurb: &str) -> String {
    let mut out = String::new();
    // Writing to a String cannot fail.
    let _ = write!(out, "# {}\n\n{}\n\n", title, blurb);

    for group in groups {
        let _ = write!(out, "## {}\n\n", group.year);
        for video in &group.videos {
            let _ = writeln!(out, "### {}", video.title);
            let _ = writeln!(out, "- **Video ID**: {}", video.id);
            let _ = writeln!(
                out,
                "- **Published**: {}",
                video.published.format(DATE_FORMAT)
            );
            let _ = write!(out, "- **URL**: {}\n\n", video.url);
        }
    }

    out
}

#[derive(Serialize)]
struct JsonReport<'a> {
    years: Vec<JsonYear<'a>>,
}

#[derive(Serialize)]
struct JsonYear<'a> {
    year: i32,
    videos: Vec<JsonVideo<'a>>,
}

#[derive(Serialize)]
struct JsonVideo<'a> {
    title: &'a str,
    id: &'a str,
    published: String,
    url: &'a str,
}

/// Same grouping as the markdown, as a data file for the site generator.
pub fn render_json(groups: &[YearGroup]) -> Result<String> {
    let report = JsonReport {
        years: groups
            .iter()
            .map(|group| JsonYear {
                year: group.year,
                videos: group
                    .videos
                    .iter()
                    .map(|video| JsonVideo {
                        title: &video.title,
                        id: &video.id,
                        published: video.published.format(DATE_FORMAT).to_string(),
                        url: &video.url,
                    })
                    .collect(),
            })
            .collect(),
    };

    Ok(serde_json::to_string_pretty(&report)?)
}

/// Writes `content` to `path`, creating parent directories.
pub async fn write_output(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
    }
    fs::write(path, content).await?;
    Ok(())
}
