use jiff::civil::DateTime;
use serde::Serialize;

/// One scraped release post.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Release {
    pub title: String,
    pub release_time: DateTime,
    /// Empty when the page has no usable image.
    pub poster: String,
    pub screenshots: Vec<String>,
    pub torrents: Vec<Torrent>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Torrent {
    pub file_name: String,
    pub torrent_link: String,
    pub magnet_link: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeedEntry {
    pub link: String,
    pub title: Option<String>,
}

/// Outcome counters for one pass over a feed snapshot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub entries: usize,
    pub skipped: usize,
    pub notified: usize,
    pub undelivered: usize,
    pub failed: usize,
    pub recorded: usize,
}
