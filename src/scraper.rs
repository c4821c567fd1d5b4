use std::sync::LazyLock;

use async_trait::async_trait;
use jiff::civil::DateTime;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;
use wreq::header::USER_AGENT;

use crate::{
    error::{AppResult, ExtractionError},
    models::{Release, Torrent},
};

const RELEASE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";
const IMAGE_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

static TITLE: LazyLock<Selector> = LazyLock::new(|| css("h3"));
static TIME: LazyLock<Selector> = LazyLock::new(|| css("time"));
static IMAGE: LazyLock<Selector> = LazyLock::new(|| css("img.ipsImage"));
static MAGNET: LazyLock<Selector> = LazyLock::new(|| css("a.skyblue-button"));
static TORRENT: LazyLock<Selector> = LazyLock::new(|| css("a[data-fileext='torrent']"));
static FILE_NAME: LazyLock<Selector> = LazyLock::new(|| css(r#"span[style="color:#0000ff;"]"#));

fn css(selector: &'static str) -> Selector {
    Selector::parse(selector).expect("static selector is valid css")
}

/// Source of raw release pages.
#[async_trait]
pub trait PageSource {
    async fn fetch(&self, link: &str) -> AppResult<String>;
}

pub struct HttpPages {
    client: wreq::Client,
    user_agent: String,
}

impl HttpPages {
    pub fn new(client: wreq::Client, user_agent: String) -> Self {
        Self { client, user_agent }
    }
}

#[async_trait]
impl PageSource for HttpPages {
    async fn fetch(&self, link: &str) -> AppResult<String> {
        debug!(link = %link, "fetching release page");
        let html = self
            .client
            .get(link)
            .header(USER_AGENT, &self.user_agent)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(html)
    }
}

/// Raw per-category values found on a page, before correlation.
///
/// Every list is in document order. Nothing here is validated beyond
/// attribute presence, so a layout change on the site shows up as a
/// shorter (or empty) list rather than an error.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Candidates {
    pub title: Option<String>,
    pub datetime: Option<String>,
    pub images: Vec<String>,
    pub magnet_links: Vec<String>,
    pub torrent_links: Vec<String>,
    pub file_names: Vec<String>,
}

pub fn extract_candidates(html: &str) -> Candidates {
    let doc = Html::parse_document(html);

    let title = doc.select(&TITLE).next().map(text_of).filter(|t| !t.is_empty());
    let datetime =
        doc.select(&TIME).next().and_then(|el| el.value().attr("datetime")).map(str::to_string);

    Candidates {
        title,
        datetime,
        images: attrs(&doc, &IMAGE, "src"),
        magnet_links: attrs(&doc, &MAGNET, "href"),
        torrent_links: attrs(&doc, &TORRENT, "href"),
        file_names: doc.select(&FILE_NAME).map(text_of).collect(),
    }
}

/// Builds a [`Release`] from a release page.
///
/// Title and timestamp are required. Images, magnets, torrent links and
/// file names degrade to empty lists. Torrents are zipped positionally and
/// truncated to the shortest of the three lists.
pub fn extract(html: &str) -> Result<Release, ExtractionError> {
    let candidates = extract_candidates(html);

    let title = candidates.title.ok_or(ExtractionError::MissingTitle)?;
    let raw_time = candidates.datetime.unwrap_or_default();
    let release_time = parse_release_time(&raw_time)?;

    let mut pictures = candidates.images.into_iter().filter(|src| is_picture(src));
    let poster = pictures.next().unwrap_or_default();
    let screenshots: Vec<String> = pictures.collect();

    let torrents: Vec<Torrent> = candidates
        .file_names
        .into_iter()
        .zip(candidates.torrent_links)
        .zip(candidates.magnet_links)
        .map(|((file_name, torrent_link), magnet_link)| Torrent {
            file_name,
            torrent_link,
            magnet_link,
        })
        .collect();

    debug!(
        title = %title,
        screenshots = screenshots.len(),
        torrents = torrents.len(),
        "extracted release"
    );

    Ok(Release { title, release_time, poster, screenshots, torrents })
}

pub fn parse_release_time(raw: &str) -> Result<DateTime, ExtractionError> {
    DateTime::strptime(RELEASE_TIME_FORMAT, raw)
        .map_err(|_| ExtractionError::MissingOrInvalidTimestamp(raw.to_string()))
}

fn attrs(doc: &Html, selector: &Selector, name: &str) -> Vec<String> {
    doc.select(selector).filter_map(|el| el.value().attr(name)).map(str::to_string).collect()
}

fn text_of(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

fn is_picture(url: &str) -> bool {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let Some((_, ext)) = path.rsplit_once('.') else {
        return false;
    };
    IMAGE_EXTENSIONS.iter().any(|allowed| ext.eq_ignore_ascii_case(allowed))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(body: &str) -> String {
        format!(
            r#"<html><body>
            <h3> Leo (2023) Tamil HQ HDRip </h3>
            <time datetime="2024-03-01T10:00:00Z">1 March</time>
            {body}
            </body></html>"#
        )
    }

    #[test]
    fn test_extract_full_page() {
        let html = page(
            r#"
            <img class="ipsImage" src="https://img.example/poster.JPG">
            <img class="ipsImage" src="https://img.example/anim.gif">
            <img class="ipsImage" src="https://img.example/shot1.png">
            <img class="ipsImage" src="https://img.example/shot2.jpeg?w=800">
            <span style="color:#0000ff;"> Leo.1080p.mkv </span>
            <a data-fileext="torrent" href="https://t.example/1.torrent">t1</a>
            <a class="skyblue-button" href="magnet:?xt=urn:btih:AAA">m1</a>
            <span style="color:#0000ff;">Leo.720p.mkv</span>
            <a data-fileext="torrent" href="https://t.example/2.torrent">t2</a>
            <a class="skyblue-button" href="magnet:?xt=urn:btih:BBB">m2</a>
            "#,
        );

        let release = extract(&html).unwrap();
        assert_eq!(release.title, "Leo (2023) Tamil HQ HDRip");
        assert_eq!(release.release_time, jiff::civil::date(2024, 3, 1).at(10, 0, 0, 0));
        assert_eq!(release.poster, "https://img.example/poster.JPG");
        assert_eq!(
            release.screenshots,
            vec!["https://img.example/shot1.png", "https://img.example/shot2.jpeg?w=800"]
        );
        assert_eq!(release.torrents.len(), 2);
        assert_eq!(
            release.torrents[1],
            Torrent {
                file_name: "Leo.720p.mkv".to_string(),
                torrent_link: "https://t.example/2.torrent".to_string(),
                magnet_link: "magnet:?xt=urn:btih:BBB".to_string(),
            }
        );
    }

    #[test]
    fn test_no_qualifying_images() {
        let html = page(r#"<img class="ipsImage" src="https://img.example/a.webp"><img src="x.jpg">"#);
        let release = extract(&html).unwrap();
        assert!(release.poster.is_empty());
        assert!(release.screenshots.is_empty());
        assert!(release.torrents.is_empty());
    }

    #[test]
    fn test_torrents_truncate_to_shortest_list() {
        let html = page(
            r#"
            <span style="color:#0000ff;">a</span>
            <span style="color:#0000ff;">b</span>
            <span style="color:#0000ff;">c</span>
            <a data-fileext="torrent" href="t1">t</a>
            <a data-fileext="torrent" href="t2">t</a>
            <a class="skyblue-button" href="m1">m</a>
            <a class="skyblue-button" href="m2">m</a>
            <a class="skyblue-button" href="m3">m</a>
            "#,
        );
        let release = extract(&html).unwrap();
        let names: Vec<_> = release.torrents.iter().map(|t| t.file_name.as_str()).collect();
        assert_eq!(names, ["a", "b"]);
        assert_eq!(release.torrents[1].torrent_link, "t2");
        assert_eq!(release.torrents[1].magnet_link, "m2");
    }

    #[test]
    fn test_missing_title() {
        let html = r#"<time datetime="2024-03-01T10:00:00Z"></time>"#;
        assert_eq!(extract(html), Err(ExtractionError::MissingTitle));
    }

    #[test]
    fn test_missing_time_element() {
        let html = "<h3>Title</h3>";
        assert_eq!(extract(html), Err(ExtractionError::MissingOrInvalidTimestamp(String::new())));
    }

    #[test]
    fn test_timestamp_without_zulu_suffix_is_rejected() {
        let html = r#"<h3>Title</h3><time datetime="2024-03-01T10:00:00"></time>"#;
        assert_eq!(
            extract(html),
            Err(ExtractionError::MissingOrInvalidTimestamp("2024-03-01T10:00:00".to_string()))
        );
    }

    #[test]
    fn test_parse_release_time() {
        let dt = parse_release_time("2024-03-01T10:00:00Z").unwrap();
        assert_eq!((dt.year(), dt.month(), dt.day()), (2024, 3, 1));
        assert_eq!((dt.hour(), dt.minute(), dt.second()), (10, 0, 0));
        assert!(parse_release_time("01/03/2024 10:00").is_err());
    }

    #[test]
    fn test_candidates_skip_elements_without_attribute() {
        let html = r#"<a class="skyblue-button">no href</a><a class="skyblue-button" href="m">x</a>"#;
        let candidates = extract_candidates(html);
        assert_eq!(candidates.magnet_links, vec!["m"]);
        assert_eq!(candidates.title, None);
    }

    #[test]
    fn test_is_picture() {
        assert!(is_picture("https://x/y/Poster.PNG"));
        assert!(is_picture("https://x/y/a.jpg#frag"));
        assert!(!is_picture("https://x/y/a.gif"));
        assert!(!is_picture("noextension"));
    }
}
