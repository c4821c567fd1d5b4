//! RSS / Atom feed polling.

use async_trait::async_trait;
use quick_xml::{
    Reader,
    events::{BytesStart, Event},
};
use tracing::{debug, warn};
use wreq::header::USER_AGENT;

use crate::{error::FeedError, models::FeedEntry};

/// Source of feed snapshots, in feed document order.
#[async_trait]
pub trait FeedSource {
    async fn entries(&self) -> Result<Vec<FeedEntry>, FeedError>;
}

pub struct HttpFeed {
    client: wreq::Client,
    url: String,
    user_agent: String,
}

impl HttpFeed {
    pub fn new(client: wreq::Client, url: String, user_agent: String) -> Self {
        Self { client, url, user_agent }
    }
}

#[async_trait]
impl FeedSource for HttpFeed {
    async fn entries(&self) -> Result<Vec<FeedEntry>, FeedError> {
        debug!(url = %self.url, "fetching feed");
        let xml = self
            .client
            .get(&self.url)
            .header(USER_AGENT, &self.user_agent)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        parse_feed(&xml)
    }
}

#[derive(Default)]
struct EntryBuilder {
    link: Option<String>,
    title: Option<String>,
}

impl EntryBuilder {
    fn build(self) -> Option<FeedEntry> {
        let link = self.link.map(|l| l.trim().to_string()).filter(|l| !l.is_empty())?;
        Some(FeedEntry { link, title: self.title.map(|t| t.trim().to_string()) })
    }
}

/// Parses RSS 2.0 `<item>` and Atom `<entry>` elements into feed entries.
///
/// Entries without a link are dropped. A parse error after at least one
/// entry was read keeps what was parsed so far.
pub fn parse_feed(xml: &str) -> Result<Vec<FeedEntry>, FeedError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut entries = Vec::new();
    let mut current: Option<EntryBuilder> = None;
    let mut current_tag = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                let tag = tag_name(e);
                match tag.as_str() {
                    "item" | "entry" => current = Some(EntryBuilder::default()),
                    "link" => {
                        if let Some(builder) = current.as_mut() {
                            take_atom_href(builder, e);
                        }
                    },
                    _ => {},
                }
                current_tag = tag;
            },
            Ok(Event::Empty(ref e)) => {
                if tag_name(e) == "link" {
                    if let Some(builder) = current.as_mut() {
                        take_atom_href(builder, e);
                    }
                }
            },
            Ok(Event::End(ref e)) => {
                let tag = String::from_utf8_lossy(e.name().as_ref()).to_string();
                if tag == "item" || tag == "entry" {
                    if let Some(entry) = current.take().and_then(EntryBuilder::build) {
                        entries.push(entry);
                    }
                }
                current_tag.clear();
            },
            Ok(Event::Text(ref e)) => {
                if let Some(builder) = current.as_mut() {
                    let text = e.unescape().unwrap_or_default().to_string();
                    take_text(builder, &current_tag, text);
                }
            },
            Ok(Event::CData(ref e)) => {
                if let Some(builder) = current.as_mut() {
                    let text = String::from_utf8_lossy(e.as_ref()).to_string();
                    take_text(builder, &current_tag, text);
                }
            },
            Ok(Event::Eof) => break,
            Err(err) => {
                if entries.is_empty() {
                    return Err(err.into());
                }
                warn!(error = %err, parsed = entries.len(), "feed xml truncated, keeping parsed entries");
                break;
            },
            _ => {},
        }
    }

    debug!(entries = entries.len(), "parsed feed");
    Ok(entries)
}

fn tag_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.name().as_ref()).to_string()
}

fn take_text(builder: &mut EntryBuilder, tag: &str, text: String) {
    match tag {
        "link" if builder.link.is_none() => builder.link = Some(text),
        "title" => builder.title = Some(text),
        _ => {},
    }
}

/// Atom links carry the url in `href`; only `rel="alternate"` (or no rel)
/// points at the post itself.
fn take_atom_href(builder: &mut EntryBuilder, e: &BytesStart<'_>) {
    let mut href = None;
    let mut rel = None;
    for attr in e.attributes().flatten() {
        let value = attr.unescape_value().map(|v| v.to_string()).unwrap_or_default();
        match attr.key.as_ref() {
            b"href" => href = Some(value),
            b"rel" => rel = Some(value),
            _ => {},
        }
    }
    let is_alternate = rel.as_deref().is_none_or(|r| r == "alternate");
    if let (Some(href), true) = (href, is_alternate) {
        builder.link.get_or_insert(href);
    }
}
