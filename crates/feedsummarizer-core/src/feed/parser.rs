use quick_xml::events::Event;
use quick_xml::Reader;

use super::html::strip_tags;
use super::models::{parse_pub_date, FeedItem};
use crate::{Error, Result};

/// Default cap on description length, in characters
pub const DEFAULT_MAX_DESCRIPTION_LENGTH: usize = 2500;

fn truncate_chars(input: &str, max_chars: usize) -> &str {
    match input.char_indices().nth(max_chars) {
        Some((idx, _)) => &input[..idx],
        None => input,
    }
}

/// RSS 2.0 item parser with a configured description cap
#[derive(Debug, Clone, Copy)]
pub struct FeedParser {
    max_description_length: usize,
}

impl Default for FeedParser {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DESCRIPTION_LENGTH)
    }
}

impl FeedParser {
    pub fn new(max_description_length: usize) -> Self {
        Self { max_description_length }
    }

    pub fn max_description_length(&self) -> usize {
        self.max_description_length
    }

    /// Parse feed text into items, in document order
    pub fn parse(&self, content: &str) -> Result<Vec<FeedItem>> {
        parse_items(content, self.max_description_length)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Title,
    Description,
    PubDate,
    Link,
}

impl Field {
    fn from_name(name: &[u8]) -> Option<Self> {
        match name {
            b"title" => Some(Field::Title),
            b"description" => Some(Field::Description),
            b"pubDate" => Some(Field::PubDate),
            b"link" => Some(Field::Link),
            _ => None,
        }
    }
}

/// Item fields exactly as found in the document
#[derive(Debug, Default)]
struct RawItem {
    title: Option<String>,
    description: Option<String>,
    pub_date: Option<String>,
    links: Vec<String>,
}

impl RawItem {
    fn set(&mut self, field: Field, value: String) {
        match field {
            Field::Title => self.title = Some(value),
            Field::Description => self.description = Some(value),
            Field::PubDate => self.pub_date = Some(value),
            Field::Link => self.links.push(value),
        }
    }
}

/// Parse the items of an RSS 2.0 document.
///
/// Every item must carry a link and a parseable `pubDate`; one bad item
/// fails the whole document. Descriptions are reduced to plain text and then
/// cut to `max_description_length` characters.
pub fn parse_items(content: &str, max_description_length: usize) -> Result<Vec<FeedItem>> {
    let raw_items = read_raw_items(content)?;

    tracing::debug!("Parsed {} raw items from feed", raw_items.len());

    raw_items
        .into_iter()
        .enumerate()
        .map(|(index, raw)| build_item(index, raw, max_description_length))
        .collect()
}

fn read_raw_items(content: &str) -> Result<Vec<RawItem>> {
    let mut reader = Reader::from_str(content);

    let mut path: Vec<Vec<u8>> = Vec::new();
    let mut saw_channel = false;
    let mut current: Option<RawItem> = None;
    // Field being captured, with the path depth of its element
    let mut field: Option<(Field, usize, String)> = None;
    let mut items = Vec::new();

    loop {
        let event = reader.read_event().map_err(|e| {
            Error::FeedFormat(format!(
                "Failed to parse feed XML at position {}: {}",
                reader.buffer_position(),
                e
            ))
        })?;

        match event {
            Event::Start(e) => {
                let name = e.name().as_ref().to_vec();
                let parent = path.last().map(Vec::as_slice);

                match (parent, name.as_slice()) {
                    (Some(b"rss"), b"channel") => saw_channel = true,
                    (Some(b"channel"), b"item") if saw_channel => current = Some(RawItem::default()),
                    (Some(b"item"), child) if current.is_some() && field.is_none() => {
                        if let Some(kind) = Field::from_name(child) {
                            field = Some((kind, path.len() + 1, String::new()));
                        }
                    }
                    _ => {}
                }

                path.push(name);
            }
            Event::Empty(e) => {
                let in_item = path.last().map(Vec::as_slice) == Some(b"item".as_slice());
                if let (true, Some(raw)) = (in_item, current.as_mut()) {
                    if let Some(kind) = Field::from_name(e.name().as_ref()) {
                        raw.set(kind, String::new());
                    }
                }
            }
            Event::Text(e) => {
                if let Some((_, _, buf)) = field.as_mut() {
                    let text = e
                        .unescape()
                        .map_err(|e| Error::FeedFormat(format!("Invalid text in feed item: {}", e)))?;
                    buf.push_str(&text);
                }
            }
            Event::CData(e) => {
                if let Some((_, _, buf)) = field.as_mut() {
                    buf.push_str(&String::from_utf8_lossy(&e.into_inner()));
                }
            }
            Event::End(_) => {
                if matches!(field, Some((_, depth, _)) if depth == path.len()) {
                    if let (Some((kind, _, value)), Some(raw)) = (field.take(), current.as_mut()) {
                        raw.set(kind, value);
                    }
                }

                let closed = path.pop();
                if closed.as_deref() == Some(b"item".as_slice())
                    && path.last().map(Vec::as_slice) == Some(b"channel".as_slice())
                {
                    if let Some(raw) = current.take() {
                        items.push(raw);
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = path.last() {
        return Err(Error::FeedFormat(format!(
            "Unexpected end of feed: <{}> is never closed",
            String::from_utf8_lossy(open)
        )));
    }

    if !saw_channel {
        return Err(Error::FeedFormat("Document has no RSS <channel> element".to_string()));
    }

    Ok(items)
}

fn build_item(index: usize, raw: RawItem, max_description_length: usize) -> Result<FeedItem> {
    let title = raw.title.as_deref().unwrap_or_default().trim().to_string();

    let link = raw
        .links
        .first()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .ok_or_else(|| Error::FeedFormat(format!("Item {} ('{}') has no link", index, title)))?
        .to_string();

    let pub_date = raw
        .pub_date
        .as_deref()
        .map(str::trim)
        .ok_or_else(|| Error::FeedFormat(format!("Item {} ('{}') has no pubDate", index, title)))?
        .to_string();

    // Validate now so a bad date fails the fetch rather than the filter
    parse_pub_date(&pub_date)?;

    let stripped = strip_tags(raw.description.as_deref().unwrap_or_default());
    let description = truncate_chars(&stripped, max_description_length).to_string();

    Ok(FeedItem {
        title,
        description,
        pub_date,
        link,
    })
}
