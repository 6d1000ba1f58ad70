//! Streaming parsers for search responses.
//!
//! # Document format
//!
//! YaCy peers answer `yacysearch.rss?query={query}` with an RSS 2.0 document:
//!
//! ```xml
//! <rss version="2.0" xmlns:yacy="http://www.yacy.net/">
//!   <channel>
//!     <item>
//!       <title>...</title>
//!       <link>...</link>
//!       <description>...</description>
//!       <pubDate>...</pubDate>
//!       <yacy:size>...</yacy:size>
//!       <yacy:sizename>...</yacy:sizename>
//!       <yacy:host>...</yacy:host>
//!       <yacy:path>...</yacy:path>
//!       <yacy:file>...</yacy:file>
//!       <guid isPermaLink="false">...</guid>
//!     </item>
//!   </channel>
//! </rss>
//! ```
//!
//! Child elements are matched by local name, so the `yacy:` prefix is
//! optional. Unknown elements are skipped. The `{query}` placeholder in the
//! search path is replaced by the normalized query terms.

use async_trait::async_trait;
use quick_xml::events::Event;
use quick_xml::Reader;
use tokio::io::AsyncBufRead;
use tracing::debug;

use crate::listener::SearchListener;
use crate::result::{ResultStore, SearchItem};
use crate::sequencer::Generation;
use crate::{Result, SearchError};

/// Placeholder substituted with the normalized query in search paths.
pub const QUERY_PLACEHOLDER: &str = "{query}";

/// Decodes a response body into search items.
#[async_trait]
pub trait ResultParser: Send + Sync {
    /// URL path template for this format, relative to the host.
    fn search_path(&self) -> &str;

    /// Consumes `input`, appending every decoded item to `store` and
    /// reporting it to `listener`.
    ///
    /// Stops early, without error, as soon as `generation` is superseded.
    /// Returns the number of items appended.
    async fn parse(
        &self,
        input: &mut (dyn AsyncBufRead + Send + Unpin),
        store: &ResultStore,
        listener: &dyn SearchListener,
        generation: &Generation,
    ) -> Result<usize>;
}

/// Fills `template` with the query terms.
pub fn expand_path(template: &str, terms: &str) -> String {
    template.replace(QUERY_PLACEHOLDER, terms)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Title,
    Link,
    Description,
    PubDate,
    Size,
    SizeName,
    Guid,
    Host,
    Path,
    File,
}

impl Field {
    fn from_name(name: &[u8]) -> Option<Self> {
        let field = match name {
            b"title" => Self::Title,
            b"link" => Self::Link,
            b"description" => Self::Description,
            b"pubDate" => Self::PubDate,
            b"size" => Self::Size,
            b"sizename" => Self::SizeName,
            b"guid" => Self::Guid,
            b"host" => Self::Host,
            b"path" => Self::Path,
            b"file" => Self::File,
            _ => return None,
        };
        Some(field)
    }
}

fn set_field(item: &mut SearchItem, field: Field, text: String) {
    let text = text.trim().to_string();
    match field {
        Field::Title => item.title = text,
        Field::Link => item.link = text,
        Field::Description => item.description = text,
        Field::PubDate => item.pub_date = Some(text),
        Field::Size => item.size = text.parse().ok(),
        Field::SizeName => item.size_name = Some(text),
        Field::Guid => item.guid = Some(text),
        Field::Host => item.host = Some(text),
        Field::Path => item.path = Some(text),
        Field::File => item.file = Some(text),
    }
}

struct OpenItem {
    depth: usize,
    item: SearchItem,
}

struct OpenField {
    field: Field,
    depth: usize,
    text: String,
}

/// Parser for YaCy's RSS result feed.
#[derive(Debug, Clone, Default)]
pub struct XmlResultParser;

impl XmlResultParser {
    /// Default search path on a YaCy peer.
    pub const SEARCH_PATH: &'static str = "yacysearch.rss?query={query}";

    /// Creates a new parser.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ResultParser for XmlResultParser {
    fn search_path(&self) -> &str {
        Self::SEARCH_PATH
    }

    async fn parse(
        &self,
        input: &mut (dyn AsyncBufRead + Send + Unpin),
        store: &ResultStore,
        listener: &dyn SearchListener,
        generation: &Generation,
    ) -> Result<usize> {
        let mut reader = Reader::from_reader(input);
        let mut buf = Vec::new();
        let mut depth = 0usize;
        let mut saw_root = false;
        let mut open_item: Option<OpenItem> = None;
        let mut open_field: Option<OpenField> = None;
        let mut appended = 0usize;

        loop {
            match reader.read_event_into_async(&mut buf).await? {
                Event::Start(e) => {
                    depth += 1;
                    saw_root = true;
                    let name = e.local_name();
                    match open_item.as_ref().map(|i| i.depth) {
                        None if name.as_ref() == b"item" => {
                            if generation.is_superseded() {
                                debug!("Request {} superseded, stop parsing", generation.id());
                                return Ok(appended);
                            }
                            open_item = Some(OpenItem {
                                depth,
                                item: SearchItem::default(),
                            });
                        }
                        Some(item_depth) if open_field.is_none() && depth == item_depth + 1 => {
                            open_field = Field::from_name(name.as_ref()).map(|field| OpenField {
                                field,
                                depth,
                                text: String::new(),
                            });
                        }
                        _ => {}
                    }
                }
                Event::End(_) => {
                    if open_field.as_ref().is_some_and(|f| f.depth == depth) {
                        if let (Some(field), Some(item)) = (open_field.take(), open_item.as_mut()) {
                            set_field(&mut item.item, field.field, field.text);
                        }
                    }
                    if open_item.as_ref().is_some_and(|i| i.depth == depth) {
                        if let Some(OpenItem { item, .. }) = open_item.take() {
                            if !store.append_if_current(item.clone(), generation) {
                                debug!("Request {} superseded, dropping item", generation.id());
                                return Ok(appended);
                            }
                            appended += 1;
                            if generation.is_superseded() {
                                debug!("Request {} superseded, item not announced", generation.id());
                                return Ok(appended);
                            }
                            listener.on_item_found(&item);
                        }
                    }
                    depth = depth.saturating_sub(1);
                }
                Event::Empty(_) => saw_root = true,
                Event::Text(text) => {
                    if let Some(field) = open_field.as_mut() {
                        field.text.push_str(&text.unescape()?);
                    }
                }
                Event::CData(data) => {
                    if let Some(field) = open_field.as_mut() {
                        field.text.push_str(&String::from_utf8_lossy(&data));
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        if !saw_root {
            return Err(SearchError::Parse("document has no root element".into()));
        }
        if depth > 0 {
            return Err(SearchError::Parse("unexpected end of document".into()));
        }

        debug!("Request {} parsed {} items", generation.id(), appended);
        Ok(appended)
    }
}
