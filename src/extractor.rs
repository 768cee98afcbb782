//! Event-driven parser for the Netscape bookmark export format.
//!
//! The format encodes folders as `<H3>` headers followed by a `<DL>` block
//! containing the folder's children, and bookmarks as `<A HREF=...>` anchors.
//! Real exports are rarely well-formed HTML, so the parser is a lenient
//! state machine over a flat tag stream rather than a tree builder.

use quick_xml::events::{BytesStart, BytesText, Event};
use quick_xml::Reader;
use tracing::{debug, warn};

use crate::domain_utils;

/// One bookmark, annotated with the folder path it was found under.
///
/// Emitted in document order, exactly once per anchor with a non-empty
/// `href`, and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct BookmarkRecord {
    /// Enclosing folder names joined with `" / "`; empty for top-level
    /// bookmarks.
    pub folder_path: String,
    pub title: String,
    pub url: String,
    /// Lowercased host of `url` without the port; `None` when the URL has
    /// no parseable authority.
    pub domain: Option<String>,
    pub add_date: Option<String>,
    pub last_modified: Option<String>,
}

/// Which text-accumulating element is currently open. Headers and anchors
/// are not expected to nest; if they do, the most recently opened one wins.
#[derive(Debug, Default)]
enum Capture {
    #[default]
    Idle,
    Header {
        text: String,
    },
    Anchor {
        title: String,
        href: Option<String>,
        add_date: Option<String>,
        last_modified: Option<String>,
    },
}

#[derive(Debug, Default)]
struct Extractor {
    folder_stack: Vec<String>,
    /// Latched folder name waiting for its content block. `Some` doubles as
    /// the "next `<DL>` belongs to this folder" flag.
    pending_folder: Option<String>,
    capture: Capture,
    records: Vec<BookmarkRecord>,
}

/// Extract all bookmarks from the full text of a bookmark export.
///
/// Infallible by design: unclosed tags, stray closers, and un-named folders
/// all degrade to no-ops. A hard syntax error from the reader (not produced
/// by any of those) ends the pass early with whatever was extracted so far.
pub fn extract_bookmarks(html: &str) -> Vec<BookmarkRecord> {
    let mut reader = Reader::from_str(html);
    let config = reader.config_mut();
    config.check_end_names = false;
    config.allow_unmatched_ends = true;

    let mut state = Extractor::default();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => state.on_open(&e),
            // A self-closed element is an open immediately followed by a close.
            Ok(Event::Empty(e)) => {
                state.on_open(&e);
                state.on_close(e.name().as_ref());
            }
            Ok(Event::End(e)) => state.on_close(e.name().as_ref()),
            Ok(Event::Text(e)) => state.on_text(&e),
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                // Reader position is unreliable after a syntax error, so the
                // pass stops here rather than risk looping on bad input.
                warn!(
                    "stopping bookmark parse after markup error at byte {}: {}",
                    reader.buffer_position(),
                    e
                );
                break;
            }
        }
    }

    debug!("extracted {} bookmarks", state.records.len());
    state.records
}

impl Extractor {
    fn on_open(&mut self, tag: &BytesStart<'_>) {
        let name = tag.name();
        if name.as_ref().eq_ignore_ascii_case(b"h3") {
            self.capture = Capture::Header { text: String::new() };
        } else if name.as_ref().eq_ignore_ascii_case(b"dl") {
            // The latch fires on the next content block no matter what
            // markup occurred in between. An unarmed <DL> (the document
            // root, or one following an un-named folder) pushes nothing.
            if let Some(folder) = self.pending_folder.take() {
                self.folder_stack.push(folder);
            }
        } else if name.as_ref().eq_ignore_ascii_case(b"a") {
            // href and timestamps are only available at open time.
            let mut href = None;
            let mut add_date = None;
            let mut last_modified = None;
            for attr in tag.attributes().with_checks(false).flatten() {
                let key = attr.key.as_ref();
                let value = attr
                    .unescape_value()
                    .map(|v| v.into_owned())
                    .unwrap_or_else(|_| String::from_utf8_lossy(&attr.value).into_owned());
                if key.eq_ignore_ascii_case(b"href") {
                    href = Some(value);
                } else if key.eq_ignore_ascii_case(b"add_date") {
                    add_date = Some(value);
                } else if key.eq_ignore_ascii_case(b"last_modified") {
                    last_modified = Some(value);
                }
            }
            self.capture = Capture::Anchor { title: String::new(), href, add_date, last_modified };
        }
    }

    fn on_close(&mut self, name: &[u8]) {
        if name.eq_ignore_ascii_case(b"h3") {
            self.close_header();
        } else if name.eq_ignore_ascii_case(b"dl") {
            // Symmetric close of whatever most recently pushed; an extra
            // closer on an empty stack is absorbed.
            self.folder_stack.pop();
        } else if name.eq_ignore_ascii_case(b"a") {
            self.close_anchor();
        }
    }

    fn on_text(&mut self, text: &BytesText<'_>) {
        let chunk = match text.unescape() {
            Ok(t) => t.into_owned(),
            // Bare ampersands and unknown entities are common in exports;
            // keep the raw text rather than dropping it.
            Err(_) => String::from_utf8_lossy(text.as_ref()).into_owned(),
        };
        match &mut self.capture {
            Capture::Header { text } => text.push_str(&chunk),
            Capture::Anchor { title, .. } => title.push_str(&chunk),
            Capture::Idle => {}
        }
    }

    fn close_header(&mut self) {
        match std::mem::take(&mut self.capture) {
            Capture::Header { text } => {
                let name = text.trim();
                // Un-named folders arm nothing; a stale armed latch from a
                // named sibling is left in place.
                if !name.is_empty() {
                    self.pending_folder = Some(name.to_string());
                }
            }
            // Stray </H3>: leave any open anchor capture untouched.
            other => self.capture = other,
        }
    }

    fn close_anchor(&mut self) {
        match std::mem::take(&mut self.capture) {
            Capture::Anchor { title, href, add_date, last_modified } => {
                let href = href.as_deref().unwrap_or("").trim().to_string();
                // Anchors without an address are not bookmarks.
                if href.is_empty() {
                    return;
                }
                let domain = domain_utils::domain_from_url(&href);
                self.records.push(BookmarkRecord {
                    folder_path: self.folder_stack.join(" / "),
                    title: title.trim().to_string(),
                    url: href,
                    domain,
                    add_date,
                    last_modified,
                });
            }
            // Stray </A>: leave any open header capture untouched.
            other => self.capture = other,
        }
    }
}
