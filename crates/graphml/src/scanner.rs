//! Forward-only scanner over the XML events of a GraphML document.
//!
//! A [`TagScanner`] makes a single pass over one input stream and stops at
//! every start element whose local name matches the requested tag. The caller
//! can then pull the `<data>` children of that element before asking for the
//! next match. Scanning a different tag means opening a new scanner, i.e. a
//! fresh pass over the file.

use crate::error::{GraphmlError, Result};
use crate::source::open_input;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashMap;
use std::io::BufRead;
use std::path::Path;

/// Owned copy of a start element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartTag {
    name: String,
    attributes: HashMap<String, String>,
    self_closing: bool,
}

impl StartTag {
    pub fn new(
        name: impl Into<String>,
        attributes: HashMap<String, String>,
        self_closing: bool,
    ) -> Self {
        Self {
            name: name.into(),
            attributes,
            self_closing,
        }
    }

    /// Local name of the element.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Whether the element was written as `<tag/>` and has no children.
    pub fn is_self_closing(&self) -> bool {
        self.self_closing
    }
}

/// A `<data>` child of a node or edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataElement {
    pub key: String,
    /// Element text; `None` when the text could not be read.
    pub text: Option<String>,
}

/// Owned XML event, detached from the reader's buffer.
#[derive(Debug)]
enum ScanEvent {
    Start(StartTag),
    End(String),
    Text(String),
    /// Text that failed to unescape.
    UnreadableText,
    Eof,
    /// Declarations, comments and other ignored events.
    Other,
}

/// Single-pass scanner for one element name.
pub struct TagScanner {
    reader: Reader<Box<dyn BufRead + Send>>,
    buf: Vec<u8>,
    tag: String,
    source_name: String,
    depth: usize,
}

impl TagScanner {
    /// Open `path` (decompressing `.gz` input) and scan for `tag`.
    pub fn open(path: &Path, tag: impl Into<String>) -> Result<Self> {
        let input = open_input(path)?;
        Ok(Self::from_reader(input, path.display().to_string(), tag))
    }

    /// Scan an already opened stream.
    pub fn from_reader(
        input: Box<dyn BufRead + Send>,
        source_name: impl Into<String>,
        tag: impl Into<String>,
    ) -> Self {
        Self {
            reader: Reader::from_reader(input),
            buf: Vec::new(),
            tag: tag.into(),
            source_name: source_name.into(),
            depth: 0,
        }
    }

    /// Advance to the next start element named like the scanned tag.
    pub fn next_match(&mut self) -> Result<Option<StartTag>> {
        loop {
            match self.next_event()? {
                ScanEvent::Start(element) if element.name == self.tag => return Ok(Some(element)),
                ScanEvent::Eof => return Ok(None),
                _ => {}
            }
        }
    }

    /// Read the `<data>` children of `owner` up to its end element.
    ///
    /// Must be called right after `owner` was returned by [`next_match`].
    /// Reading stops once the reader leaves `owner`, whatever the name of the
    /// end tag that closed it.
    ///
    /// [`next_match`]: TagScanner::next_match
    pub fn read_data_children(&mut self, owner: &StartTag) -> Result<Vec<DataElement>> {
        let mut children = Vec::new();
        if owner.is_self_closing() {
            return Ok(children);
        }
        let level = self.depth;
        loop {
            match self.next_event()? {
                ScanEvent::Start(child) => {
                    let text = if child.is_self_closing() {
                        Some(String::new())
                    } else {
                        self.element_text(&child)?
                    };
                    match child.attribute("key") {
                        Some(key) => children.push(DataElement {
                            key: key.to_string(),
                            text,
                        }),
                        None => tracing::warn!(
                            "Ignoring <{}> without a key inside <{}>",
                            child.name(),
                            owner.name()
                        ),
                    }
                }
                ScanEvent::End(_) if self.depth < level => return Ok(children),
                ScanEvent::Eof => return Err(self.truncated()),
                _ => {}
            }
        }
    }

    /// Collect the text of `element` up to its end tag.
    ///
    /// Nested elements or text that fails to unescape make the text
    /// unreadable. The rest of `element` is still consumed and `None` is
    /// returned.
    fn element_text(&mut self, element: &StartTag) -> Result<Option<String>> {
        let mut text = Some(String::new());
        loop {
            match self.next_event()? {
                ScanEvent::Text(t) => {
                    if let Some(text) = text.as_mut() {
                        text.push_str(&t);
                    }
                }
                ScanEvent::UnreadableText => {
                    tracing::warn!("Failed to read text of <{}>", element.name());
                    text = None;
                }
                ScanEvent::End(_) => return Ok(text),
                ScanEvent::Start(child) => {
                    tracing::warn!(
                        "Failed to read text of <{}>: unexpected nested <{}>",
                        element.name(),
                        child.name()
                    );
                    if !child.is_self_closing() {
                        self.skip_to_end(&child)?;
                    }
                    self.skip_to_end(element)?;
                    return Ok(None);
                }
                ScanEvent::Eof => return Err(self.truncated()),
                ScanEvent::Other => {}
            }
        }
    }

    /// Consume events until the end tag of `element` at the current level.
    fn skip_to_end(&mut self, element: &StartTag) -> Result<()> {
        let mut nested = 0usize;
        loop {
            match self.next_event()? {
                ScanEvent::Start(child) if !child.is_self_closing() => nested += 1,
                ScanEvent::End(_) if nested > 0 => nested -= 1,
                ScanEvent::End(name) => {
                    if name != element.name() {
                        tracing::warn!("Expected </{}>, found </{name}>", element.name());
                    }
                    return Ok(());
                }
                ScanEvent::Eof => return Err(self.truncated()),
                _ => {}
            }
        }
    }

    fn truncated(&self) -> GraphmlError {
        GraphmlError::Truncated {
            source_name: self.source_name.clone(),
            position: self.reader.buffer_position(),
        }
    }

    /// Read the next event, logging and skipping recoverable XML errors.
    fn next_event(&mut self) -> Result<ScanEvent> {
        loop {
            let before = self.reader.buffer_position();
            self.buf.clear();
            let event = match self.reader.read_event_into(&mut self.buf) {
                Ok(Event::Start(e)) => {
                    self.depth += 1;
                    ScanEvent::Start(owned_start(&e, false))
                }
                Ok(Event::Empty(e)) => ScanEvent::Start(owned_start(&e, true)),
                Ok(Event::End(e)) => {
                    self.depth = self.depth.saturating_sub(1);
                    ScanEvent::End(String::from_utf8_lossy(e.local_name().as_ref()).into_owned())
                }
                Ok(Event::Text(e)) => match e.unescape() {
                    Ok(text) => ScanEvent::Text(text.into_owned()),
                    Err(err) => {
                        tracing::warn!("Failed to read XML text at byte {before}: {err}");
                        ScanEvent::UnreadableText
                    }
                },
                Ok(Event::CData(e)) => {
                    ScanEvent::Text(String::from_utf8_lossy(&e.into_inner()).into_owned())
                }
                Ok(Event::Eof) => {
                    if self.depth > 0 {
                        return Err(GraphmlError::Truncated {
                            source_name: self.source_name.clone(),
                            position: self.reader.buffer_position(),
                        });
                    }
                    ScanEvent::Eof
                }
                Ok(_) => ScanEvent::Other,
                Err(quick_xml::Error::Io(error)) => {
                    return Err(GraphmlError::Io {
                        source_name: self.source_name.clone(),
                        error,
                    })
                }
                Err(quick_xml::Error::UnexpectedEof(_)) => {
                    return Err(GraphmlError::Truncated {
                        source_name: self.source_name.clone(),
                        position: self.reader.buffer_position(),
                    })
                }
                Err(quick_xml::Error::EndEventMismatch { expected, found }) => {
                    // The reader has already closed `expected`.
                    tracing::warn!("Expected </{expected}>, found </{found}> at byte {before}");
                    self.depth = self.depth.saturating_sub(1);
                    ScanEvent::End(expected)
                }
                Err(err) => {
                    let position = self.reader.buffer_position();
                    if position == before {
                        return Err(GraphmlError::Corrupt {
                            source_name: self.source_name.clone(),
                            position,
                            message: err.to_string(),
                        });
                    }
                    tracing::warn!("Failed to read XML event at byte {before}: {err}");
                    continue;
                }
            };
            return Ok(event);
        }
    }
}

fn owned_start(element: &BytesStart<'_>, self_closing: bool) -> StartTag {
    let name = String::from_utf8_lossy(element.local_name().as_ref()).into_owned();
    let mut attributes = HashMap::new();
    for attribute in element.attributes() {
        let attribute = match attribute {
            Ok(attribute) => attribute,
            Err(err) => {
                tracing::warn!("Skipping malformed attribute on <{name}>: {err}");
                continue;
            }
        };
        let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
        let value = match attribute.unescape_value() {
            Ok(value) => value.into_owned(),
            Err(err) => {
                tracing::warn!("Failed to unescape attribute '{key}' on <{name}>: {err}");
                String::from_utf8_lossy(&attribute.value).into_owned()
            }
        };
        attributes.insert(key, value);
    }
    StartTag::new(name, attributes, self_closing)
}

/// Count the elements named `tag` in the document at `path`.
pub fn count_elements(path: &Path, tag: &str) -> Result<u64> {
    let mut scanner = TagScanner::open(path, tag)?;
    let mut count = 0;
    while scanner.next_match()?.is_some() {
        count += 1;
    }
    Ok(count)
}
