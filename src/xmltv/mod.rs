//! XMLTV document model
//!
//! Channel and programme elements are kept as small element trees so that
//! whatever a feed carries (ratings, credits, extra display names) reaches the
//! merged output untouched. The typed wrappers expose the attributes the
//! pipeline needs to look at.

use chrono::{DateTime, FixedOffset, NaiveDateTime};

pub mod parser;
pub mod writer;

pub use parser::parse_document;
pub use writer::DocumentWriter;

const XMLTV_TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S %z";
const XMLTV_NAIVE_TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// Parse an XMLTV timestamp (`YYYYMMDDhhmmss +zzzz`)
///
/// A timestamp without an offset is read as UTC.
pub fn parse_xmltv_timestamp(value: &str) -> Option<DateTime<FixedOffset>> {
    let value = value.trim();
    DateTime::parse_from_str(value, XMLTV_TIMESTAMP_FORMAT)
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(value, XMLTV_NAIVE_TIMESTAMP_FORMAT)
                .ok()
                .map(|naive| naive.and_utc().fixed_offset())
        })
}

/// A generic XML element: name, ordered attributes, text and children
///
/// `text` is the character data before the first child and `tail` the data
/// following this element inside its parent, so mixed content keeps its
/// position between children.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub text: String,
    pub children: Vec<XmlElement>,
    pub tail: String,
}

impl XmlElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((key.into(), value.into()));
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_child(mut self, child: XmlElement) -> Self {
        self.children.push(child);
        self
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// First child element with the given name
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn child_text(&self, name: &str) -> Option<&str> {
        self.child(name).map(|c| c.text.as_str())
    }

    /// Whether any text sits next to child elements
    pub fn has_mixed_content(&self) -> bool {
        !self.children.is_empty()
            && (!self.text.is_empty() || self.children.iter().any(|c| !c.tail.is_empty()))
    }
}

/// A `<channel>` element with a non-empty `id`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmltvChannel {
    element: XmlElement,
}

impl XmltvChannel {
    /// Wrap a `<channel>` element; `None` when it has no usable id
    pub fn from_element(element: XmlElement) -> Option<Self> {
        let has_id = element
            .attribute("id")
            .is_some_and(|id| !id.trim().is_empty());
        (element.name == "channel" && has_id).then_some(Self { element })
    }

    /// Minimal channel carrying only an id, a display name and an icon
    pub fn minimal(id: &str, display_name: &str, icon_src: &str) -> Self {
        Self {
            element: XmlElement::new("channel")
                .with_attribute("id", id)
                .with_child(XmlElement::new("display-name").with_text(display_name))
                .with_child(XmlElement::new("icon").with_attribute("src", icon_src)),
        }
    }

    pub fn id(&self) -> &str {
        self.element.attribute("id").unwrap_or_default()
    }

    pub fn display_name(&self) -> Option<&str> {
        self.element.child_text("display-name")
    }

    pub fn element(&self) -> &XmlElement {
        &self.element
    }
}

/// A `<programme>` element with a non-empty `channel` attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmltvProgramme {
    element: XmlElement,
}

impl XmltvProgramme {
    pub fn from_element(element: XmlElement) -> Option<Self> {
        let has_channel = element
            .attribute("channel")
            .is_some_and(|channel| !channel.trim().is_empty());
        (element.name == "programme" && has_channel).then_some(Self { element })
    }

    /// Programme with a single title and description
    pub fn minimal(channel: &str, start: &str, stop: &str, title: &str, desc: &str) -> Self {
        Self {
            element: XmlElement::new("programme")
                .with_attribute("start", start)
                .with_attribute("stop", stop)
                .with_attribute("channel", channel)
                .with_child(XmlElement::new("title").with_text(title))
                .with_child(XmlElement::new("desc").with_text(desc)),
        }
    }

    pub fn channel(&self) -> &str {
        self.element.attribute("channel").unwrap_or_default()
    }

    pub fn start(&self) -> Option<&str> {
        self.element.attribute("start")
    }

    pub fn stop(&self) -> Option<&str> {
        self.element.attribute("stop")
    }

    pub fn title(&self) -> Option<&str> {
        self.element.child_text("title")
    }

    pub fn description(&self) -> Option<&str> {
        self.element.child_text("desc")
    }

    pub fn element(&self) -> &XmlElement {
        &self.element
    }
}

/// The parts of a feed the aggregator consumes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmltvDocument {
    /// Name of the root element, normally `tv`
    pub root: String,
    pub channels: Vec<XmltvChannel>,
    pub programmes: Vec<XmltvProgramme>,
}
