//! Quick-XML based XMLTV parser
//!
//! Reads a whole feed and keeps the `channel` and `programme` elements that
//! sit directly under the root. Anything nested deeper, or any other kind of
//! top-level element, is ignored.
//!
//! Content is decoded with the encoding named by a byte order mark or the XML
//! declaration, so Latin-1 and windows-1252 feeds parse like UTF-8 ones.

use anyhow::{Result, anyhow, bail};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use super::{XmlElement, XmltvChannel, XmltvDocument, XmltvProgramme};

/// Parse an XMLTV document from raw (already decompressed) bytes
pub fn parse_document(data: &[u8]) -> Result<XmltvDocument> {
    let mut reader = Reader::from_reader(data);

    let mut document = XmltvDocument::default();
    let mut root_seen = false;
    let mut root_closed = false;
    // Open elements below the root; the first entry is a direct child of it
    let mut stack: Vec<XmlElement> = Vec::new();

    loop {
        let position = reader.buffer_position();
        let event = reader
            .read_event()
            .map_err(|e| anyhow!("XML parsing error at byte {position}: {e}"))?;

        match event {
            Event::Start(ref e) => {
                if root_closed {
                    bail!("Unexpected element after the root element at byte {position}");
                }
                let element = start_element(e)?;
                if root_seen {
                    stack.push(element);
                } else {
                    root_seen = true;
                    document.root = element.name;
                }
            }

            Event::Empty(ref e) => {
                if root_closed {
                    bail!("Unexpected element after the root element at byte {position}");
                }
                let element = start_element(e)?;
                if !root_seen {
                    root_seen = true;
                    root_closed = true;
                    document.root = element.name;
                } else {
                    close_element(element, &mut stack, &mut document);
                }
            }

            Event::End(_) => match stack.pop() {
                Some(element) => close_element(element, &mut stack, &mut document),
                None => root_closed = true,
            },

            Event::Text(e) => {
                let text = e
                    .decode()
                    .map_err(|err| anyhow!("Undecodable text at byte {position}: {err}"))?;
                push_text(&mut stack, &text);
            }

            Event::CData(e) => {
                let text = e
                    .decode()
                    .map_err(|err| anyhow!("Undecodable CDATA at byte {position}: {err}"))?;
                push_text(&mut stack, &text);
            }

            Event::GeneralRef(e) => {
                let name = e
                    .decode()
                    .map_err(|err| anyhow!("Undecodable entity reference at byte {position}: {err}"))?;
                let resolved = match e
                    .resolve_char_ref()
                    .map_err(|err| anyhow!("Invalid character reference '&{name};': {err}"))?
                {
                    Some(c) => c.to_string(),
                    None => quick_xml::escape::resolve_predefined_entity(&name)
                        .map(str::to_string)
                        .ok_or_else(|| anyhow!("Undefined entity '&{name};' at byte {position}"))?,
                };
                push_text(&mut stack, &resolved);
            }

            Event::Eof => break,

            _ => {} // Declarations, comments, processing instructions, doctype
        }
    }

    if !root_seen {
        bail!("Document has no root element");
    }
    if !root_closed || !stack.is_empty() {
        bail!("Unexpected end of document inside <{}>", document.root);
    }

    Ok(document)
}

fn start_element(start: &BytesStart) -> Result<XmlElement> {
    let decoder = start.decoder();
    let name = decoder
        .decode(start.name().as_ref())
        .map_err(|e| anyhow!("Undecodable element name: {e}"))?
        .into_owned();

    let mut element = XmlElement::new(name);
    for attr in start.attributes() {
        let attr = attr.map_err(|e| anyhow!("Malformed attribute in <{}>: {e}", element.name))?;
        let key = decoder
            .decode(attr.key.as_ref())
            .map_err(|e| anyhow!("Undecodable attribute name in <{}>: {e}", element.name))?
            .into_owned();
        let value = attr
            .decode_and_unescape_value(decoder)
            .map_err(|e| anyhow!("Invalid value for attribute '{key}': {e}"))?
            .into_owned();
        element.attributes.push((key, value));
    }
    Ok(element)
}

/// Attach a finished element to its parent, or hand it to the document when
/// it is a direct child of the root
fn close_element(mut element: XmlElement, stack: &mut [XmlElement], document: &mut XmltvDocument) {
    drop_layout_whitespace(&mut element);

    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None => match element.name.as_str() {
            "channel" => document.channels.extend(XmltvChannel::from_element(element)),
            "programme" => document.programmes.extend(XmltvProgramme::from_element(element)),
            _ => {}
        },
    }
}

/// Text goes before the first child, or after the latest closed one
fn push_text(stack: &mut [XmlElement], text: &str) {
    if let Some(current) = stack.last_mut() {
        match current.children.last_mut() {
            Some(child) => child.tail.push_str(text),
            None => current.text.push_str(text),
        }
    }
}

/// Whitespace-only text around child elements is indentation; clear it unless
/// the element carries real text between its children
fn drop_layout_whitespace(element: &mut XmlElement) {
    if element.children.is_empty() {
        return;
    }
    let is_layout = element.text.trim().is_empty()
        && element.children.iter().all(|c| c.tail.trim().is_empty());
    if is_layout {
        element.text.clear();
        for child in &mut element.children {
            child.tail.clear();
        }
    }
}
