//! XMLTV output generation
//!
//! Elements are always written with an explicit closing tag, so an empty
//! `<icon src="">` comes out as `<icon src=""></icon>`.

use quick_xml::escape::escape;
use std::fmt::Write;

use super::{XmlElement, XmltvChannel, XmltvProgramme};

const INDENT: &str = "  ";

/// Serializes merged channels and programmes into one XMLTV document
#[derive(Debug, Clone)]
pub struct DocumentWriter {
    generator_name: String,
}

impl DocumentWriter {
    pub fn new(generator_name: impl Into<String>) -> Self {
        Self {
            generator_name: generator_name.into(),
        }
    }

    /// Render the document: all channels first, then all programmes, in the given order
    pub fn render<'a, C, P>(&self, channels: C, programmes: P) -> String
    where
        C: IntoIterator<Item = &'a XmltvChannel>,
        P: IntoIterator<Item = &'a XmltvProgramme>,
    {
        let mut xmltv = String::new();
        xmltv.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        xmltv.push_str("<!DOCTYPE tv SYSTEM \"xmltv.dtd\">\n");
        let _ = writeln!(
            xmltv,
            "<tv generator-info-name=\"{}\">",
            escape(self.generator_name.as_str())
        );

        for channel in channels {
            write_element(&mut xmltv, channel.element(), 1);
        }
        for programme in programmes {
            write_element(&mut xmltv, programme.element(), 1);
        }

        xmltv.push_str("</tv>\n");
        xmltv
    }
}

fn write_element(out: &mut String, element: &XmlElement, depth: usize) {
    let indent = INDENT.repeat(depth);
    out.push_str(&indent);

    if element.children.is_empty() || element.has_mixed_content() {
        write_inline(out, element);
        out.push('\n');
        return;
    }

    write_start_tag(out, element);
    out.push('\n');
    for child in &element.children {
        write_element(out, child, depth + 1);
    }
    let _ = writeln!(out, "{indent}</{}>", element.name);
}

/// Write an element and its descendants on one line with text where it was
fn write_inline(out: &mut String, element: &XmlElement) {
    write_start_tag(out, element);
    out.push_str(&escape(element.text.as_str()));
    for child in &element.children {
        write_inline(out, child);
        out.push_str(&escape(child.tail.as_str()));
    }
    let _ = write!(out, "</{}>", element.name);
}

fn write_start_tag(out: &mut String, element: &XmlElement) {
    let _ = write!(out, "<{}", element.name);
    for (key, value) in &element.attributes {
        let _ = write!(out, " {key}=\"{}\"", escape(value.as_str()));
    }
    out.push('>');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xmltv::parse_document;

    #[test]
    fn test_render_layout() {
        let channels = vec![XmltvChannel::minimal("zzz", "zzz", "")];
        let programmes = vec![XmltvProgramme::minimal(
            "zzz",
            "19700101000000 +0000",
            "20991231235959 +0000",
            "Programação Indisponível",
            "Sem dados",
        )];

        let xml = DocumentWriter::new("iptv-guide").render(&channels, &programmes);

        let expected = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>
<!DOCTYPE tv SYSTEM \"xmltv.dtd\">
<tv generator-info-name=\"iptv-guide\">
  <channel id=\"zzz\">
    <display-name>zzz</display-name>
    <icon src=\"\"></icon>
  </channel>
  <programme start=\"19700101000000 +0000\" stop=\"20991231235959 +0000\" channel=\"zzz\">
    <title>Programação Indisponível</title>
    <desc>Sem dados</desc>
  </programme>
</tv>
";
        assert_eq!(xml, expected);
    }

    #[test]
    fn test_special_characters_are_escaped() {
        let channels = vec![XmltvChannel::minimal("A&E.us", "A&E <HD>", "http://x/?a=1&b=\"2\"")];
        let xml = DocumentWriter::new("gen").render(&channels, std::iter::empty());

        assert!(xml.contains("<channel id=\"A&amp;E.us\">"));
        assert!(xml.contains("<display-name>A&amp;E &lt;HD&gt;</display-name>"));
        assert!(!xml.contains("/>"));

        let parsed = parse_document(xml.as_bytes()).unwrap();
        assert_eq!(parsed.channels, channels);
    }

    #[test]
    fn test_parsed_feed_survives_rewrite() {
        let feed = r#"<tv>
  <channel id="Globo.br">
    <display-name lang="pt">TV Globo</display-name>
    <display-name>Globo</display-name>
    <url>http://globo.com</url>
  </channel>
  <programme start="20240101000000 +0000" stop="20240101010000 +0000" channel="Globo.br">
    <title lang="pt">Jornal</title>
    <credits><presenter>Fulano</presenter></credits>
    <rating system="BR"><value>L</value></rating>
  </programme>
</tv>"#;
        let parsed_feed = parse_document(feed.as_bytes()).unwrap();

        let xml = DocumentWriter::new("gen").render(&parsed_feed.channels, &parsed_feed.programmes);
        let reparsed = parse_document(xml.as_bytes()).unwrap();

        assert_eq!(reparsed.channels, parsed_feed.channels);
        assert_eq!(reparsed.programmes, parsed_feed.programmes);
    }

    #[test]
    fn test_mixed_content_is_written_inline() {
        let feed = r#"<tv>
  <programme start="20240101000000 +0000" channel="a">
    <desc>Com <b>Fulano</b> &amp; <i>Beltrano</i>.</desc>
    <title>  Espaços  </title>
  </programme>
</tv>"#;
        let parsed_feed = parse_document(feed.as_bytes()).unwrap();

        let xml = DocumentWriter::new("gen").render(std::iter::empty(), &parsed_feed.programmes);

        assert!(xml.contains("    <desc>Com <b>Fulano</b> &amp; <i>Beltrano</i>.</desc>\n"));
        assert!(xml.contains("    <title>  Espaços  </title>\n"));
        let reparsed = parse_document(xml.as_bytes()).unwrap();
        assert_eq!(reparsed.programmes, parsed_feed.programmes);
    }

    #[test]
    fn test_empty_document() {
        let xml = DocumentWriter::new("gen").render(std::iter::empty(), std::iter::empty());
        let parsed = parse_document(xml.as_bytes()).unwrap();
        assert_eq!(parsed.root, "tv");
        assert!(parsed.channels.is_empty());
    }
}
