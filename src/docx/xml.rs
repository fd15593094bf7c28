use anyhow::{anyhow, Context};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

pub const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum XmlEvent {
    Start {
        name: String,
        attrs: Vec<(String, String)>,
    },
    End {
        name: String,
    },
    Empty {
        name: String,
        attrs: Vec<(String, String)>,
    },
    Text {
        text: String,
    },
}

#[derive(Clone, Debug)]
pub struct XmlPart {
    pub name: String,
    pub events: Vec<XmlEvent>,
}

/// Parses a part into a flat element/text event list. Declarations, comments,
/// processing instructions and doctypes are dropped; CDATA is folded into text.
pub fn parse_xml_part(name: &str, xml_bytes: &[u8]) -> anyhow::Result<XmlPart> {
    let mut reader = Reader::from_reader(xml_bytes);
    reader.config_mut().trim_text(false);

    let mut events: Vec<XmlEvent> = Vec::new();
    let mut buf = Vec::new();
    loop {
        buf.clear();
        let ev = reader
            .read_event_into(&mut buf)
            .with_context(|| format!("read xml event in {name} at {}", reader.buffer_position()))?;
        match ev {
            Event::Eof => break,
            Event::Start(s) => {
                events.push(XmlEvent::Start {
                    name: bytes_to_string(s.name().as_ref()),
                    attrs: collect_attrs(&s)?,
                });
            }
            Event::End(e) => {
                events.push(XmlEvent::End {
                    name: bytes_to_string(e.name().as_ref()),
                });
            }
            Event::Empty(s) => {
                events.push(XmlEvent::Empty {
                    name: bytes_to_string(s.name().as_ref()),
                    attrs: collect_attrs(&s)?,
                });
            }
            Event::Text(t) => {
                let txt = t.unescape().context("unescape text")?.into_owned();
                events.push(XmlEvent::Text { text: txt });
            }
            Event::CData(t) => {
                events.push(XmlEvent::Text {
                    text: bytes_to_string(t.into_inner()),
                });
            }
            Event::Decl(_) | Event::Comment(_) | Event::PI(_) | Event::DocType(_) => {}
        }
    }

    Ok(XmlPart {
        name: name.to_string(),
        events,
    })
}

fn collect_attrs(s: &BytesStart<'_>) -> anyhow::Result<Vec<(String, String)>> {
    let mut attrs: Vec<(String, String)> = Vec::new();
    for a in s.attributes() {
        let a = a.context("attr")?;
        let key = bytes_to_string(a.key.as_ref());
        let val = a.unescape_value().context("unescape attr")?.into_owned();
        attrs.push((key, val));
    }
    Ok(attrs)
}

fn bytes_to_string(bytes: impl AsRef<[u8]>) -> String {
    String::from_utf8_lossy(bytes.as_ref()).into_owned()
}

pub fn find_attr<'a>(attrs: &'a [(String, String)], key: &str) -> Option<&'a str> {
    attrs
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

/// Every prefix bound to `ns` anywhere in the part, in declaration order. A
/// default-namespace declaration (`xmlns="ns"`) yields the empty prefix.
pub fn prefixes_for_namespace(part: &XmlPart, ns: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for ev in &part.events {
        let (XmlEvent::Start { attrs, .. } | XmlEvent::Empty { attrs, .. }) = ev else {
            continue;
        };
        for (k, v) in attrs {
            if v != ns {
                continue;
            }
            let prefix = match k.as_str() {
                "xmlns" => "",
                other => match other.strip_prefix("xmlns:") {
                    Some(p) => p,
                    None => continue,
                },
            };
            if !out.iter().any(|p| p == prefix) {
                out.push(prefix.to_string());
            }
        }
    }
    out
}

/// Checks that `xml` is a single well-formed document: balanced, matching
/// tags, one root element, resolvable entities, only XML 1.0 characters in
/// text and attribute values, every element/attribute prefix bound, and no
/// stray text outside the root.
pub fn check_well_formed(xml: &str) -> anyhow::Result<()> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);
    reader.config_mut().check_end_names = true;

    // Prefixes declared on each open element.
    let mut scopes: Vec<Vec<String>> = Vec::new();
    let mut roots = 0usize;
    loop {
        let pos = reader.buffer_position();
        let ev = reader
            .read_event()
            .map_err(|e| anyhow!("{e} (at byte {pos})"))?;
        match ev {
            Event::Eof => break,
            Event::Start(s) => {
                if scopes.is_empty() {
                    roots += 1;
                }
                let declared = check_element(&s, &scopes).with_context(|| format!("at byte {pos}"))?;
                scopes.push(declared);
            }
            Event::Empty(s) => {
                if scopes.is_empty() {
                    roots += 1;
                }
                check_element(&s, &scopes).with_context(|| format!("at byte {pos}"))?;
            }
            Event::End(_) => {
                scopes
                    .pop()
                    .ok_or_else(|| anyhow!("unmatched end tag at byte {pos}"))?;
            }
            Event::Text(t) => {
                let text = t.unescape().map_err(|e| anyhow!("{e} (at byte {pos})"))?;
                check_chars(&text).with_context(|| format!("in text at byte {pos}"))?;
                if scopes.is_empty() && !text.trim().is_empty() {
                    return Err(anyhow!("text outside the root element at byte {pos}"));
                }
            }
            Event::CData(t) => {
                let text = String::from_utf8_lossy(&t);
                check_chars(&text).with_context(|| format!("in CDATA at byte {pos}"))?;
            }
            _ => {}
        }
        if roots > 1 {
            return Err(anyhow!("more than one root element (at byte {pos})"));
        }
    }
    if !scopes.is_empty() {
        return Err(anyhow!(
            "{} element(s) left unclosed at end of document",
            scopes.len()
        ));
    }
    if roots == 0 {
        return Err(anyhow!("no root element"));
    }
    Ok(())
}

/// Validates one start tag against the enclosing scopes and returns the
/// prefixes it declares.
fn check_element(s: &BytesStart<'_>, scopes: &[Vec<String>]) -> anyhow::Result<Vec<String>> {
    let mut declared: Vec<String> = Vec::new();
    let mut keys: Vec<String> = Vec::new();
    for a in s.attributes() {
        let a = a.map_err(|e| anyhow!("{e}"))?;
        let key = bytes_to_string(a.key.as_ref());
        let value = a.unescape_value().map_err(|e| anyhow!("{e}"))?;
        check_chars(&value).with_context(|| format!("in attribute {key}"))?;
        if let Some(p) = key.strip_prefix("xmlns:") {
            declared.push(p.to_string());
        } else if key != "xmlns" {
            keys.push(key);
        }
    }

    let is_bound = |prefix: &str| {
        prefix == "xml"
            || declared.iter().any(|p| p == prefix)
            || scopes.iter().flatten().any(|p| p == prefix)
    };
    let name = bytes_to_string(s.name().as_ref());
    for qname in std::iter::once(&name).chain(keys.iter()) {
        if let Some((prefix, _)) = qname.split_once(':') {
            if !is_bound(prefix) {
                return Err(anyhow!("unbound namespace prefix '{prefix}' in {qname}"));
            }
        }
    }
    Ok(declared)
}

fn is_xml_char(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}')
}

fn check_chars(text: &str) -> anyhow::Result<()> {
    match text.chars().find(|c| !is_xml_char(*c)) {
        Some(c) => Err(anyhow!("character U+{:04X} is not allowed in XML", c as u32)),
        None => Ok(()),
    }
}
