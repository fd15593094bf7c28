use crate::docx::xml::{find_attr, prefixes_for_namespace, XmlEvent, XmlPart, W_NS};

/// One `w:p` element: concatenated `w:t` text (trimmed) and its lowercased
/// paragraph style, if any.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Paragraph {
    pub text: String,
    pub style: Option<String>,
}

/// Qualified-name matcher for the WordprocessingML namespace. Holds every
/// prefix the part binds to it; the empty prefix stands for a default
/// `xmlns` declaration.
struct WordNames {
    prefixes: Vec<String>,
}

impl WordNames {
    fn for_part(part: &XmlPart) -> Self {
        let mut prefixes = prefixes_for_namespace(part, W_NS);
        if prefixes.is_empty() {
            prefixes.push("w".to_string());
        }
        Self { prefixes }
    }

    fn is(&self, qname: &str, local: &str) -> bool {
        let (prefix, rest) = qname.split_once(':').unwrap_or(("", qname));
        rest == local && self.prefixes.iter().any(|p| p == prefix)
    }

    fn attr<'a>(&self, attrs: &'a [(String, String)], local: &str) -> Option<&'a str> {
        self.prefixes.iter().find_map(|p| {
            if p.is_empty() {
                find_attr(attrs, local)
            } else {
                find_attr(attrs, &format!("{p}:{local}"))
            }
        })
    }
}

struct ParaCapture {
    out_index: usize,
    // Element stack depth of the `w:p` start tag itself.
    depth: usize,
    text: String,
}

/// Paragraphs in document order of their start tags, at any depth (body,
/// table cells, text boxes). A nested paragraph's text also counts toward
/// every paragraph enclosing it.
pub fn extract_paragraphs(part: &XmlPart) -> Vec<Paragraph> {
    let names = WordNames::for_part(part);

    let mut out: Vec<Paragraph> = Vec::new();
    let mut open: Vec<ParaCapture> = Vec::new();
    let mut stack: Vec<&str> = Vec::new();

    for ev in &part.events {
        match ev {
            XmlEvent::Start { name, attrs } | XmlEvent::Empty { name, attrs } => {
                let is_empty = matches!(ev, XmlEvent::Empty { .. });
                let parent = stack.last().copied().unwrap_or("");
                if names.is(name, "p") {
                    out.push(Paragraph {
                        text: String::new(),
                        style: None,
                    });
                    if !is_empty {
                        open.push(ParaCapture {
                            out_index: out.len() - 1,
                            depth: stack.len() + 1,
                            text: String::new(),
                        });
                    }
                } else if names.is(name, "pStyle") && names.is(parent, "pPr") {
                    // Only the paragraph's own pPr, not one inside a nested paragraph.
                    if let Some(cap) = open.last() {
                        if stack.len() == cap.depth + 1 && out[cap.out_index].style.is_none() {
                            out[cap.out_index].style =
                                names.attr(attrs, "val").map(|v| v.to_lowercase());
                        }
                    }
                }
                if !is_empty {
                    stack.push(name.as_str());
                }
            }
            XmlEvent::End { name } => {
                stack.pop();
                if names.is(name, "p") {
                    if let Some(cap) = open.pop() {
                        out[cap.out_index].text = cap.text.trim().to_string();
                        if let Some(outer) = open.last_mut() {
                            outer.text.push_str(&cap.text);
                        }
                    }
                }
            }
            XmlEvent::Text { text } => {
                if stack.last().is_some_and(|n| names.is(n, "t")) {
                    if let Some(cap) = open.last_mut() {
                        cap.text.push_str(text);
                    }
                }
            }
        }
    }
    out
}
