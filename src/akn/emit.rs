use std::collections::{BTreeMap, HashSet};
use std::io::Write;
use std::path::Path;

use anyhow::Context;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::akn::sections::Section;
use crate::textutil::slugify;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EmitOptions {
    pub unique_ids: bool,
    pub emit_preamble: bool,
}

struct IdAllocator {
    unique: bool,
    used: HashSet<String>,
}

impl IdAllocator {
    fn allocate(&mut self, title: &str) -> String {
        let base = slugify(title);
        if !self.unique {
            return base;
        }
        let mut id = base.clone();
        let mut n = 2usize;
        while self.used.contains(&id) {
            id = format!("{base}-{n}");
            n += 1;
        }
        self.used.insert(id.clone());
        id
    }
}

/// Slugs that more than one section would share, with how often each occurs.
pub fn duplicate_ids(root: &Section) -> BTreeMap<String, usize> {
    fn walk(s: &Section, counts: &mut BTreeMap<String, usize>) {
        for c in &s.children {
            *counts.entry(slugify(&c.title)).or_default() += 1;
            walk(c, counts);
        }
    }
    let mut counts = BTreeMap::new();
    walk(root, &mut counts);
    counts.retain(|_, n| *n > 1);
    counts
}

/// Serialises the tree as `akomaNtoso/judgment/body`. Only the root's
/// children become sections; the root's own content is emitted as a
/// `<header>` when `emit_preamble` is set and dropped otherwise.
pub fn render_akn(root: &Section, opts: EmitOptions) -> anyhow::Result<Vec<u8>> {
    let mut writer = Writer::new(Vec::new());
    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .context("write decl")?;
    writer.get_mut().write_all(b"\n").context("write newline")?;

    start(&mut writer, BytesStart::new("akomaNtoso"))?;
    start(&mut writer, BytesStart::new("judgment"))?;
    if opts.emit_preamble && !root.content.is_empty() {
        start(&mut writer, BytesStart::new("header"))?;
        for para in &root.content {
            text_element(&mut writer, "p", para)?;
        }
        end(&mut writer, "header")?;
    }
    start(&mut writer, BytesStart::new("body"))?;
    let mut ids = IdAllocator {
        unique: opts.unique_ids,
        used: HashSet::new(),
    };
    for child in &root.children {
        write_section(&mut writer, child, &mut ids)?;
    }
    end(&mut writer, "body")?;
    end(&mut writer, "judgment")?;
    end(&mut writer, "akomaNtoso")?;

    let mut out = writer.into_inner();
    out.push(b'\n');
    Ok(out)
}

pub fn write_akn(root: &Section, output: &Path, opts: EmitOptions) -> anyhow::Result<()> {
    let bytes = render_akn(root, opts)?;
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir: {}", parent.display()))?;
    }
    std::fs::write(output, bytes)
        .with_context(|| format!("write akoma ntoso xml: {}", output.display()))?;
    Ok(())
}

fn write_section(
    writer: &mut Writer<Vec<u8>>,
    section: &Section,
    ids: &mut IdAllocator,
) -> anyhow::Result<()> {
    let id = ids.allocate(&section.title);
    let level = section.level.to_string();
    start(
        writer,
        BytesStart::new("section").with_attributes([("id", id.as_str()), ("level", level.as_str())]),
    )?;
    text_element(writer, "heading", &section.title)?;
    for para in &section.content {
        text_element(writer, "p", para)?;
    }
    for child in &section.children {
        write_section(writer, child, ids)?;
    }
    end(writer, "section")
}

fn start(writer: &mut Writer<Vec<u8>>, tag: BytesStart<'_>) -> anyhow::Result<()> {
    writer
        .write_event(Event::Start(tag))
        .context("write start tag")?;
    Ok(())
}

fn end(writer: &mut Writer<Vec<u8>>, name: &str) -> anyhow::Result<()> {
    writer
        .write_event(Event::End(BytesEnd::new(name)))
        .with_context(|| format!("write </{name}>"))?;
    Ok(())
}

fn text_element(writer: &mut Writer<Vec<u8>>, name: &str, text: &str) -> anyhow::Result<()> {
    start(writer, BytesStart::new(name))?;
    writer
        .write_event(Event::Text(BytesText::new(text)))
        .context("write text")?;
    end(writer, name)
}
