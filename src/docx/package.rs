use std::collections::HashMap;
use std::fs::File;
use std::io::{Cursor, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::error::DocxToolError;

pub const DOCUMENT_PART: &str = "word/document.xml";

/// A DOCX archive loaded fully into memory, entries kept in archive order.
pub struct DocxPackage {
    pub path: PathBuf,
    pub entries: Vec<DocxEntry>,
}

pub struct DocxEntry {
    pub name: String,
    pub data: Vec<u8>,
    pub compression: CompressionMethod,
    pub last_modified: zip::DateTime,
    pub unix_mode: Option<u32>,
    pub is_dir: bool,
}

impl DocxPackage {
    pub fn read(path: &Path) -> anyhow::Result<Self> {
        let f = File::open(path).with_context(|| format!("open docx: {}", path.display()))?;
        let mut zip = ZipArchive::new(f)
            .with_context(|| format!("read zip: {}", path.display()))?;
        let mut entries = Vec::with_capacity(zip.len());
        for i in 0..zip.len() {
            let mut file = zip.by_index(i).context("zip entry")?;
            let mut data = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut data)
                .with_context(|| format!("read zip entry: {}", file.name()))?;
            entries.push(DocxEntry {
                name: file.name().to_string(),
                data,
                compression: file.compression(),
                last_modified: file.last_modified().unwrap_or_default(),
                unix_mode: file.unix_mode(),
                is_dir: file.is_dir(),
            });
        }
        Ok(Self {
            path: path.to_path_buf(),
            entries,
        })
    }

    pub fn entry(&self, name: &str) -> Option<&DocxEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Decoded text of a part. `context` names the archive role in the error
    /// ("template", "DOCX").
    pub fn part_text(&self, name: &str, context: &'static str) -> anyhow::Result<String> {
        let ent = self.entry(name).ok_or_else(|| DocxToolError::MissingPart {
            part: name.to_string(),
            context,
        })?;
        String::from_utf8(ent.data.clone()).with_context(|| format!("{name} is not valid UTF-8"))
    }

    /// Writes a copy of this archive to `output_path`, swapping in the bytes of
    /// every entry named in `replacements`. The archive is assembled in memory
    /// and written in one go; the source file is never opened for writing.
    pub fn write_with_replacements(
        &self,
        output_path: &Path,
        replacements: &HashMap<String, Vec<u8>>,
    ) -> anyhow::Result<()> {
        if same_file(&self.path, output_path) {
            return Err(DocxToolError::PathCollision {
                path: output_path.to_path_buf(),
            }
            .into());
        }

        let mut zout = ZipWriter::new(Cursor::new(Vec::new()));
        for ent in &self.entries {
            let data = replacements.get(&ent.name).unwrap_or(&ent.data);
            let mut opts = SimpleFileOptions::default()
                .compression_method(ent.compression)
                .last_modified_time(ent.last_modified);
            if let Some(mode) = ent.unix_mode {
                opts = opts.unix_permissions(mode);
            }
            if ent.is_dir || ent.name.ends_with('/') {
                zout.add_directory(ent.name.as_str(), opts)
                    .with_context(|| format!("add zip dir: {}", ent.name))?;
            } else {
                zout.start_file(ent.name.as_str(), opts)
                    .with_context(|| format!("start zip file: {}", ent.name))?;
                zout.write_all(data)
                    .with_context(|| format!("write zip file: {}", ent.name))?;
            }
        }
        let bytes = zout.finish().context("finish zip")?.into_inner();

        if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create output dir: {}", parent.display()))?;
        }
        std::fs::write(output_path, bytes)
            .with_context(|| format!("write output docx: {}", output_path.display()))?;
        Ok(())
    }
}

/// True when both paths name the same file, whether or not `b` exists yet.
pub fn same_file(a: &Path, b: &Path) -> bool {
    resolve_for_compare(a) == resolve_for_compare(b)
}

fn resolve_for_compare(path: &Path) -> PathBuf {
    if let Ok(p) = path.canonicalize() {
        return p;
    }
    let abs = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|d| d.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    };
    match (abs.parent(), abs.file_name()) {
        (Some(parent), Some(name)) => parent
            .canonicalize()
            .map(|p| p.join(name))
            .unwrap_or_else(|_| abs.clone()),
        _ => abs,
    }
}
