//! Text extraction from uploaded resume files.

use std::io::{Cursor, Read};
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;
use thiserror::Error;

/// Characters of extracted text returned as a preview.
pub const PREVIEW_CHARS: usize = 1000;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Unsupported file type '{0}'. Upload a PDF, DOCX or TXT file")]
    UnsupportedExtension(String),

    #[error("Could not read '{file}': {reason}")]
    Unreadable { file: String, reason: String },

    #[error("No text could be extracted from '{0}'")]
    Empty(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    Docx,
    PlainText,
}

impl DocumentFormat {
    /// Detects the format from the file extension. Legacy `.doc` is binary
    /// Word and is rejected along with anything else unknown.
    pub fn from_file_name(file_name: &str) -> Result<Self, DocumentError> {
        let extension = Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "pdf" => Ok(DocumentFormat::Pdf),
            "docx" => Ok(DocumentFormat::Docx),
            "txt" => Ok(DocumentFormat::PlainText),
            _ => Err(DocumentError::UnsupportedExtension(file_name.to_string())),
        }
    }
}

/// Extracts plain text from an uploaded file.
pub fn extract_text(file_name: &str, bytes: &[u8]) -> Result<String, DocumentError> {
    let format = DocumentFormat::from_file_name(file_name)?;
    let unreadable = |reason: String| DocumentError::Unreadable {
        file: file_name.to_string(),
        reason,
    };

    let text = match format {
        DocumentFormat::PlainText => std::str::from_utf8(bytes)
            .map(str::to_string)
            .map_err(|e| unreadable(format!("not valid UTF-8 text ({e})")))?,
        DocumentFormat::Pdf => {
            pdf_extract::extract_text_from_mem(bytes).map_err(|e| unreadable(e.to_string()))?
        }
        DocumentFormat::Docx => extract_docx(bytes).map_err(unreadable)?,
    };

    let text = text.trim().to_string();
    if text.is_empty() {
        return Err(DocumentError::Empty(file_name.to_string()));
    }
    Ok(text)
}

/// Truncates extracted text for display, marking the cut with an ellipsis.
pub fn preview(text: &str) -> String {
    if text.chars().count() > PREVIEW_CHARS {
        let head: String = text.chars().take(PREVIEW_CHARS).collect();
        format!("{head}...")
    } else {
        text.to_string()
    }
}

/// Reads `word/document.xml` out of the DOCX zip and joins the text runs of
/// each paragraph, one paragraph per line.
fn extract_docx(bytes: &[u8]) -> Result<String, String> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).map_err(|e| e.to_string())?;
    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|e| e.to_string())?
        .read_to_string(&mut xml)
        .map_err(|e| e.to_string())?;

    let mut reader = Reader::from_str(&xml);
    let mut paragraphs: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut in_text = false;

    loop {
        match reader.read_event().map_err(|e| e.to_string())? {
            Event::Start(e) if e.name().as_ref() == b"w:t" => in_text = true,
            Event::End(e) => match e.name().as_ref() {
                b"w:t" => in_text = false,
                b"w:p" => paragraphs.push(std::mem::take(&mut current)),
                _ => {}
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"w:tab" => current.push('\t'),
                b"w:br" => current.push('\n'),
                _ => {}
            },
            Event::Text(t) if in_text => {
                current.push_str(&t.decode().map_err(|e| e.to_string())?);
            }
            Event::GeneralRef(r) if in_text => {
                let name = r.decode().map_err(|e| e.to_string())?;
                if let Some(c) = resolve_entity(&name) {
                    current.push(c);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    if !current.is_empty() {
        paragraphs.push(current);
    }

    Ok(paragraphs.join("\n"))
}

fn resolve_entity(name: &str) -> Option<char> {
    if let Some(code) = name.strip_prefix("#x").or_else(|| name.strip_prefix("#X")) {
        return u32::from_str_radix(code, 16).ok().and_then(char::from_u32);
    }
    if let Some(code) = name.strip_prefix('#') {
        return code.parse::<u32>().ok().and_then(char::from_u32);
    }
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => None,
    }
}
