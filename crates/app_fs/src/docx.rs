//! Best-effort text extraction from DOCX containers
//!
//! A DOCX file is a zip archive; the body text lives in `word/document.xml`
//! as `<w:t>` runs grouped into `<w:p>` paragraphs. Formatting, tables and
//! embedded objects are ignored.

use crate::{FsError, Result};
use std::io::{Cursor, Read};

const DOCUMENT_PART: &str = "word/document.xml";

/// Extract the plain text of a DOCX document held in memory
pub fn extract_docx_text(bytes: &[u8]) -> Result<String> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| FsError::Archive(format!("Not a DOCX container: {}", e)))?;

    let mut xml = String::new();
    archive
        .by_name(DOCUMENT_PART)
        .map_err(|e| FsError::Archive(format!("Missing {}: {}", DOCUMENT_PART, e)))?
        .read_to_string(&mut xml)
        .map_err(|e| FsError::Encoding(format!("{} is not UTF-8: {}", DOCUMENT_PART, e)))?;

    Ok(document_xml_to_text(&xml))
}

/// Walk the WordprocessingML markup and keep text runs
///
/// Handles the subset Word writes: elements, the five predefined entities,
/// numeric character references and CDATA sections. Comments and processing
/// instructions are skipped as tags.
fn document_xml_to_text(xml: &str) -> String {
    let mut out = String::new();
    let mut in_text_run = false;
    let mut in_tab_stops = false;
    let mut rest = xml;

    while let Some(open) = rest.find('<') {
        if in_text_run {
            push_unescaped(&mut out, &rest[..open]);
        }

        if let Some(cdata) = rest[open..].strip_prefix("<![CDATA[") {
            let end = cdata.find("]]>").unwrap_or(cdata.len());
            if in_text_run {
                out.push_str(&cdata[..end]);
            }
            rest = cdata.get(end + 3..).unwrap_or("");
            continue;
        }

        let after = &rest[open + 1..];
        let close = match after.find('>') {
            Some(c) => c,
            None => break,
        };
        let tag = &after[..close];
        rest = &after[close + 1..];

        let closing = tag.starts_with('/');
        let self_closing = tag.ends_with('/');
        let name = tag
            .trim_start_matches('/')
            .split(|c: char| c.is_whitespace() || c == '/')
            .next()
            .unwrap_or("");

        match (name, closing) {
            ("w:t", false) => in_text_run = !self_closing,
            ("w:t", true) => in_text_run = false,
            ("w:tabs", false) => in_tab_stops = !self_closing,
            ("w:tabs", true) => in_tab_stops = false,
            ("w:tab", false) if !in_tab_stops => out.push('\t'),
            ("w:br", false) | ("w:cr", false) => out.push('\n'),
            ("w:p", true) => out.push('\n'),
            ("w:p", false) if self_closing => out.push('\n'),
            _ => {}
        }
    }

    let trimmed_len = out.trim_end_matches('\n').len();
    out.truncate(trimmed_len);
    out
}

fn push_unescaped(out: &mut String, text: &str) {
    let mut rest = text;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let after = &rest[amp..];

        let entity_end = match after.find(';') {
            Some(end) => end,
            None => {
                out.push_str(after);
                return;
            }
        };

        match decode_entity(&after[1..entity_end]) {
            Some(c) => out.push(c),
            None => out.push_str(&after[..=entity_end]),
        }
        rest = &after[entity_end + 1..];
    }

    out.push_str(rest);
}

fn decode_entity(entity: &str) -> Option<char> {
    match entity {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            let code = if let Some(hex) = entity.strip_prefix("#x") {
                u32::from_str_radix(hex, 16).ok()?
            } else {
                entity.strip_prefix('#')?.parse().ok()?
            };
            char::from_u32(code)
        }
    }
}
