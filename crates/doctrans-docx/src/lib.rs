//! DOCX text extraction.
//!
//! A DOCX file is a ZIP package whose main story lives in
//! `word/document.xml`. This crate streams that part with SAX-style event
//! processing and collects the text of body-level paragraphs (`w:p` elements
//! directly under `w:body`). Paragraphs nested in tables, text boxes or other
//! containers are not part of the body's paragraph list and are skipped.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use doctrans_core::{BackendError, DocumentBackend, DocumentFormat, join_paragraphs};

const DOCUMENT_PART: &str = "word/document.xml";

/// DOCX implementation of [`DocumentBackend`].
#[derive(Debug, Default, Clone, Copy)]
pub struct DocxBackend;

impl DocxBackend {
    pub fn new() -> Self {
        Self
    }

    /// Raw text of each body-level paragraph, in document order.
    /// Paragraphs are neither trimmed nor filtered.
    pub fn paragraphs(&self, path: &Path) -> Result<Vec<String>, BackendError> {
        let file = File::open(path)?;
        let mut archive = zip::ZipArchive::new(BufReader::new(file))
            .map_err(|e| BackendError::OpenError(format!("not a DOCX package: {e}")))?;
        let part = archive
            .by_name(DOCUMENT_PART)
            .map_err(|e| BackendError::OpenError(format!("missing {DOCUMENT_PART}: {e}")))?;

        let paragraphs = read_paragraphs(BufReader::new(part))?;
        tracing::debug!(path = %path.display(), paragraphs = paragraphs.len(), "read DOCX paragraphs");
        Ok(paragraphs)
    }
}

impl DocumentBackend for DocxBackend {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::Docx
    }

    fn extract_text(&self, path: &Path) -> Result<String, BackendError> {
        Ok(join_paragraphs(self.paragraphs(path)?))
    }
}

/// Parse a `word/document.xml` stream into body-level paragraph texts.
///
/// A paragraph's text is the concatenation of its runs' `w:t` content, with
/// `w:tab` read as `\t` and `w:br`/`w:cr` as `\n`. Runs wrapped in a
/// hyperlink, insertion or smart tag count as the paragraph's own runs.
pub fn read_paragraphs<R: BufRead>(reader: R) -> Result<Vec<String>, BackendError> {
    let mut xml = Reader::from_reader(reader);
    xml.config_mut().trim_text(false);

    let mut buf = Vec::with_capacity(4096);

    // State
    let mut stack: Vec<Vec<u8>> = Vec::new();
    let mut current: Option<String> = None;
    // Stack depth of the open body paragraph's `w:p` element.
    let mut para_depth = 0;
    let mut in_text = false;
    let mut paragraphs = Vec::new();

    loop {
        match xml.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let name = e.name();
                let name_ref = name.as_ref();

                if name_ref == b"w:p" && current.is_none() && parent_is_body(&stack) {
                    current = Some(String::new());
                    para_depth = stack.len();
                } else if name_ref == b"w:t"
                    && current.is_some()
                    && is_run_level(&stack, para_depth)
                {
                    in_text = true;
                }
                stack.push(name_ref.to_vec());
            }
            Ok(Event::Empty(ref e)) => {
                if e.name().as_ref() == b"w:p" && current.is_none() && parent_is_body(&stack) {
                    paragraphs.push(String::new());
                } else if let Some(ref mut para) = current {
                    if is_run_level(&stack, para_depth) {
                        match e.name().as_ref() {
                            b"w:tab" | b"w:ptab" => para.push('\t'),
                            b"w:noBreakHyphen" => para.push('-'),
                            b"w:br" if is_line_break(e) => para.push('\n'),
                            b"w:cr" => para.push('\n'),
                            _ => {}
                        }
                    }
                }
            }
            Ok(Event::Text(ref e)) if in_text => {
                let text = e.unescape().map_err(|err| {
                    BackendError::ExtractionError(format!("invalid text in {DOCUMENT_PART}: {err}"))
                })?;
                if let Some(ref mut para) = current {
                    para.push_str(&text);
                }
            }
            Ok(Event::CData(ref e)) if in_text => {
                if let Some(ref mut para) = current {
                    para.push_str(&String::from_utf8_lossy(e));
                }
            }
            Ok(Event::End(ref e)) => {
                stack.pop();
                let name = e.name();
                match name.as_ref() {
                    b"w:t" => in_text = false,
                    b"w:p" if stack.len() == para_depth => {
                        if let Some(para) = current.take() {
                            paragraphs.push(para);
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(BackendError::ExtractionError(format!(
                    "malformed {DOCUMENT_PART} at byte {}: {e}",
                    xml.buffer_position()
                )));
            }
            _ => {}
        }
        buf.clear();
    }

    if current.is_some() {
        return Err(BackendError::ExtractionError(format!(
            "{DOCUMENT_PART} ended inside a paragraph"
        )));
    }

    Ok(paragraphs)
}

/// A `w:br` breaks the line only when it wraps text; page and column
/// breaks contribute nothing.
fn is_line_break(e: &BytesStart<'_>) -> bool {
    match e
        .attributes()
        .flatten()
        .find(|a| a.key.as_ref() == b"w:type")
    {
        Some(attr) => attr.value.as_ref() == b"textWrapping",
        None => true,
    }
}

fn parent_is_body(stack: &[Vec<u8>]) -> bool {
    stack.last().is_some_and(|n| n.as_slice() == b"w:body")
}

/// Whether the element about to open sits directly inside a run of the
/// current body paragraph (`w:p/w:r` or `w:p/<wrapper>/w:r`).
fn is_run_level(stack: &[Vec<u8>], para_depth: usize) -> bool {
    match stack.get(para_depth + 1..) {
        Some([run]) => run.as_slice() == b"w:r",
        Some([wrapper, run]) => {
            matches!(
                wrapper.as_slice(),
                b"w:hyperlink" | b"w:ins" | b"w:smartTag"
            ) && run.as_slice() == b"w:r"
        }
        _ => false,
    }
}
