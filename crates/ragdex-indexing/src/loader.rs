//! Uploaded file staging and text extraction

use quick_xml::Reader;
use quick_xml::events::Event;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tempfile::NamedTempFile;

use ragdex_core::{Error, Result};

/// File formats accepted for ingestion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    /// UTF-8 plain text
    Text,
    /// Office Open XML word processing document
    Docx,
}

impl DocumentFormat {
    /// Detect the format from a filename's extension (case-insensitive)
    pub fn from_filename(filename: &str) -> Result<Self> {
        let extension = Path::new(filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "txt" => Ok(DocumentFormat::Text),
            "docx" => Ok(DocumentFormat::Docx),
            _ => Err(Error::UnsupportedFormat(format!(
                "'{}' is not supported, use a .txt or .docx file",
                filename
            ))),
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            DocumentFormat::Text => "txt",
            DocumentFormat::Docx => "docx",
        }
    }

    /// Read the document text from a file of this format
    pub fn extract(&self, path: &Path) -> Result<String> {
        match self {
            DocumentFormat::Text => read_text(path),
            DocumentFormat::Docx => read_docx(path),
        }
    }
}

/// An upload written to a unique temporary file.
///
/// The file is removed when the value is dropped, whichever way processing
/// ends.
pub struct StagedUpload {
    file: NamedTempFile,
}

impl StagedUpload {
    pub fn write(dir: &Path, format: DocumentFormat, bytes: &[u8]) -> Result<Self> {
        let mut file = tempfile::Builder::new()
            .prefix("ragdex-upload-")
            .suffix(&format!(".{}", format.extension()))
            .tempfile_in(dir)?;
        file.write_all(bytes)?;
        file.flush()?;
        Ok(Self { file })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

fn read_text(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path)?;
    String::from_utf8(bytes)
        .map_err(|_| Error::InvalidInput("text file is not valid UTF-8".to_string()))
}

fn read_docx(path: &Path) -> Result<String> {
    let mut archive = zip::ZipArchive::new(File::open(path)?)
        .map_err(|e| Error::InvalidInput(format!("not a valid .docx archive: {}", e)))?;

    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|e| Error::InvalidInput(format!(".docx has no document body: {}", e)))?
        .read_to_string(&mut xml)?;

    Ok(docx_paragraphs(&xml)?.join("\n"))
}

/// Paragraph texts of a WordprocessingML `document.xml`, in document order.
///
/// Paragraphs nested inside another paragraph (text boxes, shapes) are
/// skipped; the enclosing paragraph keeps its own text on both sides.
pub fn docx_paragraphs(xml: &str) -> Result<Vec<String>> {
    let mut reader = Reader::from_str(xml);
    let mut paragraphs = Vec::new();
    let mut current = String::new();
    // open `w:p` elements; text counts only at depth 1
    let mut depth = 0usize;
    let mut in_text = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"w:p" => {
                    depth += 1;
                    if depth == 1 {
                        current.clear();
                    }
                }
                b"w:t" => in_text = true,
                _ => {}
            },
            Ok(Event::Empty(e)) if depth <= 1 => match e.name().as_ref() {
                b"w:p" if depth == 0 => paragraphs.push(String::new()),
                b"w:tab" if depth == 1 => current.push('\t'),
                b"w:br" | b"w:cr" if depth == 1 => current.push('\n'),
                _ => {}
            },
            Ok(Event::Text(t)) if in_text && depth == 1 => {
                let text = t
                    .unescape()
                    .map_err(|e| Error::InvalidInput(format!("malformed .docx text: {}", e)))?;
                current.push_str(&text);
            }
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"w:t" => in_text = false,
                b"w:p" => {
                    if depth == 1 {
                        paragraphs.push(std::mem::take(&mut current));
                    }
                    depth = depth.saturating_sub(1);
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::InvalidInput(format!(
                    "malformed .docx document at byte {}: {}",
                    reader.buffer_position(),
                    e
                )));
            }
            _ => {}
        }
    }

    Ok(paragraphs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use zip::write::SimpleFileOptions;

    fn docx_bytes(paragraphs: &[&str]) -> Vec<u8> {
        let body: String = paragraphs
            .iter()
            .map(|p| format!("<w:p><w:r><w:t xml:space=\"preserve\">{}</w:t></w:r></w:p>", p))
            .collect();
        let xml = format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
             <w:document xmlns:w=\"http://schemas.openxmlformats.org/wordprocessingml/2006/main\">\
             <w:body>{}</w:body></w:document>",
            body
        );

        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        zip.start_file("word/document.xml", SimpleFileOptions::default())
            .unwrap();
        zip.write_all(xml.as_bytes()).unwrap();
        zip.finish().unwrap().into_inner()
    }

    #[test]
    fn test_format_detection() {
        assert_eq!(
            DocumentFormat::from_filename("notes.txt").unwrap(),
            DocumentFormat::Text
        );
        assert_eq!(
            DocumentFormat::from_filename("Report.DOCX").unwrap(),
            DocumentFormat::Docx
        );
        assert!(matches!(
            DocumentFormat::from_filename("paper.pdf"),
            Err(Error::UnsupportedFormat(_))
        ));
        assert!(DocumentFormat::from_filename("README").is_err());
    }

    #[test]
    fn test_paragraphs_with_runs_tabs_and_entities() {
        let xml = "<w:document><w:body>\
            <w:p><w:r><w:t>Hello</w:t></w:r><w:r><w:t xml:space=\"preserve\"> world</w:t></w:r></w:p>\
            <w:p/>\
            <w:p><w:r><w:t>a</w:t><w:tab/><w:t>b &amp; c</w:t></w:r></w:p>\
            </w:body></w:document>";

        assert_eq!(
            docx_paragraphs(xml).unwrap(),
            vec!["Hello world", "", "a\tb & c"]
        );
    }

    #[test]
    fn test_nested_paragraph_keeps_outer_text() {
        let xml = "<w:document><w:body>\
            <w:p><w:r><w:t>before </w:t></w:r>\
            <w:r><w:txbxContent><w:p><w:r><w:t>boxed</w:t></w:r></w:p><w:p/></w:txbxContent></w:r>\
            <w:r><w:t>after</w:t></w:r></w:p>\
            <w:p><w:r><w:t>next</w:t></w:r></w:p>\
            </w:body></w:document>";

        assert_eq!(docx_paragraphs(xml).unwrap(), vec!["before after", "next"]);
    }

    #[test]
    fn test_extract_docx_joins_paragraphs() {
        let dir = tempfile::tempdir().unwrap();
        let staged = StagedUpload::write(
            dir.path(),
            DocumentFormat::Docx,
            &docx_bytes(&["first paragraph", "second paragraph"]),
        )
        .unwrap();

        let text = DocumentFormat::Docx.extract(staged.path()).unwrap();
        assert_eq!(text, "first paragraph\nsecond paragraph");
    }

    #[test]
    fn test_invalid_utf8_text_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let staged = StagedUpload::write(dir.path(), DocumentFormat::Text, &[0xff, 0xfe, 0x00]).unwrap();

        assert!(matches!(
            DocumentFormat::Text.extract(staged.path()),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_staged_upload_removed_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let path = {
            let staged = StagedUpload::write(dir.path(), DocumentFormat::Text, b"hi").unwrap();
            assert!(staged.path().exists());
            staged.path().to_path_buf()
        };

        assert!(!path.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
