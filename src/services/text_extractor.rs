use std::{
    fs,
    io::{Cursor, Read},
    path::Path,
};

use docx_rs::{
    DocumentChild, ParagraphChild, RunChild, TableCellContent, TableChild, TableRowChild,
};
use once_cell::sync::Lazy;
use xml::{
    name::OwnedName,
    reader::{EventReader, XmlEvent},
};

use crate::errors::{AppError, AppResult};

pub const MIME_PDF: &str = "application/pdf";
pub const MIME_DOCX: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const MIME_DOC: &str = "application/msword";
pub const MIME_PPTX: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation";
pub const MIME_TEXT: &str = "text/plain";

static SLIDE_ENTRY: Lazy<regex::Regex> = Lazy::new(|| {
    regex::Regex::new(r"^ppt/slides/slide(\d+)\.xml$").expect("SLIDE_ENTRY is a valid regex pattern")
});

const DRAWINGML_NS: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Word,
    Presentation,
    PlainText,
}

impl DocumentKind {
    /// Resolves the declared media type of an upload; parameters such as
    /// `; charset=utf-8` are ignored.
    pub fn from_mime(mime_type: &str) -> Option<Self> {
        let essence = mime_type.split(';').next().unwrap_or_default().trim();
        match essence {
            MIME_PDF => Some(DocumentKind::Pdf),
            MIME_DOCX | MIME_DOC => Some(DocumentKind::Word),
            MIME_PPTX => Some(DocumentKind::Presentation),
            MIME_TEXT => Some(DocumentKind::PlainText),
            _ => None,
        }
    }
}

/// Turns an uploaded file into plain text. Implementations block.
#[cfg_attr(test, mockall::automock)]
pub trait TextExtractor: Send + Sync {
    fn extract(&self, path: &Path, mime_type: &str) -> AppResult<String>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct DocumentTextExtractor;

impl TextExtractor for DocumentTextExtractor {
    fn extract(&self, path: &Path, mime_type: &str) -> AppResult<String> {
        let kind = DocumentKind::from_mime(mime_type)
            .ok_or_else(|| AppError::UnsupportedFileType(mime_type.to_string()))?;

        let bytes = fs::read(path)?;
        log::debug!("Extracting {:?} document of {} bytes", kind, bytes.len());

        match kind {
            DocumentKind::Pdf => extract_pdf(&bytes),
            DocumentKind::Word => extract_word(&bytes),
            DocumentKind::Presentation => extract_presentation(&bytes),
            DocumentKind::PlainText => Ok(String::from_utf8_lossy(&bytes).into_owned()),
        }
    }
}

fn extract_pdf(bytes: &[u8]) -> AppResult<String> {
    pdf_extract::extract_text_from_mem(bytes)
        .map_err(|e| AppError::FileProcessing(format!("Unable to read PDF: {}", e)))
}

fn extract_word(bytes: &[u8]) -> AppResult<String> {
    let docx = docx_rs::read_docx(bytes)
        .map_err(|e| AppError::FileProcessing(format!("Unable to read Word document: {:?}", e)))?;

    let mut paragraphs = Vec::new();
    for child in &docx.document.children {
        match child {
            DocumentChild::Paragraph(paragraph) => paragraphs.push(paragraph_text(&paragraph.children)),
            DocumentChild::Table(table) => {
                for row in &table.rows {
                    let TableChild::TableRow(row) = row;
                    for cell in &row.cells {
                        let TableRowChild::TableCell(cell) = cell;
                        for content in &cell.children {
                            if let TableCellContent::Paragraph(paragraph) = content {
                                paragraphs.push(paragraph_text(&paragraph.children));
                            }
                        }
                    }
                }
            }
            _ => {}
        }
    }

    paragraphs.retain(|text| !text.trim().is_empty());
    Ok(paragraphs.join("\n\n"))
}

fn paragraph_text(children: &[ParagraphChild]) -> String {
    let mut text = String::new();
    for child in children {
        match child {
            ParagraphChild::Run(run) => {
                for run_child in &run.children {
                    if let RunChild::Text(t) = run_child {
                        text.push_str(&t.text);
                    }
                }
            }
            ParagraphChild::Hyperlink(link) => text.push_str(&paragraph_text(&link.children)),
            _ => {}
        }
    }
    text
}

fn extract_presentation(bytes: &[u8]) -> AppResult<String> {
    let mut archive = open_archive(bytes)?;

    let mut slides: Vec<(u32, String)> = archive
        .file_names()
        .filter_map(|name| {
            let number = SLIDE_ENTRY.captures(name)?[1].parse::<u32>().ok()?;
            Some((number, name.to_string()))
        })
        .collect();
    slides.sort_by_key(|(number, _)| *number);

    let mut texts = Vec::with_capacity(slides.len());
    for (_, name) in slides {
        let xml = read_entry(&mut archive, &name)?;
        let text = slide_text(&xml)
            .map_err(|e| AppError::FileProcessing(format!("Malformed {}: {}", name, e)))?;
        let text = text.trim();
        if !text.is_empty() {
            texts.push(text.to_string());
        }
    }

    if texts.is_empty() {
        return Err(AppError::FileProcessing("No text found".to_string()));
    }

    Ok(texts.join("\n"))
}

/// Text runs (`a:t`) of one slide, space separated.
fn slide_text(xml: &str) -> Result<String, xml::reader::Error> {
    let mut runs = Vec::new();
    let mut current: Option<String> = None;

    for event in EventReader::new(xml.as_bytes()) {
        match event? {
            XmlEvent::StartElement { name, .. } if is_text_run(&name) => {
                current = Some(String::new());
            }
            XmlEvent::Characters(text) | XmlEvent::Whitespace(text) | XmlEvent::CData(text) => {
                if let Some(run) = current.as_mut() {
                    run.push_str(&text);
                }
            }
            XmlEvent::EndElement { name } if is_text_run(&name) => {
                if let Some(run) = current.take() {
                    runs.push(run);
                }
            }
            _ => {}
        }
    }

    Ok(runs.join(" "))
}

fn is_text_run(name: &OwnedName) -> bool {
    name.local_name == "t" && name.namespace.as_deref() == Some(DRAWINGML_NS)
}

fn open_archive(bytes: &[u8]) -> AppResult<zip::ZipArchive<Cursor<&[u8]>>> {
    zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| AppError::FileProcessing(format!("Unable to open document archive: {}", e)))
}

fn read_entry(archive: &mut zip::ZipArchive<Cursor<&[u8]>>, name: &str) -> AppResult<String> {
    let mut entry = archive
        .by_name(name)
        .map_err(|e| AppError::FileProcessing(format!("Missing {}: {}", name, e)))?;

    let mut xml = String::new();
    entry
        .read_to_string(&mut xml)
        .map_err(|e| AppError::FileProcessing(format!("Unable to read {}: {}", name, e)))?;
    Ok(xml)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn zip_with(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut buffer = Cursor::new(Vec::new());
        {
            let mut writer = zip::ZipWriter::new(&mut buffer);
            let options = zip::write::SimpleFileOptions::default();
            for (name, content) in entries {
                writer.start_file(*name, options).unwrap();
                writer.write_all(content.as_bytes()).unwrap();
            }
            writer.finish().unwrap();
        }
        buffer.into_inner()
    }

    /// Packs a real `.docx` with one paragraph per entry, then splices each
    /// entry into `word/document.xml` as raw run XML.
    fn docx_with(paragraphs: &[&str]) -> Vec<u8> {
        let marker = |i: usize| format!("PARAGRAPH_{}_END", i);

        let mut docx = docx_rs::Docx::new();
        for i in 0..paragraphs.len() {
            docx = docx.add_paragraph(
                docx_rs::Paragraph::new().add_run(docx_rs::Run::new().add_text(marker(i))),
            );
        }
        let mut packed = Cursor::new(Vec::new());
        docx.build().pack(&mut packed).unwrap();

        let mut source = zip::ZipArchive::new(Cursor::new(packed.into_inner())).unwrap();
        let mut buffer = Cursor::new(Vec::new());
        {
            let mut writer = zip::ZipWriter::new(&mut buffer);
            for index in 0..source.len() {
                let mut entry = source.by_index(index).unwrap();
                let name = entry.name().to_string();
                let mut content = Vec::new();
                entry.read_to_end(&mut content).unwrap();

                if name == "word/document.xml" {
                    let mut xml = String::from_utf8(content).unwrap();
                    for (i, paragraph) in paragraphs.iter().enumerate() {
                        xml = xml.replace(&marker(i), paragraph);
                    }
                    content = xml.into_bytes();
                }

                writer
                    .start_file(name, zip::write::SimpleFileOptions::default())
                    .unwrap();
                writer.write_all(&content).unwrap();
            }
            writer.finish().unwrap();
        }
        buffer.into_inner()
    }

    fn slide(runs: &[&str]) -> String {
        let runs: String = runs
            .iter()
            .map(|text| format!("<a:r><a:t>{}</a:t></a:r>", text))
            .collect();
        format!(
            r#"<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:cSld><p:spTree><p:sp><p:txBody><a:p>{}</a:p></p:txBody></p:sp></p:spTree></p:cSld></p:sld>"#,
            runs
        )
    }

    fn write_temp(bytes: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(bytes).unwrap();
        file
    }

    #[test]
    fn from_mime_recognises_supported_types() {
        assert_eq!(DocumentKind::from_mime(MIME_PDF), Some(DocumentKind::Pdf));
        assert_eq!(DocumentKind::from_mime(MIME_DOC), Some(DocumentKind::Word));
        assert_eq!(DocumentKind::from_mime(MIME_DOCX), Some(DocumentKind::Word));
        assert_eq!(DocumentKind::from_mime(MIME_PPTX), Some(DocumentKind::Presentation));
        assert_eq!(
            DocumentKind::from_mime("text/plain; charset=utf-8"),
            Some(DocumentKind::PlainText)
        );
        assert_eq!(DocumentKind::from_mime("image/png"), None);
    }

    #[test]
    fn plain_text_is_read_verbatim() {
        let file = write_temp("Photosynthesis converts light. Plants grow.".as_bytes());

        let text = DocumentTextExtractor.extract(file.path(), MIME_TEXT).unwrap();

        assert_eq!(text, "Photosynthesis converts light. Plants grow.");
    }

    #[test]
    fn unsupported_type_is_rejected() {
        let file = write_temp(b"\x89PNG");

        let err = DocumentTextExtractor.extract(file.path(), "image/png").unwrap_err();

        assert!(matches!(err, AppError::UnsupportedFileType(_)));
        assert_eq!(err.to_string(), "Unsupported file type: image/png");
    }

    #[test]
    fn word_document_paragraphs_are_separated() {
        let file = write_temp(&docx_with(&["First paragraph", "", "Second paragraph"]));

        let text = DocumentTextExtractor.extract(file.path(), MIME_DOCX).unwrap();

        assert_eq!(text, "First paragraph\n\nSecond paragraph");
    }

    #[test]
    fn word_character_references_are_decoded() {
        let file = write_temp(&docx_with(&[
            "Newton&#8217;s law &#x2014; F=ma",
            "Salt &amp; pepper &lt;3",
        ]));

        let text = DocumentTextExtractor.extract(file.path(), MIME_DOCX).unwrap();

        assert_eq!(text, "Newton\u{2019}s law \u{2014} F=ma\n\nSalt & pepper <3");
    }

    #[test]
    fn legacy_word_binary_fails_processing() {
        let file = write_temp(b"\xD0\xCF\x11\xE0 not a zip");

        let err = DocumentTextExtractor.extract(file.path(), MIME_DOC).unwrap_err();

        assert!(matches!(err, AppError::FileProcessing(_)));
    }

    #[test]
    fn presentation_slides_are_read_in_slide_order() {
        let slide_10 = slide(&["Tenth", "end"]);
        let slide_2 = slide(&["Second", "end"]);
        let slide_1 = slide(&["First", "end"]);
        let empty = slide(&[]);
        let file = write_temp(&zip_with(&[
            ("ppt/slides/slide10.xml", &slide_10),
            ("ppt/slides/slide2.xml", &slide_2),
            ("ppt/slides/slide1.xml", &slide_1),
            ("ppt/slides/_rels/slide1.xml.rels", "<Relationships/>"),
            ("ppt/slides/slide3.xml", &empty),
        ]));

        let text = DocumentTextExtractor.extract(file.path(), MIME_PPTX).unwrap();

        assert_eq!(text, "First end\nSecond end\nTenth end");
    }

    #[test]
    fn presentation_character_references_are_decoded() {
        let deck = slide(&["Newton&#8217;s law", "&#x2014; F=ma &amp; more"]);
        let file = write_temp(&zip_with(&[("ppt/slides/slide1.xml", &deck)]));

        let text = DocumentTextExtractor.extract(file.path(), MIME_PPTX).unwrap();

        assert_eq!(text, "Newton\u{2019}s law \u{2014} F=ma & more");
    }

    #[test]
    fn malformed_slide_fails_processing() {
        let file = write_temp(&zip_with(&[("ppt/slides/slide1.xml", "<p:sld><a:t>oops")]));

        let err = DocumentTextExtractor.extract(file.path(), MIME_PPTX).unwrap_err();

        assert!(matches!(err, AppError::FileProcessing(_)));
    }

    #[test]
    fn presentation_without_text_fails() {
        let empty = slide(&[]);
        let file = write_temp(&zip_with(&[("ppt/slides/slide1.xml", &empty)]));

        let err = DocumentTextExtractor.extract(file.path(), MIME_PPTX).unwrap_err();

        assert_eq!(err.to_string(), "File processing failed: No text found");
    }
}
