use crate::error::{ChatbotError, Result};
use crate::models::*;
use std::panic;

pub const SUPPORTED_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "pdf"];

/// Turns uploads into payloads the generation service accepts.
pub struct DocumentExtractor;

impl DocumentExtractor {
    pub fn new() -> Self {
        Self
    }

    pub fn extract(&self, file: Option<&UploadedFile>) -> Result<ContentPayload> {
        let file = file.ok_or(ChatbotError::NoFileProvided)?;

        match file.extension().as_deref() {
            Some("jpg") | Some("jpeg") | Some("png") => Ok(self.image_payload(file)),
            Some("pdf") => {
                log::info!("Extracting text from PDF: {}", file.name);
                let pages = self.extract_pages(&file.data)?;
                log::info!("Extracted {} pages from {}", pages.len(), file.name);
                Ok(ContentPayload::Text(join_pages(&pages)))
            }
            _ => Err(ChatbotError::UnsupportedFileType(file.name.clone())),
        }
    }

    fn image_payload(&self, file: &UploadedFile) -> ContentPayload {
        let mime_type = file
            .mime_type
            .clone()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| match file.extension().as_deref() {
                Some("png") => "image/png".to_string(),
                _ => "image/jpeg".to_string(),
            });

        log::info!("Passing image {} through as {}", file.name, mime_type);
        ContentPayload::Image {
            mime_type,
            data: file.data.clone(),
        }
    }

    fn extract_pages(&self, data: &[u8]) -> Result<Vec<String>> {
        // pdf-extract panics on some malformed documents
        match panic::catch_unwind(|| pdf_extract::extract_text_from_mem_by_pages(data)) {
            Ok(Ok(pages)) => Ok(pages),
            Ok(Err(e)) => Err(ChatbotError::PdfExtraction(e.to_string())),
            Err(_) => Err(ChatbotError::PdfExtraction(
                "document could not be parsed".to_string(),
            )),
        }
    }
}

impl Default for DocumentExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// One newline between consecutive pages; empty pages still count.
pub fn join_pages<S: AsRef<str>>(pages: &[S]) -> String {
    pages
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(name: &str, mime: Option<&str>, data: &[u8]) -> UploadedFile {
        UploadedFile::new(name, mime.map(str::to_string), data.to_vec())
    }

    #[test]
    fn test_missing_file() {
        let extractor = DocumentExtractor::new();
        assert!(matches!(
            extractor.extract(None),
            Err(ChatbotError::NoFileProvided)
        ));
    }

    #[test]
    fn test_unsupported_extensions() {
        let extractor = DocumentExtractor::new();
        for name in ["notes.txt", "archive.tar.gz", "README", "image.gif"] {
            let file = upload(name, Some("application/octet-stream"), b"data");
            match extractor.extract(Some(&file)) {
                Err(ChatbotError::UnsupportedFileType(n)) => assert_eq!(n, name),
                other => panic!("expected UnsupportedFileType for {}, got {:?}", name, other),
            }
        }
    }

    #[test]
    fn test_image_bytes_pass_through_untouched() {
        let extractor = DocumentExtractor::new();
        // Not a real PNG: images are never decoded here
        let file = upload("receipt.PNG", Some("image/webp"), &[1, 2, 3, 4]);

        let payload = extractor.extract(Some(&file)).unwrap();
        assert_eq!(
            payload,
            ContentPayload::Image {
                mime_type: "image/webp".to_string(),
                data: vec![1, 2, 3, 4],
            }
        );
    }

    #[test]
    fn test_image_mime_inferred_when_undeclared() {
        let extractor = DocumentExtractor::new();

        let png = upload("a.png", None, b"x");
        let jpeg = upload("b.jpeg", Some(""), b"x");

        match extractor.extract(Some(&png)).unwrap() {
            ContentPayload::Image { mime_type, .. } => assert_eq!(mime_type, "image/png"),
            other => panic!("unexpected payload {:?}", other),
        }
        match extractor.extract(Some(&jpeg)).unwrap() {
            ContentPayload::Image { mime_type, .. } => assert_eq!(mime_type, "image/jpeg"),
            other => panic!("unexpected payload {:?}", other),
        }
    }

    #[test]
    fn test_garbage_pdf_is_an_extraction_error() {
        let extractor = DocumentExtractor::new();
        let file = upload("report.pdf", Some("application/pdf"), b"definitely not a pdf");

        assert!(matches!(
            extractor.extract(Some(&file)),
            Err(ChatbotError::PdfExtraction(_))
        ));
    }

    /// Builds a PDF with one page per entry; `None` gives a page with an
    /// empty content stream.
    fn pdf_with_pages(pages: &[Option<&str>]) -> Vec<u8> {
        use lopdf::content::{Content, Operation};
        use lopdf::{dictionary, Document, Object, Stream};

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids = Vec::new();
        for text in pages {
            let operations = match text {
                Some(text) => vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 24.into()]),
                    Operation::new("Td", vec![100.into(), 600.into()]),
                    Operation::new("Tj", vec![Object::string_literal(*text)]),
                    Operation::new("ET", vec![]),
                ],
                None => Vec::new(),
            };
            let content = Content { operations }.encode().unwrap();
            let content_id = doc.add_object(Stream::new(dictionary! {}, content));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            });
            kids.push(Object::Reference(page_id));
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }

    #[test]
    fn test_pdf_pages_are_joined_with_blank_page_kept() {
        let extractor = DocumentExtractor::new();
        let data = pdf_with_pages(&[Some("Alpha"), None, Some("Omega")]);

        let pages = extractor.extract_pages(&data).unwrap();
        assert_eq!(pages.len(), 3);
        assert!(pages[0].contains("Alpha"));
        assert!(pages[1].trim().is_empty());
        assert!(pages[2].contains("Omega"));

        let file = upload("notes.pdf", Some("application/pdf"), &data);
        let text = match extractor.extract(Some(&file)).unwrap() {
            ContentPayload::Text(text) => text,
            other => panic!("expected text, got {:?}", other),
        };
        assert_eq!(text, join_pages(&pages));

        // Two separators between three pages, on top of any newlines the
        // pages carry themselves
        let inner: usize = pages.iter().map(|p| p.matches('\n').count()).sum();
        assert_eq!(text.matches('\n').count(), inner + 2);
        assert!(text.find("Alpha") < text.find("Omega"));
    }

    #[test]
    fn test_join_pages_separator_count() {
        let pages = ["first page", "", "third page", ""];
        let text = join_pages(&pages);
        assert_eq!(text, "first page\n\nthird page\n");
        assert_eq!(text.matches('\n').count(), pages.len() - 1);

        let blank: [&str; 3] = ["", "", ""];
        assert_eq!(join_pages(&blank), "\n\n");
        assert_eq!(join_pages::<&str>(&[]), "");
        assert_eq!(join_pages(&["only"]), "only");
    }
}
