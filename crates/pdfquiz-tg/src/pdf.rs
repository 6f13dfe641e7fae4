//! Plain text extraction from PDF documents.

use crate::prelude::*;
use crate::Result;
use std::panic::AssertUnwindSafe;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub(crate) enum ExtractionError {
    #[error("Failed to load the PDF document")]
    Load { source: lopdf::Error },

    #[error("Failed to extract text from page {page}")]
    ExtractPage { page: u32, source: lopdf::Error },

    #[error("PDF library panicked while extracting text: {message}")]
    Panicked { message: String },
}

/// Same as [`try_extract_text`], but never fails. Errors are logged and
/// result in an empty string.
pub(crate) async fn extract_text(path: &Path) -> String {
    try_extract_text(path.to_owned())
        .await
        .unwrap_or_else(|err| {
            error!(err = tracing_err(&err), "Error extracting PDF text");
            String::new()
        })
}

/// Concatenates the text of all pages in the document order, each followed
/// by a newline. Pages without any text are skipped.
pub(crate) async fn try_extract_text(path: PathBuf) -> Result<String> {
    let text = crate::util::tokio::spawn_blocking(move || {
        std::panic::catch_unwind(AssertUnwindSafe(|| extract_text_blocking(&path)))
            .unwrap_or_else(|payload| {
                let message = payload
                    .downcast_ref::<String>()
                    .cloned()
                    .or_else(|| payload.downcast_ref::<&str>().map(|&s| s.to_owned()))
                    .unwrap_or_else(|| "<unknown>".to_owned());
                Err(ExtractionError::Panicked { message })
            })
    })
    .with_duration_log("Extracted PDF text")
    .await?;

    Ok(text)
}

fn extract_text_blocking(path: &Path) -> std::result::Result<String, ExtractionError> {
    let doc = lopdf::Document::load(path).map_err(|source| ExtractionError::Load { source })?;

    let mut text = String::new();

    // Page numbers are the keys of a sorted map, so this is the document order
    for page in doc.get_pages().into_keys() {
        let page_text = doc
            .extract_text(&[page])
            .map_err(|source| ExtractionError::ExtractPage { page, source })?;

        if page_text.trim().is_empty() {
            continue;
        }

        text.push_str(&page_text);
        text.push('\n');
    }

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Document, Object, Stream};
    use std::io::Write;

    /// Builds a PDF with one page per entry. `None` produces a page without
    /// any text operators.
    fn build_pdf(pages: &[Option<&str>]) -> tempfile::NamedTempFile {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let kids: Vec<Object> = pages
            .iter()
            .map(|text| {
                let operations = match text {
                    Some(text) => vec![
                        Operation::new("BT", vec![]),
                        Operation::new("Tf", vec!["F1".into(), 24.into()]),
                        Operation::new("Td", vec![100.into(), 600.into()]),
                        Operation::new("Tj", vec![Object::string_literal(*text)]),
                        Operation::new("ET", vec![]),
                    ],
                    None => vec![],
                };
                let content = Content { operations }.encode().unwrap();
                let content_id = doc.add_object(Stream::new(dictionary! {}, content));
                let page_id = doc.add_object(dictionary! {
                    "Type" => "Page",
                    "Parent" => pages_id,
                    "Contents" => content_id,
                });
                page_id.into()
            })
            .collect();

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut file = tempfile::Builder::new().suffix(".pdf").tempfile().unwrap();
        doc.save_to(&mut file).unwrap();
        file.flush().unwrap();
        file
    }

    #[test_log::test(tokio::test)]
    async fn single_page() {
        let file = build_pdf(&[Some("Hello World")]);

        let text = extract_text(file.path()).await;

        assert!(text.contains("Hello World"), "{text:?}");
        assert!(text.ends_with('\n'), "{text:?}");
    }

    #[test_log::test(tokio::test)]
    async fn pages_keep_document_order_and_blank_pages_are_skipped() {
        let file = build_pdf(&[Some("Photosynthesis"), None, Some("Chlorophyll")]);

        let text = extract_text(file.path()).await;

        let first = text.find("Photosynthesis").unwrap();
        let second = text.find("Chlorophyll").unwrap();
        assert!(first < second, "{text:?}");
    }

    #[test_log::test(tokio::test)]
    async fn document_without_text_yields_empty_string() {
        let file = build_pdf(&[None, None]);

        let text = extract_text(file.path()).await;

        assert_eq!(text, "");
    }

    #[test_log::test(tokio::test)]
    async fn not_a_pdf() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"definitely not a PDF document").unwrap();
        file.flush().unwrap();

        assert!(try_extract_text(file.path().to_owned()).await.is_err());
        assert_eq!(extract_text(file.path()).await, "");
    }

    #[test_log::test(tokio::test)]
    async fn missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.pdf");

        let err = try_extract_text(path.clone()).await.unwrap_err();

        assert!(matches!(
            err.kind(),
            crate::ErrorKind::Extraction {
                source: ExtractionError::Load { .. }
            }
        ));
        assert_eq!(extract_text(&path).await, "");
    }
}
