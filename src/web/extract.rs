//! Turning fetched bytes into plain text.
//!
//! HTML goes through a readability-style pass that keeps the text blocks of
//! the page's main content root (`article`, then `main`, then `body`). When
//! that finds nothing, a crude regex pass strips `<script>` blocks and every
//! remaining tag. PDFs are staged to a temporary file, parsed with `lopdf`
//! and their pages concatenated in page order.

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tempfile::NamedTempFile;
use tracing::{debug, warn};

static SCRIPT_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>").expect("valid regex"));

static ANY_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<.*?>").expect("valid regex"));

const CONTENT_BLOCKS: &str = "h1, h2, h3, h4, h5, h6, p, li, pre, blockquote";

const BOILERPLATE_ANCESTORS: &[&str] = &[
    "nav", "header", "footer", "aside", "form", "script", "style", "noscript",
];

/// How a URL's payload should be decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Html,
    Pdf,
}

impl DocumentKind {
    /// `.pdf` suffix (any case) selects the PDF path; everything else is HTML.
    pub fn from_url(url: &str) -> Self {
        if url.to_ascii_lowercase().ends_with(".pdf") {
            DocumentKind::Pdf
        } else {
            DocumentKind::Html
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("failed to stage PDF on disk: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed PDF: {0}")]
    Pdf(String),

    #[error("PDF extraction worker failed: {0}")]
    Worker(String),
}

/// A fetched body, already decoded for its kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// Markup decoded with the charset the server declared.
    Html(String),
    Pdf(Vec<u8>),
}

impl Payload {
    pub fn kind(&self) -> DocumentKind {
        match self {
            Payload::Html(_) => DocumentKind::Html,
            Payload::Pdf(_) => DocumentKind::Pdf,
        }
    }
}

/// Extracts plain text from HTML and PDF payloads.
#[derive(Debug, Clone, Default)]
pub struct ContentExtractor {
    scratch_dir: Option<PathBuf>,
}

impl ContentExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage PDF temp files in `dir` instead of the system temp directory.
    pub fn with_scratch_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            scratch_dir: Some(dir.into()),
        }
    }

    pub async fn extract(&self, payload: Payload, url: &str) -> Result<String, ExtractError> {
        match payload {
            Payload::Html(html) => Ok(extract_html(&html, url)),
            Payload::Pdf(bytes) => {
                let scratch_dir = self.scratch_dir.clone();
                // lopdf parsing is CPU-bound; keep it off the async workers.
                tokio::task::spawn_blocking(move || extract_pdf(&bytes, scratch_dir.as_deref()))
                    .await
                    .map_err(|e| ExtractError::Worker(e.to_string()))?
            }
        }
    }
}

/// Main-content text of an HTML page, falling back to tag stripping.
pub fn extract_html(html: &str, url: &str) -> String {
    let main = readable_text(html);
    if !main.trim().is_empty() {
        return main;
    }

    debug!(url, "Readability pass found no content, stripping tags instead");
    html_quick_clean(html)
}

/// Readability-style extraction: text blocks under the main content root.
///
/// Returns an empty string when the page has no recognizable text blocks.
pub fn readable_text(html: &str) -> String {
    let document = Html::parse_document(html);

    let root = ["article", "main", "body"].iter().find_map(|name| {
        Selector::parse(name)
            .ok()
            .and_then(|sel| document.select(&sel).next())
    });
    let Some(root) = root else {
        return String::new();
    };
    let Ok(block_sel) = Selector::parse(CONTENT_BLOCKS) else {
        return String::new();
    };

    let mut seen = HashSet::new();
    let mut blocks: Vec<String> = Vec::new();
    for elem in root.select(&block_sel) {
        if in_boilerplate(elem) {
            continue;
        }
        let text = compact_ws(&text_content(elem));
        if text.is_empty() || !seen.insert(text.clone()) {
            continue;
        }
        blocks.push(text);
    }

    blocks.join("\n")
}

/// Crude removal of script blocks and then all remaining tags.
///
/// Never fails, whatever the markup looks like.
pub fn html_quick_clean(html: &str) -> String {
    let without_scripts = SCRIPT_BLOCK.replace_all(html, "");
    ANY_TAG.replace_all(&without_scripts, "").into_owned()
}

fn in_boilerplate(elem: ElementRef<'_>) -> bool {
    elem.ancestors()
        .filter_map(ElementRef::wrap)
        .any(|a| BOILERPLATE_ANCESTORS.contains(&a.value().name()))
}

fn text_content(elem: ElementRef<'_>) -> String {
    elem.text().collect::<Vec<_>>().join(" ")
}

fn compact_ws(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Page-ordered text of a PDF.
///
/// The payload is written to a temp file owned by this call; the file is
/// removed when `staged` drops, on success and on every error path.
fn extract_pdf(bytes: &[u8], scratch_dir: Option<&Path>) -> Result<String, ExtractError> {
    let mut staged = match scratch_dir {
        Some(dir) => NamedTempFile::new_in(dir)?,
        None => NamedTempFile::new()?,
    };
    staged.write_all(bytes)?;
    staged.flush()?;

    let document =
        lopdf::Document::load(staged.path()).map_err(|e| ExtractError::Pdf(e.to_string()))?;

    let mut text = String::new();
    // get_pages is a BTreeMap keyed by page number, so iteration is in page order
    for page_number in document.get_pages().keys() {
        match document.extract_text(&[*page_number]) {
            Ok(page_text) => text.push_str(&page_text),
            Err(error) => warn!(page = page_number, %error, "Skipping unreadable PDF page"),
        }
    }

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("https://example.com/report.pdf", DocumentKind::Pdf)]
    #[case("https://example.com/REPORT.PDF", DocumentKind::Pdf)]
    #[case("https://example.com/report.html", DocumentKind::Html)]
    #[case("https://example.com/pdf/overview", DocumentKind::Html)]
    #[case("https://example.com/report.pdf?download=1", DocumentKind::Html)]
    fn test_kind_from_url(#[case] url: &str, #[case] expected: DocumentKind) {
        assert_eq!(DocumentKind::from_url(url), expected);
    }

    #[test]
    fn test_readable_text_prefers_article() {
        let html = r#"
            <html><body>
              <nav><ul><li>Home</li><li>About</li></ul></nav>
              <article>
                <h1>Quarterly results</h1>
                <p>Revenue grew   7% year over year.</p>
                <p>Margins were stable.</p>
              </article>
              <p>Unrelated footer text</p>
            </body></html>
        "#;

        let text = readable_text(html);
        assert_eq!(
            text,
            "Quarterly results\nRevenue grew 7% year over year.\nMargins were stable."
        );
    }

    #[test]
    fn test_readable_text_skips_boilerplate_in_body() {
        let html = r#"
            <body>
              <header><p>Site banner</p></header>
              <p>The actual content.</p>
              <footer><p>Copyright</p></footer>
            </body>
        "#;

        assert_eq!(readable_text(html), "The actual content.");
    }

    #[test]
    fn test_extract_html_falls_back_to_tag_stripping() {
        let html = "<div><script>var x = 1;</script><span>Only spans here</span></div>";
        let text = extract_html(html, "https://example.com");
        assert_eq!(text, "Only spans here");
    }

    #[test]
    fn test_quick_clean_strips_scripts_before_tags() {
        let html = "<script type=\"text/javascript\">alert('<b>x</b>')</script><b>bold</b> text";
        assert_eq!(html_quick_clean(html), "bold text");
    }

    #[test]
    fn test_quick_clean_tolerates_malformed_markup() {
        assert_eq!(html_quick_clean("<p>unclosed <b>tag"), "unclosed tag");
        assert_eq!(html_quick_clean("a < b and c > d"), "a  d");
        assert_eq!(html_quick_clean("<<<>>>"), ">>");
        assert_eq!(html_quick_clean(""), "");
    }

    #[tokio::test]
    async fn test_malformed_pdf_is_an_error_and_cleans_up() {
        let scratch = tempfile::TempDir::new().unwrap();
        let extractor = ContentExtractor::with_scratch_dir(scratch.path());

        let result = extractor
            .extract(
                Payload::Pdf(b"definitely not a pdf".to_vec()),
                "https://x/doc.pdf",
            )
            .await;

        assert!(matches!(result, Err(ExtractError::Pdf(_))));
        let leftovers = std::fs::read_dir(scratch.path()).unwrap().count();
        assert_eq!(leftovers, 0, "temp PDF must be deleted on failure");
    }

    #[tokio::test]
    async fn test_html_payload_keeps_non_ascii_text() {
        let extractor = ContentExtractor::new();
        let payload = Payload::Html("<p>Café au lait</p>".to_string());
        assert_eq!(payload.kind(), DocumentKind::Html);

        let text = extractor.extract(payload, "https://x").await.unwrap();
        assert_eq!(text, "Café au lait");
    }

    #[tokio::test]
    async fn test_unreadable_page_is_skipped() {
        let scratch = tempfile::TempDir::new().unwrap();
        let extractor = ContentExtractor::with_scratch_dir(scratch.path());

        let text = extractor
            .extract(
                Payload::Pdf(pdf_with_broken_second_page("First page text")),
                "https://x/doc.pdf",
            )
            .await
            .unwrap();
        assert!(text.contains("First page text"), "got {text:?}");
    }

    /// Two-page PDF whose second page uses an Identity-H font with no ToUnicode map.
    fn pdf_with_broken_second_page(text: &str) -> Vec<u8> {
        use lopdf::content::{Content, Operation};
        use lopdf::{dictionary, Document, Object, Stream};

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
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 24.into()]),
                Operation::new("Td", vec![72.into(), 700.into()]),
                Operation::new("Tj", vec![Object::string_literal(text)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let good_page = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        let undecodable_font = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type0",
            "BaseFont" => "NoSuchCID",
            "Encoding" => "Identity-H",
        });
        let broken_page = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => dictionary! {
                "Font" => dictionary! { "F2" => undecodable_font },
            },
        });
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => vec![good_page.into(), broken_page.into()],
            "Count" => 2,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }
}
