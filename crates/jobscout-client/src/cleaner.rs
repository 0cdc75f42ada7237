use std::sync::Arc;

use htmd::HtmlToMarkdown;

/// Turns HTML job descriptions into Markdown text.
///
/// Plain-text descriptions pass through untouched. Conversion failures keep
/// the raw text so a bad description never drops a posting.
pub struct DescriptionCleaner {
    converter: Arc<HtmlToMarkdown>,
}

impl Clone for DescriptionCleaner {
    fn clone(&self) -> Self {
        Self {
            converter: Arc::clone(&self.converter),
        }
    }
}

impl DescriptionCleaner {
    pub fn new() -> Self {
        let converter = HtmlToMarkdown::builder()
            .skip_tags(vec![
                "script", "style", "nav", "footer", "header", "aside", "noscript", "iframe", "svg",
                "img",
            ])
            .build();

        Self {
            converter: Arc::new(converter),
        }
    }

    pub fn clean(&self, raw: &str) -> String {
        if !looks_like_html(raw) {
            return raw.trim().to_string();
        }
        match self.converter.convert(raw) {
            Ok(markdown) => markdown.trim().to_string(),
            Err(e) => {
                tracing::debug!(error = %e, "HTML conversion failed, keeping raw description");
                raw.trim().to_string()
            }
        }
    }
}

impl Default for DescriptionCleaner {
    fn default() -> Self {
        Self::new()
    }
}

fn looks_like_html(s: &str) -> bool {
    s.contains('<') && s.contains('>')
}
