//! Splitting rendered content at the author's summary divider.

use crate::markup::Markup;

/// Marker the renderer sees in place of the author's `<!--more-->`
pub const SUMMARY_DIVIDER: &str = "HUGOMORE42";

/// What authors write in their source to mark the end of the summary
pub const SOURCE_DIVIDER: &str = "<!--more-->";

const RST_DOCUMENT_OPEN: &str = "<div class=\"document\">";
const RST_DOCUMENT_CLOSE: &str = "</div>";

/// Rendered content split at an explicit divider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryContent {
    pub summary: String,
    /// The whole content with the divider removed
    pub content: String,
    pub content_without_summary: String,
    pub truncated: bool,
}

/// Tags delimiting a paragraph block in the given dialect's HTML
fn block_tags(markup: Markup) -> (&'static str, &'static str) {
    match markup {
        Markup::Asciidoc => ("<div class=\"paragraph\">", "</div>"),
        _ => ("<p>", "</p>"),
    }
}

/// Split rendered HTML at [`SUMMARY_DIVIDER`].
///
/// Returns `None` when the content has no divider. The split point is moved
/// out of the paragraph enclosing the divider: past its end tag when that is
/// closer, otherwise before its start tag.
pub fn split_user_defined_summary(markup: Markup, content: &str) -> Option<SummaryContent> {
    let content = content.trim();
    let divider_at = content.find(SUMMARY_DIVIDER)?;
    let (start_tag, end_tag) = block_tags(markup);

    let before = &content[..divider_at];
    let after = &content[divider_at + SUMMARY_DIVIDER.len()..];

    // Only tags that actually enclose the divider count
    let from_start = before
        .rfind(start_tag)
        .filter(|&i| !before[i..].contains(end_tag))
        .map(|i| divider_at - i - start_tag.len());
    let from_end = after
        .find(end_tag)
        .filter(|&i| !after[..i].contains(start_tag));

    let split_at = match (from_start, from_end) {
        (Some(start), Some(end)) if end <= start => divider_at + end + end_tag.len(),
        (None, Some(_)) => divider_at,
        (Some(start), Some(_)) => divider_at - start - start_tag.len(),
        (_, None) => divider_at,
    };

    let without_divider = format!("{before}{after}");
    let summary = without_divider[..split_at].trim();
    let remainder = without_divider[split_at..].trim();
    let truncated = !remainder.is_empty();

    let (summary, content_without_summary) = if markup == Markup::Rst {
        (
            format!("{summary}{RST_DOCUMENT_CLOSE}"),
            format!("{RST_DOCUMENT_OPEN}{remainder}"),
        )
    } else {
        (summary.to_string(), remainder.to_string())
    };

    Some(SummaryContent {
        summary,
        content: without_divider.trim().to_string(),
        content_without_summary,
        truncated,
    })
}
