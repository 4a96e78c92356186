//! The seam between pages and markup renderers.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::markup::Markup;
use crate::value::FrontMatter;

/// Options handed to renderers, site defaults overlaid by the page's
/// `rendering` parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderingConfig {
    pub smart_punctuation: bool,
    pub angled_quotes: bool,
    pub fractions: bool,
    pub href_target_blank: bool,
    pub smart_dashes: bool,
    pub latex_dashes: bool,
    pub plain_id_anchors: bool,
    /// Resolve relative links against the source file instead of the output
    pub source_relative_links_eval: bool,
    pub extensions: Vec<String>,
}

impl Default for RenderingConfig {
    fn default() -> Self {
        Self {
            smart_punctuation: true,
            angled_quotes: false,
            fractions: true,
            href_target_blank: false,
            smart_dashes: true,
            latex_dashes: true,
            plain_id_anchors: true,
            source_relative_links_eval: false,
            extensions: Vec::new(),
        }
    }
}

impl RenderingConfig {
    /// Overlay page-level settings on top of these defaults.
    ///
    /// Page keys are matched ignoring case, `_` and `-`, so `hrefTargetBlank`,
    /// `hreftargetblank` and `href_target_blank` all hit the same field.
    pub fn overlay(&self, page: &FrontMatter) -> Result<RenderingConfig, serde_json::Error> {
        let Value::Object(mut merged) = serde_json::to_value(self)? else {
            return Ok(self.clone());
        };

        for (key, value) in page {
            let wanted = normalize_key(key);
            let field = merged.keys().find(|field| normalize_key(field) == wanted).cloned();
            match field {
                Some(field) => {
                    merged.insert(field, value.clone());
                }
                None => tracing::debug!(key = %key, "Ignoring unknown rendering option"),
            }
        }

        serde_json::from_value(Value::Object(merged))
    }

    pub fn has_extension(&self, name: &str) -> bool {
        self.extensions.iter().any(|ext| ext.eq_ignore_ascii_case(name))
    }
}

fn normalize_key(key: &str) -> String {
    key.chars()
        .filter(|c| *c != '_' && *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Everything a renderer may want to know about the page being rendered
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    pub markup: Markup,
    pub source_path: &'a str,
    pub unique_id: &'a str,
    pub config: &'a RenderingConfig,
}

/// Renderer output
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rendered {
    pub html: String,
    /// Table of contents fragment, when the renderer extracts one
    pub toc: Option<String>,
}

/// Turns a page body into HTML
pub trait Renderer: Send + Sync {
    fn render(&self, content: &str, ctx: &RenderContext<'_>) -> Result<Rendered, String>;
}

/// Renders Markdown with the `markdown` crate; HTML bodies pass through
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownRenderer;

/// Create markdown options (can't be static due to non-Send callback fields)
fn markdown_options(config: &RenderingConfig) -> markdown::Options {
    let mut options = markdown::Options {
        parse: markdown::ParseOptions::gfm(),
        compile: markdown::CompileOptions {
            allow_any_img_src: true,
            allow_dangerous_html: true,
            allow_dangerous_protocol: true,
            ..Default::default()
        },
    };

    if config.has_extension("math") {
        options.parse.constructs.math_flow = true;
        options.parse.constructs.math_text = true;
    }

    options
}

static EXTERNAL_LINK_RE: OnceLock<Regex> = OnceLock::new();

fn external_link_regex() -> &'static Regex {
    EXTERNAL_LINK_RE.get_or_init(|| {
        Regex::new(r#"<a href="(https?://[^"]*)""#).expect("Invalid regex pattern")
    })
}

/// Open absolute links in a new tab
fn add_target_blank(html: &str) -> String {
    external_link_regex()
        .replace_all(html, r#"<a href="$1" target="_blank" rel="noopener""#)
        .into_owned()
}

impl Renderer for MarkdownRenderer {
    fn render(&self, content: &str, ctx: &RenderContext<'_>) -> Result<Rendered, String> {
        let html = match ctx.markup {
            Markup::Markdown | Markup::Mmark | Markup::Unknown => {
                markdown::to_html_with_options(content, &markdown_options(ctx.config))
                    .map_err(|e| e.to_string())?
            }
            Markup::Html => content.to_string(),
            other => return Err(format!("no renderer is available for {other} content")),
        };

        let html = if ctx.config.href_target_blank {
            add_target_blank(&html)
        } else {
            html
        };

        Ok(Rendered { html, toc: None })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ctx(markup: Markup, config: &RenderingConfig) -> RenderContext<'_> {
        RenderContext {
            markup,
            source_path: "post.md",
            unique_id: "id",
            config,
        }
    }

    #[test]
    fn test_overlay_matches_keys_loosely() {
        let mut page = FrontMatter::new();
        page.insert("hrefTargetBlank".into(), json!(true));
        page.insert("smart-punctuation".into(), json!(false));
        page.insert("extensions".into(), json!(["math"]));
        page.insert("nonsense".into(), json!(1));

        let merged = RenderingConfig::default().overlay(&page).unwrap();
        assert!(merged.href_target_blank);
        assert!(!merged.smart_punctuation);
        assert!(merged.has_extension("MATH"));
        assert!(merged.fractions);
    }

    #[test]
    fn test_overlay_rejects_wrong_types() {
        let mut page = FrontMatter::new();
        page.insert("fractions".into(), json!("sometimes"));
        assert!(RenderingConfig::default().overlay(&page).is_err());
    }

    #[test]
    fn test_markdown_renders_paragraphs() {
        let config = RenderingConfig::default();
        let rendered = MarkdownRenderer
            .render("Hello *world*", &ctx(Markup::Markdown, &config))
            .unwrap();
        assert_eq!(rendered.html.trim(), "<p>Hello <em>world</em></p>");
        assert_eq!(rendered.toc, None);
    }

    #[test]
    fn test_href_target_blank_only_touches_absolute_links() {
        let config = RenderingConfig {
            href_target_blank: true,
            ..Default::default()
        };
        let rendered = MarkdownRenderer
            .render("[a](https://a.org) [b](/b/)", &ctx(Markup::Markdown, &config))
            .unwrap();
        assert!(rendered.html.contains(r#"<a href="https://a.org" target="_blank" rel="noopener">"#));
        assert!(rendered.html.contains(r#"<a href="/b/">"#));
    }

    #[test]
    fn test_html_passes_through_and_other_dialects_fail() {
        let config = RenderingConfig::default();
        let html = MarkdownRenderer
            .render("<div>raw</div>", &ctx(Markup::Html, &config))
            .unwrap();
        assert_eq!(html.html, "<div>raw</div>");
        assert!(MarkdownRenderer.render("= Title", &ctx(Markup::Asciidoc, &config)).is_err());
    }
}
