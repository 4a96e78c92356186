//! The page model: one content file, its metadata and everything derived
//! from it.
//!
//! A page is built once from its source, rendered once, and then shared
//! (usually behind an [`Arc`]) by everything that reads it. Derived values
//! are computed on first access and cached for the lifetime of the page.

mod derive;
mod menus;
mod metadata;
mod paths;

use std::collections::BTreeMap;
use std::io::Read;
use std::sync::{Arc, OnceLock, PoisonError, RwLock, Weak};

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{PageError, Result};
use crate::frontmatter::{self, DecodeError, FrontMatterFormat};
use crate::markup::Markup;
use crate::menu::{MenuDecl, PageMenus};
use crate::render::{RenderContext, Renderer, RenderingConfig};
use crate::site::Site;
use crate::source::SourceFile;
use crate::summary::{SOURCE_DIVIDER, SUMMARY_DIVIDER, split_user_defined_summary};
use crate::value::{FrontMatter, Param};

pub use derive::{Summary, WordStats};
pub use metadata::Sitemap;

/// Pages related to this one, filled in by whoever assembles the corpus
#[derive(Debug, Default)]
struct Relations {
    translations: Vec<Weak<Page>>,
    prev: Weak<Page>,
    next: Weak<Page>,
    prev_in_section: Weak<Page>,
    next_in_section: Weak<Page>,
}

#[derive(Debug)]
pub struct Page {
    site: Arc<Site>,
    source: SourceFile,

    /// Source text preceding the body: the front matter block and its separator
    source_frontmatter: String,
    frontmatter_format: Option<FrontMatterFormat>,
    raw_content: String,
    working_copy: String,
    renderable: bool,

    title: String,
    link_title: String,
    description: String,
    slug: String,
    url: String,
    content_type: String,
    extension: String,
    keywords: Vec<String>,
    date: Option<DateTime<Utc>>,
    lastmod: Option<DateTime<Utc>>,
    publish_date: Option<DateTime<Utc>>,
    expiry_date: Option<DateTime<Utc>>,
    draft: bool,
    layout: String,
    markup: String,
    weight: i64,
    aliases: Vec<String>,
    status: String,
    sitemap: Sitemap,
    is_cjk_language: bool,
    params: BTreeMap<String, Param>,
    menu_decl: Option<MenuDecl>,
    /// Front matter set both `draft` and `published`
    conflicting_intent: bool,

    content: String,
    toc: Option<String>,
    rendered: bool,

    plain: OnceLock<String>,
    plain_words: OnceLock<Vec<String>>,
    word_stats: OnceLock<WordStats>,
    summary: OnceLock<Summary>,
    menus: OnceLock<PageMenus>,
    rendering_config: OnceLock<RenderingConfig>,

    relations: RwLock<Relations>,
}

impl Page {
    /// An empty page for the content file at `name`, relative to the content directory
    pub fn new(name: &str, site: Arc<Site>) -> Result<Page> {
        if name.trim().is_empty() {
            return Err(PageError::EmptyName);
        }
        let source = SourceFile::new(name, site.languages(), site.default_language());

        Ok(Page {
            site,
            source,
            source_frontmatter: String::new(),
            frontmatter_format: None,
            raw_content: String::new(),
            working_copy: String::new(),
            renderable: true,
            title: String::new(),
            link_title: String::new(),
            description: String::new(),
            slug: String::new(),
            url: String::new(),
            content_type: String::new(),
            extension: String::new(),
            keywords: Vec::new(),
            date: None,
            lastmod: None,
            publish_date: None,
            expiry_date: None,
            draft: false,
            layout: String::new(),
            markup: String::new(),
            weight: 0,
            aliases: Vec::new(),
            status: String::new(),
            sitemap: Sitemap::default(),
            is_cjk_language: false,
            params: BTreeMap::new(),
            menu_decl: None,
            conflicting_intent: false,
            content: String::new(),
            toc: None,
            rendered: false,
            plain: OnceLock::new(),
            plain_words: OnceLock::new(),
            word_stats: OnceLock::new(),
            summary: OnceLock::new(),
            menus: OnceLock::new(),
            rendering_config: OnceLock::new(),
            relations: RwLock::new(Relations::default()),
        })
    }

    /// Read a page from `reader` and normalize its front matter.
    ///
    /// A draft/published conflict is logged and the page is kept (see
    /// [`Page::has_conflicting_intent`]); every other metadata error aborts
    /// construction.
    pub fn from_reader(name: &str, mut reader: impl Read, site: Arc<Site>) -> Result<Page> {
        let mut page = Page::new(name, site)?;

        let mut text = String::new();
        reader
            .read_to_string(&mut text)
            .map_err(|e| PageError::FileRead {
                path: name.into(),
                cause: e,
            })?;

        page.parse(&text)?;
        debug!(file = %page.source.path(), title = %page.title, "Read page");
        Ok(page)
    }

    /// Shorthand for [`Page::from_reader`] over in-memory text
    pub fn from_source(name: &str, text: &str, site: Arc<Site>) -> Result<Page> {
        Page::from_reader(name, text.as_bytes(), site)
    }

    fn parse(&mut self, text: &str) -> Result<()> {
        let parsed = frontmatter::split(text).map_err(|e| match e {
            DecodeError::NotAMap => PageError::NoMetadata {
                file: self.source.path().into(),
            },
            DecodeError::Syntax(reason) => PageError::FrontMatterParse {
                file: self.source.path().into(),
                reason,
            },
        })?;

        self.source_frontmatter = parsed.prefix;
        self.frontmatter_format = parsed.format;
        self.renderable = parsed.renderable;
        self.working_copy = parsed.content.clone();
        let meta = parsed.metadata;
        self.raw_content = parsed.content;

        match self.update(&meta) {
            Err(e) if e.is_conflicting_intent() => {
                self.conflicting_intent = true;
                warn!(
                    file = %self.source.path(),
                    draft = self.draft,
                    "Page has both draft and published settings, using draft"
                );
                Ok(())
            }
            other => other,
        }
    }

    /// Render the working copy through `renderer`.
    ///
    /// An explicit summary divider splits the output and fixes the summary.
    /// Rendering happens once; later calls do nothing.
    pub fn render_with(&mut self, renderer: &dyn Renderer) -> Result<()> {
        if self.rendered {
            return Ok(());
        }

        let body = self.working_copy.replacen(SOURCE_DIVIDER, SUMMARY_DIVIDER, 1);
        let markup = self.markup();
        let config = self.rendering_config().clone();
        let ctx = RenderContext {
            markup,
            source_path: self.source.path(),
            unique_id: self.source.unique_id(),
            config: &config,
        };

        let rendered = renderer
            .render(&body, &ctx)
            .map_err(|reason| PageError::Render {
                file: self.source.path().into(),
                reason,
            })?;

        self.toc = rendered.toc;
        // Anything derived from the content before now describes the wrong text
        self.plain = OnceLock::new();
        self.plain_words = OnceLock::new();
        self.word_stats = OnceLock::new();
        match split_user_defined_summary(markup, &rendered.html) {
            Some(split) => {
                self.content = split.content;
                self.summary = OnceLock::from(Summary {
                    html: split.summary,
                    truncated: split.truncated,
                });
            }
            None => {
                self.content = rendered.html;
                self.summary = OnceLock::new();
            }
        }
        self.rendered = true;
        Ok(())
    }

    /// Whether the front matter set both `draft` and `published`; `draft` won
    pub fn has_conflicting_intent(&self) -> bool {
        self.conflicting_intent
    }

    pub fn site(&self) -> &Site {
        &self.site
    }

    pub fn source(&self) -> &SourceFile {
        &self.source
    }

    pub fn lang(&self) -> &str {
        self.source.lang()
    }

    pub fn section(&self) -> &str {
        self.source.section()
    }

    pub fn unique_id(&self) -> &str {
        self.source.unique_id()
    }

    /// The front matter block as it appears in the source
    pub fn frontmatter(&self) -> &str {
        &self.source_frontmatter
    }

    pub fn frontmatter_format(&self) -> Option<FrontMatterFormat> {
        self.frontmatter_format
    }

    /// The body as read from the source
    pub fn raw_content(&self) -> &str {
        &self.raw_content
    }

    /// The body that will be rendered; starts as a copy of the raw content
    pub fn working_copy(&self) -> &str {
        &self.working_copy
    }

    pub fn set_working_copy(&mut self, content: impl Into<String>) {
        self.working_copy = content.into();
    }

    /// Rendered HTML
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Replace the rendered HTML. Values already derived from it are kept.
    pub fn set_content(&mut self, html: impl Into<String>) {
        self.content = html.into();
        self.rendered = true;
    }

    pub fn toc(&self) -> Option<&str> {
        self.toc.as_deref()
    }

    pub fn is_rendered(&self) -> bool {
        self.rendered
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Link title, falling back to the title
    pub fn link_title(&self) -> &str {
        if self.link_title.is_empty() {
            &self.title
        } else {
            &self.link_title
        }
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    /// Explicit URL override from the front matter
    pub fn url_override(&self) -> &str {
        &self.url
    }

    /// The type override, else the section, else `page`
    pub fn content_type(&self) -> &str {
        if !self.content_type.is_empty() {
            &self.content_type
        } else if !self.section().is_empty() {
            self.section()
        } else {
            "page"
        }
    }

    /// Output extension, falling back to the site default
    pub fn extension(&self) -> &str {
        if self.extension.is_empty() {
            &self.site.build().default_extension
        } else {
            &self.extension
        }
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn date(&self) -> Option<DateTime<Utc>> {
        self.date
    }

    pub fn lastmod(&self) -> Option<DateTime<Utc>> {
        self.lastmod
    }

    pub fn publish_date(&self) -> Option<DateTime<Utc>> {
        self.publish_date
    }

    pub fn expiry_date(&self) -> Option<DateTime<Utc>> {
        self.expiry_date
    }

    pub fn layout(&self) -> &str {
        &self.layout
    }

    /// Markup dialect from the front matter, else from the file extension
    pub fn markup(&self) -> Markup {
        if !self.renderable {
            return Markup::Html;
        }
        if self.markup.is_empty() {
            Markup::guess(self.source.ext())
        } else {
            Markup::guess(&self.markup)
        }
    }

    pub fn weight(&self) -> i64 {
        self.weight
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn sitemap(&self) -> &Sitemap {
        &self.sitemap
    }

    pub fn is_cjk_language(&self) -> bool {
        self.is_cjk_language
    }

    pub fn params(&self) -> &BTreeMap<String, Param> {
        &self.params
    }

    /// Page parameter by case-insensitive key, with string content lower-cased.
    ///
    /// Values with no usable shape are logged and skipped.
    pub fn get_param(&self, key: &str) -> Option<Param> {
        self.get_param_raw(key).map(|param| param.to_lowercase())
    }

    /// Like [`Page::get_param`] but keeps the original case
    pub fn get_param_raw(&self, key: &str) -> Option<Param> {
        let param = self.params.get(&key.to_lowercase())?;
        if let Param::Other(value) = param {
            tracing::error!(
                file = %self.source.path(),
                key,
                kind = param.kind(),
                value = %value,
                "Unsupported parameter type"
            );
            return None;
        }
        Some(param.clone())
    }

    /// Page parameter, falling back to the site parameter of the same name
    pub fn param(&self, key: &str) -> Option<Value> {
        self.params
            .get(&key.to_lowercase())
            .map(Param::to_value)
            .or_else(|| self.site.param(key).cloned())
    }

    /// Rendering options for this page, site defaults overlaid by its
    /// `rendering` parameter
    pub fn rendering_config(&self) -> &RenderingConfig {
        self.rendering_config.get_or_init(|| {
            let defaults = self.site.rendering();
            let Some(Param::Map(overrides)) = self.params.get("rendering") else {
                return defaults.clone();
            };
            let lowered: FrontMatter = overrides
                .iter()
                .map(|(key, value)| (key.to_lowercase(), value.clone()))
                .collect();
            defaults.overlay(&lowered).unwrap_or_else(|e| {
                tracing::error!(
                    file = %self.source.path(),
                    error = %e,
                    "Failed to decode rendering options, using site defaults"
                );
                defaults.clone()
            })
        })
    }

    /// Replace the source front matter with `meta` encoded as `format`
    pub fn set_source_metadata(&mut self, meta: &FrontMatter, format: FrontMatterFormat) -> Result<()> {
        let mut block = frontmatter::encode(meta, format)?;
        block.push('\n');
        self.source_frontmatter = block;
        self.frontmatter_format = Some(format);
        Ok(())
    }

    pub fn set_source_content(&mut self, content: impl Into<String>) {
        self.raw_content = content.into();
        self.working_copy = self.raw_content.clone();
    }

    /// The full source file: front matter followed by the body
    pub fn source_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.source_frontmatter.len() + self.raw_content.len());
        bytes.extend_from_slice(self.source_frontmatter.as_bytes());
        bytes.extend_from_slice(self.raw_content.as_bytes());
        bytes
    }

    fn relations(&self) -> std::sync::RwLockReadGuard<'_, Relations> {
        self.relations.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn relations_mut(&self) -> std::sync::RwLockWriteGuard<'_, Relations> {
        self.relations.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record the pages sharing this page's translation base name
    pub fn set_translations(&self, pages: &[Arc<Page>]) {
        self.relations_mut().translations = pages.iter().map(Arc::downgrade).collect();
    }

    /// Translations of this page, without the page itself
    pub fn translations(&self) -> Vec<Arc<Page>> {
        self.relations()
            .translations
            .iter()
            .filter_map(Weak::upgrade)
            .filter(|page| !std::ptr::eq(Arc::as_ptr(page), self))
            .collect()
    }

    /// Every language version of this page, itself included, ordered by language
    pub fn all_translations(self: &Arc<Self>) -> Vec<Arc<Page>> {
        let mut pages = self.translations();
        pages.push(Arc::clone(self));
        pages.sort_by(|a, b| a.lang().cmp(b.lang()));
        pages
    }

    pub fn is_translated(&self) -> bool {
        !self.translations().is_empty()
    }

    /// Neighbours in the whole corpus
    pub fn set_neighbours(&self, prev: Option<&Arc<Page>>, next: Option<&Arc<Page>>) {
        let mut relations = self.relations_mut();
        relations.prev = prev.map(Arc::downgrade).unwrap_or_default();
        relations.next = next.map(Arc::downgrade).unwrap_or_default();
    }

    /// Neighbours within the page's section
    pub fn set_section_neighbours(&self, prev: Option<&Arc<Page>>, next: Option<&Arc<Page>>) {
        let mut relations = self.relations_mut();
        relations.prev_in_section = prev.map(Arc::downgrade).unwrap_or_default();
        relations.next_in_section = next.map(Arc::downgrade).unwrap_or_default();
    }

    pub fn prev(&self) -> Option<Arc<Page>> {
        self.relations().prev.upgrade()
    }

    pub fn next(&self) -> Option<Arc<Page>> {
        self.relations().next.upgrade()
    }

    pub fn prev_in_section(&self) -> Option<Arc<Page>> {
        self.relations().prev_in_section.upgrade()
    }

    pub fn next_in_section(&self) -> Option<Arc<Page>> {
        self.relations().next_in_section.upgrade()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LanguageConfig, SiteConfig};
    use crate::render::{MarkdownRenderer, Rendered};
    use serde_json::json;
    use std::path::Path;

    pub(super) fn site_with(configure: impl FnOnce(&mut SiteConfig)) -> Arc<Site> {
        let mut config = SiteConfig::default();
        config.base_url = "https://example.com/".into();
        configure(&mut config);
        Arc::new(Site::new(&config, Path::new(".")).unwrap())
    }

    pub(super) fn site() -> Arc<Site> {
        site_with(|_| {})
    }

    #[test]
    fn test_empty_name_is_rejected() {
        let err = Page::new("  ", site()).unwrap_err();
        assert!(matches!(err, PageError::EmptyName));
    }

    #[test]
    fn test_end_to_end_draft_with_slug() {
        let page = Page::from_source(
            "hello.md",
            "---\ntitle: Hello\ndraft: true\nslug: hi\n---\nBody\n",
            site(),
        )
        .unwrap();

        assert_eq!(page.title(), "Hello");
        assert!(page.is_draft());
        assert_eq!(page.target_path(), Path::new("hi.html"));
    }

    #[test]
    fn test_conflicting_draft_keeps_the_page() {
        let page = Page::from_source(
            "post.md",
            "---\ndraft: false\npublished: false\n---\n",
            site(),
        )
        .unwrap();
        assert!(!page.is_draft());
        assert!(page.has_conflicting_intent());

        let plain = Page::from_source("post.md", "---\ndraft: true\n---\n", site()).unwrap();
        assert!(!plain.has_conflicting_intent());
    }

    #[test]
    fn test_malformed_front_matter_aborts() {
        let err = Page::from_source("post.md", "---\ntitle: [unclosed\n---\n", site()).unwrap_err();
        assert!(matches!(err, PageError::FrontMatterParse { .. }));

        let err = Page::from_source("post.md", "---\n- a\n---\n", site()).unwrap_err();
        assert!(matches!(err, PageError::NoMetadata { .. }));
    }

    #[test]
    fn test_absolute_url_aborts() {
        let err = Page::from_source("post.md", "---\nurl: https://evil.org/\n---\n", site())
            .unwrap_err();
        assert!(matches!(err, PageError::AbsoluteUrl { .. }));

        let page = Page::from_source("post.md", "---\nurl: /go?to=https://x.org\n---\n", site())
            .unwrap();
        assert_eq!(page.url_override(), "/go?to=https://x.org");
    }

    #[test]
    fn test_source_bytes_round_trip() {
        let text = "---\ntitle: Hello\n---\nBody\n";
        let page = Page::from_source("post.md", text, site()).unwrap();
        assert_eq!(page.source_bytes(), text.as_bytes());
        assert_eq!(page.raw_content().trim(), "Body");
        assert_eq!(page.working_copy(), page.raw_content());
    }

    #[test]
    fn test_set_source_metadata_re_serializes() {
        let mut page = Page::from_source("post.md", "---\ntitle: Old\n---\nBody\n", site()).unwrap();

        let mut meta = FrontMatter::new();
        meta.insert("title".into(), json!("New"));
        page.set_source_metadata(&meta, FrontMatterFormat::Yaml).unwrap();

        let text = String::from_utf8(page.source_bytes()).unwrap();
        let reread = Page::from_source("post.md", &text, site()).unwrap();
        assert_eq!(reread.title(), "New");
        assert_eq!(reread.raw_content().trim(), "Body");
    }

    #[test]
    fn test_params_lookup() {
        let site = site_with(|config| {
            config.params.insert("author".into(), toml::Value::String("Site".into()));
            config.params.insert("theme".into(), toml::Value::String("Dark".into()));
        });
        let page = Page::from_source(
            "post.md",
            "---\nAuthor: Jo\nTags: [Rust, Web]\nnothing: ~\n---\n",
            site,
        )
        .unwrap();

        assert_eq!(page.get_param("AUTHOR"), Some(Param::String("jo".into())));
        assert_eq!(page.get_param_raw("author"), Some(Param::String("Jo".into())));
        assert_eq!(
            page.get_param("tags"),
            Some(Param::Strings(vec!["rust".into(), "web".into()]))
        );
        assert_eq!(page.get_param("nothing"), None);
        assert_eq!(page.get_param("missing"), None);

        assert_eq!(page.param("author"), Some(json!("Jo")));
        assert_eq!(page.param("theme"), Some(json!("Dark")));
    }

    #[test]
    fn test_render_with_markdown_and_divider() {
        let mut page = Page::from_source(
            "post.md",
            "---\ntitle: Post\n---\nIntro.\n\n<!--more-->\n\nRest of it.\n",
            site(),
        )
        .unwrap();
        page.render_with(&MarkdownRenderer).unwrap();

        assert!(!page.content().contains(SUMMARY_DIVIDER));
        assert!(page.content().contains("Rest of it."));
        assert!(page.summary().html.contains("Intro."));
        assert!(!page.summary().html.contains("Rest of it."));
        assert!(page.summary().truncated);
    }

    struct Fixed(&'static str);

    impl Renderer for Fixed {
        fn render(&self, _content: &str, _ctx: &RenderContext<'_>) -> std::result::Result<Rendered, String> {
            Ok(Rendered {
                html: self.0.to_string(),
                toc: Some("<nav></nav>".into()),
            })
        }
    }

    struct Failing;

    impl Renderer for Failing {
        fn render(&self, _content: &str, _ctx: &RenderContext<'_>) -> std::result::Result<Rendered, String> {
            Err("boom".into())
        }
    }

    #[test]
    fn test_render_happens_once() {
        let mut page = Page::from_source("post.md", "Body", site()).unwrap();
        page.render_with(&Fixed("<p>first</p>")).unwrap();
        page.render_with(&Fixed("<p>second</p>")).unwrap();
        assert_eq!(page.content(), "<p>first</p>");
        assert_eq!(page.toc(), Some("<nav></nav>"));
    }

    #[test]
    fn test_summary_read_before_render_is_replaced() {
        let mut page = Page::from_source("post.md", "A.\n\n<!--more-->\n\nB.", site()).unwrap();
        assert_eq!(page.summary().html, "");
        assert_eq!(page.word_count(), 0);

        page.render_with(&Fixed("<p>A.</p>HUGOMORE42<p>B.</p>")).unwrap();

        assert_eq!(page.summary().html, "<p>A.</p>");
        assert!(page.is_truncated());
        assert_eq!(page.content(), "<p>A.</p><p>B.</p>");
        assert_eq!(page.word_count(), 2);
    }

    #[test]
    fn test_render_errors_name_the_file() {
        let mut page = Page::from_source("post.md", "Body", site()).unwrap();
        let err = page.render_with(&Failing).unwrap_err();
        assert!(matches!(err, PageError::Render { reason, .. } if reason == "boom"));
        assert!(!page.is_rendered());
    }

    #[test]
    fn test_rendering_config_overlay() {
        let page = Page::from_source(
            "post.md",
            "---\nrendering:\n  hrefTargetBlank: true\n---\n",
            site(),
        )
        .unwrap();
        assert!(page.rendering_config().href_target_blank);

        let broken = Page::from_source(
            "post.md",
            "---\nrendering:\n  fractions: sometimes\n---\n",
            site(),
        )
        .unwrap();
        assert_eq!(broken.rendering_config(), &RenderingConfig::default());
    }

    #[test]
    fn test_translations_always_include_self() {
        let site = site_with(|config| {
            config.languages.insert("en".into(), LanguageConfig::default());
            config.languages.insert("fr".into(), LanguageConfig::default());
        });
        let en = Arc::new(Page::from_source("blog/post.md", "", Arc::clone(&site)).unwrap());
        let fr = Arc::new(Page::from_source("blog/post.fr.md", "", site).unwrap());

        assert_eq!(en.all_translations().len(), 1);

        let group = vec![Arc::clone(&en), Arc::clone(&fr)];
        en.set_translations(&group);
        fr.set_translations(&group);

        assert_eq!(en.translations().len(), 1);
        assert_eq!(en.translations()[0].lang(), "fr");
        let all = fr.all_translations();
        assert_eq!(all.iter().map(|p| p.lang()).collect::<Vec<_>>(), vec!["en", "fr"]);
        assert!(fr.is_translated());
    }

    #[test]
    fn test_neighbours_are_weak() {
        let site = site();
        let a = Arc::new(Page::from_source("a.md", "", Arc::clone(&site)).unwrap());
        let b = Arc::new(Page::from_source("b.md", "", site).unwrap());
        a.set_neighbours(None, Some(&b));
        b.set_section_neighbours(Some(&a), None);

        assert_eq!(a.next().unwrap().source().path(), "b.md");
        assert!(a.prev().is_none());
        assert_eq!(b.prev_in_section().unwrap().source().path(), "a.md");

        drop(b);
        assert!(a.next().is_none());
    }

    #[test]
    fn test_pages_are_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Page>();
    }
}
