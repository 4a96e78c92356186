use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use folio::error::PageResultExt;
use folio::{MarkdownRenderer, Page, PageMenus, Result, Site, SiteConfig, WordStats};
use owo_colors::OwoColorize;
use serde::Serialize;
use tracing::info;

/// Load `config.toml` from `site_path` and compile it
pub async fn load_site(site_path: &Path) -> Result<Arc<Site>> {
    let config = SiteConfig::load(site_path).await?;
    let site = Site::new(&config, site_path)?;
    info!(
        site = %site_path.display(),
        languages = site.languages().len(),
        "Loaded site"
    );
    Ok(Arc::new(site))
}

/// The name a page is known by: its path below the content directory with `/` separators
pub fn page_name(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Read and render the page at `name` below the content directory
pub async fn read_page(site: Arc<Site>, name: &str) -> Result<Page> {
    let path = site.content_dir().join(name);
    let text = tokio::fs::read_to_string(&path).await.with_file_read(&path)?;

    let mut page = Page::from_source(name, &text, site)?;
    page.render_with(&MarkdownRenderer)?;
    Ok(page)
}

#[derive(Debug, Serialize)]
struct PageReport<'a> {
    file: &'a str,
    title: &'a str,
    section: &'a str,
    lang: &'a str,
    content_type: &'a str,
    markup: &'a str,
    date: Option<DateTime<Utc>>,
    lastmod: Option<DateTime<Utc>>,
    draft: bool,
    should_build: bool,
    permalink: String,
    rel_permalink: String,
    target_path: String,
    stats: WordStats,
    summary: &'a str,
    truncated: bool,
    menus: &'a PageMenus,
}

impl<'a> PageReport<'a> {
    fn new(page: &'a Page) -> Result<Self> {
        Ok(Self {
            file: page.source().path(),
            title: page.title(),
            section: page.section(),
            lang: page.lang(),
            content_type: page.content_type(),
            markup: page.markup().as_str(),
            date: page.date(),
            lastmod: page.lastmod(),
            draft: page.is_draft(),
            should_build: page.should_build(),
            permalink: page.permalink()?,
            rel_permalink: page.rel_permalink()?,
            target_path: page.target_path().display().to_string(),
            stats: page.stats(),
            summary: &page.summary().html,
            truncated: page.is_truncated(),
            menus: page.menus(),
        })
    }

    fn print(&self) {
        let row = |label: &str, value: &dyn std::fmt::Display| {
            println!("  {:>14} {}", label.dimmed(), value);
        };
        let date = |d: Option<DateTime<Utc>>| d.map(|d| d.to_rfc3339()).unwrap_or_else(|| "-".into());

        println!();
        println!("  {}", self.title.bold());
        println!();
        row("file", &self.file.cyan());
        row("section", &self.section);
        row("language", &self.lang);
        row("type", &self.content_type);
        row("markup", &self.markup);
        row("date", &date(self.date));
        row("lastmod", &date(self.lastmod));
        row("draft", &self.draft);
        row("builds", &self.should_build);
        row("permalink", &self.permalink.cyan());
        row("relative", &self.rel_permalink);
        row("target", &self.target_path);
        row("words", &self.stats.word_count);
        row("fuzzy words", &self.stats.fuzzy_word_count);
        row("reading time", &format!("{} min", self.stats.reading_time));
        for (menu, entry) in self.menus {
            row("menu", &format!("{menu} ({}, weight {})", entry.name, entry.weight));
        }
        println!();
        let marker = if self.truncated { " ..." } else { "" };
        println!("  {}{}", self.summary.trim(), marker.dimmed());
        println!();
    }
}

pub async fn run_inspect(site_path: PathBuf, file: PathBuf, json: bool) -> Result<()> {
    let site = load_site(&site_path).await?;
    let page = read_page(site, &page_name(&file)).await?;
    let report = PageReport::new(&page)?;

    if json {
        let out = serde_json::to_string_pretty(&report).map_err(|e| {
            folio::PageError::FrontMatterEncode {
                format: "JSON".into(),
                reason: e.to_string(),
            }
        })?;
        println!("{out}");
    } else {
        report.print();
    }
    Ok(())
}
