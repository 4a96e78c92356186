use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use folio::error::PageResultExt;
use folio::{FrontMatter, FrontMatterFormat, Page, PageError, Result, Site};
use owo_colors::OwoColorize;
use serde_json::Value;
use tokio::io::AsyncWriteExt;
use tracing::info;

use crate::inspect::{load_site, page_name};

/// Ask for a page title on the terminal
fn prompt_title() -> Result<String> {
    dialoguer::Input::<String>::new()
        .with_prompt("What's the title of your page?")
        .interact_text()
        .map_err(|e| PageError::InputError {
            cause: e.to_string(),
        })
}

/// A draft page at `name` titled `title`, ready to be written out
pub fn draft_page(site: Arc<Site>, name: &str, title: &str, format: FrontMatterFormat) -> Result<Page> {
    let mut meta = FrontMatter::new();
    meta.insert("title".into(), Value::String(title.to_string()));
    meta.insert(
        "date".into(),
        Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)),
    );
    meta.insert("draft".into(), Value::Bool(true));

    let mut page = Page::new(name, site)?;
    page.set_source_metadata(&meta, format)?;
    page.set_source_content("\n");
    Ok(page)
}

/// Create `file` below the site's content directory, never overwriting
async fn write_new(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .with_file_write(parent)?;
    }

    let mut file = tokio::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .await
        .with_file_write(path)?;
    file.write_all(bytes).await.with_file_write(path)?;
    file.flush().await.with_file_write(path)?;
    Ok(())
}

/// Create a new draft page in the site at `site_path`
pub async fn create_page(
    site_path: PathBuf,
    file: PathBuf,
    title: Option<String>,
    format: FrontMatterFormat,
) -> Result<()> {
    let site = load_site(&site_path).await?;
    let name = page_name(&file);

    let title = match title {
        Some(title) => title,
        None => prompt_title()?,
    };

    let page = draft_page(Arc::clone(&site), &name, &title, format)?;
    let path = site.content_dir().join(&name);
    write_new(&path, &page.source_bytes()).await?;

    info!(file = %name, format = %format, "Created page");
    println!();
    println!(
        "  {} Created {} at {}",
        "✓".green().bold(),
        title.bold(),
        path.display().to_string().cyan()
    );
    println!();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draft_page_reads_back() {
        let site = Arc::new(Site::default());
        let page = draft_page(Arc::clone(&site), "blog/new.md", "Fresh", FrontMatterFormat::Toml).unwrap();

        let bytes = page.source_bytes();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.starts_with("+++\n"));

        let reread = Page::from_source("blog/new.md", &text, site).unwrap();
        assert_eq!(reread.title(), "Fresh");
        assert!(reread.is_draft());
        assert!(reread.date().is_some());
        assert!(!reread.should_build());
    }

    #[tokio::test]
    async fn test_write_new_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("content/blog/new.md");

        write_new(&path, b"first").await.unwrap();
        let err = write_new(&path, b"second").await.unwrap_err();

        assert!(matches!(err, PageError::FileExists { .. }));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "first");
    }
}
