//! Content pages for a static site: front matter normalization, derived text
//! statistics, summaries, permalinks and target paths, menu membership and
//! publication rules.
//!
//! ```no_run
//! use std::sync::Arc;
//! use folio::{MarkdownRenderer, Page, Site};
//!
//! # fn main() -> folio::Result<()> {
//! let site = Arc::new(Site::default());
//! let mut page = Page::from_source("blog/hello.md", "---\ntitle: Hello\n---\nHi there.", site)?;
//! page.render_with(&MarkdownRenderer)?;
//! println!("{} -> {}", page.title(), page.target_path().display());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod frontmatter;
pub mod markup;
pub mod menu;
pub mod page;
pub mod permalink;
pub mod publish;
pub mod render;
pub mod site;
pub mod source;
pub mod summary;
pub mod text;
pub mod urls;
pub mod value;

pub use config::SiteConfig;
pub use error::{PageError, Result};
pub use frontmatter::FrontMatterFormat;
pub use markup::Markup;
pub use menu::{MenuDecl, MenuEntry, PageMenus};
pub use page::{Page, Sitemap, Summary, WordStats};
pub use render::{MarkdownRenderer, Renderer, RenderingConfig};
pub use site::Site;
pub use value::{FrontMatter, Param};
