use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use folio::{Markup, Page, PageError, Result, Site};
use tokio::task::JoinSet;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::console;
use crate::inspect::{load_site, page_name, read_page};

/// Errors collected while checking, reported after the run
#[derive(Default)]
struct CheckErrors {
    errors: Vec<PageError>,
}

impl CheckErrors {
    fn add(&mut self, error: PageError) {
        self.errors.push(error);
    }

    /// Display all collected errors using miette's fancy formatting
    fn display(self) {
        if self.errors.is_empty() {
            return;
        }

        eprintln!();
        for error in self.errors {
            let report = miette::Report::new(error);
            eprintln!("{:?}", report);
        }
    }
}

/// Outcome of checking a whole site
#[derive(Debug, Default)]
pub struct CheckSummary {
    pub pages: usize,
    pub built: usize,
    pub skipped: usize,
    pub failed: usize,
    /// Pages whose front matter set both `draft` and `published`
    pub conflicts: usize,
    /// Output paths claimed by more than one built page
    pub collisions: BTreeMap<PathBuf, Vec<String>>,
}

/// Content files below `content_dir` that have a known markup, as page names
fn collect_page_names(content_dir: &Path) -> Vec<String> {
    WalkDir::new(content_dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| !e.file_name().to_string_lossy().starts_with('.'))
        .filter(|e| {
            let ext = e.path().extension().and_then(|ext| ext.to_str()).unwrap_or("");
            Markup::guess(ext) != Markup::Unknown
        })
        .filter_map(|e| {
            e.path()
                .strip_prefix(content_dir)
                .ok()
                .map(page_name)
        })
        .collect()
}

/// Link translations and date-ordered neighbours between `pages`
fn link_pages(pages: &[Arc<Page>]) {
    let mut by_translation: HashMap<(&str, &str), Vec<Arc<Page>>> = HashMap::new();
    for page in pages {
        let key = (page.source().dir(), page.source().translation_base_name());
        by_translation.entry(key).or_default().push(Arc::clone(page));
    }
    for group in by_translation.values() {
        for page in group {
            page.set_translations(group);
        }
    }

    // Newest first, like a listing page
    let mut ordered: Vec<Arc<Page>> = pages.to_vec();
    ordered.sort_by(|a, b| b.date().cmp(&a.date()).then_with(|| a.title().cmp(b.title())));
    set_neighbours(&ordered, |page, prev, next| page.set_neighbours(prev, next));

    let mut by_section: BTreeMap<&str, Vec<Arc<Page>>> = BTreeMap::new();
    for page in &ordered {
        by_section
            .entry(page.section())
            .or_default()
            .push(Arc::clone(page));
    }
    for section in by_section.values() {
        set_neighbours(section, |page, prev, next| {
            page.set_section_neighbours(prev, next)
        });
    }
}

fn set_neighbours(
    pages: &[Arc<Page>],
    set: impl Fn(&Page, Option<&Arc<Page>>, Option<&Arc<Page>>),
) {
    for (i, page) in pages.iter().enumerate() {
        let prev = i.checked_sub(1).and_then(|j| pages.get(j));
        set(page, prev, pages.get(i + 1));
    }
}

/// Read every page of `site` in parallel, link them and tally the results
async fn check_site(site: Arc<Site>, errors: &mut CheckErrors) -> Result<CheckSummary> {
    let names = collect_page_names(site.content_dir());
    let pb = console::create_progress_bar(names.len() as u64, "Checking", "pages");

    let mut join_set: JoinSet<(String, Result<Page>)> = JoinSet::new();
    for name in names {
        let site = Arc::clone(&site);
        join_set.spawn(async move {
            let page = read_page(site, &name).await;
            (name, page)
        });
    }

    let mut pages = Vec::new();
    let mut summary = CheckSummary::default();
    while let Some(result) = join_set.join_next().await {
        let (name, page) = result.map_err(|e| PageError::TaskJoin {
            reason: e.to_string(),
        })?;
        pb.inc(1);
        summary.pages += 1;

        match page {
            Ok(page) => pages.push(Arc::new(page)),
            Err(e) => {
                debug!(file = %name, error = %e, "Page failed");
                summary.failed += 1;
                errors.add(e);
            }
        }
    }
    console::progress_finish(&pb);

    link_pages(&pages);

    let mut targets: BTreeMap<PathBuf, Vec<String>> = BTreeMap::new();
    for page in &pages {
        if page.has_conflicting_intent() {
            summary.conflicts += 1;
            errors.add(PageError::DraftAndPublished {
                file: page.source().path().into(),
            });
        }
        if !page.should_build() {
            summary.skipped += 1;
            continue;
        }
        summary.built += 1;
        targets
            .entry(page.target_path())
            .or_default()
            .push(page.source().path().to_string());

        if let Err(e) = page.rel_permalink() {
            errors.add(e);
        }
    }
    summary.collisions = targets
        .into_iter()
        .filter(|(_, files)| files.len() > 1)
        .collect();

    Ok(summary)
}

pub async fn run_check(site_path: PathBuf) -> Result<()> {
    console::start();
    info!(site = %site_path.display(), "Checking site");

    let site = load_site(&site_path).await?;
    console::status("Checking", site.content_dir().display());

    let mut errors = CheckErrors::default();
    let summary = check_site(site, &mut errors).await?;

    for (target, files) in &summary.collisions {
        console::warn(format!(
            "{} is written by {}",
            target.display(),
            files.join(", ")
        ));
    }
    if summary.skipped > 0 {
        console::status_cyan("Skipped", format!("{} drafts, future or expired pages", summary.skipped));
    }

    if summary.conflicts > 0 {
        console::warn(format!(
            "{} pages set both draft and published",
            summary.conflicts
        ));
    }

    let failed = if summary.failed > 0 {
        format!(", {} failed", summary.failed)
    } else {
        String::new()
    };
    console::finished(format!(
        "{} pages, {} to build{}",
        summary.pages, summary.built, failed
    ));

    errors.display();
    Ok(())
}
