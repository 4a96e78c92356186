use std::path::PathBuf;

use tracing::debug;

use super::Page;
use crate::error::{PageError, Result};
use crate::permalink::{PermalinkFields, PermalinkPattern};
use crate::urls::{
    is_abs_url, join, make_path, relative_path, replace_extension, strip_origin, url_prep, urlize,
};

/// Convert a slash path to a platform path relative to the publish directory.
/// Empty, `.` and `..` segments are dropped so the result stays inside it.
fn from_slash(path: &str) -> PathBuf {
    path.split('/')
        .filter(|part| !matches!(*part, "" | "." | ".."))
        .collect()
}

impl Page {
    fn permalink_fields(&self) -> PermalinkFields<'_> {
        PermalinkFields {
            date: self.date,
            section: self.section(),
            title: &self.title,
            slug: &self.slug,
            filename: self.source.translation_base_name(),
        }
    }

    fn expand_pattern(&self, pattern: &PermalinkPattern) -> Result<String> {
        pattern
            .expand(&self.permalink_fields())
            .map_err(|reason| PageError::PermalinkExpand {
                file: self.source.path().into(),
                pattern: pattern.as_str().into(),
                reason,
            })
    }

    fn needs_language_prefix(&self) -> bool {
        self.site.needs_language_prefix(self.lang())
    }

    /// Prefix a site-relative URL with `/<lang>` when the page's language needs it
    fn add_lang_path_prefix(&self, link: &str) -> String {
        if is_abs_url(link) || !self.needs_language_prefix() {
            return link.to_string();
        }
        let mut prefixed = format!("/{}", join(&[self.lang(), link]));
        if link.ends_with('/') && !prefixed.ends_with('/') {
            prefixed.push('/');
        }
        prefixed
    }

    fn add_lang_filepath_prefix(&self, path: &str) -> PathBuf {
        if !self.needs_language_prefix() {
            return from_slash(path);
        }
        from_slash(&join(&[self.lang(), path]))
    }

    /// Absolute URL of the page.
    ///
    /// The first of these wins: the `url` override, the section's permalink
    /// pattern, the slug, the source file name. All but the override get the
    /// language prefix.
    pub fn permalink(&self) -> Result<String> {
        let base = self.site.base_url();

        let url = urlize(self.url.trim());
        if !url.is_empty() {
            return Ok(base.make_permalink(&url));
        }

        let ugly = self.site.build().ugly_urls;
        let dir = make_path(&self.source.dir().to_lowercase());

        let link = if let Some(pattern) = self.site.permalink_pattern(self.section()) {
            self.expand_pattern(pattern)?
        } else if !urlize(&self.slug).is_empty() {
            let leaf = format!("{}.{}", self.slug, self.extension());
            url_prep(ugly, &join(&[&dir, &leaf]))
        } else {
            let leaf = replace_extension(self.source.translation_base_name().trim(), self.extension());
            url_prep(ugly, &join(&[&dir, &leaf]))
        };

        Ok(base.make_permalink(&self.add_lang_path_prefix(&link)))
    }

    /// Site-relative URL of the page
    pub fn rel_permalink(&self) -> Result<String> {
        let link = self.permalink()?;

        if self.site.build().canonify_urls {
            let base = self.site.base_url().normalized();
            return relative_path(&link, &base).ok_or_else(|| PageError::RelativePath {
                link: link.as_str().into(),
                base: base.as_str().into(),
            });
        }

        Ok(strip_origin(&link).to_string())
    }

    /// The `url` override when set, otherwise the relative permalink
    pub fn url(&self) -> Result<String> {
        if !self.url.trim().is_empty() {
            return Ok(self.url.trim().to_string());
        }
        self.rel_permalink()
    }

    /// Output file of the page, relative to the publish directory
    pub fn target_path(&self) -> PathBuf {
        let url = self.url.trim();
        if url.len() > 2 {
            let mut out = url.to_string();
            if out.ends_with('/') {
                out.push_str("index.html");
            }
            return from_slash(&out);
        }

        if let Some(pattern) = self.site.permalink_pattern(self.section()) {
            match self.expand_pattern(pattern) {
                Ok(expanded) => {
                    let mut out = urlencoding::decode(&expanded)
                        .map(|decoded| decoded.into_owned())
                        .unwrap_or(expanded);
                    if out.ends_with('/') {
                        out.push_str("index.html");
                    }
                    return self.add_lang_filepath_prefix(&out);
                }
                Err(e) => debug!(file = %self.source.path(), error = %e, "Falling back to file name for target path"),
            }
        }

        let slug = self.slug.trim();
        let leaf = if slug.is_empty() {
            format!("{}.{}", self.source.translation_base_name(), self.extension())
        } else {
            format!("{}.{}", slug, self.extension())
        };
        let dir = make_path(self.source.dir()).to_lowercase();
        self.add_lang_filepath_prefix(&join(&[&dir, leaf.trim()]))
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::site_with;
    use super::*;
    use crate::config::{LanguageConfig, SiteConfig};
    use std::path::Path;
    use std::sync::Arc;

    fn page_in(configure: impl FnOnce(&mut SiteConfig), name: &str, text: &str) -> Page {
        Page::from_source(name, text, site_with(configure)).unwrap()
    }

    fn multilingual(config: &mut SiteConfig) {
        config.languages.insert("en".into(), LanguageConfig::default());
        config.languages.insert("fr".into(), LanguageConfig::default());
    }

    #[test]
    fn test_pretty_urls_from_file_name() {
        let page = page_in(|_| {}, "Blog/Post.md", "");
        assert_eq!(page.permalink().unwrap(), "https://example.com/blog/Post/");
        assert_eq!(page.rel_permalink().unwrap(), "/blog/Post/");
        assert_eq!(page.target_path(), Path::new("blog/Post.html"));
    }

    #[test]
    fn test_ugly_urls_from_slug() {
        let page = page_in(
            |config| config.build.ugly_urls = true,
            "blog/post.md",
            "---\nslug: hi\n---\n",
        );
        assert_eq!(page.rel_permalink().unwrap(), "/blog/hi.html");
        assert_eq!(page.target_path(), Path::new("blog/hi.html"));
    }

    #[test]
    fn test_explicit_url_wins() {
        let page = page_in(
            |config| {
                config.permalinks.insert("blog".into(), "/:section/:title/".into());
            },
            "blog/post.md",
            "---\ntitle: Hello\nslug: hi\nurl: /custom/\n---\n",
        );
        assert_eq!(page.permalink().unwrap(), "https://example.com/custom/");
        assert_eq!(page.rel_permalink().unwrap(), "/custom/");
        assert_eq!(page.url().unwrap(), "/custom/");
        assert_eq!(page.target_path(), Path::new("custom/index.html"));
    }

    #[test]
    fn test_target_paths_are_relative() {
        let overridden = page_in(|_| {}, "a.md", "---\nurl: /blog/post.html\n---\n");
        let from_name = page_in(|_| {}, "blog/post.md", "");
        assert_eq!(overridden.target_path(), from_name.target_path());
        assert!(overridden.target_path().is_relative());

        let escaping = page_in(|_| {}, "a.md", "---\nurl: /../../etc/passwd\n---\n");
        assert_eq!(escaping.target_path(), Path::new("etc/passwd"));
    }

    #[test]
    fn test_section_pattern() {
        let page = page_in(
            |config| {
                config.permalinks.insert("blog".into(), "/:section/:title/".into());
            },
            "blog/post.md",
            "---\ntitle: Hello\n---\n",
        );
        assert_eq!(page.rel_permalink().unwrap(), "/blog/hello/");
        assert_eq!(page.target_path(), Path::new("blog/hello/index.html"));
    }

    #[test]
    fn test_pattern_expansion_failure() {
        let page = page_in(
            |config| {
                config.permalinks.insert("blog".into(), "/:year/:slug/".into());
            },
            "blog/post.md",
            "---\nslug: hi\n---\n",
        );
        let err = page.permalink().unwrap_err();
        assert!(matches!(err, PageError::PermalinkExpand { .. }));
        // The target path falls back to the slug
        assert_eq!(page.target_path(), Path::new("blog/hi.html"));
    }

    #[test]
    fn test_language_prefix() {
        let fr = page_in(multilingual, "blog/post.fr.md", "");
        assert_eq!(fr.rel_permalink().unwrap(), "/fr/blog/post/");
        assert_eq!(fr.target_path(), Path::new("fr/blog/post.html"));

        let en = page_in(multilingual, "blog/post.md", "");
        assert_eq!(en.rel_permalink().unwrap(), "/blog/post/");
        assert_eq!(en.target_path(), Path::new("blog/post.html"));

        let in_subdir = page_in(
            |config| {
                multilingual(config);
                config.default_content_language_in_subdir = true;
            },
            "blog/post.md",
            "",
        );
        assert_eq!(in_subdir.rel_permalink().unwrap(), "/en/blog/post/");
    }

    #[test]
    fn test_explicit_url_skips_language_prefix() {
        let fr = page_in(multilingual, "blog/post.fr.md", "---\nurl: /a-propos/\n---\n");
        assert_eq!(fr.rel_permalink().unwrap(), "/a-propos/");
    }

    #[test]
    fn test_canonify_with_sub_path_base() {
        let page = page_in(
            |config| {
                config.base_url = "https://example.com/docs/".into();
                config.build.canonify_urls = true;
            },
            "guide/intro.md",
            "",
        );
        assert_eq!(page.permalink().unwrap(), "https://example.com/docs/guide/intro/");
        assert_eq!(page.rel_permalink().unwrap(), "/guide/intro/");
    }

    #[test]
    fn test_sub_path_base_without_canonify_keeps_path() {
        let page = page_in(
            |config| config.base_url = "https://example.com/docs/".into(),
            "guide/intro.md",
            "",
        );
        assert_eq!(page.rel_permalink().unwrap(), "/docs/guide/intro/");
    }

    #[test]
    fn test_custom_extension() {
        let page = page_in(|_| {}, "feeds/all.md", "---\nextension: xml\n---\n");
        assert_eq!(page.target_path(), Path::new("feeds/all.xml"));
        assert_eq!(page.rel_permalink().unwrap(), "/feeds/all/index.xml");
    }

    #[test]
    fn test_root_index_page() {
        let page = Page::from_source("index.md", "", Arc::new(crate::site::Site::default())).unwrap();
        assert_eq!(page.rel_permalink().unwrap(), "/");
    }
}
