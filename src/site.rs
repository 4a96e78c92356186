use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::config::{BuildConfig, SiteConfig};
use crate::error::Result;
use crate::permalink::PermalinkPattern;
use crate::render::RenderingConfig;
use crate::urls::BaseUrl;
use crate::value::{FrontMatter, toml_to_json_value};

/// Read-only context shared by every page of a build
#[derive(Debug, Clone)]
pub struct Site {
    base_url: BaseUrl,
    content_dir: PathBuf,
    languages: Vec<String>,
    default_language: String,
    default_language_in_subdir: bool,
    permalinks: HashMap<String, PermalinkPattern>,
    params: FrontMatter,
    build: BuildConfig,
    rendering: RenderingConfig,
}

impl Site {
    /// Compile `config` for the site rooted at `root`.
    ///
    /// Fails when a permalink pattern names an unknown placeholder.
    pub fn new(config: &SiteConfig, root: &Path) -> Result<Self> {
        let permalinks = config
            .permalinks
            .iter()
            .map(|(section, pattern)| {
                PermalinkPattern::parse(section, pattern).map(|p| (section.clone(), p))
            })
            .collect::<Result<HashMap<_, _>>>()?;

        let params = match toml_to_json_value(&toml::Value::Table(config.params.clone())) {
            Value::Object(map) => map
                .into_iter()
                .map(|(key, value)| (key.to_lowercase(), value))
                .collect(),
            _ => FrontMatter::new(),
        };

        Ok(Self {
            base_url: BaseUrl::parse(&config.base_url),
            content_dir: root.join(&config.content_dir),
            languages: config.language_codes(),
            default_language: config.default_content_language.clone(),
            default_language_in_subdir: config.default_content_language_in_subdir,
            permalinks,
            params,
            build: config.build.clone(),
            rendering: config.rendering.clone(),
        })
    }

    pub fn base_url(&self) -> &BaseUrl {
        &self.base_url
    }

    pub fn content_dir(&self) -> &Path {
        &self.content_dir
    }

    pub fn languages(&self) -> &[String] {
        &self.languages
    }

    pub fn default_language(&self) -> &str {
        &self.default_language
    }

    pub fn is_multilingual(&self) -> bool {
        self.languages.len() > 1
    }

    /// Whether pages in `lang` live under a `/<lang>/` prefix
    pub fn needs_language_prefix(&self, lang: &str) -> bool {
        if !self.is_multilingual() || lang.is_empty() {
            return false;
        }
        self.default_language_in_subdir || lang != self.default_language
    }

    pub fn permalink_pattern(&self, section: &str) -> Option<&PermalinkPattern> {
        self.permalinks.get(section)
    }

    /// Site parameter by lower-cased key
    pub fn param(&self, key: &str) -> Option<&Value> {
        self.params.get(&key.to_lowercase())
    }

    pub fn build(&self) -> &BuildConfig {
        &self.build
    }

    pub fn rendering(&self) -> &RenderingConfig {
        &self.rendering
    }
}

impl Default for Site {
    fn default() -> Self {
        Self {
            base_url: BaseUrl::parse(""),
            content_dir: PathBuf::from("content"),
            languages: Vec::new(),
            default_language: "en".to_string(),
            default_language_in_subdir: false,
            permalinks: HashMap::new(),
            params: FrontMatter::new(),
            build: BuildConfig::default(),
            rendering: RenderingConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LanguageConfig;
    use crate::error::PageError;

    fn multilingual(in_subdir: bool) -> Site {
        let mut config = SiteConfig::default();
        config.languages.insert("en".into(), LanguageConfig::default());
        config.languages.insert("fr".into(), LanguageConfig::default());
        config.default_content_language_in_subdir = in_subdir;
        Site::new(&config, Path::new(".")).unwrap()
    }

    #[test]
    fn test_language_prefix_rules() {
        let site = multilingual(false);
        assert!(site.is_multilingual());
        assert!(site.needs_language_prefix("fr"));
        assert!(!site.needs_language_prefix("en"));
        assert!(!site.needs_language_prefix(""));

        assert!(multilingual(true).needs_language_prefix("en"));
        assert!(!Site::default().needs_language_prefix("fr"));
    }

    #[test]
    fn test_permalink_patterns_are_validated() {
        let mut config = SiteConfig::default();
        config.permalinks.insert("blog".into(), "/:section/:nope/".into());
        let err = Site::new(&config, Path::new(".")).unwrap_err();
        assert!(matches!(err, PageError::PermalinkPattern { .. }));
    }

    #[test]
    fn test_params_are_case_insensitive() {
        let mut config = SiteConfig::default();
        config.params.insert("Author".into(), toml::Value::String("Jo".into()));
        let site = Site::new(&config, Path::new("/srv/site")).unwrap();
        assert_eq!(site.param("AUTHOR"), Some(&Value::String("Jo".into())));
        assert_eq!(site.content_dir(), Path::new("/srv/site/content"));
    }
}
