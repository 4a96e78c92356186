use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{PageError, Result};
use crate::publish::BuildFlags;
use crate::render::RenderingConfig;

#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    #[serde(default)]
    pub base_url: String,

    /// Directory holding content files, relative to the site root
    #[serde(default = "default_content_dir")]
    pub content_dir: PathBuf,

    #[serde(default = "default_language")]
    pub default_content_language: String,

    /// Put pages of the default language under `/<lang>/` as well
    #[serde(default)]
    pub default_content_language_in_subdir: bool,

    #[serde(default)]
    pub build: BuildConfig,

    /// Configured languages; two or more make the site multilingual
    #[serde(default)]
    pub languages: BTreeMap<String, LanguageConfig>,

    /// Section name to permalink pattern, e.g. `blog = "/:section/:year/:slug/"`
    #[serde(default)]
    pub permalinks: BTreeMap<String, String>,

    /// Site-wide parameters, the fallback for page parameters
    #[serde(default)]
    pub params: toml::Table,

    #[serde(default)]
    pub rendering: RenderingConfig,
}

fn default_content_dir() -> PathBuf {
    PathBuf::from("content")
}

fn default_language() -> String {
    "en".to_string()
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            content_dir: default_content_dir(),
            default_content_language: default_language(),
            default_content_language_in_subdir: false,
            build: BuildConfig::default(),
            languages: BTreeMap::new(),
            permalinks: BTreeMap::new(),
            params: toml::Table::new(),
            rendering: RenderingConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BuildConfig {
    /// Output `dir/name.html` instead of `dir/name/`
    #[serde(default)]
    pub ugly_urls: bool,

    /// Derive relative permalinks by stripping the whole base URL
    #[serde(default)]
    pub canonify_urls: bool,

    #[serde(default)]
    pub build_future: bool,

    #[serde(default)]
    pub build_expired: bool,

    #[serde(default)]
    pub build_drafts: bool,

    /// Use the file modification time when a page has no date
    #[serde(default)]
    pub use_modtime_as_fallback: bool,

    /// Scan page bodies for CJK characters
    #[serde(default)]
    pub has_cjk_language: bool,

    #[serde(default = "default_extension")]
    pub default_extension: String,

    /// Menu whose entries are identified by section name
    #[serde(default)]
    pub section_pages_menu: String,
}

fn default_extension() -> String {
    "html".to_string()
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            ugly_urls: false,
            canonify_urls: false,
            build_future: false,
            build_expired: false,
            build_drafts: false,
            use_modtime_as_fallback: false,
            has_cjk_language: false,
            default_extension: default_extension(),
            section_pages_menu: String::new(),
        }
    }
}

impl BuildConfig {
    pub fn flags(&self) -> BuildFlags {
        BuildFlags {
            build_future: self.build_future,
            build_expired: self.build_expired,
            build_drafts: self.build_drafts,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct LanguageConfig {
    pub language_name: Option<String>,
    #[serde(default)]
    pub weight: i64,
}

impl SiteConfig {
    pub async fn load(site_path: &Path) -> Result<Self> {
        let config_path = site_path.join("config.toml");

        if !config_path.exists() {
            return Ok(SiteConfig::default());
        }

        let content = tokio::fs::read_to_string(&config_path)
            .await
            .map_err(|e| PageError::ConfigRead {
                path: (&config_path).into(),
                cause: e,
            })?;

        Self::parse(&config_path, &content)
    }

    pub fn parse(config_path: &Path, content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| PageError::config_parse(config_path, content, e))
    }

    /// Language codes ordered by weight, then code
    pub fn language_codes(&self) -> Vec<String> {
        let mut languages: Vec<(&String, &LanguageConfig)> = self.languages.iter().collect();
        languages.sort_by(|(a_code, a), (b_code, b)| a.weight.cmp(&b.weight).then(a_code.cmp(b_code)));
        languages.into_iter().map(|(code, _)| code.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = SiteConfig::parse(Path::new("config.toml"), "").unwrap();
        assert_eq!(config.content_dir, PathBuf::from("content"));
        assert_eq!(config.default_content_language, "en");
        assert_eq!(config.build.default_extension, "html");
        assert!(!config.build.ugly_urls);
        assert!(config.rendering.smart_punctuation);
    }

    #[test]
    fn test_full_config() {
        let content = r#"
base_url = "https://example.com/"
default_content_language = "fr"

[build]
ugly_urls = true
build_drafts = true
section_pages_menu = "main"

[languages.fr]
weight = 1

[languages.en]
weight = 2

[permalinks]
blog = "/:section/:year/:slug/"

[params]
author = "Jo"

[rendering]
href_target_blank = true
"#;
        let config = SiteConfig::parse(Path::new("config.toml"), content).unwrap();
        assert_eq!(config.base_url, "https://example.com/");
        assert!(config.build.ugly_urls);
        assert!(config.build.flags().build_drafts);
        assert_eq!(config.build.section_pages_menu, "main");
        assert_eq!(config.language_codes(), vec!["fr".to_string(), "en".to_string()]);
        assert_eq!(config.permalinks["blog"], "/:section/:year/:slug/");
        assert_eq!(config.params["author"].as_str(), Some("Jo"));
        assert!(config.rendering.href_target_blank);
        assert!(config.rendering.fractions);
    }

    #[test]
    fn test_invalid_config_reports_parse_error() {
        let err = SiteConfig::parse(Path::new("config.toml"), "base_url = ").unwrap_err();
        assert!(matches!(err, PageError::ConfigParse { .. }));
    }

    #[tokio::test]
    async fn test_missing_config_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = SiteConfig::load(dir.path()).await.unwrap();
        assert_eq!(config.base_url, "");
    }

    #[tokio::test]
    async fn test_load_reads_config_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.toml"), "base_url = \"https://x.org/\"\n").unwrap();
        let config = SiteConfig::load(dir.path()).await.unwrap();
        assert_eq!(config.base_url, "https://x.org/");
    }
}
