use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error};

use super::Page;
use crate::error::{PageError, Result};
use crate::menu::MenuDecl;
use crate::publish::{self, PublishState};
use crate::urls::is_abs_url;
use crate::value::{self, FrontMatter, Param};

static CJK_RE: OnceLock<Regex> = OnceLock::new();

fn cjk_regex() -> &'static Regex {
    CJK_RE.get_or_init(|| {
        Regex::new(r"\p{Han}|\p{Hangul}|\p{Hiragana}|\p{Katakana}").expect("Invalid regex pattern")
    })
}

/// Per-page sitemap settings
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sitemap {
    pub change_freq: String,
    /// Negative when unset
    pub priority: f64,
    pub filename: String,
}

impl Default for Sitemap {
    fn default() -> Self {
        Self {
            change_freq: String::new(),
            priority: -1.0,
            filename: String::new(),
        }
    }
}

impl Sitemap {
    fn from_value(value: &Value) -> Sitemap {
        let mut sitemap = Sitemap::default();
        let Value::Object(map) = value else {
            return sitemap;
        };
        for (key, value) in map {
            match key.to_lowercase().as_str() {
                "changefreq" => sitemap.change_freq = value::to_string(value),
                "priority" => sitemap.priority = value::to_float(value),
                "filename" => sitemap.filename = value::to_string(value),
                _ => {}
            }
        }
        sitemap
    }
}

impl Page {
    /// Apply a decoded front-matter map to this page.
    ///
    /// Known keys (matched ignoring case) set typed fields; everything else
    /// lands in the parameter bag under its lower-cased name. When both
    /// `draft` and `published` are given, `draft` wins and
    /// [`PageError::DraftAndPublished`] is returned after every other field
    /// has been applied.
    pub fn update(&mut self, meta: &FrontMatter) -> Result<()> {
        let mut draft: Option<bool> = None;
        let mut published: Option<bool> = None;
        let mut cjk: Option<bool> = None;

        for (key, value) in meta {
            let lower = key.to_lowercase();
            match lower.as_str() {
                "title" => self.title = value::to_string(value),
                "linktitle" => self.link_title = value::to_string(value),
                "description" => {
                    self.description = value::to_string(value);
                    self.params
                        .insert(lower, Param::String(self.description.clone()));
                }
                "slug" => self.slug = value::to_string(value).trim().to_string(),
                "url" => {
                    let url = value::to_string(value);
                    if is_abs_url(&url) {
                        return Err(PageError::AbsoluteUrl {
                            file: self.source.path().into(),
                            url: url.into(),
                        });
                    }
                    self.url = url;
                }
                "type" => self.content_type = value::to_string(value),
                "extension" | "ext" => self.extension = value::to_string(value),
                "keywords" => self.keywords = value::to_string_list(value),
                "date" => self.date = self.parse_date(key, value),
                "lastmod" => self.lastmod = self.parse_date(key, value),
                "publishdate" | "pubdate" => self.publish_date = self.parse_date(key, value),
                "expirydate" | "unpublishdate" => self.expiry_date = self.parse_date(key, value),
                "draft" => draft = Some(value::to_bool(value)),
                "published" => published = Some(value::to_bool(value)),
                "layout" => self.layout = value::to_string(value),
                "markup" => self.markup = value::to_string(value),
                "weight" => self.weight = value::to_int(value),
                "aliases" => {
                    let aliases = value::to_string_list(value);
                    if let Some(alias) = aliases.iter().find(|alias| is_abs_url(alias)) {
                        return Err(PageError::AbsoluteAlias {
                            file: self.source.path().into(),
                            alias: alias.as_str().into(),
                        });
                    }
                    self.aliases = aliases;
                }
                "status" => self.status = value::to_string(value),
                "sitemap" => self.sitemap = Sitemap::from_value(value),
                "iscjklanguage" => cjk = Some(value::to_bool(value)),
                _ => {
                    if lower == "menu" || lower == "menus" {
                        self.menu_decl = MenuDecl::from_value(value);
                        if self.menu_decl.is_none() {
                            error!(file = %self.source.path(), value = %value, "Unable to process menus");
                        }
                    }
                    self.params.insert(lower, Param::from_value(value));
                }
            }
        }

        if let Some(draft) = draft {
            self.draft = draft;
        } else if let Some(published) = published {
            self.draft = !published;
        }

        if self.date.is_none() && self.site.build().use_modtime_as_fallback {
            self.date = self.source_modified();
        }

        if self.lastmod.is_none() {
            self.lastmod = self.date;
        }

        self.is_cjk_language = match cjk {
            Some(explicit) => explicit,
            None => self.site.build().has_cjk_language && cjk_regex().is_match(&self.raw_content),
        };

        if draft.is_some() && published.is_some() {
            return Err(PageError::DraftAndPublished {
                file: self.source.path().into(),
            });
        }
        Ok(())
    }

    fn parse_date(&self, key: &str, value: &Value) -> Option<DateTime<Utc>> {
        let date = value::to_date(value);
        if date.is_none() {
            error!(file = %self.source.path(), key, value = %value, "Failed to parse date");
        }
        date
    }

    /// Modification time of the source file under the content directory
    fn source_modified(&self) -> Option<DateTime<Utc>> {
        let path = self.site.content_dir().join(self.source.path());
        match std::fs::metadata(&path).and_then(|meta| meta.modified()) {
            Ok(modified) => Some(DateTime::<Utc>::from(modified)),
            Err(e) => {
                debug!(path = %path.display(), error = %e, "No modification time for page");
                None
            }
        }
    }

    pub fn is_draft(&self) -> bool {
        self.draft
    }

    pub fn is_future(&self) -> bool {
        self.publish_date.is_some_and(|date| date > Utc::now())
    }

    pub fn is_expired(&self) -> bool {
        self.expiry_date.is_some_and(|date| date < Utc::now())
    }

    pub fn publish_state(&self) -> PublishState {
        PublishState {
            draft: self.draft,
            publish_date: self.publish_date,
            expiry_date: self.expiry_date,
        }
    }

    /// Whether this page is part of the output under the site's build flags
    pub fn should_build(&self) -> bool {
        publish::should_build(self.site.build().flags(), self.publish_state())
    }
}
