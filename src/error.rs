use std::fmt;
use std::path::Path;

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

// ANSI color codes for styled error output
const BOLD_CYAN: &str = "\x1b[1;36m";
const YELLOW: &str = "\x1b[33m";
const RESET: &str = "\x1b[0m";

/// A path that displays with cyan highlighting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyledPath(pub String);

impl fmt::Display for StyledPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{BOLD_CYAN}{}{RESET}", self.0)
    }
}

impl From<&Path> for StyledPath {
    fn from(p: &Path) -> Self {
        StyledPath(p.display().to_string())
    }
}

impl From<String> for StyledPath {
    fn from(s: String) -> Self {
        StyledPath(s)
    }
}

impl From<&str> for StyledPath {
    fn from(s: &str) -> Self {
        StyledPath(s.to_string())
    }
}

impl From<std::path::PathBuf> for StyledPath {
    fn from(p: std::path::PathBuf) -> Self {
        StyledPath(p.display().to_string())
    }
}

impl From<&std::path::PathBuf> for StyledPath {
    fn from(p: &std::path::PathBuf) -> Self {
        StyledPath(p.display().to_string())
    }
}

/// A name/identifier that displays with yellow highlighting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyledName(pub String);

impl fmt::Display for StyledName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{YELLOW}{}{RESET}", self.0)
    }
}

impl From<String> for StyledName {
    fn from(s: String) -> Self {
        StyledName(s)
    }
}

impl From<&str> for StyledName {
    fn from(s: &str) -> Self {
        StyledName(s.to_string())
    }
}

/// The primary error type for page construction and resolution
#[derive(Error, Diagnostic, Debug)]
pub enum PageError {
    // === Config Errors ===
    #[error("I couldn't parse your {path} file", path = StyledPath::from("config.toml"))]
    #[diagnostic(
        code(folio::config::parse),
        help("I had trouble understanding your TOML syntax. Common issues include missing quotes around strings or unclosed brackets.")
    )]
    ConfigParse {
        #[source_code]
        src: NamedSource<String>,
        #[label("the error is around here")]
        span: SourceSpan,
        reason: String,
    },

    #[error("I couldn't read the config file at {path}")]
    #[diagnostic(
        code(folio::config::read),
        help("Make sure the file exists and you have permission to read it.")
    )]
    ConfigRead {
        path: StyledPath,
        #[source]
        cause: std::io::Error,
    },

    // === Construction Errors ===
    #[error("I can't create a page without a source name")]
    #[diagnostic(
        code(folio::page::empty_name),
        help("Every page needs the path of the content file it was read from.")
    )]
    EmptyName,

    #[error("I couldn't parse the front matter in {file}")]
    #[diagnostic(
        code(folio::frontmatter::parse),
        help("Front matter is a YAML block fenced by `---`, a TOML block fenced by `+++`, or a JSON object at the very top of the file.\n\nExample:\n---\ntitle: My Page Title\ndescription: A short description\n---")
    )]
    FrontMatterParse { file: StyledPath, reason: String },

    #[error("The front matter in {file} is not a key/value mapping")]
    #[diagnostic(
        code(folio::frontmatter::not_a_map),
        help("The front matter must be a mapping of keys to values, not a list or a single value.")
    )]
    NoMetadata { file: StyledPath },

    #[error("Only relative URLs are supported, {url} provided in {file}")]
    #[diagnostic(
        code(folio::metadata::absolute_url),
        help("Set `url` to a site-relative path such as `/about/`. The site's base URL is added for you.")
    )]
    AbsoluteUrl { file: StyledPath, url: StyledName },

    #[error("Only relative aliases are supported, {alias} provided in {file}")]
    #[diagnostic(
        code(folio::metadata::absolute_alias),
        help("Aliases are redirects inside your own site, so they must be paths such as `/old/path/`.")
    )]
    AbsoluteAlias { file: StyledPath, alias: StyledName },

    #[error("{file} has both draft and published settings in its front matter")]
    #[diagnostic(
        code(folio::metadata::draft_and_published),
        severity(Warning),
        help("I used the `draft` value. Remove `published` to silence this warning.")
    )]
    DraftAndPublished { file: StyledPath },

    // === Resolution Errors ===
    #[error("The permalink pattern {pattern} for section {section} is ill-formed")]
    #[diagnostic(
        code(folio::permalink::pattern),
        help("{reason}\n\nKnown placeholders: :year, :month, :monthname, :day, :weekday, :weekdayname, :yearday, :section, :title, :slug, :filename")
    )]
    PermalinkPattern {
        section: StyledName,
        pattern: StyledName,
        reason: String,
    },

    #[error("I couldn't expand the permalink pattern {pattern} for {file}")]
    #[diagnostic(code(folio::permalink::expand))]
    PermalinkExpand {
        file: StyledPath,
        pattern: StyledName,
        reason: String,
    },

    #[error("The permalink {link} is not inside the base URL {base}")]
    #[diagnostic(
        code(folio::permalink::relative),
        help("With `canonify_urls` enabled every permalink must start with `base_url`.")
    )]
    RelativePath { link: StyledName, base: StyledName },

    // === Rendering Errors ===
    #[error("I couldn't render {file}")]
    #[diagnostic(code(folio::render))]
    Render { file: StyledPath, reason: String },

    // === Marshalling Errors ===
    #[error("I couldn't write the front matter as {format}")]
    #[diagnostic(
        code(folio::frontmatter::encode),
        help("{reason}")
    )]
    FrontMatterEncode { format: StyledName, reason: String },

    // === File Errors ===
    #[error("I couldn't find the file at {path}")]
    #[diagnostic(
        code(folio::file::not_found),
        help("Make sure the file exists and the path is correct.")
    )]
    FileNotFound { path: StyledPath },

    #[error("I couldn't read the file at {path}")]
    #[diagnostic(code(folio::file::read))]
    FileRead {
        path: StyledPath,
        #[source]
        cause: std::io::Error,
    },

    #[error("I couldn't write to {path}")]
    #[diagnostic(code(folio::file::write))]
    FileWrite {
        path: StyledPath,
        #[source]
        cause: std::io::Error,
    },

    #[error("I won't overwrite {path}, it already exists")]
    #[diagnostic(
        code(folio::file::exists),
        help("Pick another path or delete the existing file first.")
    )]
    FileExists { path: StyledPath },

    #[error("A background task failed: {reason}")]
    #[diagnostic(
        code(folio::check::task_join),
        help("A parallel task panicked or was cancelled.")
    )]
    TaskJoin { reason: String },

    #[error("I couldn't read your input: {cause}")]
    #[diagnostic(code(folio::new::input_error))]
    InputError { cause: String },
}

pub type Result<T> = std::result::Result<T, PageError>;

impl PageError {
    /// Create a config parse error with source span from a TOML error
    pub fn config_parse(path: &Path, content: &str, error: toml::de::Error) -> Self {
        let span = error
            .span()
            .map(|r| SourceSpan::new(r.start.into(), (r.end - r.start).max(1)))
            .unwrap_or_else(|| SourceSpan::from((0_usize, 1_usize)));

        PageError::ConfigParse {
            src: NamedSource::new(path.display().to_string(), content.to_string()),
            span,
            reason: error.message().to_string(),
        }
    }

    /// True for the draft/published conflict, which leaves the page usable
    pub fn is_conflicting_intent(&self) -> bool {
        matches!(self, PageError::DraftAndPublished { .. })
    }
}

/// Extension trait for adding page error context to IO operations
pub trait PageResultExt<T> {
    /// Add file read context to an error
    fn with_file_read(self, path: &Path) -> Result<T>;

    /// Add file write context to an error
    fn with_file_write(self, path: &Path) -> Result<T>;
}

impl<T> PageResultExt<T> for std::result::Result<T, std::io::Error> {
    fn with_file_read(self, path: &Path) -> Result<T> {
        self.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                PageError::FileNotFound {
                    path: StyledPath::from(path),
                }
            } else {
                PageError::FileRead {
                    path: StyledPath::from(path),
                    cause: e,
                }
            }
        })
    }

    fn with_file_write(self, path: &Path) -> Result<T> {
        self.map_err(|e| {
            if e.kind() == std::io::ErrorKind::AlreadyExists {
                PageError::FileExists {
                    path: StyledPath::from(path),
                }
            } else {
                PageError::FileWrite {
                    path: StyledPath::from(path),
                    cause: e,
                }
            }
        })
    }
}
