use sha2::{Digest, Sha256};

/// Identity of a content file, relative to the content directory.
///
/// `blog/hello.fr.md` splits into:
///
/// | part | value |
/// |---|---|
/// | dir | `blog/` |
/// | logical name | `hello.fr.md` |
/// | ext | `md` |
/// | base name | `hello.fr` |
/// | lang | `fr` (when `fr` is a configured language) |
/// | translation base name | `hello` |
/// | section | `blog` |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    path: String,
    dir: String,
    logical_name: String,
    ext: String,
    base_name: String,
    translation_base_name: String,
    lang: String,
    section: String,
    unique_id: String,
}

impl SourceFile {
    /// Describe the file at `path`; `languages` lists the configured language codes
    pub fn new(path: &str, languages: &[String], default_lang: &str) -> Self {
        let path = path.replace('\\', "/");
        let (dir, logical_name) = match path.rfind('/') {
            Some(i) => (path[..=i].to_string(), path[i + 1..].to_string()),
            None => (String::new(), path.clone()),
        };

        let ext = extension(&logical_name).to_string();
        let base_name = strip_extension(&logical_name).to_string();

        let candidate = extension(&base_name);
        let (lang, translation_base_name) =
            if !candidate.is_empty() && languages.iter().any(|l| l == candidate) {
                (candidate.to_string(), strip_extension(&base_name).to_string())
            } else {
                (default_lang.to_string(), base_name.clone())
            };

        let section = guess_section(&dir);
        let unique_id = compute_unique_id(&path);

        Self {
            path,
            dir,
            logical_name,
            ext,
            base_name,
            translation_base_name,
            lang,
            section,
            unique_id,
        }
    }

    /// Full relative path with forward slashes
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Directory part including the trailing slash, empty at the root
    pub fn dir(&self) -> &str {
        &self.dir
    }

    pub fn logical_name(&self) -> &str {
        &self.logical_name
    }

    pub fn ext(&self) -> &str {
        &self.ext
    }

    pub fn base_name(&self) -> &str {
        &self.base_name
    }

    /// Base name with any language code removed
    pub fn translation_base_name(&self) -> &str {
        &self.translation_base_name
    }

    pub fn lang(&self) -> &str {
        &self.lang
    }

    pub fn section(&self) -> &str {
        &self.section
    }

    pub fn unique_id(&self) -> &str {
        &self.unique_id
    }
}

/// Extension without the dot, empty if there is none
fn extension(name: &str) -> &str {
    match name.rfind('.') {
        Some(i) if i > 0 => &name[i + 1..],
        _ => "",
    }
}

fn strip_extension(name: &str) -> &str {
    match name.rfind('.') {
        Some(i) if i > 0 => &name[..i],
        _ => name,
    }
}

/// The first directory component names the section
fn guess_section(dir: &str) -> String {
    dir.split('/')
        .find(|part| !part.is_empty())
        .unwrap_or("")
        .to_string()
}

/// Compute SHA-256 of the path and return the first 16 bytes as hex
fn compute_unique_id(path: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(path.as_bytes());
    let result = hasher.finalize();
    hex::encode(&result[..16])
}
