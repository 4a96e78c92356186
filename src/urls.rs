//! URL and path helpers used by permalink and target-path resolution.
//!
//! All paths here use forward slashes; conversion to platform separators
//! happens only when a target path is produced.

/// True for URLs starting with an `http://` or `https://` scheme
pub fn is_abs_url(url: &str) -> bool {
    let url = url.trim_start();
    ["http://", "https://"].iter().any(|scheme| {
        url.get(..scheme.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
    })
}

/// Replace spaces with dashes and drop characters unsafe in paths
pub fn make_path(s: &str) -> String {
    s.trim()
        .replace(' ', "-")
        .chars()
        .filter(|&c| c.is_alphanumeric() || matches!(c, '.' | '/' | '\\' | '_' | '-' | '#' | '+'))
        .collect()
}

/// Lower-cased [`make_path`]
pub fn make_path_sanitized(s: &str) -> String {
    make_path(s).to_lowercase()
}

/// Turn arbitrary text into a URL path component: sanitized, lower-cased,
/// non-ASCII characters percent-encoded
pub fn urlize(uri: &str) -> String {
    let sanitized = make_path_sanitized(uri);
    let mut encoded = String::with_capacity(sanitized.len());
    for ch in sanitized.chars() {
        if ch.is_ascii() {
            encoded.push(ch);
        } else {
            let mut buf = [0u8; 4];
            encoded.push_str(&urlencoding::encode(ch.encode_utf8(&mut buf)));
        }
    }
    encoded
}

/// Clean a slash path: collapse duplicate slashes, resolve `.` and `..`,
/// drop the trailing slash. Returns `.` for an empty relative path.
pub fn clean(path: &str) -> String {
    let rooted = path.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if parts.last().is_some_and(|last| *last != "..") {
                    parts.pop();
                } else if !rooted {
                    parts.push("..");
                }
            }
            other => parts.push(other),
        }
    }

    let joined = parts.join("/");
    match (rooted, joined.is_empty()) {
        (true, _) => format!("/{joined}"),
        (false, true) => ".".to_string(),
        (false, false) => joined,
    }
}

/// Join path elements with `/` and clean the result; empty elements are skipped
pub fn join(parts: &[&str]) -> String {
    let joined = parts
        .iter()
        .filter(|p| !p.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join("/");
    if joined.is_empty() {
        String::new()
    } else {
        clean(&joined)
    }
}

/// Everything before the last slash, cleaned
pub fn dir(path: &str) -> String {
    match path.rfind('/') {
        Some(i) => clean(&path[..=i]),
        None => ".".to_string(),
    }
}

/// Last path element
pub fn base(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    match trimmed.rfind('/') {
        Some(i) => &trimmed[i + 1..],
        None => trimmed,
    }
}

/// Extension of the last path element including the dot, or empty
pub fn ext(path: &str) -> &str {
    let last = &path[path.rfind('/').map(|i| i + 1).unwrap_or(0)..];
    match last.rfind('.') {
        Some(i) => &last[i..],
        None => "",
    }
}

/// Swap the extension of `path` for `new_ext`
pub fn replace_extension(path: &str, new_ext: &str) -> String {
    let stem = path.strip_suffix(ext(path)).unwrap_or(path);
    format!("{stem}.{new_ext}")
}

/// Split the last element into name and extension
fn file_and_ext(path: &str) -> (&str, &str) {
    let extension = ext(path);
    let name = base(path);
    (name.strip_suffix(extension).unwrap_or(name), extension)
}

/// Collapse duplicate slashes, resolve dot segments and drop the trailing slash
pub fn sanitize_url(input: &str) -> String {
    if input.is_empty() {
        return String::new();
    }
    let cleaned = clean(input);
    if cleaned == "." { String::new() } else { cleaned }
}

/// Convert a content path to a pretty path.
///
/// ```text
/// /section/name.html       -> /section/name/index.html
/// /section/name/           -> /section/name/index.html
/// /section/name/index.html -> /section/name/index.html
/// ```
pub fn prettify_url_path(input: &str) -> String {
    if ext(input).is_empty() {
        if input.len() < 2 {
            return "/".to_string();
        }
        return join(&[input, "index.html"]);
    }

    let (name, extension) = file_and_ext(input);
    if name == "index" {
        return clean(input);
    }

    let parent = dir(input);
    let parent = if parent == "." { "" } else { parent.as_str() };
    join(&[parent, name, &format!("index{extension}")])
}

/// Pretty URL without the `index.html` leaf
pub fn prettify_url(input: &str) -> String {
    if input.is_empty() {
        return "/".to_string();
    }
    let pretty = prettify_url_path(input);
    if base(&pretty) == "index.html" {
        let parent = dir(&pretty);
        if parent == "." {
            return "/".to_string();
        }
        return parent;
    }
    pretty
}

/// The opposite of [`prettify_url_path`].
///
/// ```text
/// /section/name/index.html -> /section/name.html
/// /section/name/           -> /section/name.html
/// /section/name.html       -> /section/name.html
/// ```
pub fn uglify(input: &str) -> String {
    if ext(input).is_empty() {
        if input.len() < 2 {
            return "/".to_string();
        }
        return format!("{}.html", clean(input));
    }

    let (name, extension) = file_and_ext(input);
    if name == "index" {
        let parent = dir(input);
        if parent.len() > 1 {
            return format!("{parent}{extension}");
        }
        return input.to_string();
    }
    if name.is_empty() {
        // /.xml -> /index.xml
        let parent = dir(input);
        let parent = if parent == "." { "" } else { parent.as_str() };
        return join(&[parent, &format!("index{extension}")]);
    }
    clean(input)
}

/// Prepare a content path for use as a URL in pretty or ugly mode
pub fn url_prep(ugly: bool, input: &str) -> String {
    let sanitized = sanitize_url(input);
    if ugly {
        return uglify(&sanitized);
    }

    let pretty = prettify_url(&sanitized);
    if ext(&pretty) == ".xml" || pretty.ends_with('/') {
        return pretty;
    }
    format!("{pretty}/")
}

/// A base URL split into its origin (`https://host`) and path (`/sub/`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseUrl {
    origin: String,
    path: String,
    raw: String,
}

impl BaseUrl {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        let (origin, path) = match raw.find("://") {
            Some(scheme_end) => {
                let after = scheme_end + 3;
                match raw[after..].find('/') {
                    Some(i) => (&raw[..after + i], &raw[after + i..]),
                    None => (raw, ""),
                }
            }
            None => ("", raw),
        };

        Self {
            origin: origin.to_lowercase(),
            path: path.to_string(),
            raw: raw.to_string(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// The base URL with a lower-cased origin, as permalinks spell it
    pub fn normalized(&self) -> String {
        format!("{}{}", self.origin, self.path)
    }

    /// Join a site-relative link onto this base URL.
    ///
    /// A trailing slash on the link (or on the base, for an empty link) is kept.
    pub fn make_permalink(&self, link: &str) -> String {
        if is_abs_url(link) {
            return link.to_string();
        }
        let link_path = link.split(['?', '#']).next().unwrap_or("");

        let mut path = join(&[&self.path, link_path]);
        if !path.starts_with('/') {
            path.insert(0, '/');
        }

        let had_trailing_slash =
            (link.is_empty() && self.raw.ends_with('/')) || link_path.ends_with('/');
        if had_trailing_slash && !path.ends_with('/') {
            path.push('/');
        }

        format!("{}{}", self.origin, path)
    }
}

/// Drop scheme and host from an absolute URL, keeping its path
pub fn strip_origin(url: &str) -> &str {
    match url.find("://") {
        Some(scheme_end) => {
            let after = scheme_end + 3;
            match url[after..].find('/') {
                Some(i) => &url[after + i..],
                None => "/",
            }
        }
        None => url,
    }
}

/// Path of `link` relative to `base`, with a leading slash.
///
/// Returns `None` when `link` does not live under `base`.
pub fn relative_path(link: &str, base: &str) -> Option<String> {
    let base = base.trim_end_matches('/');
    let rest = link.strip_prefix(base)?;
    if !rest.is_empty() && !rest.starts_with('/') {
        return None;
    }

    let relative = rest.trim_start_matches('/');
    if relative.is_empty() {
        return Some("/".to_string());
    }

    let mut result = format!("/{}", clean(relative));
    if link.ends_with('/') && !result.ends_with('/') {
        result.push('/');
    }
    Some(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_abs_url_checks_the_scheme_prefix() {
        assert!(is_abs_url("https://example.com/"));
        assert!(is_abs_url("HTTP://example.com/"));
        assert!(!is_abs_url("/go?to=https://x.org"));
        assert!(!is_abs_url("/about/"));
        assert!(!is_abs_url("é"));
    }

    #[test]
    fn test_make_path_and_urlize() {
        assert_eq!(make_path(" Hello World! "), "Hello-World");
        assert_eq!(urlize("Hello World"), "hello-world");
        assert_eq!(urlize("/custom/"), "/custom/");
        assert_eq!(urlize("Été"), "%C3%A9t%C3%A9");
    }

    #[test]
    fn test_clean_and_join() {
        assert_eq!(clean("/a//b/./c/../d/"), "/a/b/d");
        assert_eq!(clean(""), ".");
        assert_eq!(clean("/"), "/");
        assert_eq!(join(&["blog/", "hi.html"]), "blog/hi.html");
        assert_eq!(join(&["", "hi.html"]), "hi.html");
        assert_eq!(join(&["/sub/", "/x/"]), "/sub/x");
    }

    #[test]
    fn test_prettify() {
        assert_eq!(prettify_url_path("/section/name.html"), "/section/name/index.html");
        assert_eq!(prettify_url_path("/section/name/"), "/section/name/index.html");
        assert_eq!(prettify_url_path("/section/name/index.html"), "/section/name/index.html");
        assert_eq!(prettify_url("/section/name.html"), "/section/name");
        assert_eq!(prettify_url("hi.html"), "hi");
        assert_eq!(prettify_url("index.html"), "/");
    }

    #[test]
    fn test_uglify() {
        assert_eq!(uglify("/section/name/index.html"), "/section/name.html");
        assert_eq!(uglify("/section/name/"), "/section/name.html");
        assert_eq!(uglify("/section/name.html"), "/section/name.html");
        assert_eq!(uglify("/"), "/");
        assert_eq!(uglify("/.xml"), "/index.xml");
    }

    #[test]
    fn test_url_prep() {
        assert_eq!(url_prep(false, "blog/hi.html"), "blog/hi/");
        assert_eq!(url_prep(true, "blog/hi.html"), "blog/hi.html");
        assert_eq!(url_prep(false, "/:section/x/"), "/:section/x/");
        assert_eq!(url_prep(false, "feed.xml"), "feed/index.xml");
    }

    #[test]
    fn test_make_permalink() {
        let base = BaseUrl::parse("https://Example.com/");
        assert_eq!(base.make_permalink("blog/hi/"), "https://example.com/blog/hi/");
        assert_eq!(base.make_permalink("/custom/"), "https://example.com/custom/");
        assert_eq!(base.make_permalink(""), "https://example.com/");

        let sub = BaseUrl::parse("https://example.com/sub/");
        assert_eq!(sub.make_permalink("blog/hi/"), "https://example.com/sub/blog/hi/");
        assert_eq!(sub.make_permalink("blog/hi.html"), "https://example.com/sub/blog/hi.html");

        let bare = BaseUrl::parse("https://example.com");
        assert_eq!(bare.make_permalink("hi/"), "https://example.com/hi/");

        let empty = BaseUrl::parse("");
        assert_eq!(empty.make_permalink("hi/"), "/hi/");
        assert_eq!(empty.make_permalink("hi.html"), "/hi.html");
    }

    #[test]
    fn test_strip_origin() {
        assert_eq!(strip_origin("https://example.com/sub/x/"), "/sub/x/");
        assert_eq!(strip_origin("https://example.com"), "/");
        assert_eq!(strip_origin("/already/"), "/already/");
    }

    #[test]
    fn test_relative_path() {
        assert_eq!(
            relative_path("https://example.com/sub/blog/x/", "https://example.com/sub/"),
            Some("/blog/x/".to_string())
        );
        assert_eq!(
            relative_path("https://example.com/sub/", "https://example.com/sub/"),
            Some("/".to_string())
        );
        assert_eq!(relative_path("https://other.org/x/", "https://example.com/"), None);
        assert_eq!(relative_path("https://example.com/subway/", "https://example.com/sub"), None);
    }

    #[test]
    fn test_replace_extension() {
        assert_eq!(replace_extension("hello", "html"), "hello.html");
        assert_eq!(replace_extension("hello.md", "html"), "hello.html");
    }
}
