use std::fmt;

/// Markup dialects a content file can be written in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Markup {
    Markdown,
    Mmark,
    Asciidoc,
    Asciidoctor,
    Pandoc,
    Rst,
    Html,
    Unknown,
}

impl Markup {
    /// Guess the dialect from a front-matter `markup` value or a file extension
    pub fn guess(name: &str) -> Markup {
        match name.trim().trim_start_matches('.').to_ascii_lowercase().as_str() {
            "md" | "markdown" | "mdown" => Markup::Markdown,
            "mmark" => Markup::Mmark,
            "asciidoc" | "adoc" | "ad" => Markup::Asciidoc,
            "asciidoctor" => Markup::Asciidoctor,
            "pandoc" | "pdc" => Markup::Pandoc,
            "rst" => Markup::Rst,
            "html" | "htm" => Markup::Html,
            _ => Markup::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Markup::Markdown => "markdown",
            Markup::Mmark => "mmark",
            Markup::Asciidoc => "asciidoc",
            Markup::Asciidoctor => "asciidoctor",
            Markup::Pandoc => "pandoc",
            Markup::Rst => "rst",
            Markup::Html => "html",
            Markup::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Markup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
