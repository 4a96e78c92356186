use serde::Serialize;

use super::Page;
use crate::text::{
    SUMMARY_LENGTH, is_single_byte_word, strip_html, total_words, truncate_words_by_rune,
    truncate_words_to_whole_sentence,
};

/// Word statistics over a page's plain text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WordStats {
    pub word_count: usize,
    /// Word count rounded up to the next hundred
    pub fuzzy_word_count: usize,
    /// Estimated minutes to read
    pub reading_time: usize,
}

impl WordStats {
    fn from_word_count(word_count: usize, cjk: bool) -> Self {
        let reading_time = if cjk {
            (word_count + 500) / 501
        } else {
            (word_count + 212) / 213
        };
        Self {
            word_count,
            fuzzy_word_count: (word_count + 100) / 100 * 100,
            reading_time,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub html: String,
    pub truncated: bool,
}

/// CJK words count one per character, ASCII words count once
fn cjk_word_count(words: &[String]) -> usize {
    words
        .iter()
        .map(|word| {
            if is_single_byte_word(word) {
                1
            } else {
                word.chars().count()
            }
        })
        .sum()
}

impl Page {
    /// Rendered content with all markup stripped
    pub fn plain(&self) -> &str {
        self.plain.get_or_init(|| strip_html(&self.content))
    }

    pub fn plain_words(&self) -> &[String] {
        self.plain_words
            .get_or_init(|| self.plain().split_whitespace().map(String::from).collect())
    }

    fn word_stats(&self) -> WordStats {
        *self.word_stats.get_or_init(|| {
            let word_count = if self.is_cjk_language {
                cjk_word_count(self.plain_words())
            } else {
                total_words(self.plain())
            };
            WordStats::from_word_count(word_count, self.is_cjk_language)
        })
    }

    pub fn word_count(&self) -> usize {
        self.word_stats().word_count
    }

    pub fn fuzzy_word_count(&self) -> usize {
        self.word_stats().fuzzy_word_count
    }

    pub fn reading_time(&self) -> usize {
        self.word_stats().reading_time
    }

    pub fn stats(&self) -> WordStats {
        self.word_stats()
    }

    /// The explicit summary when the content has a divider, otherwise the
    /// plain text truncated to the summary length
    pub fn summary(&self) -> &Summary {
        self.summary.get_or_init(|| {
            let (html, truncated) = if self.is_cjk_language {
                truncate_words_by_rune(self.plain_words(), SUMMARY_LENGTH)
            } else {
                truncate_words_to_whole_sentence(self.plain(), SUMMARY_LENGTH)
            };
            Summary { html, truncated }
        })
    }

    pub fn is_truncated(&self) -> bool {
        self.summary().truncated
    }
}
