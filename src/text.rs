//! Plain-text helpers shared by the derivation engine and the summary code.

/// Word budget for automatic summaries
pub const SUMMARY_LENGTH: usize = 70;

/// Strip HTML tags.
///
/// Newlines become spaces, paragraph ends and line breaks become newlines,
/// and consecutive whitespace collapses to its first character.
pub fn strip_html(html: &str) -> String {
    // Shortcut strings with no tags in them
    if !html.contains(['<', '>']) {
        return html.to_string();
    }

    let replaced = html
        .replace('\n', " ")
        .replace("</p>", "\n")
        .replace("<br />", "\n")
        .replace("<br>", "\n");

    let mut result = String::with_capacity(replaced.len());
    let mut in_tag = false;
    let mut was_space = false;

    for ch in replaced.chars() {
        let mut is_space = false;
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if in_tag => {}
            _ => {
                is_space = ch.is_whitespace();
                if !is_space || !was_space {
                    result.push(ch);
                }
            }
        }
        if !in_tag {
            was_space = is_space;
        }
    }
    result
}

/// Count whitespace-separated words
pub fn total_words(text: &str) -> usize {
    text.split_whitespace().count()
}

/// True when every character is a single byte, i.e. the word is ASCII
pub fn is_single_byte_word(word: &str) -> bool {
    word.len() == word.chars().count()
}

/// Truncate a word list to `max` units, counting non-ASCII words rune by rune.
///
/// Returns the joined text and whether anything was cut off.
pub fn truncate_words_by_rune(words: &[String], max: usize) -> (String, bool) {
    let mut count = 0;

    for (index, word) in words.iter().enumerate() {
        if count >= max {
            return (words[..index].join(" "), true);
        }

        let rune_count = word.chars().count();
        if is_single_byte_word(word) {
            count += 1;
        } else if count + rune_count < max {
            count += rune_count;
        } else {
            for (byte_index, _) in word.char_indices() {
                if count >= max {
                    let mut kept: Vec<&str> = words[..index].iter().map(String::as_str).collect();
                    kept.push(&word[..byte_index]);
                    return (kept.join(" "), true);
                }
                count += 1;
            }
        }
    }

    (words.join(" "), false)
}

fn is_end_of_sentence(ch: char) -> bool {
    matches!(ch, '.' | '?' | '!' | '"' | '\n')
}

/// Truncate text to `max` words, extended to the end of the sentence.
///
/// Text with no more than `max` words is returned unchanged and untruncated.
pub fn truncate_words_to_whole_sentence(text: &str, max: usize) -> (String, bool) {
    if total_words(text) <= max {
        return (text.to_string(), false);
    }

    let mut word_count = 0;
    let mut last_word_index = None;
    let mut in_word = false;
    for (i, ch) in text.char_indices() {
        if ch.is_whitespace() {
            if in_word {
                word_count += 1;
                last_word_index = Some(i);
                if word_count >= max {
                    break;
                }
            }
            in_word = false;
        } else {
            in_word = true;
        }
    }

    let Some(last_word_index) = last_word_index else {
        return (text.to_string(), false);
    };

    let end_index = text[last_word_index..]
        .char_indices()
        .find(|(_, ch)| is_end_of_sentence(*ch))
        .map(|(j, ch)| last_word_index + j + ch.len_utf8());

    match end_index {
        Some(end) => (text[..end].trim().to_string(), end < text.trim_end().len()),
        None => (text.to_string(), false),
    }
}
