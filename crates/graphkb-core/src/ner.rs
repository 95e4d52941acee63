//! Entity recognition seam.
//!
//! The recognition algorithm itself lives behind [`EntityRecognizer`]; the
//! core only caches one recognizer per repository and ships a minimal
//! capitalized-run implementation as the default registration.

use serde::{Deserialize, Serialize};

use crate::model::Language;

/// Registered id of the built-in [`TermRecognizer`].
pub const TERM_RECOGNIZER_ID: &str = "graphkb.ner.term";

/// A candidate entity mention found in free text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityMention {
    pub text: String,
    /// Byte offset of the mention within the input.
    pub start: usize,
}

/// Finds candidate entity mentions in free text for one repository.
pub trait EntityRecognizer: Send + Sync + std::fmt::Debug {
    fn language(&self) -> Language;

    fn recognize(&self, text: &str) -> Vec<EntityMention>;
}

/// Naive recognizer: consecutive capitalized words form one mention.
/// Stands in wherever no language-specific recognizer is registered.
#[derive(Debug)]
pub struct TermRecognizer {
    language: Language,
}

impl TermRecognizer {
    pub fn new(language: Language) -> Self {
        Self { language }
    }
}

impl EntityRecognizer for TermRecognizer {
    fn language(&self) -> Language {
        self.language
    }

    fn recognize(&self, text: &str) -> Vec<EntityMention> {
        let mut words: Vec<(usize, &str)> = Vec::new();
        let mut start = None;
        for (i, c) in text.char_indices() {
            if c.is_whitespace() {
                if let Some(s) = start.take() {
                    words.push((s, &text[s..i]));
                }
            } else if start.is_none() {
                start = Some(i);
            }
        }
        if let Some(s) = start {
            words.push((s, &text[s..]));
        }

        let mut mentions = Vec::new();
        let mut run: Option<(usize, usize)> = None;
        for (pos, word) in words {
            let trimmed = word.trim_matches(|c: char| !c.is_alphanumeric());
            let capitalized = trimmed
                .chars()
                .next()
                .map(|c| c.is_uppercase())
                .unwrap_or(false);
            if capitalized {
                let end = pos + word.len();
                run = Some(match run {
                    Some((s, _)) => (s, end),
                    None => (pos, end),
                });
            } else if let Some((s, e)) = run.take() {
                mentions.push(mention(text, s, e));
            }
        }
        if let Some((s, e)) = run {
            mentions.push(mention(text, s, e));
        }
        mentions
    }
}

fn mention(text: &str, start: usize, end: usize) -> EntityMention {
    let raw = &text[start..end];
    let trimmed = raw.trim_end_matches(|c: char| !c.is_alphanumeric());
    EntityMention {
        text: trimmed.to_string(),
        start,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_consecutive_capitalized_words() {
        let recognizer = TermRecognizer::new(Language::En);
        let mentions = recognizer.recognize("who founded New York City in america");
        assert_eq!(mentions.len(), 1);
        assert_eq!(mentions[0].text, "New York City");
        assert_eq!(mentions[0].start, 12);
    }

    #[test]
    fn strips_trailing_punctuation() {
        let recognizer = TermRecognizer::new(Language::En);
        let mentions = recognizer.recognize("tell me about Berlin.");
        assert_eq!(mentions.len(), 1);
        assert_eq!(mentions[0].text, "Berlin");
    }

    #[test]
    fn no_mentions_in_lowercase_text() {
        let recognizer = TermRecognizer::new(Language::En);
        assert!(recognizer.recognize("nothing to see here").is_empty());
    }
}
