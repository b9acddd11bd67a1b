//! Sentence boundary detection for German regulatory prose.
//!
//! Unicode sentence boundaries (UAX #29) treat every period followed by an
//! uppercase word as a sentence end. Legal texts are full of abbreviations
//! (`Abs.`, `Nr.`, `BGBl.`, `z. B.`) that break that rule, so segments ending
//! in a known abbreviation, a single-letter initial or a day-of-month ordinal
//! are joined with the following segment. A Roman class number after
//! `Klasse` (`Deponieklasse I.`) still ends the sentence.

use std::collections::HashSet;

use unicode_segmentation::UnicodeSegmentation;

const GERMAN_LEGAL_ABBREVIATIONS: &[&str] = &[
    "Abs", "Anh", "Anl", "Art", "Aufl", "Bd", "BGBl", "Buchst", "bzgl", "bzw", "ca", "gem",
    "ggf", "Hrsg", "inkl", "Kap", "lfd", "max", "min", "Nr", "Nrn", "Rn", "Rdnr", "sog", "Sp",
    "Tab", "usw", "vgl", "zzgl", "Ziff", "Zif",
];

const MONTHS: &[&str] = &[
    "Januar", "Februar", "März", "April", "Mai", "Juni", "Juli", "August", "September",
    "Oktober", "November", "Dezember",
];

/// Sentence splitter, built once and shared by reference.
#[derive(Debug, Clone)]
pub struct SentenceSplitter {
    abbreviations: HashSet<String>,
}

impl SentenceSplitter {
    /// Splitter with the built-in German legal abbreviation list.
    pub fn new() -> Self {
        Self::with_abbreviations(GERMAN_LEGAL_ABBREVIATIONS.iter().copied())
    }

    /// Splitter with a custom abbreviation list (entries without the trailing period).
    pub fn with_abbreviations<I, S>(abbreviations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            abbreviations: abbreviations.into_iter().map(Into::into).collect(),
        }
    }

    /// Split `text` into trimmed, non-empty sentences in document order.
    pub fn sentences<'t>(&self, text: &'t str) -> Vec<&'t str> {
        let segments: Vec<(usize, &str)> = text.split_sentence_bound_indices().collect();
        let mut sentences = Vec::new();
        let mut start: Option<usize> = None;

        for (i, &(offset, segment)) in segments.iter().enumerate() {
            let begin = *start.get_or_insert(offset);
            let end = offset + segment.len();
            if let Some(&(_, next)) = segments.get(i + 1) {
                if self.continues_after(&text[begin..end], next) {
                    continue;
                }
            }
            push_trimmed(&mut sentences, &text[begin..end]);
            start = None;
        }

        sentences
    }

    /// The last `count` sentences of `text` joined by single spaces.
    ///
    /// Returns `None` when `text` has fewer than `count` sentences.
    pub fn tail(&self, text: &str, count: usize) -> Option<String> {
        let sentences = self.sentences(text);
        if sentences.len() < count {
            return None;
        }
        Some(sentences[sentences.len() - count..].join(" "))
    }

    /// Whether the period ending `candidate` belongs to an abbreviation or a date ordinal.
    fn continues_after(&self, candidate: &str, next: &str) -> bool {
        let trimmed = candidate.trim_end();
        let Some(body) = trimmed.strip_suffix('.') else {
            return false;
        };
        let mut words = body.rsplit(char::is_whitespace);
        let word = words
            .next()
            .unwrap_or_default()
            .trim_start_matches(|c: char| !c.is_alphanumeric());

        if word.is_empty() {
            return false;
        }
        if word.chars().all(|c| c.is_ascii_digit()) {
            // "1. August" is a date, "Anlage 1. Die ..." ends a sentence.
            let next_word = next.split_whitespace().next().unwrap_or_default();
            return word.len() <= 2 && MONTHS.contains(&next_word);
        }
        let mut chars = word.chars();
        if let (Some(first), None) = (chars.next(), chars.next()) {
            return first.is_alphabetic() && !is_class_numeral(words.next(), first);
        }
        self.abbreviations.contains(word)
    }
}

impl Default for SentenceSplitter {
    fn default() -> Self {
        Self::new()
    }
}

/// "Deponieklasse I." ends with a class number, not an initial.
fn is_class_numeral(previous: Option<&str>, letter: char) -> bool {
    matches!(letter, 'I' | 'V' | 'X')
        && previous.is_some_and(|word| word.to_lowercase().ends_with("klasse"))
}

fn push_trimmed<'t>(sentences: &mut Vec<&'t str>, candidate: &'t str) {
    let trimmed = candidate.trim();
    if !trimmed.is_empty() {
        sentences.push(trimmed);
    }
}
