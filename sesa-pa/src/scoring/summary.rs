//! Word and phoneme error summaries
//!
//! Turns the recognizer's per-word / per-phoneme accuracy breakdown into
//! the two display strings stored with each record. Missing or malformed
//! structure never raises; empty flag sets degrade to the sentinel.

use crate::models::{ErrorKind, WordEntry};

/// Sentinel emitted when nothing was flagged ("nothing in particular")
pub const NO_ISSUES: &str = "特になし";

/// Words are flagged below this accuracy even without an error kind
const WORD_ACCURACY_THRESHOLD: f64 = 80.0;

/// Phonemes are flagged below this accuracy
const PHONEME_ACCURACY_THRESHOLD: f64 = 60.0;

/// At most this many phoneme entries are rendered; the rest are dropped
/// silently (display-size policy, not an error)
const MAX_PHONEME_ENTRIES: usize = 5;

/// Human-readable error summaries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorSummary {
    /// Flagged words, e.g. "world(75点誤発音)", joined with ", "
    pub mispronounced_words: String,
    /// Flagged phonemes, e.g. "/r/(world内, 55点)", joined with ", "
    pub phoneme_errors: String,
}

/// Extract low-accuracy words and phonemes into display strings
///
/// A word is flagged when its accuracy is below 80 or its error kind is
/// anything other than None. Phonemes are checked under every word,
/// flagged or not, when their accuracy is below 60. Accuracies render
/// integer-truncated to match existing reports.
pub fn summarize_errors(words: &[WordEntry]) -> ErrorSummary {
    let mut flagged_words = Vec::new();
    let mut flagged_phonemes = Vec::new();

    for entry in words {
        if entry.accuracy < WORD_ACCURACY_THRESHOLD || entry.error_kind != ErrorKind::None {
            flagged_words.push(format!(
                "{}({}点{})",
                entry.word,
                entry.accuracy as i64,
                entry.error_kind.label()
            ));
        }

        for phoneme in &entry.phonemes {
            if phoneme.accuracy < PHONEME_ACCURACY_THRESHOLD {
                flagged_phonemes.push(format!(
                    "/{}/({}内, {}点)",
                    phoneme.phoneme, entry.word, phoneme.accuracy as i64
                ));
            }
        }
    }

    flagged_phonemes.truncate(MAX_PHONEME_ENTRIES);

    ErrorSummary {
        mispronounced_words: join_or_sentinel(flagged_words),
        phoneme_errors: join_or_sentinel(flagged_phonemes),
    }
}

fn join_or_sentinel(entries: Vec<String>) -> String {
    if entries.is_empty() {
        NO_ISSUES.to_string()
    } else {
        entries.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PhonemeEntry;

    fn word(word: &str, accuracy: f64, error_kind: ErrorKind) -> WordEntry {
        WordEntry {
            word: word.to_string(),
            accuracy,
            error_kind,
            phonemes: Vec::new(),
        }
    }

    #[test]
    fn empty_input_yields_both_sentinels() {
        let summary = summarize_errors(&[]);
        assert_eq!(summary.mispronounced_words, NO_ISSUES);
        assert_eq!(summary.phoneme_errors, NO_ISSUES);
    }

    #[test]
    fn clean_words_are_not_flagged() {
        let words = vec![
            word("hello", 95.0, ErrorKind::None),
            word("world", 80.0, ErrorKind::None),
        ];
        let summary = summarize_errors(&words);
        assert_eq!(summary.mispronounced_words, NO_ISSUES);
    }

    #[test]
    fn mispronounced_word_with_bad_phoneme() {
        let mut entry = word("world", 75.0, ErrorKind::Mispronunciation);
        entry.phonemes.push(PhonemeEntry {
            phoneme: "r".to_string(),
            accuracy: 55.0,
        });
        entry.phonemes.push(PhonemeEntry {
            phoneme: "d".to_string(),
            accuracy: 90.0,
        });

        let summary = summarize_errors(&[entry]);
        assert_eq!(summary.mispronounced_words, "world(75点誤発音)");
        assert_eq!(summary.phoneme_errors, "/r/(world内, 55点)");
    }

    #[test]
    fn error_kind_flags_word_even_at_high_accuracy() {
        let words = vec![word("the", 98.0, ErrorKind::Omission)];
        let summary = summarize_errors(&words);
        assert_eq!(summary.mispronounced_words, "the(98点省略)");
    }

    #[test]
    fn unknown_error_kind_renders_empty_label() {
        let words = vec![word("uh", 90.0, ErrorKind::Other("UnexpectedBreak".to_string()))];
        let summary = summarize_errors(&words);
        assert_eq!(summary.mispronounced_words, "uh(90点)");
    }

    #[test]
    fn phonemes_checked_under_unflagged_words() {
        let mut entry = word("hello", 95.0, ErrorKind::None);
        entry.phonemes.push(PhonemeEntry {
            phoneme: "l".to_string(),
            accuracy: 40.0,
        });

        let summary = summarize_errors(&[entry]);
        assert_eq!(summary.mispronounced_words, NO_ISSUES);
        assert_eq!(summary.phoneme_errors, "/l/(hello内, 40点)");
    }

    #[test]
    fn phoneme_entries_capped_at_five_in_encounter_order() {
        let mut entry = word("tongue", 70.0, ErrorKind::None);
        for i in 0..8 {
            entry.phonemes.push(PhonemeEntry {
                phoneme: format!("p{}", i),
                accuracy: 10.0,
            });
        }

        let summary = summarize_errors(&[entry]);
        // Each entry renders as "/pN/(tongue内, 10点)"; count the opening
        // slashes since the join delimiter also appears inside entries
        assert_eq!(summary.phoneme_errors.matches("/p").count(), 5);
        assert!(summary.phoneme_errors.starts_with("/p0/"));
        assert!(summary.phoneme_errors.contains("/p4/"));
        assert!(!summary.phoneme_errors.contains("/p5/"));
    }

    #[test]
    fn accuracy_is_truncated_not_rounded() {
        let words = vec![word("sixth", 79.9, ErrorKind::None)];
        let summary = summarize_errors(&words);
        assert_eq!(summary.mispronounced_words, "sixth(79点)");
    }
}
