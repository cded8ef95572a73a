//! Local, deterministic turn-intent checks.
//!
//! Cancellation must work even when the parsing capability is down, so it
//! is detected here with keyword matching rather than delegated to the
//! external parser.

/// Cancellation phrases. English phrases match case-insensitively on
/// whole-word boundaries, so "cancellation" or "cancelled" never trigger.
/// Chinese phrases are substrings (no word boundaries) and are checked
/// for every session language since the input language is not guaranteed
/// to match the session tag.
const CANCEL_PHRASES_EN: &[&str] = &["cancel", "never mind", "nevermind", "forget it"];
const CANCEL_PHRASES_ZH: &[&str] = &["取消", "算了", "不用了"];

/// Returns true when the transcript is an explicit cancel instruction.
pub fn is_cancel(transcript: &str) -> bool {
    let lower = transcript.trim().to_lowercase();
    if lower.is_empty() {
        return false;
    }
    let words: Vec<&str> = lower
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .collect();
    CANCEL_PHRASES_EN
        .iter()
        .any(|phrase| contains_phrase(&words, phrase))
        || CANCEL_PHRASES_ZH.iter().any(|p| transcript.contains(p))
}

fn contains_phrase(words: &[&str], phrase: &str) -> bool {
    let needle: Vec<&str> = phrase.split_whitespace().collect();
    words
        .windows(needle.len())
        .any(|window| window == needle.as_slice())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_english_cancel_phrases() {
        assert!(is_cancel("cancel that"));
        assert!(is_cancel("Never mind"));
        assert!(is_cancel("ugh, forget it"));
    }

    #[test]
    fn detects_chinese_cancel_phrases() {
        assert!(is_cancel("取消这个日程"));
        assert!(is_cancel("算了"));
    }

    #[test]
    fn ordinary_transcripts_are_not_cancel() {
        assert!(!is_cancel("meeting with John tomorrow at 3pm"));
        assert!(!is_cancel(""));
        assert!(!is_cancel("   "));
    }

    #[test]
    fn cancel_inside_a_longer_word_is_not_cancel() {
        assert!(!is_cancel("set up a meeting about the cancellation policy"));
        assert!(!is_cancel("my flight was cancelled, book a call"));
        assert!(!is_cancel("we need to discuss the nevermindful report"));
        // Whole-word use still cancels, punctuation included.
        assert!(is_cancel("Cancel it, please."));
    }
}
