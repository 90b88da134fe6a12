use once_cell::sync::Lazy;
use regex::Regex;

/// Tokens shorter than this are dropped ("ai" and "ml" survive).
pub const MIN_TOKEN_LEN: usize = 2;

static PUNCTUATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.,/#!$%^&*;:{}=\-_`~()?]").expect("punctuation pattern is valid"));

/// Lowercases `text`, strips the fixed punctuation set, splits on whitespace
/// and drops tokens shorter than [`MIN_TOKEN_LEN`] characters.
///
/// An empty result means "no evidence", never an error.
pub fn tokenize(text: &str) -> Vec<String> {
    let lower_text = text.to_lowercase();
    PUNCTUATION
        .replace_all(&lower_text, "")
        .split_whitespace()
        .filter(|w| w.chars().count() >= MIN_TOKEN_LEN)
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_punctuation_and_folds_case() {
        // the apostrophe is not in the stripped set, so "i'm" survives
        assert_eq!(
            tokenize("Hi, I'm asking about Python!"),
            vec!["hi", "i'm", "asking", "about", "python"]
        );
    }

    #[test]
    fn drops_single_letter_words_and_keeps_two_letter_ones() {
        assert_eq!(tokenize("I do AI & ML a lot"), vec!["do", "ai", "ml", "lot"]);
    }

    #[test]
    fn joins_words_split_by_stripped_punctuation() {
        assert_eq!(tokenize("co-author e.g. node_js"), vec!["coauthor", "eg", "nodejs"]);
    }

    #[test]
    fn empty_and_punctuation_only_inputs_yield_nothing() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("   \t\n").is_empty());
        assert!(tokenize("?!... ,,, ()").is_empty());
    }

    #[test]
    fn collapses_whitespace_runs() {
        assert_eq!(tokenize("  skills \n\t and   tools "), vec!["skills", "and", "tools"]);
    }
}
