//! Deterministic stage implementations
//!
//! Keyword- and template-driven collaborators. Output depends only on the
//! input, which keeps cached results and test expectations stable. Real
//! deployments swap these for model-backed collaborators.

mod analysis;
mod documents;
mod forecast;
mod intent;
mod optimization;
mod risk;
mod spec;
mod steering;
mod summary;
mod validation;

pub use analysis::RequirementsAnalyzer;
pub use documents::MarkdownDocumentGenerator;
pub use forecast::RoiForecaster;
pub use intent::KeywordInterpreter;
pub use optimization::CategoryOptimizer;
pub use risk::KeywordRiskAssessor;
pub use spec::TemplateSpecGenerator;
pub use steering::FsSteeringWriter;
pub use summary::TemplateSummarizer;
pub use validation::CompletenessValidator;

const STOPWORDS: &[&str] = &[
    "about", "after", "also", "been", "being", "both", "could", "does", "each", "from", "have",
    "into", "more", "most", "need", "needs", "only", "other", "over", "should", "some", "such",
    "than", "that", "their", "them", "then", "there", "these", "they", "this", "those", "through",
    "very", "want", "wants", "what", "when", "where", "which", "while", "will", "with", "would",
    "your",
];

/// Lowercased alphanumeric words of at least `min_len` characters,
/// stopwords removed, in order of appearance
pub(crate) fn significant_words(text: &str, min_len: usize) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.chars().count() >= min_len)
        .map(str::to_lowercase)
        .filter(|w| !STOPWORDS.contains(&w.as_str()))
        .collect()
}

/// `"Build a Payments API"` → `"build-a-payments-api"`, at most `max_words`
pub(crate) fn kebab_case(text: &str, max_words: usize) -> String {
    let slug = text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .take(max_words)
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-");
    if slug.is_empty() {
        "feature".to_string()
    } else {
        slug
    }
}

/// First sentence of `text`, capped at `max_chars`
pub(crate) fn first_sentence(text: &str, max_chars: usize) -> String {
    let sentence = text
        .split_terminator(['.', '!', '?', '\n'])
        .map(str::trim)
        .find(|s| !s.is_empty())
        .unwrap_or_else(|| text.trim());
    sentence.chars().take(max_chars).collect()
}

/// Render a markdown bullet list
pub(crate) fn bullets<S: AsRef<str>>(items: &[S]) -> String {
    items
        .iter()
        .map(|item| format!("- {}\n", item.as_ref()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn significant_words_filters_short_and_stopwords() {
        let words = significant_words("We want a fast Checkout, with Apple Pay support!", 4);
        assert_eq!(words, vec!["fast", "checkout", "apple", "support"]);
    }

    #[test]
    fn kebab_case_limits_words() {
        assert_eq!(kebab_case("Build a Payments API for merchants", 4), "build-a-payments-api");
        assert_eq!(kebab_case("!!!", 4), "feature");
    }

    #[test]
    fn first_sentence_stops_at_terminator() {
        assert_eq!(first_sentence("  Ship checkout. Then billing.", 100), "Ship checkout");
        assert_eq!(first_sentence("abcdef", 3), "abc");
    }

    #[test]
    fn bullets_render_one_per_line() {
        assert_eq!(bullets(&["a", "b"]), "- a\n- b\n");
    }
}
