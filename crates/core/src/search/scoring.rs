//! Similarity between a query and one text field.

use strsim::normalized_levenshtein;

/// Similarity in `[0, 1]` of a lowercased `query` to a lowercased `field`.
///
/// A substring hit scores 1.0. Otherwise the best normalized edit
/// similarity against the field's words and against every field window
/// of the query's length wins. Multi-word queries also get the average of
/// their per-word scores, so word order does not matter.
pub fn field_similarity(query: &str, field: &str) -> f64 {
    if query.is_empty() || field.is_empty() {
        return 0.0;
    }

    let whole = term_similarity(query, field);
    let terms: Vec<&str> = query.split_whitespace().collect();
    if terms.len() < 2 {
        return whole;
    }

    let per_term =
        terms.iter().map(|t| term_similarity(t, field)).sum::<f64>() / terms.len() as f64;
    whole.max(per_term)
}

fn term_similarity(term: &str, field: &str) -> f64 {
    if field.contains(term) {
        return 1.0;
    }

    let words = field
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(|w| normalized_levenshtein(term, w));

    let chars: Vec<char> = field.chars().collect();
    let width = term.chars().count();
    let windows: Vec<f64> = if width > 0 && width <= chars.len() {
        chars
            .windows(width)
            .map(|w| normalized_levenshtein(term, &w.iter().collect::<String>()))
            .collect()
    } else {
        Vec::new()
    };

    words.chain(windows).fold(0.0, f64::max)
}
