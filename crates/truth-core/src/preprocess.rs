// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Text Preprocessing
// ─────────────────────────────────────────────────────────────────────
//! Code detection and sentence segmentation ahead of embedding.

/// Substrings that betray source code rather than prose.
pub const CODE_MARKERS: [&str; 6] = ["def ", "class ", "import ", "{", "}", "return "];

/// Number of distinct code markers present in `text`.
pub fn code_marker_count(text: &str) -> usize {
    CODE_MARKERS.iter().filter(|m| text.contains(*m)).count()
}

/// True when at least `min_markers` distinct markers occur.
pub fn looks_like_code(text: &str, min_markers: usize) -> bool {
    code_marker_count(text) >= min_markers
}

fn is_terminator(c: char) -> bool {
    matches!(c, '.' | '!' | '?' | '\n')
}

/// Split on runs of `.`, `!`, `?` and newlines; keep trimmed candidates
/// with at least `min_words` whitespace-separated words.
pub fn split_sentences(text: &str, min_words: usize) -> Vec<String> {
    text.split(is_terminator)
        .map(str::trim)
        .filter(|s| !s.is_empty() && s.split_whitespace().count() >= min_words)
        .map(str::to_string)
        .collect()
}
