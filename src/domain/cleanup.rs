//! Post-processing for raw LLM output.

const FENCE: &str = "```";

/// Preamble lines the models are known to prepend despite instructions.
const PREAMBLE_PHRASES: [&str; 5] = [
    "Here are the test cases for the provided code:",
    "Here is the cleaned code:",
    "Here's the cleaned code:",
    "Here is the fixed code:",
    "Here's the fixed code:",
];

/// Strip code-fence markers and known boilerplate phrases, then trim.
///
/// One pass removes every fence marker, so applying the transform twice
/// yields the same result as applying it once.
pub fn tidy_output(raw: &str) -> String {
    let mut text = strip_fences(raw);
    for phrase in PREAMBLE_PHRASES {
        if text.contains(phrase) {
            text = text.replace(phrase, "");
        }
    }
    text.trim().to_string()
}

/// Remove triple-backtick fence markers.
///
/// A line that is nothing but a fence marker, optionally with a language
/// tag (e.g. ```python), is dropped entirely so the tag does not leak into
/// the artifact. Markers embedded in a longer line are removed in place.
pub fn strip_fences(raw: &str) -> String {
    let mut kept: Vec<String> = Vec::new();

    for line in raw.lines() {
        let trimmed = line.trim();
        if let Some(tag) = trimmed.strip_prefix(FENCE) {
            if tag.chars().all(|ch| ch.is_ascii_alphanumeric()) {
                continue;
            }
        }
        if line.contains(FENCE) {
            kept.push(line.replace(FENCE, ""));
        } else {
            kept.push(line.to_string());
        }
    }

    kept.join("\n")
}
