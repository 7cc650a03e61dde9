//! Parsing of joint fix responses into separate code and test artifacts.

use crate::domain::AppError;
use crate::domain::cleanup::tidy_output;

/// Marker separating the code and test sections of a joint fix response.
pub const TEST_SECTION_MARKER: &str = "Test Cases:";

/// Tag the model is asked to open the code section with.
const CODE_SECTION_TAG: &str = "Code:";

const PREVIEW_CHARS: usize = 120;

/// Artifacts recovered from a joint fix response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedArtifacts {
    pub code: String,
    pub tests: String,
}

/// Split a joint fix response on the first `Test Cases:` marker.
///
/// The code portion is everything before the marker, the test portion
/// everything after it; both are fence-stripped and trimmed. A response
/// without the marker is reported as malformed instead of aborting the
/// whole action.
pub fn split_fixed_response(raw: &str) -> Result<FixedArtifacts, AppError> {
    let Some((code_part, tests_part)) = raw.split_once(TEST_SECTION_MARKER) else {
        return Err(AppError::MalformedResponse {
            expected: format!("a '{TEST_SECTION_MARKER}' section"),
            details: preview(raw),
        });
    };

    let code_head = code_part.trim_start();
    let code_head = code_head.strip_prefix(CODE_SECTION_TAG).unwrap_or(code_head);

    Ok(FixedArtifacts { code: tidy_output(code_head), tests: tidy_output(tests_part) })
}

fn preview(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.chars().count() <= PREVIEW_CHARS {
        return trimmed.to_string();
    }
    let head: String = trimmed.chars().take(PREVIEW_CHARS).collect();
    format!("{head}...")
}
