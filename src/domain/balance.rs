//! Stack-based delimiter balance validation for generated test text.

use std::fmt;

/// Why a text blob failed the balance scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BalanceIssue {
    /// A closer appeared with no opener left on the stack.
    UnmatchedCloser { found: char, offset: usize },
    /// A closer did not pair with the most recent opener.
    MismatchedPair { expected: char, found: char, offset: usize },
    /// Input ended with an opener still unclosed.
    UnclosedOpener { opener: char, offset: usize },
}

impl fmt::Display for BalanceIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BalanceIssue::UnmatchedCloser { found, offset } => {
                write!(f, "unmatched '{found}' at byte {offset}")
            }
            BalanceIssue::MismatchedPair { expected, found, offset } => {
                write!(f, "expected '{expected}' but found '{found}' at byte {offset}")
            }
            BalanceIssue::UnclosedOpener { opener, offset } => {
                write!(f, "unclosed '{opener}' opened at byte {offset}")
            }
        }
    }
}

/// Check that `(`, `[`, `{` in `text` are paired and correctly nested.
///
/// Non-delimiter characters are ignored. Success requires every closer to
/// match the most recent opener and an empty stack at end of input.
pub fn check_balance(text: &str) -> Result<(), BalanceIssue> {
    let mut stack: Vec<(char, usize)> = Vec::new();

    for (offset, ch) in text.char_indices() {
        match ch {
            '(' | '[' | '{' => stack.push((ch, offset)),
            ')' | ']' | '}' => {
                let Some((opener, _)) = stack.pop() else {
                    return Err(BalanceIssue::UnmatchedCloser { found: ch, offset });
                };
                let expected = closer_for(opener);
                if ch != expected {
                    return Err(BalanceIssue::MismatchedPair { expected, found: ch, offset });
                }
            }
            _ => {}
        }
    }

    match stack.pop() {
        Some((opener, offset)) => Err(BalanceIssue::UnclosedOpener { opener, offset }),
        None => Ok(()),
    }
}

/// Verdict-only convenience wrapper.
pub fn is_balanced(text: &str) -> bool {
    check_balance(text).is_ok()
}

fn closer_for(opener: char) -> char {
    match opener {
        '(' => ')',
        '[' => ']',
        _ => '}',
    }
}
