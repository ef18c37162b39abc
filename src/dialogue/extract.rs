//! Locating a JSON payload inside free-form model output.
//!
//! Strategies are tried in a fixed order and each one either yields a
//! candidate span or reports no match; none of them parse the JSON.

use once_cell::sync::Lazy;
use regex::Regex;

// @const: Fence explicitly tagged as json
static TAGGED_FENCE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)```json\s*(.*?)```").unwrap()
});

// @const: Any fenced block
static GENERIC_FENCE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)```[A-Za-z]*(.*?)```").unwrap()
});

/// A way of finding the payload in a response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadStrategy {
    /// ```` ```json ... ``` ````
    TaggedFence,
    /// The first ```` ``` ... ``` ```` block, whatever its tag
    GenericFence,
    /// The first balanced `{ ... }` span
    BraceSpan,
}

impl PayloadStrategy {
    /// Strategies in the order they are tried
    pub const ORDER: [PayloadStrategy; 3] = [
        PayloadStrategy::TaggedFence,
        PayloadStrategy::GenericFence,
        PayloadStrategy::BraceSpan,
    ];

    /// Try this strategy alone
    pub fn apply(self, content: &str) -> Option<String> {
        let found = match self {
            Self::TaggedFence => TAGGED_FENCE_REGEX
                .captures(content)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str().trim().to_string()),
            Self::GenericFence => GENERIC_FENCE_REGEX
                .captures(content)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str().trim().to_string()),
            Self::BraceSpan => first_brace_span(content).map(str::to_string),
        };
        found.filter(|s| !s.is_empty())
    }
}

/// Run every strategy in order and return the first hit
pub fn locate_payload(content: &str) -> Option<(PayloadStrategy, String)> {
    PayloadStrategy::ORDER
        .iter()
        .find_map(|strategy| strategy.apply(content).map(|payload| (*strategy, payload)))
}

/// First top-level `{...}` span; braces inside JSON strings are ignored.
fn first_brace_span(content: &str) -> Option<&str> {
    let start = content.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in content[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&content[start..start + offset + ch.len_utf8()]);
                }
            }
            _ => {}
        }
    }

    None
}
