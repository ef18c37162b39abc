/*!
 * Language utilities for the synthesis language code.
 *
 * The synthesis engine expects a two-letter ISO 639-1 code. Three-letter
 * codes are accepted from configuration and folded to their two-letter form
 * when one exists.
 */

use anyhow::{Result, anyhow};
use isolang::Language;

/// Validate a language code and return its ISO 639-1 form
pub fn validate_language_code(code: &str) -> Result<String> {
    let normalized_code = code.trim().to_lowercase();

    let language = match normalized_code.len() {
        2 => Language::from_639_1(&normalized_code),
        3 => Language::from_639_3(&normalized_code),
        _ => None,
    };

    language
        .and_then(|lang| lang.to_639_1())
        .map(|c| c.to_string())
        .ok_or_else(|| anyhow!("Invalid synthesis language code: {}", code))
}

/// Get the English language name from a code
pub fn get_language_name(code: &str) -> Result<String> {
    let part1 = validate_language_code(code)?;
    let lang = Language::from_639_1(&part1)
        .ok_or_else(|| anyhow!("Failed to get language from code: {}", part1))?;

    Ok(lang.to_name().to_string())
}
