//! Post field validation.
//!
//! Lengths are counted in characters (Unicode scalar values) after trimming.

use thiserror::Error;

pub const TITLE_MAX_CHARS: usize = 80;
pub const NICK_MAX_CHARS: usize = 24;
pub const CONTENT_MAX_CHARS: usize = 5000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// At least one field is missing or blank.
    #[error("title, nick and content are all required")]
    Required,
    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },
}

/// Trimmed, length-checked post fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedPost {
    pub title: String,
    pub nick: String,
    pub content: String,
}

pub fn validate(
    title: Option<&str>,
    nick: Option<&str>,
    content: Option<&str>,
) -> Result<ValidatedPost, ValidationError> {
    let title = title.unwrap_or_default().trim();
    let nick = nick.unwrap_or_default().trim();
    let content = content.unwrap_or_default().trim();

    if title.is_empty() || nick.is_empty() || content.is_empty() {
        return Err(ValidationError::Required);
    }
    check_len("title", title, TITLE_MAX_CHARS)?;
    check_len("nick", nick, NICK_MAX_CHARS)?;
    check_len("content", content, CONTENT_MAX_CHARS)?;

    Ok(ValidatedPost {
        title: title.to_string(),
        nick: nick.to_string(),
        content: content.to_string(),
    })
}

fn check_len(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    if value.chars().count() > max {
        return Err(ValidationError::TooLong { field, max });
    }
    Ok(())
}
