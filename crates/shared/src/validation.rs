use crate::constants::*;

/// Validates message content and returns it trimmed, which is the form
/// that gets persisted.
pub fn validate_message_content(content: &str) -> Result<&str, String> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err("Message cannot be empty".into());
    }
    if trimmed.chars().count() > MAX_MESSAGE_LENGTH {
        return Err(format!(
            "Message must be at most {} characters",
            MAX_MESSAGE_LENGTH
        ));
    }
    Ok(trimmed)
}

pub fn validate_display_name(name: &str) -> Result<(), String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err("Name is required".into());
    }
    if trimmed.chars().count() > MAX_DISPLAY_NAME_LENGTH {
        return Err(format!(
            "Name must be at most {} characters",
            MAX_DISPLAY_NAME_LENGTH
        ));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), String> {
    let trimmed = email.trim();
    if trimmed.len() > MAX_EMAIL_LENGTH {
        return Err("Email is too long".into());
    }
    match trimmed.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err("Email is invalid".into()),
    }
}

pub fn validate_emoji(emoji: &str) -> Result<(), String> {
    if emoji.is_empty() {
        return Err("Emoji is required".into());
    }
    if emoji.len() > MAX_EMOJI_LENGTH || emoji.chars().any(char::is_whitespace) {
        return Err("Emoji is invalid".into());
    }
    Ok(())
}
