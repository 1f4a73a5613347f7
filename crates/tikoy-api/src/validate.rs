use tikoy_types::api::{MAX_MESSAGE_CHARS, MAX_SENDER_NAME_CHARS};

/// Trimmed, length-checked form input. The lifecycle layer assumes it only
/// ever receives values that passed through here.
#[derive(Debug, PartialEq, Eq)]
pub struct TikoyForm {
    pub sender_name: String,
    pub message: String,
}

pub fn validate_form(sender_name: &str, message: &str) -> Result<TikoyForm, String> {
    let sender_name = sender_name.trim();
    let message = message.trim();

    if sender_name.is_empty() {
        return Err("senderName is required".into());
    }
    if message.is_empty() {
        return Err("message is required".into());
    }
    if sender_name.chars().count() > MAX_SENDER_NAME_CHARS {
        return Err(format!("senderName must be at most {} characters", MAX_SENDER_NAME_CHARS));
    }
    if message.chars().count() > MAX_MESSAGE_CHARS {
        return Err(format!("message must be at most {} characters", MAX_MESSAGE_CHARS));
    }

    Ok(TikoyForm {
        sender_name: sender_name.to_string(),
        message: message.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_input() {
        let form = validate_form("  Mary ", "\nHuat ah!  ").unwrap();
        assert_eq!(form.sender_name, "Mary");
        assert_eq!(form.message, "Huat ah!");
    }

    #[test]
    fn rejects_blank_fields() {
        assert!(validate_form("   ", "Huat ah!").is_err());
        assert!(validate_form("Mary", "").is_err());
    }

    #[test]
    fn limits_count_characters_not_bytes() {
        let name = "ñ".repeat(MAX_SENDER_NAME_CHARS);
        assert!(validate_form(&name, "ok").is_ok());
        assert!(validate_form(&format!("{}a", name), "ok").is_err());

        let message = "福".repeat(MAX_MESSAGE_CHARS);
        assert!(validate_form("Mary", &message).is_ok());
        assert!(validate_form("Mary", &format!("{}!", message)).is_err());
    }
}
