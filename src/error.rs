use thiserror::Error;

#[derive(Debug, Error)]
pub enum OverlayError {
    #[error("tauri error: {0}")]
    Tauri(#[from] tauri::Error),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("invalid trigger '{accelerator}': {reason}")]
    InvalidTrigger { accelerator: String, reason: String },

    #[error("global shortcut error: {0}")]
    Shortcut(String),

    #[error("autostart error: {0}")]
    Autostart(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl From<OverlayError> for String {
    fn from(e: OverlayError) -> Self {
        e.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_trigger_message_names_the_accelerator() {
        let err = OverlayError::InvalidTrigger {
            accelerator: "ctrl+".to_string(),
            reason: "missing key".to_string(),
        };
        assert_eq!(err.to_string(), "invalid trigger 'ctrl+': missing key");
    }

    #[test]
    fn converts_into_command_error_string() {
        let msg: String = OverlayError::Autostart("launch agent not writable".into()).into();
        assert_eq!(msg, "autostart error: launch agent not writable");
    }
}
