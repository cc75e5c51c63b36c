// Out-of-band messaging policy
//
// The original design mixed messaging into handlers through inheritance;
// here it is a value object the dispatcher holds and consults after the
// handler runs. The emitted header tells the client-side trigger library
// to display a transient notification.

use serde_json::json;

/// Header carrying the out-of-band message signal.
pub const TRIGGER_HEADER: &str = "HX-Trigger";

/// Severity shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLevel {
    Success,
    Danger,
}

impl MessageLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageLevel::Success => "success",
            MessageLevel::Danger => "danger",
        }
    }
}

/// A message a handler produced for the current request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlashMessage {
    pub text: String,
    pub level: MessageLevel,
}

impl FlashMessage {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            level: MessageLevel::Success,
        }
    }

    pub fn danger(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            level: MessageLevel::Danger,
        }
    }
}

/// Messaging policy: emits exactly one structured header per response when
/// enabled, nothing when disabled. Pure function of (message, level, flag).
#[derive(Debug, Clone, Copy, Default)]
pub struct MessagePolicy {
    enabled: bool,
}

impl MessagePolicy {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Build the `(name, value)` header pair for a message, or `None` when
    /// messaging is disabled.
    pub fn header(&self, message: &FlashMessage) -> Option<(&'static str, String)> {
        if !self.enabled {
            return None;
        }
        let payload = json!({
            "showMessages": {
                "message": &message.text,
                "level": message.level.as_str(),
            }
        });
        Some((TRIGGER_HEADER, payload.to_string()))
    }
}
