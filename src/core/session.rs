use serde::{Deserialize, Serialize};

/// Longest wishlist accepted, in characters
pub const MAX_WISHLIST_CHARS: usize = 4000;

/// Wishlist editing conversation state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WishlistState {
    #[default]
    Idle,
    AwaitingText,
}

/// Input to the wishlist conversation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WishlistEvent {
    BeginEdit,
    Text(String),
    Cancel,
}

/// What the caller should do after a transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WishlistAction {
    /// Ask the participant to send their wishlist
    Prompt,
    /// Persist this wishlist
    Save(String),
    /// Text was rejected; stay in the current state
    Reject(String),
    Cancelled,
    /// Event has no meaning in the current state
    Ignored,
}

/// Advance the wishlist conversation by one event
pub fn step(state: WishlistState, event: WishlistEvent) -> (WishlistState, WishlistAction) {
    use WishlistAction::*;
    use WishlistState::*;

    match (state, event) {
        (_, WishlistEvent::BeginEdit) => (AwaitingText, Prompt),
        (AwaitingText, WishlistEvent::Text(text)) => match normalize_wishlist(&text) {
            Ok(wishlist) => (Idle, Save(wishlist)),
            Err(reason) => (AwaitingText, Reject(reason)),
        },
        (AwaitingText, WishlistEvent::Cancel) => (Idle, Cancelled),
        (Idle, WishlistEvent::Text(_)) | (Idle, WishlistEvent::Cancel) => (Idle, Ignored),
    }
}

/// Trim and bound a wishlist text
pub fn normalize_wishlist(text: &str) -> Result<String, String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err("Wishlist cannot be empty".to_string());
    }
    let chars = trimmed.chars().count();
    if chars > MAX_WISHLIST_CHARS {
        return Err(format!(
            "Wishlist is too long: {} characters, at most {} allowed",
            chars, MAX_WISHLIST_CHARS
        ));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edit_then_save() {
        let (state, action) = step(WishlistState::Idle, WishlistEvent::BeginEdit);
        assert_eq!(state, WishlistState::AwaitingText);
        assert_eq!(action, WishlistAction::Prompt);

        let (state, action) = step(state, WishlistEvent::Text("  socks, tea \n".into()));
        assert_eq!(state, WishlistState::Idle);
        assert_eq!(action, WishlistAction::Save("socks, tea".into()));
    }

    #[test]
    fn test_cancel_returns_to_idle() {
        let (state, action) = step(WishlistState::AwaitingText, WishlistEvent::Cancel);
        assert_eq!(state, WishlistState::Idle);
        assert_eq!(action, WishlistAction::Cancelled);
    }

    #[test]
    fn test_text_while_idle_ignored() {
        let (state, action) = step(WishlistState::Idle, WishlistEvent::Text("books".into()));
        assert_eq!(state, WishlistState::Idle);
        assert_eq!(action, WishlistAction::Ignored);
    }

    #[test]
    fn test_blank_text_keeps_waiting() {
        let (state, action) = step(WishlistState::AwaitingText, WishlistEvent::Text("   ".into()));
        assert_eq!(state, WishlistState::AwaitingText);
        assert!(matches!(action, WishlistAction::Reject(_)));
    }

    #[test]
    fn test_oversized_wishlist_rejected() {
        let text = "x".repeat(MAX_WISHLIST_CHARS + 1);
        assert!(normalize_wishlist(&text).is_err());
        assert!(normalize_wishlist(&"x".repeat(MAX_WISHLIST_CHARS)).is_ok());
    }
}
