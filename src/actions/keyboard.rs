//! Keyboard key definitions.
//!
//! Maps named keys and single characters to the fields a key event
//! carries on the wire.
//!
//! # Example
//!
//! ```ignore
//! use inspector_rpc::Key;
//!
//! connection.press_key(Key::Char('t')).await?;
//! connection.press_key(Key::ArrowDown).await?;
//! connection.press_key(Key::Enter).await?;
//! ```

// ============================================================================
// KeyDefinition
// ============================================================================

/// Wire fields of one key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyDefinition {
    /// DOM `key` value.
    pub key: String,
    /// DOM `code` value.
    pub code: String,
    /// Windows virtual key code (0 when none).
    pub key_code: u32,
    /// Text produced by the key, if printable.
    pub text: Option<String>,
}

// ============================================================================
// Key Enum
// ============================================================================

/// Keyboard keys for navigation, control and text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    // ========================================================================
    // Navigation & Control
    // ========================================================================
    /// Enter/Return key
    Enter,
    /// Tab key
    Tab,
    /// Escape key
    Escape,
    /// Backspace key
    Backspace,
    /// Delete key
    Delete,
    /// Space bar
    Space,

    // ========================================================================
    // Arrow Keys
    // ========================================================================
    /// Arrow Up
    ArrowUp,
    /// Arrow Down
    ArrowDown,
    /// Arrow Left
    ArrowLeft,
    /// Arrow Right
    ArrowRight,

    // ========================================================================
    // Page Navigation
    // ========================================================================
    /// Home key
    Home,
    /// End key
    End,
    /// Page Up key
    PageUp,
    /// Page Down key
    PageDown,

    // ========================================================================
    // Text
    // ========================================================================
    /// A single printable character.
    Char(char),
}

impl Key {
    /// Returns the wire fields for this key.
    #[must_use]
    pub fn definition(self) -> KeyDefinition {
        let named = |key: &str, key_code: u32| KeyDefinition {
            key: key.to_string(),
            code: key.to_string(),
            key_code,
            text: None,
        };

        match self {
            Key::Enter => named("Enter", 13),
            Key::Tab => named("Tab", 9),
            Key::Escape => named("Escape", 27),
            Key::Backspace => named("Backspace", 8),
            Key::Delete => named("Delete", 46),
            Key::Space => KeyDefinition {
                key: " ".to_string(),
                code: "Space".to_string(),
                key_code: 32,
                text: Some(" ".to_string()),
            },
            Key::ArrowUp => named("ArrowUp", 38),
            Key::ArrowDown => named("ArrowDown", 40),
            Key::ArrowLeft => named("ArrowLeft", 37),
            Key::ArrowRight => named("ArrowRight", 39),
            Key::Home => named("Home", 36),
            Key::End => named("End", 35),
            Key::PageUp => named("PageUp", 33),
            Key::PageDown => named("PageDown", 34),
            Key::Char(c) => char_definition(c),
        }
    }

    /// Returns whether this key produces text.
    #[inline]
    #[must_use]
    pub fn is_printable(self) -> bool {
        self.definition().text.is_some()
    }
}

impl From<char> for Key {
    fn from(c: char) -> Self {
        match c {
            ' ' => Key::Space,
            '\n' | '\r' => Key::Enter,
            '\t' => Key::Tab,
            c => Key::Char(c),
        }
    }
}

/// Builds the definition for a character key.
///
/// ASCII letters and digits get their physical `code` and virtual key
/// code; anything else is sent as text only.
fn char_definition(c: char) -> KeyDefinition {
    let (code, key_code) = if c.is_ascii_alphabetic() {
        let upper = c.to_ascii_uppercase();
        (format!("Key{upper}"), upper as u32)
    } else if c.is_ascii_digit() {
        (format!("Digit{c}"), c as u32)
    } else {
        (String::new(), 0)
    };

    KeyDefinition {
        key: c.to_string(),
        code,
        key_code,
        text: Some(c.to_string()),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_key() {
        let def = Key::ArrowDown.definition();
        assert_eq!(def.key, "ArrowDown");
        assert_eq!(def.code, "ArrowDown");
        assert_eq!(def.key_code, 40);
        assert!(def.text.is_none());
    }

    #[test]
    fn test_letter_key() {
        let def = Key::Char('t').definition();
        assert_eq!(def.key, "t");
        assert_eq!(def.code, "KeyT");
        assert_eq!(def.key_code, 84);
        assert_eq!(def.text.as_deref(), Some("t"));
    }

    #[test]
    fn test_digit_and_symbol() {
        let digit = Key::Char('7').definition();
        assert_eq!(digit.code, "Digit7");
        assert_eq!(digit.key_code, 55);

        let symbol = Key::Char('é').definition();
        assert_eq!(symbol.code, "");
        assert_eq!(symbol.key_code, 0);
        assert_eq!(symbol.text.as_deref(), Some("é"));
    }

    #[test]
    fn test_printable() {
        assert!(Key::Space.is_printable());
        assert!(Key::Char('a').is_printable());
        assert!(!Key::Enter.is_printable());
        assert!(!Key::Escape.is_printable());
    }

    #[test]
    fn test_from_char() {
        assert_eq!(Key::from(' '), Key::Space);
        assert_eq!(Key::from('\n'), Key::Enter);
        assert_eq!(Key::from('x'), Key::Char('x'));
    }
}
