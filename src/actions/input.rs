//! Synthetic input dispatch.
//!
//! Every phase of a key press or click is one atomic wire call; no delay
//! is inserted between phases. Callers wanting realistic timing sleep
//! between primitive invocations.

// ============================================================================
// Imports
// ============================================================================

use serde_json::{Map, Value, json};
use tracing::debug;

use crate::error::Result;
use crate::transport::Connection;

use super::keyboard::{Key, KeyDefinition};

// ============================================================================
// Key Events
// ============================================================================

/// Phase of a key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEventType {
    /// Key pressed.
    KeyDown,
    /// Key pressed without generating text.
    RawKeyDown,
    /// Character produced.
    Char,
    /// Key released.
    KeyUp,
}

impl KeyEventType {
    /// Returns the wire name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::KeyDown => "keyDown",
            Self::RawKeyDown => "rawKeyDown",
            Self::Char => "char",
            Self::KeyUp => "keyUp",
        }
    }
}

/// One `Input.dispatchKeyEvent` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    /// Event phase.
    pub event_type: KeyEventType,
    /// DOM `key` value.
    pub key: String,
    /// DOM `code` value (omitted when empty).
    pub code: String,
    /// Virtual key code (omitted when 0).
    pub key_code: u32,
    /// Generated text.
    pub text: Option<String>,
    /// Modifier bit field (Alt=1, Ctrl=2, Meta=4, Shift=8).
    pub modifiers: u32,
}

impl KeyEvent {
    /// Creates an event of the given phase for a key.
    #[must_use]
    pub fn new(event_type: KeyEventType, definition: &KeyDefinition) -> Self {
        Self {
            event_type,
            key: definition.key.clone(),
            code: definition.code.clone(),
            key_code: definition.key_code,
            text: None,
            modifiers: 0,
        }
    }

    /// Creates the `char` phase for a printable key.
    #[must_use]
    pub fn char(definition: &KeyDefinition) -> Option<Self> {
        let text = definition.text.clone()?;
        Some(Self {
            event_type: KeyEventType::Char,
            key: definition.key.clone(),
            code: String::new(),
            key_code: 0,
            text: Some(text),
            modifiers: 0,
        })
    }

    /// Sets the modifier bit field.
    #[inline]
    #[must_use]
    pub fn with_modifiers(mut self, modifiers: u32) -> Self {
        self.modifiers = modifiers;
        self
    }

    fn params(&self) -> Value {
        let mut params = Map::new();
        params.insert("type".into(), json!(self.event_type.as_str()));
        params.insert("key".into(), json!(self.key));
        if !self.code.is_empty() {
            params.insert("code".into(), json!(self.code));
        }
        if self.key_code != 0 {
            params.insert("windowsVirtualKeyCode".into(), json!(self.key_code));
            params.insert("nativeVirtualKeyCode".into(), json!(self.key_code));
        }
        if let Some(text) = &self.text {
            params.insert("text".into(), json!(text));
        }
        if self.modifiers != 0 {
            params.insert("modifiers".into(), json!(self.modifiers));
        }
        Value::Object(params)
    }
}

// ============================================================================
// Mouse Events
// ============================================================================

/// Phase of a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseEventType {
    /// Button pressed.
    Pressed,
    /// Button released.
    Released,
    /// Pointer moved.
    Moved,
}

impl MouseEventType {
    /// Returns the wire name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pressed => "mousePressed",
            Self::Released => "mouseReleased",
            Self::Moved => "mouseMoved",
        }
    }
}

/// Mouse button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MouseButton {
    /// No button.
    None,
    /// Primary button.
    #[default]
    Left,
    /// Wheel button.
    Middle,
    /// Secondary button.
    Right,
}

impl MouseButton {
    /// Returns the wire name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Left => "left",
            Self::Middle => "middle",
            Self::Right => "right",
        }
    }
}

/// One `Input.dispatchMouseEvent` call.
#[derive(Debug, Clone, PartialEq)]
pub struct MouseEvent {
    /// Event phase.
    pub event_type: MouseEventType,
    /// X coordinate in CSS pixels relative to the viewport.
    pub x: f64,
    /// Y coordinate in CSS pixels relative to the viewport.
    pub y: f64,
    /// Button involved.
    pub button: MouseButton,
    /// Click count for press/release.
    pub click_count: u32,
}

impl MouseEvent {
    /// Creates a left-button event at a point.
    #[must_use]
    pub fn new(event_type: MouseEventType, x: f64, y: f64) -> Self {
        let (button, click_count) = match event_type {
            MouseEventType::Moved => (MouseButton::None, 0),
            _ => (MouseButton::Left, 1),
        };
        Self {
            event_type,
            x,
            y,
            button,
            click_count,
        }
    }

    /// Sets the button.
    #[inline]
    #[must_use]
    pub fn with_button(mut self, button: MouseButton) -> Self {
        self.button = button;
        self
    }

    fn params(&self) -> Value {
        json!({
            "type": self.event_type.as_str(),
            "x": self.x,
            "y": self.y,
            "button": self.button.as_str(),
            "clickCount": self.click_count,
        })
    }
}

// ============================================================================
// InputEvent
// ============================================================================

/// A synthetic input event.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Keyboard event.
    Key(KeyEvent),
    /// Pointer event.
    Mouse(MouseEvent),
}

impl InputEvent {
    /// Returns the protocol method that dispatches this event.
    #[must_use]
    pub fn method(&self) -> &'static str {
        match self {
            Self::Key(_) => "Input.dispatchKeyEvent",
            Self::Mouse(_) => "Input.dispatchMouseEvent",
        }
    }

    /// Returns the call parameters.
    #[must_use]
    pub fn params(&self) -> Value {
        match self {
            Self::Key(event) => event.params(),
            Self::Mouse(event) => event.params(),
        }
    }
}

impl From<KeyEvent> for InputEvent {
    fn from(event: KeyEvent) -> Self {
        Self::Key(event)
    }
}

impl From<MouseEvent> for InputEvent {
    fn from(event: MouseEvent) -> Self {
        Self::Mouse(event)
    }
}

// ============================================================================
// Connection - Input
// ============================================================================

impl Connection {
    /// Dispatches one input event as a single call.
    ///
    /// # Errors
    ///
    /// Any error from [`Connection::call`].
    pub async fn dispatch_input_event(&self, event: &InputEvent) -> Result<()> {
        self.call(event.method(), event.params()).await?;
        Ok(())
    }

    /// Presses and releases a key.
    ///
    /// Issues `keyDown`, `char` (printable keys only) and `keyUp`, each
    /// awaited before the next.
    ///
    /// # Errors
    ///
    /// Any error from [`Connection::call`]; later phases are not sent.
    pub async fn press_key(&self, key: Key) -> Result<()> {
        let definition = key.definition();
        debug!(key = %definition.key, "Pressing key");

        self.dispatch_input_event(&KeyEvent::new(KeyEventType::KeyDown, &definition).into())
            .await?;
        if let Some(char_event) = KeyEvent::char(&definition) {
            self.dispatch_input_event(&char_event.into()).await?;
        }
        self.dispatch_input_event(&KeyEvent::new(KeyEventType::KeyUp, &definition).into())
            .await
    }

    /// Types text one key press per character.
    ///
    /// # Errors
    ///
    /// Any error from [`Connection::call`]; remaining characters are not sent.
    pub async fn type_text(&self, text: &str) -> Result<()> {
        debug!(len = text.chars().count(), "Typing text");
        for c in text.chars() {
            self.press_key(Key::from(c)).await?;
        }
        Ok(())
    }

    /// Clicks the left button at a viewport point.
    ///
    /// Issues `mousePressed` then `mouseReleased`.
    ///
    /// # Errors
    ///
    /// Any error from [`Connection::call`].
    pub async fn click(&self, x: f64, y: f64) -> Result<()> {
        debug!(x, y, "Clicking");
        self.dispatch_input_event(&MouseEvent::new(MouseEventType::Pressed, x, y).into())
            .await?;
        self.dispatch_input_event(&MouseEvent::new(MouseEventType::Released, x, y).into())
            .await
    }
}

// ============================================================================
// Tests
// ============================================================================
