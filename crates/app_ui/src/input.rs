//! Input handling and keybinding resolution

use app_core::Command;
use std::collections::HashMap;
use winit::event::{ElementState, KeyEvent, MouseButton};
use winit::keyboard::{Key, ModifiersState, NamedKey};

/// Maps keys and mouse buttons to commands
pub struct InputHandler {
    /// Key string (lowercase, e.g. "ctrl+shift+o") -> command
    bindings: HashMap<String, Command>,

    modifiers: ModifiersState,
}

impl InputHandler {
    /// Create a handler from the `command id -> keys` table of the config
    pub fn new(bindings: &HashMap<String, Vec<String>>) -> Self {
        let mut key_to_command = HashMap::new();

        for (id, keys) in bindings {
            let Some(command) = Command::from_id(id) else {
                tracing::warn!("Ignoring keybinding for unknown command {}", id);
                continue;
            };
            for key in keys {
                if let Some(previous) = key_to_command.insert(key.to_lowercase(), command) {
                    if previous != command {
                        tracing::warn!("Key {} bound to both {} and {}", key, previous, command);
                    }
                }
            }
        }

        Self {
            bindings: key_to_command,
            modifiers: ModifiersState::empty(),
        }
    }

    pub fn update_modifiers(&mut self, modifiers: ModifiersState) {
        self.modifiers = modifiers;
    }

    /// Command bound to a key press, if any
    pub fn handle_key(&self, event: &KeyEvent) -> Option<Command> {
        if event.state != ElementState::Pressed {
            return None;
        }

        let key_str = key_to_string(&event.logical_key)?;
        let full_key = build_key_string(self.modifiers, &key_str);
        tracing::trace!("Key pressed: {}", full_key);

        self.resolve(&full_key)
    }

    /// Look up a key string such as `Ctrl+Shift+o`
    pub fn resolve(&self, key: &str) -> Option<Command> {
        self.bindings.get(&key.to_lowercase()).copied()
    }

    /// Back/forward mouse buttons flip pages
    pub fn handle_mouse_button(&self, button: MouseButton, state: ElementState) -> Option<Command> {
        if state != ElementState::Pressed {
            return None;
        }
        match button {
            MouseButton::Back => Some(Command::PrevPage),
            MouseButton::Forward => Some(Command::NextPage),
            _ => None,
        }
    }
}

/// Prefix a key with the held modifiers, in the order used by the config
fn build_key_string(modifiers: ModifiersState, key: &str) -> String {
    let mut parts = Vec::new();

    if modifiers.control_key() {
        parts.push("Ctrl");
    }
    if modifiers.alt_key() {
        parts.push("Alt");
    }
    if modifiers.shift_key() {
        parts.push("Shift");
    }
    if modifiers.super_key() {
        parts.push("Super");
    }

    parts.push(key);
    parts.join("+")
}

fn key_to_string(key: &Key) -> Option<String> {
    let name = match key {
        Key::Named(named) => match named {
            NamedKey::Escape => "Escape",
            NamedKey::Enter => "Return",
            NamedKey::Tab => "Tab",
            NamedKey::Space => "Space",
            NamedKey::Delete => "Delete",
            NamedKey::Home => "Home",
            NamedKey::End => "End",
            NamedKey::PageUp => "PageUp",
            NamedKey::PageDown => "PageDown",
            NamedKey::ArrowUp => "Up",
            NamedKey::ArrowDown => "Down",
            NamedKey::ArrowLeft => "Left",
            NamedKey::ArrowRight => "Right",
            _ => return None,
        },
        // Shift turns "o" into "O"; bindings spell the modifier out instead
        Key::Character(c) => return Some(c.to_lowercase()),
        _ => return None,
    };
    Some(name.to_string())
}
