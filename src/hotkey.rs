use std::str::FromStr;

use tauri::AppHandle;
use tauri_plugin_global_shortcut::{
    Code, GlobalShortcutExt, Modifiers, Shortcut, ShortcutEvent, ShortcutState,
};

use crate::error::OverlayError;

/// ⌥ Space.
pub const DEFAULT_TRIGGER: &str = "alt+Space";

/// The global key combination that toggles the overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HotkeyBinding {
    shortcut: Shortcut,
}

impl HotkeyBinding {
    /// Parse an accelerator such as `alt+Space` or `ctrl+shift+KeyG`.
    /// At least one modifier is required so the trigger cannot swallow plain
    /// typing in other applications.
    pub fn parse(accelerator: &str) -> Result<Self, OverlayError> {
        let shortcut = Shortcut::from_str(accelerator.trim()).map_err(|e| {
            OverlayError::InvalidTrigger {
                accelerator: accelerator.to_string(),
                reason: e.to_string(),
            }
        })?;
        if shortcut.mods.is_empty() {
            return Err(OverlayError::InvalidTrigger {
                accelerator: accelerator.to_string(),
                reason: "at least one modifier key is required".to_string(),
            });
        }
        Ok(Self { shortcut })
    }

    pub fn new(modifiers: Modifiers, key: Code) -> Self {
        Self {
            shortcut: Shortcut::new(Some(modifiers), key),
        }
    }

    pub fn modifiers(&self) -> Modifiers {
        self.shortcut.mods
    }

    pub fn key(&self) -> Code {
        self.shortcut.key
    }

    pub fn shortcut(&self) -> Shortcut {
        self.shortcut
    }

    /// Canonical string form, used for persistence.
    pub fn accelerator(&self) -> String {
        self.shortcut.into_string()
    }

    /// Exact match: same key and the same modifier set, no more, no less.
    pub fn matches(&self, event: &KeyDown) -> bool {
        self.shortcut.key == event.key && self.shortcut.mods == event.modifiers
    }
}

impl Default for HotkeyBinding {
    fn default() -> Self {
        Self::new(Modifiers::ALT, Code::Space)
    }
}

/// One system-wide key-down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyDown {
    pub modifiers: Modifiers,
    pub key: Code,
}

impl KeyDown {
    /// Only presses become key-downs; releases are dropped.
    pub fn from_shortcut_event(shortcut: &Shortcut, event: &ShortcutEvent) -> Option<Self> {
        (event.state == ShortcutState::Pressed).then_some(Self {
            modifiers: shortcut.mods,
            key: shortcut.key,
        })
    }
}

/// What happens to an observed key event. The listener never consumes or
/// rewrites events, so this is always `PassThrough`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyDisposition {
    PassThrough,
}

/// Holds the active binding and decides whether a key-down toggles the overlay.
#[derive(Debug, Default)]
pub struct HotkeyListener {
    binding: HotkeyBinding,
    /// A new trigger is being captured; the current one must not toggle.
    capturing: bool,
}

impl HotkeyListener {
    pub fn new(binding: HotkeyBinding) -> Self {
        Self {
            binding,
            capturing: false,
        }
    }

    pub fn is_capturing(&self) -> bool {
        self.capturing
    }

    pub fn set_capturing(&mut self, capturing: bool) {
        self.capturing = capturing;
    }

    pub fn binding(&self) -> HotkeyBinding {
        self.binding
    }

    /// Invoke `toggle` exactly once if `event` matches the binding and no
    /// capture is in progress.
    pub fn on_key_down(&self, event: &KeyDown, toggle: impl FnOnce()) -> KeyDisposition {
        if self.capturing {
            tracing::debug!("trigger capture active, key-down ignored");
        } else if self.binding.matches(event) {
            tracing::debug!(trigger = %self.binding.accelerator(), "trigger pressed");
            toggle();
        }
        KeyDisposition::PassThrough
    }

    /// Swap in a new binding, returning the previous one.
    pub fn rebind(&mut self, binding: HotkeyBinding) -> HotkeyBinding {
        std::mem::replace(&mut self.binding, binding)
    }
}

/// Register `binding` with the system. Failure leaves the overlay reachable
/// from the status menu only.
pub fn install(app: &AppHandle, binding: &HotkeyBinding) -> Result<(), OverlayError> {
    app.global_shortcut()
        .register(binding.shortcut())
        .map_err(|e| OverlayError::Shortcut(e.to_string()))?;
    tracing::info!(trigger = %binding.accelerator(), "global trigger registered");
    Ok(())
}

/// Replace the registered trigger. If `new` cannot be registered, `old` is
/// restored and the error is returned.
pub fn replace(
    app: &AppHandle,
    old: &HotkeyBinding,
    new: &HotkeyBinding,
) -> Result<(), OverlayError> {
    if old == new {
        return Ok(());
    }
    let shortcuts = app.global_shortcut();
    if let Err(e) = shortcuts.unregister(old.shortcut()) {
        tracing::debug!(trigger = %old.accelerator(), "old trigger was not registered: {e}");
    }
    if let Err(e) = shortcuts.register(new.shortcut()) {
        if let Err(restore) = shortcuts.register(old.shortcut()) {
            tracing::warn!(trigger = %old.accelerator(), "failed to restore trigger: {restore}");
        }
        return Err(OverlayError::Shortcut(e.to_string()));
    }
    tracing::info!(
        old = %old.accelerator(),
        new = %new.accelerator(),
        "global trigger replaced"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn key(modifiers: Modifiers, key: Code) -> KeyDown {
        KeyDown { modifiers, key }
    }

    #[test]
    fn default_is_option_space() {
        let binding = HotkeyBinding::default();
        assert_eq!(binding.modifiers(), Modifiers::ALT);
        assert_eq!(binding.key(), Code::Space);
        assert_eq!(HotkeyBinding::parse(DEFAULT_TRIGGER).unwrap(), binding);
    }

    #[test]
    fn parse_accepts_aliases_and_case() {
        let a = HotkeyBinding::parse("option+space").unwrap();
        let b = HotkeyBinding::parse("Alt+Space").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn accelerator_round_trips_through_parse() {
        let binding = HotkeyBinding::new(Modifiers::CONTROL | Modifiers::SHIFT, Code::KeyG);
        assert_eq!(HotkeyBinding::parse(&binding.accelerator()).unwrap(), binding);
    }

    #[test]
    fn parse_rejects_bare_key() {
        let err = HotkeyBinding::parse("Space").unwrap_err();
        assert!(matches!(err, OverlayError::InvalidTrigger { .. }));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(HotkeyBinding::parse("alt+NotAKey").is_err());
        assert!(HotkeyBinding::parse("").is_err());
    }

    #[test]
    fn matching_key_down_toggles_once() {
        let listener = HotkeyListener::default();
        let toggles = Cell::new(0);

        let disposition = listener.on_key_down(&key(Modifiers::ALT, Code::Space), || {
            toggles.set(toggles.get() + 1)
        });

        assert_eq!(toggles.get(), 1);
        assert_eq!(disposition, KeyDisposition::PassThrough);
    }

    #[test]
    fn non_matching_key_downs_pass_through_without_toggle() {
        let listener = HotkeyListener::default();
        let toggles = Cell::new(0);
        let others = [
            key(Modifiers::empty(), Code::Space),
            key(Modifiers::ALT | Modifiers::SHIFT, Code::Space),
            key(Modifiers::SUPER, Code::Space),
            key(Modifiers::ALT, Code::KeyA),
            key(Modifiers::CONTROL, Code::KeyC),
        ];

        for event in &others {
            let disposition = listener.on_key_down(event, || toggles.set(toggles.get() + 1));
            assert_eq!(disposition, KeyDisposition::PassThrough);
        }
        assert_eq!(toggles.get(), 0);
    }

    #[test]
    fn rebind_replaces_binding_and_returns_old() {
        let mut listener = HotkeyListener::default();
        let new = HotkeyBinding::new(Modifiers::SUPER | Modifiers::SHIFT, Code::KeyK);

        let old = listener.rebind(new);

        assert_eq!(old, HotkeyBinding::default());
        assert_eq!(listener.binding(), new);
        let toggles = Cell::new(0);
        listener.on_key_down(&key(Modifiers::ALT, Code::Space), || toggles.set(1));
        assert_eq!(toggles.get(), 0);
        listener.on_key_down(&key(Modifiers::SUPER | Modifiers::SHIFT, Code::KeyK), || {
            toggles.set(1)
        });
        assert_eq!(toggles.get(), 1);
    }

    #[test]
    fn capture_suppresses_toggle_until_finished() {
        let mut listener = HotkeyListener::default();
        let toggles = Cell::new(0);
        let trigger = key(Modifiers::ALT, Code::Space);

        listener.set_capturing(true);
        assert!(listener.is_capturing());
        let disposition = listener.on_key_down(&trigger, || toggles.set(toggles.get() + 1));
        assert_eq!(disposition, KeyDisposition::PassThrough);
        assert_eq!(toggles.get(), 0);

        listener.set_capturing(false);
        listener.on_key_down(&trigger, || toggles.set(toggles.get() + 1));
        assert_eq!(toggles.get(), 1);
    }

    #[test]
    fn releases_are_not_key_downs() {
        let shortcut = HotkeyBinding::default().shortcut();
        let pressed = ShortcutEvent {
            id: shortcut.id(),
            state: ShortcutState::Pressed,
        };
        let released = ShortcutEvent {
            id: shortcut.id(),
            state: ShortcutState::Released,
        };

        assert_eq!(
            KeyDown::from_shortcut_event(&shortcut, &pressed),
            Some(key(Modifiers::ALT, Code::Space))
        );
        assert_eq!(KeyDown::from_shortcut_event(&shortcut, &released), None);
    }
}
