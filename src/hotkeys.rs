//! Hotkey dispatch
//!
//! Turns the raw key stream from the keyboard hook into clicker toggles.
//! OS key repeat re-fires press events while a key is held; each binding
//! remembers whether its key is down so one physical press toggles once.

use rdev::Key;
use tracing::{debug, info};

use crate::keys::{is_modifier, is_system_modifier, key_name};
use crate::{ClickerError, MouseButton};

/// A key event from the global keyboard hook
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KeyEvent {
    Press(Key),
    Release(Key),
}

/// What the application should do in response to a key event
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HotkeyAction {
    /// Toggle the clicker for this button
    Toggle(MouseButton),
    /// A key was captured for this button's hotkey
    Captured { button: MouseButton, key: Key },
    /// Capture was cancelled with Escape
    CaptureCancelled(MouseButton),
}

#[derive(Debug, Clone, Copy)]
struct Binding {
    key: Key,
    pressed: bool,
}

/// Held state of the system modifiers
#[derive(Debug, Default, Clone, Copy)]
struct Modifiers {
    alt: bool,
    alt_gr: bool,
    control_left: bool,
    control_right: bool,
    meta_left: bool,
    meta_right: bool,
}

impl Modifiers {
    fn update(&mut self, key: Key, down: bool) {
        let slot = match key {
            Key::Alt => &mut self.alt,
            Key::AltGr => &mut self.alt_gr,
            Key::ControlLeft => &mut self.control_left,
            Key::ControlRight => &mut self.control_right,
            Key::MetaLeft => &mut self.meta_left,
            Key::MetaRight => &mut self.meta_right,
            _ => return,
        };
        *slot = down;
    }

    fn any_held(&self) -> bool {
        self.alt
            || self.alt_gr
            || self.control_left
            || self.control_right
            || self.meta_left
            || self.meta_right
    }
}

/// Maps hotkeys to clicker toggles
#[derive(Debug, Default)]
pub struct HotkeyDispatcher {
    left: Option<Binding>,
    right: Option<Binding>,
    modifiers: Modifiers,
    capture: Option<MouseButton>,
}

impl HotkeyDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&mut self, button: MouseButton) -> &mut Option<Binding> {
        match button {
            MouseButton::Left => &mut self.left,
            MouseButton::Right => &mut self.right,
        }
    }

    /// Key currently bound to a button
    pub fn binding(&self, button: MouseButton) -> Option<Key> {
        let slot = match button {
            MouseButton::Left => &self.left,
            MouseButton::Right => &self.right,
        };
        slot.map(|b| b.key)
    }

    /// Bind `key` to `button`, replacing any previous binding.
    ///
    /// Returns the key that was replaced. The old key stops toggling before
    /// the new one is installed. Fails without changes if `key` is a modifier
    /// or the other button already uses it.
    pub fn bind(&mut self, button: MouseButton, key: Key) -> Result<Option<Key>, ClickerError> {
        if is_modifier(key) {
            return Err(ClickerError::ModifierKey(key_name(key)));
        }
        if self.binding(button.other()) == Some(key) {
            return Err(ClickerError::KeyInUse {
                key: key_name(key),
                button: button.other(),
            });
        }

        let previous = match self.unbind(button) {
            Ok(old) => Some(old),
            Err(ClickerError::NotBound(_)) => None,
            Err(e) => return Err(e),
        };

        *self.slot(button) = Some(Binding {
            key,
            pressed: false,
        });
        info!("{} hotkey bound to '{}'", button, key_name(key));
        Ok(previous)
    }

    /// Remove a button's binding, returning the key it had
    pub fn unbind(&mut self, button: MouseButton) -> Result<Key, ClickerError> {
        let binding = self.slot(button).take().ok_or(ClickerError::NotBound(button))?;
        debug!("{} hotkey '{}' unbound", button, key_name(binding.key));
        Ok(binding.key)
    }

    /// Capture the next key press as a hotkey for `button`
    pub fn begin_capture(&mut self, button: MouseButton) {
        debug!("Capturing hotkey for {}", button);
        self.capture = Some(button);
    }

    pub fn capturing(&self) -> Option<MouseButton> {
        self.capture
    }

    /// Feed one hook event through the dispatcher
    pub fn handle(&mut self, event: KeyEvent) -> Option<HotkeyAction> {
        match event {
            KeyEvent::Press(key) => self.on_press(key),
            KeyEvent::Release(key) => {
                self.on_release(key);
                None
            }
        }
    }

    fn on_press(&mut self, key: Key) -> Option<HotkeyAction> {
        if is_system_modifier(key) {
            self.modifiers.update(key, true);
            return None;
        }

        if let Some(button) = self.capture {
            if is_modifier(key) {
                return None;
            }
            self.capture = None;
            return Some(if key == Key::Escape {
                HotkeyAction::CaptureCancelled(button)
            } else {
                HotkeyAction::Captured { button, key }
            });
        }

        if self.modifiers.any_held() {
            debug!("Ignoring '{}' while a modifier is held", key_name(key));
            return None;
        }

        for button in MouseButton::ALL {
            if let Some(binding) = self.slot(button) {
                if binding.key == key && !binding.pressed {
                    binding.pressed = true;
                    return Some(HotkeyAction::Toggle(button));
                }
            }
        }
        None
    }

    fn on_release(&mut self, key: Key) {
        if is_system_modifier(key) {
            self.modifiers.update(key, false);
            return;
        }

        // Cleared even if the matching press was suppressed by a modifier
        for button in MouseButton::ALL {
            if let Some(binding) = self.slot(button) {
                if binding.key == key {
                    binding.pressed = false;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dispatcher() -> HotkeyDispatcher {
        let mut dispatcher = HotkeyDispatcher::new();
        dispatcher.bind(MouseButton::Left, Key::F6).unwrap();
        dispatcher.bind(MouseButton::Right, Key::F7).unwrap();
        dispatcher
    }

    fn tap(dispatcher: &mut HotkeyDispatcher, key: Key) -> Option<HotkeyAction> {
        let action = dispatcher.handle(KeyEvent::Press(key));
        dispatcher.handle(KeyEvent::Release(key));
        action
    }

    #[test]
    fn test_press_toggles_bound_button() {
        let mut d = dispatcher();
        assert_eq!(tap(&mut d, Key::F6), Some(HotkeyAction::Toggle(MouseButton::Left)));
        assert_eq!(tap(&mut d, Key::F7), Some(HotkeyAction::Toggle(MouseButton::Right)));
        assert_eq!(tap(&mut d, Key::F8), None);
    }

    #[test]
    fn test_held_key_toggles_once() {
        let mut d = dispatcher();
        let toggles = (0..10)
            .filter_map(|_| d.handle(KeyEvent::Press(Key::F6)))
            .count();
        assert_eq!(toggles, 1);

        d.handle(KeyEvent::Release(Key::F6));
        assert_eq!(
            d.handle(KeyEvent::Press(Key::F6)),
            Some(HotkeyAction::Toggle(MouseButton::Left))
        );
    }

    #[test]
    fn test_modifier_suppresses_press() {
        let mut d = dispatcher();
        for modifier in [Key::ControlLeft, Key::Alt, Key::MetaRight, Key::AltGr] {
            d.handle(KeyEvent::Press(modifier));
            assert_eq!(tap(&mut d, Key::F6), None);
            d.handle(KeyEvent::Release(modifier));
        }
        assert_eq!(tap(&mut d, Key::F6), Some(HotkeyAction::Toggle(MouseButton::Left)));
    }

    #[test]
    fn test_shift_does_not_suppress() {
        let mut d = dispatcher();
        d.handle(KeyEvent::Press(Key::ShiftLeft));
        assert_eq!(tap(&mut d, Key::F6), Some(HotkeyAction::Toggle(MouseButton::Left)));
    }

    #[test]
    fn test_release_clears_after_suppressed_press() {
        let mut d = dispatcher();
        d.handle(KeyEvent::Press(Key::ControlLeft));
        d.handle(KeyEvent::Press(Key::F6));
        d.handle(KeyEvent::Release(Key::ControlLeft));
        d.handle(KeyEvent::Release(Key::F6));
        assert_eq!(tap(&mut d, Key::F6), Some(HotkeyAction::Toggle(MouseButton::Left)));
    }

    #[test]
    fn test_rebind_moves_toggle_to_new_key() {
        let mut d = dispatcher();
        assert_eq!(d.bind(MouseButton::Left, Key::KeyX).unwrap(), Some(Key::F6));
        assert_eq!(tap(&mut d, Key::F6), None);
        assert_eq!(tap(&mut d, Key::KeyX), Some(HotkeyAction::Toggle(MouseButton::Left)));
    }

    #[test]
    fn test_rebind_while_held() {
        let mut d = dispatcher();
        d.handle(KeyEvent::Press(Key::F6));
        d.bind(MouseButton::Left, Key::F9).unwrap();
        assert_eq!(
            d.handle(KeyEvent::Press(Key::F9)),
            Some(HotkeyAction::Toggle(MouseButton::Left))
        );
    }

    #[test]
    fn test_key_in_use_is_rejected() {
        let mut d = dispatcher();
        assert!(matches!(
            d.bind(MouseButton::Left, Key::F7),
            Err(ClickerError::KeyInUse { button: MouseButton::Right, .. })
        ));
        assert_eq!(d.binding(MouseButton::Left), Some(Key::F6));
    }

    #[test]
    fn test_modifier_is_rejected() {
        let mut d = dispatcher();
        for modifier in [Key::ControlLeft, Key::ShiftRight, Key::AltGr] {
            assert!(matches!(
                d.bind(MouseButton::Left, modifier),
                Err(ClickerError::ModifierKey(_))
            ));
        }
        assert_eq!(d.binding(MouseButton::Left), Some(Key::F6));
    }

    #[test]
    fn test_keypad_key_binds() {
        let mut d = dispatcher();
        d.bind(MouseButton::Right, Key::Kp0).unwrap();
        assert_eq!(tap(&mut d, Key::Kp0), Some(HotkeyAction::Toggle(MouseButton::Right)));
    }

    #[test]
    fn test_unbind() {
        let mut d = dispatcher();
        assert_eq!(d.unbind(MouseButton::Left).unwrap(), Key::F6);
        assert!(matches!(
            d.unbind(MouseButton::Left),
            Err(ClickerError::NotBound(MouseButton::Left))
        ));
        assert_eq!(tap(&mut d, Key::F6), None);
        assert_eq!(d.bind(MouseButton::Left, Key::F6).unwrap(), None);
    }

    #[test]
    fn test_capture_consumes_next_press() {
        let mut d = dispatcher();
        d.begin_capture(MouseButton::Right);
        assert_eq!(d.capturing(), Some(MouseButton::Right));

        // Modifiers are skipped, and the bound key does not toggle
        assert_eq!(d.handle(KeyEvent::Press(Key::ShiftLeft)), None);
        assert_eq!(
            tap(&mut d, Key::F6),
            Some(HotkeyAction::Captured {
                button: MouseButton::Right,
                key: Key::F6
            })
        );
        assert_eq!(d.capturing(), None);
    }

    #[test]
    fn test_capture_cancelled_by_escape() {
        let mut d = dispatcher();
        d.begin_capture(MouseButton::Left);
        assert_eq!(
            tap(&mut d, Key::Escape),
            Some(HotkeyAction::CaptureCancelled(MouseButton::Left))
        );
        assert_eq!(tap(&mut d, Key::F6), Some(HotkeyAction::Toggle(MouseButton::Left)));
    }
}
