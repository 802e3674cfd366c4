//! Application loop
//!
//! The keyboard hook, the stdin reader and the Ctrl+C handler all send
//! [`AppEvent`]s into one channel. `App::run` is its only consumer, so the
//! preferences, the dispatcher and both clickers are touched by one thread.

use std::sync::mpsc;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::clicker::{ClickRate, Clicker};
use crate::hotkeys::{HotkeyAction, HotkeyDispatcher, KeyEvent};
use crate::input_simulator::ClickEmitter;
use crate::keys::{key_name, parse_key, try_key_name};
use crate::preferences::{default_hotkey, parse_rate, Preferences, PreferencesStore};
use crate::shell::{Command, Notify, HELP};
use crate::{ClickerError, MouseButton};

/// Events consumed by the application loop
#[derive(Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Command(Command),
    /// A shell line that failed to parse
    Invalid(ClickerError),
    Shutdown,
}

pub struct App<N: Notify> {
    store: PreferencesStore,
    prefs: Preferences,
    dispatcher: HotkeyDispatcher,
    left: Clicker,
    right: Clicker,
    notify: N,
}

impl<N: Notify> App<N> {
    /// Load preferences and install the saved hotkeys
    ///
    /// Preference problems are reported through `notify` and never fail
    /// construction.
    pub fn new(store: PreferencesStore, emitter: Arc<dyn ClickEmitter>, mut notify: N) -> Self {
        let prefs = match store.load() {
            Ok(loaded) => {
                for warning in &loaded.warnings {
                    notify.error(warning);
                }
                loaded.preferences
            }
            Err(e) => {
                warn!("Using default preferences: {}", e);
                notify.error(&e);
                Preferences::default()
            }
        };

        let left = Clicker::new(
            MouseButton::Left,
            Arc::clone(&emitter),
            Arc::new(ClickRate::new(prefs.left_cps)),
        );
        let right = Clicker::new(
            MouseButton::Right,
            emitter,
            Arc::new(ClickRate::new(prefs.right_cps)),
        );

        let mut app = Self {
            store,
            prefs,
            dispatcher: HotkeyDispatcher::new(),
            left,
            right,
            notify,
        };
        app.install_hotkeys();
        app
    }

    fn install_hotkeys(&mut self) {
        for button in MouseButton::ALL {
            let result = parse_key(self.prefs.hotkey(button))
                .and_then(|key| self.dispatcher.bind(button, key));
            if let Err(e) = result {
                warn!("{} hotkey not installed: {}", button, e);
                self.notify.error(&e);
                self.restore_default_hotkey(button);
            }
        }
    }

    /// Bind `button` to its default key so the preference matches what is
    /// actually installed. The other button gives the key up if it holds it.
    fn restore_default_hotkey(&mut self, button: MouseButton) {
        let other = button.other();
        let Ok(key) = parse_key(default_hotkey(button)) else {
            return;
        };

        if self.dispatcher.binding(other) == Some(key) {
            let moved = parse_key(default_hotkey(other))
                .and_then(|other_key| self.dispatcher.bind(other, other_key));
            match moved {
                Ok(_) => self.prefs.set_hotkey(other, default_hotkey(other)),
                Err(e) => warn!("{} hotkey not restored: {}", other, e),
            }
        }

        match self.dispatcher.bind(button, key) {
            Ok(_) => {
                self.prefs.set_hotkey(button, default_hotkey(button));
                self.notify.info(&format!(
                    "{} hotkey reset to '{}'",
                    button.label(),
                    default_hotkey(button)
                ));
            }
            Err(e) => warn!("{} hotkey not restored: {}", button, e),
        }
    }

    pub fn preferences(&self) -> &Preferences {
        &self.prefs
    }

    pub fn is_running(&self, button: MouseButton) -> bool {
        self.clicker(button).is_running()
    }

    pub fn notifier(&self) -> &N {
        &self.notify
    }

    fn clicker(&self, button: MouseButton) -> &Clicker {
        match button {
            MouseButton::Left => &self.left,
            MouseButton::Right => &self.right,
        }
    }

    fn clicker_mut(&mut self, button: MouseButton) -> &mut Clicker {
        match button {
            MouseButton::Left => &mut self.left,
            MouseButton::Right => &mut self.right,
        }
    }

    /// Consume events until quit, shutdown or the channel closes, then
    /// stop the clickers and save.
    pub fn run(&mut self, events: &mpsc::Receiver<AppEvent>) {
        info!("Application loop running");
        loop {
            match events.recv() {
                Ok(event) => {
                    if !self.handle(event) {
                        break;
                    }
                }
                Err(_) => {
                    warn!("Event channel disconnected");
                    break;
                }
            }
        }
        self.shutdown();
    }

    /// Handle one event. Returns false when the application should exit.
    pub fn handle(&mut self, event: AppEvent) -> bool {
        match event {
            AppEvent::Key(key_event) => {
                if let Some(action) = self.dispatcher.handle(key_event) {
                    self.on_hotkey(action);
                }
                true
            }
            AppEvent::Command(command) => self.on_command(command),
            AppEvent::Invalid(e) => {
                self.notify.error(&e);
                true
            }
            AppEvent::Shutdown => {
                info!("Shutdown signal received");
                false
            }
        }
    }

    fn on_hotkey(&mut self, action: HotkeyAction) {
        match action {
            HotkeyAction::Toggle(button) => self.toggle(button),
            HotkeyAction::Captured { button, key } => self.bind(button, key),
            HotkeyAction::CaptureCancelled(button) => {
                self.notify
                    .info(&format!("Hotkey capture for the {} clicker cancelled", button));
            }
        }
    }

    fn on_command(&mut self, command: Command) -> bool {
        debug!("Command: {:?}", command);
        match command {
            Command::Status => self.status(),
            Command::SetRate { button, value } => self.set_rate(button, &value),
            Command::Bind { button, key: None } => {
                self.dispatcher.begin_capture(button);
                self.notify.info(&format!(
                    "Press the desired hotkey for the {} clicker... (Esc to cancel)",
                    button
                ));
            }
            Command::Bind {
                button,
                key: Some(name),
            } => match parse_key(&name) {
                Ok(key) => self.bind(button, key),
                Err(e) => self.notify.error(&e),
            },
            Command::Toggle(button) => self.toggle(button),
            Command::Sound(enabled) => {
                self.prefs.sound_enabled = enabled;
                self.persist();
                self.notify
                    .info(&format!("Sound {}", if enabled { "on" } else { "off" }));
            }
            Command::Help => self.notify.info(HELP),
            Command::Quit => return false,
        }
        true
    }

    fn toggle(&mut self, button: MouseButton) {
        let running = self.clicker_mut(button).toggle();
        self.notify.info(&format!(
            "{} clicker {}",
            button.label(),
            if running { "on" } else { "off" }
        ));
        if self.prefs.sound_enabled {
            self.notify.chime();
        }
    }

    fn bind(&mut self, button: MouseButton, key: rdev::Key) {
        // A key without an identifier could not be loaded back
        let Some(name) = try_key_name(key) else {
            self.notify.error(&ClickerError::UnknownKey(key_name(key)));
            return;
        };

        match self.dispatcher.bind(button, key) {
            Ok(_) => {
                self.notify
                    .info(&format!("{} hotkey set to '{}'", button.label(), name));
                self.prefs.set_hotkey(button, name);
                self.persist();
            }
            Err(e) => self.notify.error(&e),
        }
    }

    /// Invalid input leaves the preferences and the file untouched
    fn set_rate(&mut self, button: Option<MouseButton>, value: &str) {
        let cps = match parse_rate(value) {
            Ok(cps) => cps,
            Err(e) => {
                self.notify.error(&e);
                return;
            }
        };

        let buttons = match button {
            Some(button) => vec![button],
            None => MouseButton::ALL.to_vec(),
        };
        for button in buttons {
            self.prefs.set_rate(button, cps);
            self.clicker(button).rate().set(cps);
        }
        self.persist();
        self.notify
            .info(&format!("Clicks per second set to {}", cps));
    }

    fn status(&mut self) {
        let mut lines = Vec::new();
        for button in MouseButton::ALL {
            lines.push(format!(
                "{:<5} clicker: {:<3}  rate: {} cps  hotkey: {}",
                button,
                if self.is_running(button) { "on" } else { "off" },
                self.prefs.rate(button),
                self.prefs.hotkey(button),
            ));
        }
        lines.push(format!(
            "sound: {}",
            if self.prefs.sound_enabled { "on" } else { "off" }
        ));
        if let Some(button) = self.dispatcher.capturing() {
            lines.push(format!("waiting for a {} hotkey", button));
        }
        self.notify.info(&lines.join("\n"));
    }

    fn persist(&mut self) {
        if let Err(e) = self.store.save(&self.prefs) {
            warn!("{}", e);
            self.notify.error(&e);
        }
    }

    /// Stop all clickers and save. Safe to call more than once.
    pub fn shutdown(&mut self) {
        self.left.stop();
        self.right.stop();
        self.persist();
        info!("Clickers stopped, preferences saved");
    }
}

