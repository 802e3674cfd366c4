//! Global keyboard listening using rdev

use rdev::{listen, Event, EventType};
use std::sync::mpsc;
use std::thread;
use tracing::{error, info, trace};

use crate::app::AppEvent;
use crate::hotkeys::KeyEvent;

/// Translate an rdev event into a key event, ignoring mouse activity
pub fn key_event(event_type: &EventType) -> Option<KeyEvent> {
    match *event_type {
        EventType::KeyPress(key) => Some(KeyEvent::Press(key)),
        EventType::KeyRelease(key) => Some(KeyEvent::Release(key)),
        _ => None,
    }
}

/// Input listener that forwards global keyboard events to the application
pub struct InputListener {
    sender: mpsc::Sender<AppEvent>,
}

impl InputListener {
    /// Create a new InputListener with the given channel sender
    pub fn new(sender: mpsc::Sender<AppEvent>) -> Self {
        Self { sender }
    }

    /// Start listening for keyboard events in a background thread
    ///
    /// The hook is process-wide and stays installed until the process exits.
    /// Events are only forwarded; all hotkey state lives on the receiving side.
    pub fn start(self) -> thread::JoinHandle<()> {
        thread::spawn(move || {
            info!("Keyboard listener started");

            let sender = self.sender;

            let callback = move |event: Event| {
                if let Some(key_event) = key_event(&event.event_type) {
                    trace!("Key event: {:?}", key_event);
                    // The receiver is gone once the application is shutting down
                    let _ = sender.send(AppEvent::Key(key_event));
                }
            };

            if let Err(e) = listen(callback) {
                error!("Error in keyboard listener: {:?}", e);
            }
        })
    }
}
