//! Input simulation
//!
//! Three backends inject a press-release pair at the current pointer
//! position:
//! - X11 via the XTest extension (native X11 and XWayland sessions)
//! - ydotool via uinput, which bypasses the display server and works on Wayland.
//!   Requires the ydotoold daemon: sudo systemctl enable --now ydotoold
//! - rdev simulate, as a portable fallback

use std::process::Command;
use tracing::{debug, info};
use x11rb::connection::{Connection, RequestConnection};
use x11rb::protocol::xproto::{BUTTON_PRESS_EVENT, BUTTON_RELEASE_EVENT};
use x11rb::protocol::xtest::{self, ConnectionExt as _};
use x11rb::rust_connection::RustConnection;

use crate::config::Backend;
use crate::{ClickerError, MouseButton};

/// Sends one synthetic click of a button
pub trait ClickEmitter: Send + Sync {
    fn click(&self, button: MouseButton) -> Result<(), ClickerError>;
}

/// Create the emitter for a backend
pub fn create_emitter(backend: Backend) -> Result<Box<dyn ClickEmitter>, ClickerError> {
    let emitter: Box<dyn ClickEmitter> = match backend {
        Backend::X11 => Box::new(XTestEmitter::new()?),
        Backend::Ydotool => Box::new(YdotoolEmitter::new()?),
        Backend::Rdev => Box::new(RdevEmitter),
    };
    info!("Using {} click backend", backend);
    Ok(emitter)
}

/// X11 core button numbers
fn x11_button(button: MouseButton) -> u8 {
    match button {
        MouseButton::Left => 1,
        MouseButton::Right => 3,
    }
}

/// Click injection through the XTest extension
pub struct XTestEmitter {
    conn: RustConnection,
}

impl XTestEmitter {
    pub fn new() -> Result<Self, ClickerError> {
        let (conn, _screen) = x11rb::connect(None)
            .map_err(|e| ClickerError::Display(format!("Failed to connect to X11: {}", e)))?;

        let has_xtest = conn
            .extension_information(xtest::X11_EXTENSION_NAME)
            .map_err(|e| ClickerError::Display(e.to_string()))?
            .is_some();
        if !has_xtest {
            return Err(ClickerError::Display(
                "X server does not support the XTEST extension".to_string(),
            ));
        }

        debug!("Connected to X11 with XTest");
        Ok(Self { conn })
    }

    fn fake_button(&self, event_type: u8, button: MouseButton) -> Result<(), ClickerError> {
        self.conn
            .xtest_fake_input(
                event_type,
                x11_button(button),
                x11rb::CURRENT_TIME,
                x11rb::NONE,
                0,
                0,
                0,
            )
            .map_err(|e| ClickerError::SendEvent(format!("XTest fake input failed: {}", e)))?;
        Ok(())
    }
}

impl ClickEmitter for XTestEmitter {
    fn click(&self, button: MouseButton) -> Result<(), ClickerError> {
        self.fake_button(BUTTON_PRESS_EVENT, button)?;
        self.fake_button(BUTTON_RELEASE_EVENT, button)?;
        self.conn
            .flush()
            .map_err(|e| ClickerError::SendEvent(format!("X11 flush failed: {}", e)))?;
        Ok(())
    }
}

/// Get the ydotool socket path
fn get_socket_path() -> String {
    let uid = unsafe { libc::getuid() };
    format!("/run/user/{}/.ydotool_socket", uid)
}

/// ydotool click codes: 0xC0 is press+release, low bits select the button
fn ydotool_code(button: MouseButton) -> &'static str {
    match button {
        MouseButton::Left => "0xC0",
        MouseButton::Right => "0xC1",
    }
}

/// Click injection through ydotool
pub struct YdotoolEmitter {
    socket_path: String,
}

impl YdotoolEmitter {
    /// Requires ydotool to be installed and ydotoold daemon running.
    pub fn new() -> Result<Self, ClickerError> {
        let output = Command::new("which")
            .arg("ydotool")
            .output()
            .map_err(|e| ClickerError::InputAccess(format!("Failed to check for ydotool: {}", e)))?;

        if !output.status.success() {
            return Err(ClickerError::InputAccess(
                "ydotool not found. Install it with your package manager".to_string(),
            ));
        }

        Ok(Self {
            socket_path: get_socket_path(),
        })
    }

    fn run_ydotool(&self, args: &[&str]) -> Result<(), ClickerError> {
        let output = Command::new("ydotool")
            .env("YDOTOOL_SOCKET", &self.socket_path)
            .args(args)
            .output()
            .map_err(|e| ClickerError::SendEvent(format!("Failed to run ydotool: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ClickerError::SendEvent(format!("ydotool failed: {}", stderr)));
        }

        Ok(())
    }
}

impl ClickEmitter for YdotoolEmitter {
    fn click(&self, button: MouseButton) -> Result<(), ClickerError> {
        self.run_ydotool(&["click", ydotool_code(button)])
    }
}

/// Click injection through rdev
pub struct RdevEmitter;

impl RdevEmitter {
    fn send(event: rdev::EventType) -> Result<(), ClickerError> {
        rdev::simulate(&event)
            .map_err(|e| ClickerError::SendEvent(format!("rdev simulate failed: {:?}", e)))
    }
}

impl ClickEmitter for RdevEmitter {
    fn click(&self, button: MouseButton) -> Result<(), ClickerError> {
        let button = match button {
            MouseButton::Left => rdev::Button::Left,
            MouseButton::Right => rdev::Button::Right,
        };
        Self::send(rdev::EventType::ButtonPress(button))?;
        Self::send(rdev::EventType::ButtonRelease(button))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_button_codes() {
        assert_eq!(x11_button(MouseButton::Left), 1);
        assert_eq!(x11_button(MouseButton::Right), 3);
        assert_eq!(ydotool_code(MouseButton::Left), "0xC0");
        assert_eq!(ydotool_code(MouseButton::Right), "0xC1");
    }

    #[test]
    fn test_socket_path_is_per_user() {
        let path = get_socket_path();
        assert!(path.starts_with("/run/user/"));
        assert!(path.ends_with("/.ydotool_socket"));
    }
}
