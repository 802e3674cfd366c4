//! Terminal shell
//!
//! Commands arrive one per line on stdin and are forwarded to the
//! application as events. Notices go back to the terminal through [`Notify`].

use std::io::{self, BufRead, Write};
use std::sync::mpsc;
use std::thread;
use tracing::{debug, error};

use crate::app::AppEvent;
use crate::{ClickerError, MouseButton};

pub const HELP: &str = "\
Commands:
  status                      show rates, hotkeys and clicker states
  rate <cps>                  set the rate of both clickers
  rate left|right <cps>       set the rate of one clicker
  bind left|right             press a key to use as the hotkey (Esc cancels)
  bind left|right <key>       bind a named key, e.g. f8, x, space
  toggle left|right           toggle a clicker
  sound on|off                audible feedback when a clicker toggles
  help                        show this help
  quit                        stop clickers, save and exit";

/// A parsed shell command
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Status,
    /// `None` applies the rate to both buttons. The value is raw user input.
    SetRate {
        button: Option<MouseButton>,
        value: String,
    },
    /// `None` captures the next key press
    Bind {
        button: MouseButton,
        key: Option<String>,
    },
    Toggle(MouseButton),
    Sound(bool),
    Help,
    Quit,
}

impl Command {
    /// Parse one input line. Blank lines yield `None`.
    pub fn parse(line: &str) -> Result<Option<Self>, ClickerError> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return Ok(None);
        };
        let args: Vec<&str> = words.collect();

        let command = match (verb.to_lowercase().as_str(), args.as_slice()) {
            ("status", []) => Command::Status,
            ("help" | "?", []) => Command::Help,
            ("quit" | "exit", []) => Command::Quit,
            ("rate" | "cps", [value]) => Command::SetRate {
                button: None,
                value: value.to_string(),
            },
            ("rate" | "cps", [button, value]) => Command::SetRate {
                button: Some(button.parse()?),
                value: value.to_string(),
            },
            ("bind", [button]) => Command::Bind {
                button: button.parse()?,
                key: None,
            },
            // Key names may contain spaces ("page up")
            ("bind", [button, key @ ..]) => Command::Bind {
                button: button.parse()?,
                key: Some(key.join(" ")),
            },
            ("toggle", [button]) => Command::Toggle(button.parse()?),
            ("sound", [state]) => match state.to_lowercase().as_str() {
                "on" | "true" | "yes" => Command::Sound(true),
                "off" | "false" | "no" => Command::Sound(false),
                other => {
                    return Err(ClickerError::InvalidCommand(format!(
                        "sound expects 'on' or 'off', got '{}'",
                        other
                    )))
                }
            },
            _ => {
                return Err(ClickerError::InvalidCommand(format!(
                    "'{}' (type 'help' for commands)",
                    line.trim()
                )))
            }
        };

        Ok(Some(command))
    }
}

/// Start reading commands from stdin in a background thread
///
/// End of input is treated as a quit command.
pub fn start_stdin_reader(sender: mpsc::Sender<AppEvent>) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    error!("Failed to read stdin: {}", e);
                    break;
                }
            };

            let event = match Command::parse(&line) {
                Ok(Some(command)) => AppEvent::Command(command),
                Ok(None) => continue,
                Err(e) => AppEvent::Invalid(e),
            };
            if sender.send(event).is_err() {
                return;
            }
        }

        debug!("stdin closed");
        let _ = sender.send(AppEvent::Command(Command::Quit));
    })
}

/// User-facing notices
pub trait Notify {
    fn info(&mut self, message: &str);
    fn error(&mut self, error: &ClickerError);
    /// Audible feedback for a clicker state change
    fn chime(&mut self);
}

/// Notices written to a terminal
pub struct Console<W: Write> {
    out: W,
}

impl Console<io::Stdout> {
    pub fn stdout() -> Self {
        Self { out: io::stdout() }
    }
}

impl<W: Write> Console<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_line(&mut self, line: &str) {
        if let Err(e) = writeln!(self.out, "{}", line).and_then(|_| self.out.flush()) {
            error!("Failed to write to console: {}", e);
        }
    }
}

impl<W: Write> Notify for Console<W> {
    fn info(&mut self, message: &str) {
        self.write_line(message);
    }

    fn error(&mut self, error: &ClickerError) {
        self.write_line(&format!("error: {}", error));
    }

    fn chime(&mut self) {
        // Terminal bell
        if let Err(e) = write!(self.out, "\x07").and_then(|_| self.out.flush()) {
            error!("Failed to write to console: {}", e);
        }
    }
}
