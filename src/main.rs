//! Bedrock Clicker - hotkey-toggled auto-clicker
//!
//! Clicks the left or right mouse button at a configurable rate while its
//! hotkey is toggled on. Preferences persist to a JSON file.

use bedrock_clicker::{
    create_emitter, input_listener::InputListener, shell, App, AppEvent, Backend, ClickEmitter,
    ClickerError, Config, Console, PreferencesStore,
};
use clap::Parser;
use std::path::PathBuf;
use std::sync::mpsc;
use std::sync::Arc;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "bedrock-clicker", version, about)]
struct Cli {
    /// Preferences file
    #[arg(short, long, default_value = bedrock_clicker::config::DEFAULT_PREFERENCES_FILE)]
    config: PathBuf,

    /// Click injection backend
    #[arg(short, long, value_enum, default_value_t = Backend::X11)]
    backend: Backend,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<(), ClickerError> {
    let cli = Cli::parse();
    let config = Config::default()
        .with_preferences_path(cli.config)
        .with_backend(cli.backend)
        .with_verbose(cli.verbose);

    // Initialize logging
    FmtSubscriber::builder()
        .with_max_level(if config.verbose { Level::DEBUG } else { Level::INFO })
        .with_target(false)
        .compact()
        .init();

    info!("Bedrock Clicker starting...");
    info!(
        "Config: preferences={:?}, backend={}",
        config.preferences_path, config.backend
    );

    let emitter: Arc<dyn ClickEmitter> = match create_emitter(config.backend) {
        Ok(emitter) => Arc::from(emitter),
        Err(e) => {
            error!("Click backend unavailable: {}", e);
            error!("Try another backend with --backend x11|ydotool|rdev");
            return Err(e);
        }
    };

    let (sender, receiver) = mpsc::channel();

    // Set up Ctrl+C handler for graceful shutdown
    let signal_sender = sender.clone();
    ctrlc::set_handler(move || {
        let _ = signal_sender.send(AppEvent::Shutdown);
    })
    .map_err(|e| ClickerError::Signal(e.to_string()))?;

    let mut app = App::new(
        PreferencesStore::new(&config.preferences_path),
        emitter,
        Console::stdout(),
    );

    // The hook and the shell feed the same channel as the signal handler
    let _listener_handle = InputListener::new(sender.clone()).start();
    let _stdin_handle = shell::start_stdin_reader(sender);

    let prefs = app.preferences();
    info!(
        "Ready - {} toggles left, {} toggles right. Type 'help' for commands",
        prefs.left_hotkey, prefs.right_hotkey
    );

    app.run(&receiver);

    info!("Bedrock Clicker shutting down...");
    Ok(())
}
