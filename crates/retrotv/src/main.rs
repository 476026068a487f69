mod catalog;
mod clock;
mod config;
mod display;
mod input;
mod loader;
mod sequencer;
mod session;
mod surface;

use std::io::BufRead;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::bail;
use bpaf::Bpaf;
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

use crate::catalog::ChannelCatalog;
use crate::clock::SessionClock;
use crate::config::Config;
use crate::display::ChannelDisplay;
use crate::input::{InputAggregator, KeyEvent};
use crate::loader::ChannelLoader;
use crate::sequencer::ChannelSwitcher;
use crate::session::Session;
use crate::surface::console::{ConsolePresenter, SimulatedCamera, SimulatedPlayback};
use crate::surface::{CameraProvider, PlaybackSurface, Presenter};

#[derive(Bpaf, Clone, Debug)]
#[bpaf(options)]
struct Options {
    /// Perform verbose logging
    #[bpaf(short, long)]
    verbose: bool,

    /// Path to the configuration file
    #[bpaf(long, argument("PATH"), fallback(PathBuf::from("./config.toml")))]
    config: PathBuf,
}

fn key_event_for(c: char) -> Option<KeyEvent> {
    match c {
        '+' | 'k' => Some(KeyEvent::StepUp),
        '-' | 'j' => Some(KeyEvent::StepDown),
        '0'..='9' => Some(KeyEvent::Digit(c as u8 - b'0')),
        ' ' | '\t' => None,
        _ => Some(KeyEvent::Other),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let options = options().run();

    let env_filter = EnvFilter::builder()
        .with_default_directive(
            match options.verbose {
                true => LevelFilter::TRACE,
                _ => LevelFilter::INFO,
            }
            .into(),
        )
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(env_filter)
        .init();

    let config = Config::load_from_file(&options.config)?;

    if config.channels.is_empty() {
        bail!("No channels are defined in the config. At least one channel is required.");
    }

    let catalog = ChannelCatalog::from_config(&config);
    let default_channel = config.tv.default_channel;

    if !catalog.in_range(default_channel) {
        bail!(
            "The default channel {} is outside the channel range {}..={}.",
            default_channel,
            catalog.min_channel(),
            catalog.max_channel(),
        );
    }

    let session = Arc::new(Session::new(catalog, SessionClock::new(), default_channel));

    let playback: Arc<dyn PlaybackSurface> = Arc::new(SimulatedPlayback::new(
        Duration::from_secs(config.playback.simulated_duration_secs),
    ));
    let presenter: Arc<dyn Presenter> = Arc::new(ConsolePresenter);
    let camera: Arc<dyn CameraProvider> = Arc::new(SimulatedCamera);

    let display = Arc::new(ChannelDisplay::new(presenter.clone()));
    let loader = Arc::new(ChannelLoader::new(
        session.clone(),
        playback.clone(),
        camera,
        display.clone(),
    ));
    let switcher = ChannelSwitcher::new(
        session.clone(),
        loader.clone(),
        display.clone(),
        playback,
        presenter,
    );
    let input = InputAggregator::new(session.clone(), switcher, display.clone());

    if let Err(err) = loader.load(default_channel).await {
        warn!(?err, channel = default_channel, "Default channel failed to load");
    }

    display.show_channel(default_channel);

    let (tx, mut rx) = mpsc::unbounded_channel();

    std::thread::spawn(move || {
        let stdin = std::io::stdin();

        for line in stdin.lock().lines() {
            let Ok(line) = line else {
                break;
            };

            for c in line.chars() {
                if let Some(key) = key_event_for(c) {
                    if tx.send(key).is_err() {
                        return;
                    }
                }
            }
        }
    });

    info!("retrotv on air: '+'/'-' step channels, two digits tune directly, Ctrl-C exits");

    loop {
        tokio::select! {
            key = rx.recv() => match key {
                Some(key) => input.handle_key(key),
                None => break,
            },
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    // The capture must not outlive the session.
    session.release_camera();

    Ok(())
}
