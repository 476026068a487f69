use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::{oneshot, watch};
use tracing::{debug, info};

use super::{CameraFeed, CameraProvider, CaptureError, Overlay, PlaybackSurface, Presenter};

/// Logs every presentation change instead of drawing it, so the binary is
/// observable end to end without a rendering stack.
pub struct ConsolePresenter;

impl Presenter for ConsolePresenter {
    fn set_overlay(&self, overlay: Overlay, visible: bool) {
        debug!(?overlay, visible, "Overlay toggled");
    }

    fn set_caption(&self, text: &str) {
        info!(text, "Caption");
    }

    fn set_caption_visible(&self, visible: bool) {
        debug!(visible, "Caption visibility toggled");
    }

    fn set_timestamp(&self, text: &str) {
        debug!(text, "Timestamp");
    }

    fn start_static_sound(&self) {
        debug!("Static sound started");
    }

    fn stop_static_sound(&self) {
        debug!("Static sound stopped");
    }
}

struct PlaybackState {
    position: Duration,
    playing: bool,
    progress: watch::Sender<Duration>,
    generation: u64,
}

/// A playback device standing in for a real player: every video reports a
/// fixed duration, and a ticker advances the position once a second while
/// playing, looping at the duration.
pub struct SimulatedPlayback {
    duration: Duration,
    state: Arc<Mutex<PlaybackState>>,
}

impl SimulatedPlayback {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            state: Arc::new(Mutex::new(PlaybackState {
                position: Duration::ZERO,
                playing: false,
                progress: watch::channel(Duration::ZERO).0,
                generation: 0,
            })),
        }
    }

    /// Resets the position and replaces the progress channel. Watchers and
    /// the ticker from the previous bind drop out via the generation bump
    /// and the dropped sender.
    fn rebind(&self) -> (watch::Sender<Duration>, u64) {
        let (tx, _) = watch::channel(Duration::ZERO);
        let mut state = self.state.lock().unwrap();

        state.position = Duration::ZERO;
        state.playing = false;
        state.progress = tx.clone();
        state.generation += 1;

        (tx, state.generation)
    }

    fn spawn_ticker(&self, tx: watch::Sender<Duration>, generation: u64) {
        let duration = self.duration;
        let state = self.state.clone();

        tokio::spawn(async move {
            loop {
                tokio::time::sleep(Duration::from_secs(1)).await;

                let position = {
                    let mut state = state.lock().unwrap();

                    // A newer bind owns the surface now; dropping our
                    // sender lets its stale watchers exit too.
                    if state.generation != generation {
                        break;
                    }

                    if !state.playing {
                        continue;
                    }

                    let mut next = state.position + Duration::from_secs(1);
                    if !duration.is_zero() && next >= duration {
                        next = Duration::ZERO;
                    }

                    state.position = next;
                    next
                };

                tx.send(position).ok();
            }
        });
    }
}

impl PlaybackSurface for SimulatedPlayback {
    fn bind_video(&self, media: &Path) -> oneshot::Receiver<Duration> {
        info!(media = %media.display(), "Binding video source");

        let (tx, generation) = self.rebind();
        self.spawn_ticker(tx, generation);

        let (metadata_tx, metadata_rx) = oneshot::channel();
        metadata_tx.send(self.duration).ok();

        metadata_rx
    }

    fn bind_live(&self, _feed: &dyn CameraFeed) {
        info!("Binding live camera feed");
        self.rebind();
    }

    fn unbind(&self) {
        debug!("Playback source unbound");
        self.rebind();
    }

    fn play(&self) {
        debug!("Playback started");
        self.state.lock().unwrap().playing = true;
    }

    fn pause(&self) {
        debug!("Playback paused");
        self.state.lock().unwrap().playing = false;
    }

    fn seek_to(&self, position: Duration) {
        info!(seconds = position.as_secs_f64(), "Seeking");

        let mut state = self.state.lock().unwrap();
        state.position = position;
        state.progress.send_replace(position);
    }

    fn watch_progress(&self) -> watch::Receiver<Duration> {
        self.state.lock().unwrap().progress.subscribe()
    }
}

pub struct SimulatedFeed;

impl CameraFeed for SimulatedFeed {
    fn release(&self) {
        info!("Camera capture released");
    }
}

/// Grants every capture request with a logging feed.
pub struct SimulatedCamera;

impl CameraProvider for SimulatedCamera {
    fn request_capture(&self) -> oneshot::Receiver<Result<Box<dyn CameraFeed>, CaptureError>> {
        info!("Camera capture requested");

        let (tx, rx) = oneshot::channel();
        tx.send(Ok(Box::new(SimulatedFeed) as Box<dyn CameraFeed>))
            .ok();

        rx
    }
}
