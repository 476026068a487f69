use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, error, info};

use crate::display::ChannelDisplay;
use crate::loader::{ChannelLoader, TuneError};
use crate::session::Session;
use crate::surface::{Overlay, PlaybackSurface, Presenter};

const BLACK_LEAD: Duration = Duration::from_millis(10);
const STATIC_HOLD: Duration = Duration::from_millis(500);
const BLACK_TAIL: Duration = Duration::from_millis(10);
const INPUT_HOLDOFF: Duration = Duration::from_millis(500);

/// Runs the CRT tuning effect: black, static burst, black again, then the
/// new channel. One sequence at a time; requests arriving while one is in
/// flight are dropped, so an input storm collapses to the first accepted
/// switch.
#[derive(Clone)]
pub struct ChannelSwitcher {
    inner: Arc<Inner>,
}

struct Inner {
    session: Arc<Session>,
    loader: Arc<ChannelLoader>,
    display: Arc<ChannelDisplay>,
    playback: Arc<dyn PlaybackSurface>,
    presenter: Arc<dyn Presenter>,
}

impl ChannelSwitcher {
    pub fn new(
        session: Arc<Session>,
        loader: Arc<ChannelLoader>,
        display: Arc<ChannelDisplay>,
        playback: Arc<dyn PlaybackSurface>,
        presenter: Arc<dyn Presenter>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                session,
                loader,
                display,
                playback,
                presenter,
            }),
        }
    }

    /// Accepts the switch if no sequence is in flight. The sequence runs
    /// to completion on its own task; it is never cancelled.
    pub fn request_switch(&self, target: u32) -> bool {
        if !self.inner.session.begin_switch() {
            debug!(target, "Switch already in progress; request dropped");
            return false;
        }

        let inner = self.inner.clone();

        tokio::spawn(async move {
            inner.run_sequence(target).await;
        });

        true
    }
}

impl Inner {
    async fn run_sequence(&self, target: u32) {
        info!(target, "Switching channel");

        // The display reflects the target before any media is ready.
        self.session.set_channel(target);
        self.display.show_channel(target);
        self.presenter.set_overlay(Overlay::Black, true);

        sleep(BLACK_LEAD).await;
        self.presenter.set_overlay(Overlay::Black, false);
        self.presenter.set_overlay(Overlay::Static, true);
        self.presenter.start_static_sound();
        self.playback.pause();

        sleep(STATIC_HOLD).await;
        self.presenter.set_overlay(Overlay::Static, false);
        self.presenter.stop_static_sound();
        self.presenter.set_overlay(Overlay::Black, true);

        sleep(BLACK_TAIL).await;
        self.presenter.set_overlay(Overlay::Black, false);
        self.spawn_load(target);

        sleep(INPUT_HOLDOFF).await;
        self.session.finish_switch();
    }

    /// The load resolves on its own; a failure leaves the channel blank
    /// until the viewer switches away. No retry.
    fn spawn_load(&self, target: u32) {
        let loader = self.loader.clone();

        tokio::spawn(async move {
            match loader.load(target).await {
                Ok(()) => {}
                Err(TuneError::ConfigurationMiss(number)) => {
                    error!(number, "No source mapped for channel");
                }
                Err(TuneError::CaptureUnavailable(reason)) => {
                    error!(?reason, "Camera capture unavailable");
                }
            }
        });
    }
}
