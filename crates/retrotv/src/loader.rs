use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use crate::catalog::Source;
use crate::display::ChannelDisplay;
use crate::session::Session;
use crate::surface::{CameraProvider, CaptureError, PlaybackSurface};

#[derive(Debug)]
pub enum TuneError {
    /// The requested number has no catalog entry; no playback is touched.
    ConfigurationMiss(u32),
    /// The environment refused to hand out a capture; the channel stays
    /// blank until the viewer switches away.
    CaptureUnavailable(CaptureError),
}

/// Resolves a channel number to its source and binds it to the playback
/// surface, seeking videos to `elapsed mod duration` so every tune-in
/// lands mid-broadcast.
pub struct ChannelLoader {
    session: Arc<Session>,
    playback: Arc<dyn PlaybackSurface>,
    camera: Arc<dyn CameraProvider>,
    display: Arc<ChannelDisplay>,
}

impl ChannelLoader {
    pub fn new(
        session: Arc<Session>,
        playback: Arc<dyn PlaybackSurface>,
        camera: Arc<dyn CameraProvider>,
        display: Arc<ChannelDisplay>,
    ) -> Self {
        Self {
            session,
            playback,
            camera,
            display,
        }
    }

    pub async fn load(&self, number: u32) -> Result<(), TuneError> {
        let Some(source) = self.session.catalog().get(number) else {
            return Err(TuneError::ConfigurationMiss(number));
        };

        match source {
            Source::LiveCamera => self.load_camera().await,
            Source::Video(path) => self.load_video(path).await,
        }
    }

    async fn load_camera(&self) -> Result<(), TuneError> {
        let feed = match self.camera.request_capture().await {
            Ok(Ok(feed)) => feed,
            Ok(Err(err)) => return Err(TuneError::CaptureUnavailable(err)),
            // Provider went away without answering.
            Err(_) => return Err(TuneError::CaptureUnavailable(CaptureError::Unsupported)),
        };

        // A previously held capture is released before the new one binds.
        self.session.release_camera();

        self.playback.bind_live(feed.as_ref());
        self.session.store_camera(feed);
        self.watch_progress();
        self.playback.play();

        info!("Live camera feed on air");

        Ok(())
    }

    async fn load_video(&self, media: &Path) -> Result<(), TuneError> {
        if self.session.release_camera() {
            self.playback.unbind();
        }

        let metadata = self.playback.bind_video(media);
        self.watch_progress();

        let Ok(duration) = metadata.await else {
            // A later bind replaced this one before its metadata arrived.
            debug!(media = %media.display(), "Load superseded before metadata");
            return Ok(());
        };

        let seek = wrap_position(self.session.clock().elapsed(), duration);

        self.playback.seek_to(seek);
        self.playback.play();

        info!(
            media = %media.display(),
            seek = seek.as_secs_f64(),
            duration = duration.as_secs_f64(),
            "Video on air"
        );

        Ok(())
    }

    /// One progress watcher per load. The surface replaces its progress
    /// sender on every bind, so the watcher from the previous load sees a
    /// closed channel and exits instead of doubling up timestamp updates.
    fn watch_progress(&self) {
        let mut progress = self.playback.watch_progress();
        let display = self.display.clone();

        tokio::spawn(async move {
            while progress.changed().await.is_ok() {
                let position = *progress.borrow();
                display.show_timestamp(position);
            }
        });
    }
}

/// Position of the "ongoing broadcast" at the given elapsed time.
fn wrap_position(elapsed: Duration, duration: Duration) -> Duration {
    if duration.is_zero() {
        return Duration::ZERO;
    }

    Duration::from_secs_f64(elapsed.as_secs_f64() % duration.as_secs_f64())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::atomic::Ordering;

    use tokio::time::{advance, sleep};

    use super::*;
    use crate::catalog::ChannelCatalog;
    use crate::clock::SessionClock;
    use crate::surface::fake::{EventLog, FakeCamera, FakePlayback, FakePresenter, SurfaceEvent};

    struct Rig {
        log: Arc<EventLog>,
        playback: Arc<FakePlayback>,
        camera: Arc<FakeCamera>,
        session: Arc<Session>,
        loader: ChannelLoader,
    }

    fn rig(camera: FakeCamera, duration: Duration) -> Rig {
        let log = Arc::new(EventLog::default());
        let playback = Arc::new(FakePlayback::new(log.clone(), duration));
        let camera = Arc::new(camera);

        let sources = BTreeMap::from([
            (2, Source::Video("two.mp4".into())),
            (9, Source::Video("nine.mp4".into())),
            (10, Source::LiveCamera),
        ]);
        let catalog = ChannelCatalog::new(2, 57, sources);
        let session = Arc::new(Session::new(catalog, SessionClock::new(), 2));

        let presenter = Arc::new(FakePresenter::new(log.clone()));
        let display = Arc::new(ChannelDisplay::new(presenter));

        let loader = ChannelLoader::new(
            session.clone(),
            playback.clone(),
            camera.clone(),
            display,
        );

        Rig {
            log,
            playback,
            camera,
            session,
            loader,
        }
    }

    #[test]
    fn wrap_position_stays_inside_the_duration() {
        let duration = Duration::from_secs(60);

        for elapsed in [0u64, 59, 60, 61, 3600, 86461] {
            let seek = wrap_position(Duration::from_secs(elapsed), duration);
            assert!(seek < duration, "elapsed {elapsed}");
            assert_eq!(seek, Duration::from_secs(elapsed % 60));
        }

        assert_eq!(
            wrap_position(Duration::from_secs(5), Duration::ZERO),
            Duration::ZERO,
        );
    }

    #[tokio::test(start_paused = true)]
    async fn seek_follows_elapsed_time_modulo_duration() {
        let rig = rig(FakeCamera::granting(), Duration::from_secs(60));

        advance(Duration::from_secs(70)).await;
        rig.loader.load(2).await.unwrap();

        advance(Duration::from_secs(60)).await;
        rig.loader.load(2).await.unwrap();

        let seeks = rig
            .log
            .events()
            .into_iter()
            .filter_map(|event| match event {
                SurfaceEvent::SeekTo(position) => Some(position),
                _ => None,
            })
            .collect::<Vec<_>>();

        // Same channel, 60s apart, 60s media: both tune-ins land on the
        // same frame of the loop.
        assert_eq!(
            seeks,
            vec![Duration::from_secs(10), Duration::from_secs(10)],
        );
    }

    #[tokio::test(start_paused = true)]
    async fn unmapped_channel_is_a_configuration_miss() {
        let rig = rig(FakeCamera::granting(), Duration::from_secs(60));

        let result = rig.loader.load(42).await;

        assert!(matches!(result, Err(TuneError::ConfigurationMiss(42))));
        assert!(rig.log.events().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn camera_feed_is_released_before_a_video_binds() {
        let rig = rig(FakeCamera::granting(), Duration::from_secs(60));

        rig.loader.load(10).await.unwrap();
        assert!(rig.session.has_camera());

        rig.loader.load(9).await.unwrap();

        assert_eq!(rig.camera.releases.load(Ordering::SeqCst), 1);
        assert!(!rig.session.has_camera());

        let events = rig.log.events();
        let unbind = events
            .iter()
            .position(|event| *event == SurfaceEvent::Unbind)
            .unwrap();
        let bind = events
            .iter()
            .position(|event| *event == SurfaceEvent::BindVideo("nine.mp4".into()))
            .unwrap();

        assert!(unbind < bind);
    }

    #[tokio::test(start_paused = true)]
    async fn denied_capture_leaves_the_channel_blank() {
        let rig = rig(FakeCamera::denying(), Duration::from_secs(60));

        let result = rig.loader.load(10).await;

        assert!(matches!(
            result,
            Err(TuneError::CaptureUnavailable(CaptureError::PermissionDenied)),
        ));
        assert!(!rig.session.has_camera());
        assert!(rig.log.events().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn progress_watchers_do_not_accumulate_across_loads() {
        let rig = rig(FakeCamera::granting(), Duration::from_secs(60));

        rig.loader.load(2).await.unwrap();
        rig.loader.load(9).await.unwrap();

        // Let both watcher tasks reach their receive points.
        sleep(Duration::from_millis(1)).await;

        rig.playback.push_progress(Duration::from_secs(65));
        sleep(Duration::from_millis(1)).await;

        let timestamps = rig
            .log
            .events()
            .into_iter()
            .filter(|event| matches!(event, SurfaceEvent::Timestamp(_)))
            .collect::<Vec<_>>();

        assert_eq!(timestamps, vec![SurfaceEvent::Timestamp("1:05".into())]);
    }
}
