pub mod console;

use std::path::Path;
use std::time::Duration;

use tokio::sync::{oneshot, watch};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Overlay {
    Black,
    Static,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CaptureError {
    PermissionDenied,
    Unsupported,
}

/// An exclusively held live capture. Released before any other source
/// binds and at process teardown.
pub trait CameraFeed: Send + Sync {
    fn release(&self);
}

pub trait CameraProvider: Send + Sync {
    /// Requests an exclusive video-only capture from the environment.
    /// Resolves at most once; a dropped sender counts as unsupported.
    fn request_capture(&self) -> oneshot::Receiver<Result<Box<dyn CameraFeed>, CaptureError>>;
}

/// The single active playback device. Only one of {video, live feed} is
/// bound at a time; binding replaces whatever was bound before.
pub trait PlaybackSurface: Send + Sync {
    /// Binds a video source. The returned receiver resolves once with the
    /// media duration; binding again drops the previous sender, so a
    /// superseded load observes a closed channel instead of a stale
    /// metadata signal.
    fn bind_video(&self, media: &Path) -> oneshot::Receiver<Duration>;

    fn bind_live(&self, feed: &dyn CameraFeed);

    fn unbind(&self);

    fn play(&self);

    fn pause(&self);

    fn seek_to(&self, position: Duration);

    /// Subscribes to playback position updates. The surface replaces the
    /// sender on every bind, so subscribers from earlier loads see a
    /// closed channel and drop out rather than accumulating.
    fn watch_progress(&self) -> watch::Receiver<Duration>;
}

/// Overlay, caption, and sound-cue output. Toggles cannot fail.
pub trait Presenter: Send + Sync {
    fn set_overlay(&self, overlay: Overlay, visible: bool);

    fn set_caption(&self, text: &str);

    fn set_caption_visible(&self, visible: bool);

    fn set_timestamp(&self, text: &str);

    /// Plays the static noise cue from its start.
    fn start_static_sound(&self);

    fn stop_static_sound(&self);
}
