use std::sync::Mutex;

use crate::catalog::ChannelCatalog;
use crate::clock::SessionClock;
use crate::surface::CameraFeed;

struct SessionState {
    channel: u32,
    switching: bool,
    entry_pending: bool,
    buffer: String,
    camera: Option<Box<dyn CameraFeed>>,
}

/// Mutable viewer-session state, shared by the aggregator, sequencer, and
/// loader. The switching flag is the mutual-exclusion gate for switch
/// sequences; the camera feed is held here so exactly one component owns
/// its release.
pub struct Session {
    catalog: ChannelCatalog,
    clock: SessionClock,
    state: Mutex<SessionState>,
}

impl Session {
    pub fn new(catalog: ChannelCatalog, clock: SessionClock, default_channel: u32) -> Self {
        Self {
            catalog,
            clock,
            state: Mutex::new(SessionState {
                channel: default_channel,
                switching: false,
                entry_pending: false,
                buffer: String::new(),
                camera: None,
            }),
        }
    }

    pub fn catalog(&self) -> &ChannelCatalog {
        &self.catalog
    }

    pub fn clock(&self) -> &SessionClock {
        &self.clock
    }

    pub fn current_channel(&self) -> u32 {
        self.state.lock().unwrap().channel
    }

    pub fn set_channel(&self, number: u32) {
        self.state.lock().unwrap().channel = number;
    }

    /// True while input must be discarded: a switch sequence is running or
    /// a two-digit entry is waiting out its debounce.
    pub fn is_gated(&self) -> bool {
        let state = self.state.lock().unwrap();
        state.switching || state.entry_pending
    }

    /// Claims the switching gate. Returns false if a sequence is already
    /// in flight; the caller must drop the request, not queue it.
    pub fn begin_switch(&self) -> bool {
        let mut state = self.state.lock().unwrap();
        if state.switching {
            false
        } else {
            state.switching = true;
            true
        }
    }

    pub fn finish_switch(&self) {
        self.state.lock().unwrap().switching = false;
    }

    pub fn set_entry_pending(&self, pending: bool) {
        self.state.lock().unwrap().entry_pending = pending;
    }

    /// Appends a digit and returns the buffer contents. The buffer never
    /// grows past two digits.
    pub fn push_digit(&self, digit: u8) -> String {
        let mut state = self.state.lock().unwrap();
        if state.buffer.len() < 2 {
            state.buffer.push(char::from(b'0' + digit));
        }

        state.buffer.clone()
    }

    pub fn clear_buffer(&self) {
        self.state.lock().unwrap().buffer.clear();
    }

    pub fn store_camera(&self, feed: Box<dyn CameraFeed>) {
        self.state.lock().unwrap().camera = Some(feed);
    }

    /// Releases the held camera feed, if any. Returns whether one was held.
    pub fn release_camera(&self) -> bool {
        let feed = self.state.lock().unwrap().camera.take();

        match feed {
            Some(feed) => {
                feed.release();
                true
            }
            None => false,
        }
    }

    pub fn has_camera(&self) -> bool {
        self.state.lock().unwrap().camera.is_some()
    }

    #[cfg(test)]
    pub fn buffer(&self) -> String {
        self.state.lock().unwrap().buffer.clone()
    }

    #[cfg(test)]
    pub fn is_switching(&self) -> bool {
        self.state.lock().unwrap().switching
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        let catalog = ChannelCatalog::new(2, 57, Default::default());
        Session::new(catalog, SessionClock::new(), 2)
    }

    #[tokio::test]
    async fn only_one_switch_may_be_claimed_at_a_time() {
        let session = session();

        assert!(session.begin_switch());
        assert!(!session.begin_switch());
        assert!(session.is_gated());

        session.finish_switch();

        assert!(!session.is_gated());
        assert!(session.begin_switch());
    }

    #[tokio::test]
    async fn buffer_never_exceeds_two_digits() {
        let session = session();

        assert_eq!(session.push_digit(4), "4");
        assert_eq!(session.push_digit(2), "42");
        assert_eq!(session.push_digit(7), "42");

        session.clear_buffer();

        assert_eq!(session.buffer(), "");
    }

    #[tokio::test]
    async fn pending_entry_gates_input() {
        let session = session();

        session.set_entry_pending(true);
        assert!(session.is_gated());

        session.set_entry_pending(false);
        assert!(!session.is_gated());
    }
}
