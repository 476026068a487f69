use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::sleep;

use crate::surface::Presenter;

pub const INVALID_CAPTION: &str = "Invalid";

const HIDE_AFTER: Duration = Duration::from_millis(2000);

pub fn format_channel(number: u32) -> String {
    format!("CH {number:02}")
}

pub fn format_entry(buffer: &str) -> String {
    format!("CH {buffer:0>2}")
}

pub fn format_timestamp(position: Duration) -> String {
    let total = position.as_secs();

    format!("{}:{:02}", total / 60, total % 60)
}

/// Pushes captions to the presenter and keeps the single auto-hide timer.
/// Every render replaces the timer, so only the latest update decides when
/// the caption disappears; a stale timer is aborted, never left to fire.
pub struct ChannelDisplay {
    presenter: Arc<dyn Presenter>,
    hide_timer: Mutex<Option<JoinHandle<()>>>,
}

impl ChannelDisplay {
    pub fn new(presenter: Arc<dyn Presenter>) -> Self {
        Self {
            presenter,
            hide_timer: Mutex::new(None),
        }
    }

    pub fn show_channel(&self, number: u32) {
        self.render(&format_channel(number));
    }

    pub fn show_entry(&self, buffer: &str) {
        self.render(&format_entry(buffer));
    }

    pub fn show_invalid(&self) {
        self.render(INVALID_CAPTION);
    }

    pub fn show_timestamp(&self, position: Duration) {
        self.presenter.set_timestamp(&format_timestamp(position));
    }

    fn render(&self, caption: &str) {
        self.presenter.set_caption(caption);
        self.presenter.set_caption_visible(true);
        self.rearm_hide();
    }

    fn rearm_hide(&self) {
        let mut timer = self.hide_timer.lock().unwrap();

        if let Some(handle) = timer.take() {
            handle.abort();
        }

        let presenter = self.presenter.clone();

        *timer = Some(tokio::spawn(async move {
            sleep(HIDE_AFTER).await;
            presenter.set_caption_visible(false);
        }));
    }
}
