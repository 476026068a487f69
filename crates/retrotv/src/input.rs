use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::warn;

use crate::display::ChannelDisplay;
use crate::sequencer::ChannelSwitcher;
use crate::session::Session;

const BUFFER_RESET: Duration = Duration::from_millis(2000);
const COMMIT_DEBOUNCE: Duration = Duration::from_millis(125);
const INVALID_FLASH: Duration = Duration::from_millis(500);

/// Digit values are 0..=9; anything the remote does not map lands on
/// `Other` and is ignored.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyEvent {
    StepUp,
    StepDown,
    Digit(u8),
    Other,
}

/// Turns key events into switch requests: single steps with wraparound,
/// or direct two-digit entry with a reset timeout and a short debounce
/// before committing. All input is discarded while a switch sequence or a
/// pending entry holds the gate.
pub struct InputAggregator {
    session: Arc<Session>,
    switcher: ChannelSwitcher,
    display: Arc<ChannelDisplay>,
    reset_timer: Mutex<Option<JoinHandle<()>>>,
}

impl InputAggregator {
    pub fn new(
        session: Arc<Session>,
        switcher: ChannelSwitcher,
        display: Arc<ChannelDisplay>,
    ) -> Self {
        Self {
            session,
            switcher,
            display,
            reset_timer: Mutex::new(None),
        }
    }

    pub fn handle_key(&self, key: KeyEvent) {
        if self.session.is_gated() {
            return;
        }

        match key {
            KeyEvent::StepUp => {
                let target = self
                    .session
                    .catalog()
                    .next_up(self.session.current_channel());
                self.switcher.request_switch(target);
            }
            KeyEvent::StepDown => {
                let target = self
                    .session
                    .catalog()
                    .next_down(self.session.current_channel());
                self.switcher.request_switch(target);
            }
            KeyEvent::Digit(digit) => self.push_digit(digit),
            KeyEvent::Other => {}
        }
    }

    fn push_digit(&self, digit: u8) {
        let buffer = self.session.push_digit(digit);
        self.display.show_entry(&buffer);

        self.cancel_reset_timer();

        if buffer.len() == 2 {
            self.session.clear_buffer();
            self.session.set_entry_pending(true);

            let target = parse_entry(&buffer);
            let session = self.session.clone();
            let switcher = self.switcher.clone();
            let display = self.display.clone();

            tokio::spawn(commit_entry(session, switcher, display, target));
        } else {
            let session = self.session.clone();
            let display = self.display.clone();

            let handle = tokio::spawn(async move {
                sleep(BUFFER_RESET).await;
                session.clear_buffer();
                display.show_channel(session.current_channel());
            });

            *self.reset_timer.lock().unwrap() = Some(handle);
        }
    }

    fn cancel_reset_timer(&self) {
        if let Some(handle) = self.reset_timer.lock().unwrap().take() {
            handle.abort();
        }
    }
}

/// The debounce lets the second digit register on screen before the entry
/// commits. A valid target becomes a switch request; an invalid one
/// flashes the caption and leaves the channel alone.
async fn commit_entry(
    session: Arc<Session>,
    switcher: ChannelSwitcher,
    display: Arc<ChannelDisplay>,
    target: u32,
) {
    sleep(COMMIT_DEBOUNCE).await;

    if session.catalog().in_range(target) {
        switcher.request_switch(target);
        session.set_entry_pending(false);
    } else {
        session.set_entry_pending(false);

        warn!(
            target,
            current = session.current_channel(),
            "Invalid channel entry"
        );

        display.show_invalid();
        sleep(INVALID_FLASH).await;
        display.show_channel(session.current_channel());
    }
}

fn parse_entry(buffer: &str) -> u32 {
    buffer
        .bytes()
        .fold(0, |acc, digit| acc * 10 + u32::from(digit - b'0'))
}
