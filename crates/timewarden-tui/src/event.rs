//! Terminal event source — keyboard, resize, tick, and render pulses.

use std::time::Duration;

use crossterm::event::{Event as CrosstermEvent, EventStream, KeyEvent, KeyEventKind};
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::error;

/// Events delivered to the main loop.
#[derive(Debug, Clone, Copy)]
pub enum Event {
    Key(KeyEvent),
    Resize(u16, u16),
    /// Periodic pulse for time-based state (toast expiry).
    Tick,
    /// Frame pulse; the loop redraws on each one.
    Render,
}

/// Background reader merging crossterm input with tick/render timers.
pub struct EventReader {
    rx: mpsc::UnboundedReceiver<Event>,
    cancel: CancellationToken,
}

impl EventReader {
    pub fn new(tick_rate: Duration, render_rate: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        let task_cancel = cancel.clone();

        tokio::spawn(async move {
            let mut stream = EventStream::new();
            let mut tick = tokio::time::interval(tick_rate);
            let mut render = tokio::time::interval(render_rate);

            loop {
                tokio::select! {
                    () = task_cancel.cancelled() => break,

                    maybe_event = stream.next() => match maybe_event {
                        // Only key presses; repeats and releases would
                        // double-fire on some terminals.
                        Some(Ok(CrosstermEvent::Key(key))) if key.kind == KeyEventKind::Press => {
                            if tx.send(Event::Key(key)).is_err() {
                                break;
                            }
                        }
                        Some(Ok(CrosstermEvent::Resize(w, h))) => {
                            if tx.send(Event::Resize(w, h)).is_err() {
                                break;
                            }
                        }
                        Some(Ok(_)) => {}
                        Some(Err(e)) => {
                            error!(error = %e, "terminal event stream error");
                            break;
                        }
                        None => break,
                    },

                    _ = tick.tick() => {
                        if tx.send(Event::Tick).is_err() {
                            break;
                        }
                    }

                    _ = render.tick() => {
                        if tx.send(Event::Render).is_err() {
                            break;
                        }
                    }
                }
            }
        });

        Self { rx, cancel }
    }

    pub async fn next(&mut self) -> Option<Event> {
        self.rx.recv().await
    }

    pub fn stop(&self) {
        self.cancel.cancel();
    }
}
