//! Progress indicator driven by the state machine.
//!
//! The spinner follows a `watch` receiver: it appears when the state turns
//! `Submitting` and clears itself once the state leaves it. On a TTY it
//! animates in place; otherwise a single status line goes to stderr.

use airq_common::RequestState;
use owo_colors::OwoColorize;
use std::io::{self, Write};
use std::time::Duration;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Braille spinner frames
const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

const SPINNER_INTERVAL_MS: u64 = 120;

pub struct Spinner {
    stop: oneshot::Sender<()>,
    handle: JoinHandle<Option<Duration>>,
}

impl Spinner {
    /// Show `message` for as long as the observed state is `Submitting`.
    /// `animate` selects the in-place TTY animation.
    pub fn follow(states: watch::Receiver<RequestState>, message: &str, animate: bool) -> Self {
        let (stop, stopped) = oneshot::channel();
        let handle = tokio::spawn(run(states, stopped, message.to_string(), animate));
        Self { stop, handle }
    }

    /// Stop and clear the line. Returns how long the query was shown as
    /// in flight, or `None` if it never was.
    pub async fn stop(self) -> Option<Duration> {
        let _ = self.stop.send(());
        self.handle.await.ok().flatten()
    }
}

async fn run(
    mut states: watch::Receiver<RequestState>,
    mut stopped: oneshot::Receiver<()>,
    message: String,
    animate: bool,
) -> Option<Duration> {
    let submitting = async { states.wait_for(|s| s.is_submitting()).await.is_ok() };
    tokio::select! {
        started = submitting => {
            if !started {
                return None;
            }
        }
        _ = &mut stopped => return None,
    }

    let start_time = Instant::now();
    if !animate {
        eprintln!("[airq]  ... {}", message);
    }

    let mut ticker = tokio::time::interval(Duration::from_millis(SPINNER_INTERVAL_MS));
    let mut frame = 0;
    loop {
        tokio::select! {
            _ = ticker.tick(), if animate => {
                print!(
                    "\r{}  {} {}",
                    "[airq]".bright_cyan(),
                    SPINNER_FRAMES[frame].bright_green(),
                    message.dimmed()
                );
                let _ = io::stdout().flush();
                frame = (frame + 1) % SPINNER_FRAMES.len();
            }
            changed = states.changed() => {
                if changed.is_err() || !states.borrow_and_update().is_submitting() {
                    break;
                }
            }
            _ = &mut stopped => break,
        }
    }

    if animate {
        print!("\r{}\r", " ".repeat(60));
        let _ = io::stdout().flush();
    }
    Some(start_time.elapsed())
}
