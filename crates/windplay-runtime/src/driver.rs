#![forbid(unsafe_code)]

//! Driver thread that owns a playback controller.
//!
//! [`PlaybackController`] is single-owner and has no locking. On native hosts
//! where UI input and timers live on different threads, [`PlaybackDriver`]
//! funnels every mutating call through one actor thread:
//!
//! 1. Handle methods send a [`Command`] over an mpsc channel.
//! 2. The driver thread waits for the next command, or until the held
//!    timer's next tick is due, whichever comes first.
//! 3. Elapsed wall time is fed to [`PlaybackController::advance`] before each
//!    command is applied, so ticks and commands are strictly ordered.
//!
//! The subscriber runs on the driver thread.
//!
//! # Teardown
//!
//! [`PlaybackDriver::shutdown`] stops the thread and joins it. Dropping the
//! handle also stops the thread but does not join, so a handler blocked
//! elsewhere cannot hang the caller.

use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;

use web_time::Instant;
use windplay_core::{FrameEvent, PlaybackController, PlaybackOptions, PlaybackTimer};

/// Messages accepted by the driver thread.
enum Command<T> {
    SetFrames(Vec<T>),
    Play,
    Pause,
    Toggle,
    SetIndex(i64),
    SetOptions(PlaybackOptions),
    Snapshot(mpsc::Sender<DriverSnapshot>),
    Shutdown,
}

/// Point-in-time view of the driver's controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverSnapshot {
    pub index: usize,
    pub total: usize,
    pub playing: bool,
    pub options: PlaybackOptions,
}

/// Driver error type.
#[derive(Debug)]
pub enum DriverError {
    /// The driver thread could not be spawned.
    Spawn(std::io::Error),
    /// The driver thread has exited.
    Disconnected,
    /// The driver thread panicked (usually inside the subscriber).
    Panicked,
}

impl std::fmt::Display for DriverError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Spawn(e) => write!(f, "failed to spawn playback driver: {e}"),
            Self::Disconnected => write!(f, "playback driver has stopped"),
            Self::Panicked => write!(f, "playback driver panicked"),
        }
    }
}

impl std::error::Error for DriverError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Spawn(e) => Some(e),
            Self::Disconnected | Self::Panicked => None,
        }
    }
}

/// Handle to a playback controller running on its own thread.
pub struct PlaybackDriver<T: Send + 'static> {
    sender: mpsc::Sender<Command<T>>,
    thread: Option<thread::JoinHandle<()>>,
}

impl<T: Send + 'static> PlaybackDriver<T> {
    /// Spawn the driver thread.
    ///
    /// `handler` becomes the controller's subscriber and is invoked once
    /// immediately with the empty initial state.
    pub fn spawn(
        options: PlaybackOptions,
        handler: impl FnMut(FrameEvent<'_, T>) + Send + 'static,
    ) -> Result<Self, DriverError> {
        let (sender, receiver) = mpsc::channel();
        let thread = thread::Builder::new()
            .name("windplay-driver".into())
            .spawn(move || {
                let mut controller = PlaybackController::new(options);
                controller.on_frame(handler);
                run(controller, receiver);
            })
            .map_err(DriverError::Spawn)?;
        tracing::debug!(
            frame_delay_ms = options.frame_delay().as_millis() as u64,
            looping = options.looping(),
            "playback driver started"
        );
        Ok(Self {
            sender,
            thread: Some(thread),
        })
    }

    fn send(&self, command: Command<T>) -> Result<(), DriverError> {
        self.sender
            .send(command)
            .map_err(|_| DriverError::Disconnected)
    }

    /// Replace the frame sequence (stops playback, resets to frame 0).
    pub fn set_frames(&self, frames: impl Into<Vec<T>>) -> Result<(), DriverError> {
        self.send(Command::SetFrames(frames.into()))
    }

    /// Start playback.
    pub fn play(&self) -> Result<(), DriverError> {
        self.send(Command::Play)
    }

    /// Pause playback.
    pub fn pause(&self) -> Result<(), DriverError> {
        self.send(Command::Pause)
    }

    /// Toggle between play and pause.
    pub fn toggle(&self) -> Result<(), DriverError> {
        self.send(Command::Toggle)
    }

    /// Seek to a clamped index.
    pub fn set_index(&self, index: i64) -> Result<(), DriverError> {
        self.send(Command::SetIndex(index))
    }

    /// Replace the playback options.
    pub fn set_options(&self, options: PlaybackOptions) -> Result<(), DriverError> {
        self.send(Command::SetOptions(options))
    }

    /// Query the controller state after all previously sent commands.
    pub fn snapshot(&self) -> Result<DriverSnapshot, DriverError> {
        let (reply, response) = mpsc::channel();
        self.send(Command::Snapshot(reply))?;
        response.recv().map_err(|_| DriverError::Disconnected)
    }

    /// Stop the driver thread and wait for it to exit.
    pub fn shutdown(mut self) -> Result<(), DriverError> {
        let _ = self.sender.send(Command::Shutdown);
        match self.thread.take() {
            Some(handle) => handle.join().map_err(|_| DriverError::Panicked),
            None => Ok(()),
        }
    }
}

impl<T: Send + 'static> Drop for PlaybackDriver<T> {
    fn drop(&mut self) {
        let _ = self.sender.send(Command::Shutdown);
        // Not joined; the thread exits on its next wakeup.
    }
}

fn run<T>(mut controller: PlaybackController<T>, receiver: mpsc::Receiver<Command<T>>) {
    let mut last = Instant::now();
    loop {
        let command = match controller.timer().map(PlaybackTimer::remaining) {
            Some(wait) => match receiver.recv_timeout(wait) {
                Ok(command) => Some(command),
                Err(RecvTimeoutError::Timeout) => None,
                Err(RecvTimeoutError::Disconnected) => break,
            },
            None => match receiver.recv() {
                Ok(command) => Some(command),
                Err(_) => break,
            },
        };

        let now = Instant::now();
        controller.advance(now.saturating_duration_since(last));
        last = now;

        let Some(command) = command else {
            continue;
        };
        match command {
            Command::SetFrames(frames) => {
                tracing::debug!(frames = frames.len(), "driver: set frames");
                controller.set_frames(frames);
            }
            Command::Play => controller.play(),
            Command::Pause => controller.pause(),
            Command::Toggle => controller.toggle(),
            Command::SetIndex(index) => controller.set_index(index),
            Command::SetOptions(options) => controller.set_options(options),
            Command::Snapshot(reply) => {
                let _ = reply.send(DriverSnapshot {
                    index: controller.current_index(),
                    total: controller.len(),
                    playing: controller.is_playing(),
                    options: controller.options(),
                });
            }
            Command::Shutdown => break,
        }
    }
    controller.shutdown();
    tracing::debug!("playback driver stopped");
}
