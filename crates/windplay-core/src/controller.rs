#![forbid(unsafe_code)]

//! Playback controller: timer-driven traversal of a frame sequence.
//!
//! A [`PlaybackController`] owns an ordered list of frames, a current index,
//! and at most one [`PlaybackTimer`]. The host drives time: it either calls
//! [`tick`](PlaybackController::tick) from its own recurring timer, or feeds
//! elapsed wall time through [`advance`](PlaybackController::advance). Every
//! index change is reported synchronously to a single subscriber.
//!
//! # Usage
//!
//! ```
//! use std::time::Duration;
//! use windplay_core::{PlaybackController, PlaybackOptions};
//!
//! let opts = PlaybackOptions::from_millis(100, false).unwrap();
//! let mut ctl: PlaybackController<char> = PlaybackController::new(opts);
//! ctl.set_frames(vec!['A', 'B', 'C']);
//! ctl.on_frame(|ev| println!("frame {}/{}", ev.index + 1, ev.total));
//! ctl.play();
//!
//! assert_eq!(ctl.advance(Duration::from_millis(250)), 2);
//! assert_eq!(ctl.current_index(), 2);
//! ```
//!
//! # Invariants
//!
//! 1. `current_index() < len()` whenever frames are loaded; `0` when empty.
//! 2. A timer is held iff playback is running and `len() > 1`.
//! 3. `set_frames` resets the index to 0 and releases the timer.
//! 4. Once the timer is released, no tick (stale [`TimerId`] or otherwise)
//!    advances state.
//!
//! # Failure Modes
//!
//! - Out-of-range seek: clamped into bounds, never rejected.
//! - No subscriber: notifications are dropped.
//! - Zero frame delay: unrepresentable; rejected by [`PlaybackOptions::new`]
//!   and [`PlaybackController::set_frame_delay`].
//! - Huge `advance` spans: at most [`MAX_TICKS_PER_ADVANCE`] ticks fire per
//!   call; the remaining backlog is dropped modulo the interval.

use core::time::Duration;

use crate::error::PlaybackError;
use crate::options::PlaybackOptions;

/// Upper bound on ticks fired by a single [`PlaybackController::advance`] call.
pub const MAX_TICKS_PER_ADVANCE: usize = 4096;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Notification payload delivered to the subscriber.
#[derive(Debug, PartialEq)]
pub struct FrameEvent<'a, T> {
    /// Current frame, `None` when no frames are loaded.
    pub frame: Option<&'a T>,
    /// Current index (0 when empty).
    pub index: usize,
    /// Number of loaded frames.
    pub total: usize,
}

impl<T> Clone for FrameEvent<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for FrameEvent<'_, T> {}

impl<T> FrameEvent<'_, T> {
    /// Whether this event describes the last frame of the sequence.
    #[must_use]
    pub fn is_last(&self) -> bool {
        self.total > 0 && self.index + 1 == self.total
    }
}

/// Boxed single subscriber.
pub type FrameHandler<T> = Box<dyn FnMut(FrameEvent<'_, T>)>;

/// Logical playback state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    /// No timer held.
    #[default]
    Stopped,
    /// Timer held; ticks advance the index.
    Running,
}

impl PlaybackState {
    /// Short label for status text.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Stopped => "paused",
            Self::Running => "playing",
        }
    }
}

/// Identifier of one timer acquisition.
///
/// Every acquisition (play, or a restart caused by new options) gets a fresh
/// id, so hosts whose platform timer cannot be cancelled synchronously can
/// filter stale ticks with [`PlaybackController::tick_timer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

impl TimerId {
    /// Raw generation number.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// The recurring timer owned by a running controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackTimer {
    id: TimerId,
    interval: Duration,
    elapsed: Duration,
}

impl PlaybackTimer {
    /// Acquisition id.
    #[must_use]
    pub fn id(&self) -> TimerId {
        self.id
    }

    /// Delay between ticks.
    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Time accumulated toward the next tick via `advance`.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Time left until the next tick is due.
    #[must_use]
    pub fn remaining(&self) -> Duration {
        self.interval.saturating_sub(self.elapsed)
    }
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

/// Timer-driven frame playback with a single subscriber.
pub struct PlaybackController<T> {
    frames: Vec<T>,
    index: usize,
    options: PlaybackOptions,
    timer: Option<PlaybackTimer>,
    next_timer_id: u64,
    handler: Option<FrameHandler<T>>,
}

impl<T> std::fmt::Debug for PlaybackController<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackController")
            .field("frame_count", &self.frames.len())
            .field("index", &self.index)
            .field("options", &self.options)
            .field("timer", &self.timer)
            .field("has_subscriber", &self.handler.is_some())
            .finish()
    }
}

impl<T> PlaybackController<T> {
    /// Create a stopped controller with no frames.
    #[must_use]
    pub fn new(options: PlaybackOptions) -> Self {
        Self {
            frames: Vec::new(),
            index: 0,
            options,
            timer: None,
            next_timer_id: 0,
            handler: None,
        }
    }

    // -- Frames and seeking -------------------------------------------------

    /// Replace the frame sequence.
    ///
    /// Resets the index to 0, stops playback, and notifies once (with
    /// `frame: None` when `frames` is empty).
    pub fn set_frames(&mut self, frames: impl Into<Vec<T>>) {
        self.release_timer("frames_replaced");
        self.frames = frames.into();
        self.index = 0;
        #[cfg(feature = "tracing")]
        tracing::debug!(frames = self.frames.len(), "playback frames replaced");
        self.notify();
    }

    /// Seek to `index`, clamped into `[0, len - 1]` (0 when empty).
    ///
    /// Always notifies once. A running timer keeps running from the new
    /// position.
    pub fn set_index(&mut self, index: i64) {
        self.index = self.clamp_index(index);
        self.notify();
    }

    /// Seek one frame forward, stopping at the last frame.
    pub fn step_forward(&mut self) {
        let next = i64::try_from(self.index).unwrap_or(i64::MAX).saturating_add(1);
        self.set_index(next);
    }

    /// Seek one frame backward, stopping at the first frame.
    pub fn step_backward(&mut self) {
        let prev = i64::try_from(self.index).unwrap_or(i64::MAX).saturating_sub(1);
        self.set_index(prev);
    }

    fn clamp_index(&self, index: i64) -> usize {
        let Some(last) = self.frames.len().checked_sub(1) else {
            return 0;
        };
        if index <= 0 {
            return 0;
        }
        usize::try_from(index).map_or(last, |i| i.min(last))
    }

    // -- Transport ------------------------------------------------------------

    /// Start recurring advancement.
    ///
    /// No-op when already running or when fewer than two frames are loaded.
    pub fn play(&mut self) {
        if self.timer.is_some() || self.frames.len() <= 1 {
            return;
        }
        self.acquire_timer();
    }

    /// Stop recurring advancement. No-op when stopped.
    pub fn pause(&mut self) {
        self.release_timer("paused");
    }

    /// Pause when running, play otherwise.
    pub fn toggle(&mut self) {
        if self.is_playing() {
            self.pause();
        } else {
            self.play();
        }
    }

    /// Whether a timer is currently held.
    #[inline]
    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.timer.is_some()
    }

    /// Current logical state.
    #[inline]
    #[must_use]
    pub fn state(&self) -> PlaybackState {
        if self.timer.is_some() {
            PlaybackState::Running
        } else {
            PlaybackState::Stopped
        }
    }

    // -- Options --------------------------------------------------------------

    /// Replace the configuration without moving the current position.
    ///
    /// When running, the timer is restarted immediately with the new delay
    /// (fresh [`TimerId`], no leftover elapsed time). Emits no notification.
    pub fn set_options(&mut self, options: PlaybackOptions) {
        self.options = options;
        if self.timer.is_some() {
            self.acquire_timer();
        }
    }

    /// Replace only the frame delay, rejecting zero.
    ///
    /// On error the previous options stay in effect.
    pub fn set_frame_delay(&mut self, frame_delay: Duration) -> Result<(), PlaybackError> {
        let options = self.options.with_frame_delay(frame_delay)?;
        self.set_options(options);
        Ok(())
    }

    /// Replace only the loop flag.
    pub fn set_looping(&mut self, looping: bool) {
        self.set_options(self.options.with_looping(looping));
    }

    /// Current configuration.
    #[inline]
    #[must_use]
    pub fn options(&self) -> PlaybackOptions {
        self.options
    }

    // -- Subscriber -----------------------------------------------------------

    /// Register the single subscriber, replacing any previous one.
    ///
    /// The handler is invoked once immediately with the current state.
    pub fn on_frame(&mut self, handler: impl FnMut(FrameEvent<'_, T>) + 'static) {
        self.handler = Some(Box::new(handler));
        self.notify();
    }

    /// Drop the subscriber. Later state changes notify nobody.
    pub fn clear_subscriber(&mut self) {
        self.handler = None;
    }

    /// Whether a subscriber is registered.
    #[must_use]
    pub fn has_subscriber(&self) -> bool {
        self.handler.is_some()
    }

    fn notify(&mut self) {
        let Some(handler) = self.handler.as_mut() else {
            return;
        };
        handler(FrameEvent {
            frame: self.frames.get(self.index),
            index: self.index,
            total: self.frames.len(),
        });
    }

    // -- Queries --------------------------------------------------------------

    /// Current index.
    #[inline]
    #[must_use]
    pub fn current_index(&self) -> usize {
        self.index
    }

    /// Current frame, if any are loaded.
    #[must_use]
    pub fn current_frame(&self) -> Option<&T> {
        self.frames.get(self.index)
    }

    /// Snapshot of the current state as a notification payload.
    #[must_use]
    pub fn event(&self) -> FrameEvent<'_, T> {
        FrameEvent {
            frame: self.frames.get(self.index),
            index: self.index,
            total: self.frames.len(),
        }
    }

    /// Loaded frames.
    #[must_use]
    pub fn frames(&self) -> &[T] {
        &self.frames
    }

    /// Number of loaded frames.
    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Whether no frames are loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// The held timer, if running.
    #[must_use]
    pub fn timer(&self) -> Option<&PlaybackTimer> {
        self.timer.as_ref()
    }

    // -- Ticking --------------------------------------------------------------

    /// Perform one advancement step.
    ///
    /// Returns `true` if the index changed and the subscriber was notified.
    /// A tick while stopped does nothing, so a host tick that fires after
    /// cancellation is harmless.
    pub fn tick(&mut self) -> bool {
        if self.timer.is_none() {
            return false;
        }
        let last = self.frames.len().saturating_sub(1);
        if self.index >= last {
            if self.options.looping() {
                self.index = 0;
            } else {
                self.release_timer("completed");
                return false;
            }
        } else {
            self.index += 1;
        }
        self.notify();
        true
    }

    /// Tick only if `id` identifies the currently held timer.
    pub fn tick_timer(&mut self, id: TimerId) -> bool {
        match &self.timer {
            Some(timer) if timer.id == id => self.tick(),
            _ => false,
        }
    }

    /// Feed elapsed host time and fire every tick that became due.
    ///
    /// Returns the number of notifications emitted.
    pub fn advance(&mut self, dt: Duration) -> usize {
        let Some(timer) = self.timer.as_mut() else {
            return 0;
        };
        timer.elapsed = timer.elapsed.saturating_add(dt);

        let mut fired = 0;
        let mut due = 0;
        loop {
            let Some(timer) = self.timer.as_mut() else {
                break;
            };
            if timer.elapsed < timer.interval {
                break;
            }
            if due == MAX_TICKS_PER_ADVANCE {
                let rem = timer.elapsed.as_nanos() % timer.interval.as_nanos();
                timer.elapsed = Duration::from_nanos(u64::try_from(rem).unwrap_or(u64::MAX));
                #[cfg(feature = "tracing")]
                tracing::warn!(
                    playback_event = "backlog_collapsed",
                    ticks = due,
                    interval_ms = timer.interval.as_millis() as u64,
                );
                break;
            }
            timer.elapsed -= timer.interval;
            due += 1;
            if self.tick() {
                fired += 1;
            }
        }
        fired
    }

    // -- Teardown -------------------------------------------------------------

    /// Release the timer and drop the subscriber.
    ///
    /// This is the explicit teardown path for hosts destroying the view;
    /// dropping the controller does the same.
    pub fn shutdown(&mut self) {
        self.release_timer("shutdown");
        self.handler = None;
    }

    // -- Timer resource ---------------------------------------------------------

    fn acquire_timer(&mut self) {
        self.next_timer_id = self.next_timer_id.wrapping_add(1);
        let timer = PlaybackTimer {
            id: TimerId(self.next_timer_id),
            interval: self.options.frame_delay(),
            elapsed: Duration::ZERO,
        };
        #[cfg(feature = "tracing")]
        tracing::debug!(
            playback_event = "timer_acquired",
            timer_id = timer.id.get(),
            interval_ms = timer.interval.as_millis() as u64,
            looping = self.options.looping(),
            index = self.index,
            frames = self.frames.len(),
        );
        self.timer = Some(timer);
    }

    fn release_timer(&mut self, reason: &'static str) {
        let Some(timer) = self.timer.take() else {
            return;
        };
        #[cfg(feature = "tracing")]
        tracing::debug!(
            playback_event = "timer_released",
            reason,
            timer_id = timer.id.get(),
            index = self.index,
        );
        #[cfg(not(feature = "tracing"))]
        let _ = (timer, reason);
    }
}

impl<T> Default for PlaybackController<T> {
    fn default() -> Self {
        Self::new(PlaybackOptions::default())
    }
}

impl<T> Drop for PlaybackController<T> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    const MS_100: Duration = Duration::from_millis(100);

    type Log = Rc<RefCell<Vec<(Option<char>, usize, usize)>>>;

    fn recorder() -> (Log, impl FnMut(FrameEvent<'_, char>) + 'static) {
        let log: Log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        let handler = move |ev: FrameEvent<'_, char>| {
            sink.borrow_mut().push((ev.frame.copied(), ev.index, ev.total));
        };
        (log, handler)
    }

    fn controller(frames: &[char], looping: bool) -> (PlaybackController<char>, Log) {
        let opts = PlaybackOptions::new(MS_100, looping).unwrap();
        let mut ctl = PlaybackController::new(opts);
        ctl.set_frames(frames.to_vec());
        let (log, handler) = recorder();
        ctl.on_frame(handler);
        log.borrow_mut().clear();
        (ctl, log)
    }

    #[test]
    fn new_controller_is_stopped_at_zero() {
        let ctl = PlaybackController::<char>::default();
        assert_eq!(ctl.current_index(), 0);
        assert!(!ctl.is_playing());
        assert_eq!(ctl.state(), PlaybackState::Stopped);
        assert!(ctl.is_empty());
        assert!(ctl.current_frame().is_none());
    }

    #[test]
    fn on_frame_before_frames_notifies_empty_state() {
        let mut ctl = PlaybackController::<char>::default();
        let (log, handler) = recorder();
        ctl.on_frame(handler);
        assert_eq!(*log.borrow(), vec![(None, 0, 0)]);
    }

    #[test]
    fn set_frames_empty_then_on_frame_reports_no_frame() {
        let mut ctl = PlaybackController::<char>::default();
        ctl.set_frames(Vec::new());
        let (log, handler) = recorder();
        ctl.on_frame(handler);
        assert_eq!(*log.borrow(), vec![(None, 0, 0)]);
    }

    #[test]
    fn set_frames_notifies_and_resets() {
        let (mut ctl, log) = controller(&['A', 'B', 'C'], false);
        ctl.set_index(2);
        ctl.play();
        ctl.set_frames(vec!['X', 'Y']);
        assert_eq!(ctl.current_index(), 0);
        assert!(!ctl.is_playing());
        assert_eq!(log.borrow().last(), Some(&(Some('X'), 0, 2)));
    }

    #[test]
    fn set_frames_with_empty_notifies_none() {
        let (mut ctl, log) = controller(&['A', 'B'], false);
        ctl.set_frames(Vec::new());
        assert_eq!(*log.borrow(), vec![(None, 0, 0)]);
    }

    #[test]
    fn scenario_no_loop_stops_at_end() {
        let (mut ctl, log) = controller(&['A', 'B', 'C'], false);
        ctl.play();
        assert!(ctl.is_playing());

        for _ in 0..3 {
            ctl.tick();
        }
        assert_eq!(*log.borrow(), vec![(Some('B'), 1, 3), (Some('C'), 2, 3)]);
        assert!(!ctl.is_playing());

        // A fourth tick after stopping changes nothing.
        assert!(!ctl.tick());
        assert_eq!(log.borrow().len(), 2);
        assert_eq!(ctl.current_index(), 2);
    }

    #[test]
    fn scenario_loop_wraps_to_start() {
        let (mut ctl, log) = controller(&['A', 'B', 'C'], true);
        ctl.set_index(2);
        log.borrow_mut().clear();
        ctl.play();
        ctl.tick();
        ctl.tick();
        assert_eq!(*log.borrow(), vec![(Some('A'), 0, 3), (Some('B'), 1, 3)]);
        assert!(ctl.is_playing());
    }

    #[test]
    fn loop_cycles_indefinitely() {
        let (mut ctl, _log) = controller(&['A', 'B', 'C', 'D'], true);
        ctl.play();
        for n in 1..=50usize {
            assert!(ctl.tick());
            assert_eq!(ctl.current_index(), n % 4);
        }
        assert!(ctl.is_playing());
    }

    #[test]
    fn play_with_one_or_zero_frames_stays_stopped() {
        let mut ctl = PlaybackController::<char>::default();
        ctl.play();
        assert!(!ctl.is_playing());

        ctl.set_frames(vec!['A']);
        ctl.play();
        assert!(!ctl.is_playing());
        assert!(ctl.timer().is_none());
    }

    #[test]
    fn play_and_pause_are_idempotent() {
        let (mut ctl, _log) = controller(&['A', 'B'], false);
        ctl.play();
        let id = ctl.timer().map(PlaybackTimer::id);
        ctl.play();
        assert_eq!(ctl.timer().map(PlaybackTimer::id), id);

        ctl.pause();
        ctl.pause();
        assert!(!ctl.is_playing());
    }

    #[test]
    fn toggle_switches_state() {
        let (mut ctl, _log) = controller(&['A', 'B'], false);
        ctl.toggle();
        assert!(ctl.is_playing());
        ctl.toggle();
        assert!(!ctl.is_playing());
    }

    #[test]
    fn toggle_on_single_frame_stays_stopped() {
        let (mut ctl, _log) = controller(&['A'], false);
        ctl.toggle();
        assert!(!ctl.is_playing());
    }

    #[test]
    fn set_index_clamps() {
        let (mut ctl, log) = controller(&['A', 'B', 'C', 'D', 'E'], false);
        ctl.set_index(-5);
        assert_eq!(ctl.current_index(), 0);
        ctl.set_index(99);
        assert_eq!(ctl.current_index(), 4);
        ctl.set_index(i64::MAX);
        assert_eq!(ctl.current_index(), 4);
        ctl.set_index(i64::MIN);
        assert_eq!(ctl.current_index(), 0);
        assert_eq!(log.borrow().len(), 4);
    }

    #[test]
    fn set_index_on_empty_lands_on_zero_and_notifies() {
        let mut ctl = PlaybackController::<char>::default();
        let (log, handler) = recorder();
        ctl.on_frame(handler);
        ctl.set_index(7);
        assert_eq!(ctl.current_index(), 0);
        assert_eq!(*log.borrow(), vec![(None, 0, 0), (None, 0, 0)]);
    }

    #[test]
    fn step_forward_and_backward_clamp() {
        let (mut ctl, log) = controller(&['A', 'B'], false);
        ctl.step_backward();
        assert_eq!(ctl.current_index(), 0);
        ctl.step_forward();
        ctl.step_forward();
        assert_eq!(ctl.current_index(), 1);
        assert_eq!(log.borrow().len(), 3);
    }

    #[test]
    fn seek_while_running_keeps_timer() {
        let (mut ctl, _log) = controller(&['A', 'B', 'C'], false);
        ctl.play();
        let id = ctl.timer().map(PlaybackTimer::id);
        ctl.set_index(0);
        assert_eq!(ctl.timer().map(PlaybackTimer::id), id);
    }

    #[test]
    fn set_options_restarts_running_timer_without_notification() {
        let (mut ctl, log) = controller(&['A', 'B', 'C'], false);
        ctl.play();
        ctl.advance(Duration::from_millis(60));
        let old = ctl.timer().cloned().unwrap();

        ctl.set_options(PlaybackOptions::from_millis(30, false).unwrap());
        let new = ctl.timer().cloned().unwrap();
        assert_ne!(old.id(), new.id());
        assert_eq!(new.interval(), Duration::from_millis(30));
        assert_eq!(new.elapsed(), Duration::ZERO);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn set_options_while_stopped_does_not_start() {
        let (mut ctl, _log) = controller(&['A', 'B', 'C'], false);
        ctl.set_options(PlaybackOptions::from_millis(30, true).unwrap());
        assert!(!ctl.is_playing());
        assert!(ctl.options().looping());
    }

    #[test]
    fn set_frame_delay_rejects_zero_and_keeps_options() {
        let (mut ctl, _log) = controller(&['A', 'B'], true);
        let before = ctl.options();
        assert_eq!(
            ctl.set_frame_delay(Duration::ZERO),
            Err(PlaybackError::InvalidFrameDelay(Duration::ZERO))
        );
        assert_eq!(ctl.options(), before);
    }

    #[test]
    fn set_looping_takes_effect_at_end() {
        let (mut ctl, log) = controller(&['A', 'B', 'C'], false);
        ctl.play();
        ctl.tick();
        ctl.tick();
        ctl.set_looping(true);
        ctl.tick();
        assert_eq!(log.borrow().last(), Some(&(Some('A'), 0, 3)));
        assert!(ctl.is_playing());
    }

    #[test]
    fn replacing_subscriber_silences_previous() {
        let (mut ctl, first) = controller(&['A', 'B', 'C'], true);
        let (second, handler) = recorder();
        ctl.on_frame(handler);
        ctl.play();
        ctl.tick();
        assert!(first.borrow().is_empty());
        assert_eq!(
            *second.borrow(),
            vec![(Some('A'), 0, 3), (Some('B'), 1, 3)]
        );
    }

    #[test]
    fn ticks_without_subscriber_still_advance() {
        let mut ctl = PlaybackController::new(PlaybackOptions::new(MS_100, false).unwrap());
        ctl.set_frames(vec![1, 2, 3]);
        ctl.play();
        assert!(ctl.tick());
        assert_eq!(ctl.current_index(), 1);
        ctl.clear_subscriber();
        assert!(!ctl.has_subscriber());
    }

    #[test]
    fn stale_timer_id_is_ignored() {
        let (mut ctl, log) = controller(&['A', 'B', 'C'], true);
        ctl.play();
        let stale = ctl.timer().unwrap().id();
        ctl.pause();
        ctl.play();
        assert!(!ctl.tick_timer(stale));
        assert!(log.borrow().is_empty());

        let fresh = ctl.timer().unwrap().id();
        assert!(ctl.tick_timer(fresh));
        assert_eq!(ctl.current_index(), 1);
    }

    #[test]
    fn tick_after_pause_is_noop() {
        let (mut ctl, log) = controller(&['A', 'B', 'C'], true);
        ctl.play();
        ctl.pause();
        assert!(!ctl.tick());
        assert_eq!(ctl.advance(Duration::from_secs(5)), 0);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn advance_fires_one_tick_per_interval() {
        let (mut ctl, log) = controller(&['A', 'B', 'C', 'D'], false);
        ctl.play();
        assert_eq!(ctl.advance(Duration::from_millis(99)), 0);
        assert_eq!(ctl.advance(Duration::from_millis(1)), 1);
        assert_eq!(ctl.advance(Duration::from_millis(250)), 2);
        assert_eq!(
            ctl.timer().map(PlaybackTimer::elapsed),
            Some(Duration::from_millis(50))
        );
        assert_eq!(log.borrow().len(), 3);
    }

    #[test]
    fn advance_stops_at_end_without_loop() {
        let (mut ctl, log) = controller(&['A', 'B', 'C'], false);
        ctl.play();
        assert_eq!(ctl.advance(Duration::from_secs(10)), 2);
        assert!(!ctl.is_playing());
        assert_eq!(log.borrow().len(), 2);
    }

    #[test]
    fn advance_caps_backlog() {
        let (mut ctl, _log) = controller(&['A', 'B'], true);
        ctl.set_frame_delay(Duration::from_millis(1)).unwrap();
        ctl.play();
        let fired = ctl.advance(Duration::from_secs(3600));
        assert_eq!(fired, MAX_TICKS_PER_ADVANCE);
        let timer = ctl.timer().unwrap();
        assert!(timer.elapsed() < timer.interval());
    }

    #[test]
    fn shutdown_releases_timer_and_subscriber() {
        let (mut ctl, log) = controller(&['A', 'B', 'C'], true);
        ctl.play();
        ctl.shutdown();
        assert!(!ctl.is_playing());
        assert!(!ctl.has_subscriber());
        ctl.set_index(2);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn event_mirrors_current_state() {
        let (mut ctl, _log) = controller(&['A', 'B', 'C'], false);
        ctl.set_index(2);
        let ev = ctl.event();
        assert_eq!(ev.frame, Some(&'C'));
        assert_eq!((ev.index, ev.total), (2, 3));
        assert!(ev.is_last());
    }

    #[test]
    fn debug_omits_handler() {
        let (ctl, _log) = controller(&['A'], false);
        let text = format!("{ctl:?}");
        assert!(text.contains("frame_count: 1"));
        assert!(text.contains("has_subscriber: true"));
    }
}
