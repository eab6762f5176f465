//! Cursor/renderer synchronization.
//!
//! The cursor is continuous (seconds) while the renderer's clock is
//! discrete (frames). [`PlaybackSync`] mediates between them with an
//! explicit state machine:
//!
//! - `Idle`: nothing in flight, renderer frame events are ignored.
//! - `Seeking`: a cursor-driven jump was issued; renderer frame events are
//!   ignored until the cooldown elapses, then the state returns to `Idle`.
//! - `Playing`: renderer frame events move the cursor, coalesced so small
//!   advances are not published one by one.
//!
//! Play/pause events that originate in the renderer are mirrored into the
//! state without sending an instruction back. A play event that arrives
//! during a seek cooldown is held until the cooldown ends.

use std::time::{Duration, Instant};

use cutline_core::FrameRate;

use crate::policy::PlaybackPolicy;

/// The external frame-driven player.
pub trait PlaybackRenderer {
    fn play(&mut self);
    fn pause(&mut self);
    fn seek_to_frame(&mut self, frame: i64);
    fn current_frame(&self) -> i64;
}

/// Synchronization state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Idle,
    Seeking { until: Instant },
    Playing,
}

impl PlaybackState {
    pub fn is_playing(&self) -> bool {
        matches!(self, Self::Playing)
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Seeking { .. } => "seeking",
            Self::Playing => "playing",
        }
    }
}

/// Drives a [`PlaybackRenderer`] from cursor changes and turns its frame
/// notifications back into cursor times.
#[derive(Debug)]
pub struct PlaybackSync<R: PlaybackRenderer> {
    renderer: R,
    frame_rate: FrameRate,
    state: PlaybackState,
    seek_cooldown: Duration,
    coalesce_secs: f64,
    last_published: f64,
    renderer_play_pending: bool,
}

impl<R: PlaybackRenderer> PlaybackSync<R> {
    pub fn new(renderer: R, frame_rate: FrameRate, policy: &PlaybackPolicy) -> Self {
        Self {
            renderer,
            frame_rate,
            state: PlaybackState::Idle,
            seek_cooldown: policy.seek_cooldown(),
            coalesce_secs: policy.cursor_coalesce_secs,
            last_published: 0.0,
            renderer_play_pending: false,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn set_frame_rate(&mut self, frame_rate: FrameRate) {
        self.frame_rate = frame_rate;
    }

    fn transition(&mut self, next: PlaybackState) {
        if self.state != next {
            tracing::debug!(from = self.state.name(), to = next.name(), "Playback state");
        }
        self.state = next;
    }

    /// Move the renderer to a cursor time. Playback is paused first.
    ///
    /// Returns true when a jump was issued; targets within one frame of the
    /// renderer's position are skipped.
    pub fn request_seek(&mut self, cursor_time: f64, now: Instant) -> bool {
        if self.state.is_playing() || self.renderer_play_pending {
            self.renderer.pause();
        }
        self.renderer_play_pending = false;

        let target = self.frame_rate.to_frame(cursor_time.max(0.0));
        let current = self.renderer.current_frame();
        let jump = (current - target).abs() > 1;
        if jump {
            self.renderer.seek_to_frame(target);
        }
        self.last_published = cursor_time;
        tracing::debug!(target, current, jump, "Seek requested");

        self.transition(PlaybackState::Seeking {
            until: now + self.seek_cooldown,
        });
        jump
    }

    /// Start playback from the renderer's current position.
    pub fn play(&mut self) {
        if self.state.is_playing() {
            return;
        }
        self.renderer_play_pending = false;
        self.last_published = self.renderer_time();
        self.renderer.play();
        self.transition(PlaybackState::Playing);
    }

    /// Stop playback. Returns the cursor time at the stop position when it
    /// differs from the last published one.
    pub fn pause(&mut self) -> Option<f64> {
        if !self.state.is_playing() {
            return None;
        }
        self.renderer.pause();
        self.transition(PlaybackState::Idle);
        self.flush_position()
    }

    /// End an elapsed seek cooldown. A renderer play event held during the
    /// cooldown takes effect here.
    pub fn poll(&mut self, now: Instant) {
        if let PlaybackState::Seeking { until } = self.state {
            if now >= until {
                if std::mem::take(&mut self.renderer_play_pending) {
                    self.last_published = self.renderer_time();
                    self.transition(PlaybackState::Playing);
                } else {
                    self.transition(PlaybackState::Idle);
                }
            }
        }
    }

    /// Renderer reached `frame`. Returns a new cursor time to publish.
    pub fn on_renderer_frame(&mut self, frame: i64, now: Instant) -> Option<f64> {
        self.poll(now);
        if !self.state.is_playing() {
            tracing::trace!(frame, state = self.state.name(), "Frame event ignored");
            return None;
        }

        let time = self.frame_rate.frame_to_seconds(frame);
        if (time - self.last_published).abs() > self.coalesce_secs {
            self.last_published = time;
            Some(time)
        } else {
            None
        }
    }

    /// The renderer started playing on its own. During a seek cooldown the
    /// switch to `Playing` waits for [`Self::poll`].
    pub fn on_renderer_play(&mut self) {
        match self.state {
            PlaybackState::Playing => {}
            PlaybackState::Seeking { .. } => {
                tracing::debug!("Renderer play held until seek cooldown ends");
                self.renderer_play_pending = true;
            }
            PlaybackState::Idle => {
                self.last_published = self.renderer_time();
                self.transition(PlaybackState::Playing);
            }
        }
    }

    /// The renderer paused on its own. Returns the final cursor time when
    /// it differs from the last published one.
    pub fn on_renderer_pause(&mut self) -> Option<f64> {
        self.renderer_play_pending = false;
        if !self.state.is_playing() {
            return None;
        }
        self.transition(PlaybackState::Idle);
        self.flush_position()
    }

    fn renderer_time(&self) -> f64 {
        self.frame_rate
            .frame_to_seconds(self.renderer.current_frame())
    }

    fn flush_position(&mut self) -> Option<f64> {
        let time = self.renderer_time();
        if (time - self.last_published).abs() > f64::EPSILON {
            self.last_published = time;
            Some(time)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Play,
        Pause,
        Seek(i64),
    }

    #[derive(Debug, Default)]
    struct MockRenderer {
        frame: i64,
        calls: Vec<Call>,
    }

    impl PlaybackRenderer for MockRenderer {
        fn play(&mut self) {
            self.calls.push(Call::Play);
        }

        fn pause(&mut self) {
            self.calls.push(Call::Pause);
        }

        fn seek_to_frame(&mut self, frame: i64) {
            self.frame = frame;
            self.calls.push(Call::Seek(frame));
        }

        fn current_frame(&self) -> i64 {
            self.frame
        }
    }

    fn sync() -> PlaybackSync<MockRenderer> {
        PlaybackSync::new(
            MockRenderer::default(),
            FrameRate::FPS_30,
            &PlaybackPolicy::default(),
        )
    }

    #[test]
    fn test_seek_enters_seeking_then_idle() {
        let mut sync = sync();
        let t0 = Instant::now();

        assert!(sync.request_seek(2.0, t0));
        assert_eq!(sync.renderer().calls, vec![Call::Seek(60)]);
        assert!(matches!(sync.state(), PlaybackState::Seeking { .. }));

        sync.poll(t0 + Duration::from_millis(50));
        assert!(matches!(sync.state(), PlaybackState::Seeking { .. }));
        sync.poll(t0 + Duration::from_millis(150));
        assert_eq!(sync.state(), PlaybackState::Idle);
    }

    #[test]
    fn test_seek_within_one_frame_skips_jump() {
        let mut sync = sync();
        sync.renderer_mut().frame = 60;
        assert!(!sync.request_seek(61.0 / 30.0, Instant::now()));
        assert!(sync.renderer().calls.is_empty());
    }

    #[test]
    fn test_seek_while_playing_pauses_first() {
        let mut sync = sync();
        sync.play();
        sync.request_seek(5.0, Instant::now());
        assert_eq!(
            sync.renderer().calls,
            vec![Call::Play, Call::Pause, Call::Seek(150)]
        );
        assert!(!sync.state().is_playing());
    }

    #[test]
    fn test_frames_ignored_during_cooldown() {
        let mut sync = sync();
        let t0 = Instant::now();
        sync.request_seek(2.0, t0);
        sync.on_renderer_play();
        sync.request_seek(3.0, t0);
        assert_eq!(sync.on_renderer_frame(95, t0 + Duration::from_millis(10)), None);
        assert_eq!(sync.renderer().calls, vec![Call::Seek(60), Call::Pause, Call::Seek(90)]);

        // the second seek dropped the held play
        sync.poll(t0 + Duration::from_millis(200));
        assert_eq!(sync.state(), PlaybackState::Idle);
    }

    #[test]
    fn test_renderer_play_held_until_cooldown_ends() {
        let mut sync = sync();
        let t0 = Instant::now();
        sync.request_seek(2.0, t0);
        sync.on_renderer_play();
        assert!(matches!(sync.state(), PlaybackState::Seeking { .. }));

        assert_eq!(sync.on_renderer_frame(75, t0 + Duration::from_millis(10)), None);
        assert!(!sync.state().is_playing());

        let published = sync.on_renderer_frame(75, t0 + Duration::from_millis(200));
        assert!(sync.state().is_playing());
        assert!((published.unwrap() - 2.5).abs() < 1e-9);
        assert_eq!(sync.renderer().calls, vec![Call::Seek(60)]);
    }

    #[test]
    fn test_renderer_pause_drops_held_play() {
        let mut sync = sync();
        let t0 = Instant::now();
        sync.request_seek(2.0, t0);
        sync.on_renderer_play();
        assert_eq!(sync.on_renderer_pause(), None);

        sync.poll(t0 + Duration::from_millis(200));
        assert_eq!(sync.state(), PlaybackState::Idle);
    }

    #[test]
    fn test_playing_frames_are_coalesced() {
        let mut sync = sync();
        let t0 = Instant::now();
        sync.play();

        assert_eq!(sync.on_renderer_frame(1, t0), None);
        assert_eq!(sync.on_renderer_frame(3, t0), None);
        let published = sync.on_renderer_frame(4, t0).unwrap();
        assert!((published - 4.0 / 30.0).abs() < 1e-9);
        assert_eq!(sync.on_renderer_frame(6, t0), None);
        assert!(sync.on_renderer_frame(8, t0).is_some());
    }

    #[test]
    fn test_idle_frames_ignored() {
        let mut sync = sync();
        assert_eq!(sync.on_renderer_frame(90, Instant::now()), None);
    }

    #[test]
    fn test_renderer_events_mirrored_without_echo() {
        let mut sync = sync();
        sync.on_renderer_play();
        assert!(sync.state().is_playing());

        sync.renderer_mut().frame = 45;
        let final_time = sync.on_renderer_pause().unwrap();
        assert!((final_time - 1.5).abs() < 1e-9);
        assert_eq!(sync.state(), PlaybackState::Idle);
        assert!(sync.renderer().calls.is_empty());
    }

    #[test]
    fn test_pause_flushes_position() {
        let mut sync = sync();
        sync.play();
        sync.renderer_mut().frame = 2;
        assert_eq!(sync.on_renderer_frame(2, Instant::now()), None);
        let time = sync.pause().unwrap();
        assert!((time - 2.0 / 30.0).abs() < 1e-9);
        assert_eq!(sync.pause(), None);
    }
}
