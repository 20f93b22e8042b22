//! Per-frame cooperative tasks around the core
//!
//! Score ticking, the game-over countdown and panel fades run as small tasks
//! polled once per frame. Each task holds a [`CancelToken`]; cancelling it
//! makes the next poll return `Ready` without doing any work.

use std::cell::Cell;
use std::collections::BTreeMap;
use std::rc::Rc;
use std::task::Poll;

use crate::settings::Tuning;
use crate::sim::GameSignal;

/// Shared cancellation flag
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Rc<Cell<bool>>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.get()
    }
}

/// What a task sees each frame
#[derive(Debug, Clone, Copy)]
pub struct FrameCtx {
    pub dt: f32,
    pub is_game_over: bool,
}

/// A unit of work advanced one frame at a time
pub trait Task {
    type Output;

    fn poll(&mut self, ctx: &FrameCtx) -> Poll<Self::Output>;
}

/// Awards a point every `interval` seconds until the game is over
#[derive(Debug)]
pub struct ScoreTracker {
    interval: f32,
    elapsed: f32,
    points: u64,
    pub cancel: CancelToken,
}

impl ScoreTracker {
    pub fn new(interval: f32) -> Self {
        Self {
            interval,
            // First point is awarded immediately
            elapsed: interval,
            points: 0,
            cancel: CancelToken::new(),
        }
    }

    /// Points earned since the last call
    pub fn take_points(&mut self) -> u64 {
        std::mem::take(&mut self.points)
    }
}

impl Task for ScoreTracker {
    type Output = ();

    fn poll(&mut self, ctx: &FrameCtx) -> Poll<()> {
        if self.cancel.is_cancelled() || ctx.is_game_over {
            return Poll::Ready(());
        }
        self.elapsed += ctx.dt;
        while self.elapsed >= self.interval {
            self.elapsed -= self.interval;
            self.points += 1;
        }
        Poll::Pending
    }
}

/// Counts down after a game over. Ready(true) when time ran out.
#[derive(Debug)]
pub struct DeathTimer {
    duration: f32,
    remaining: f32,
    pub cancel: CancelToken,
}

impl DeathTimer {
    pub fn new(duration: f32) -> Self {
        Self {
            duration,
            remaining: duration,
            cancel: CancelToken::new(),
        }
    }

    /// Whole seconds left, as shown on the countdown
    pub fn display(&self) -> u32 {
        self.remaining.max(0.0).ceil() as u32
    }

    /// Countdown ring fill (1 = full)
    pub fn fill(&self) -> f32 {
        if self.duration <= 0.0 {
            0.0
        } else {
            (self.remaining / self.duration).clamp(0.0, 1.0)
        }
    }
}

impl Task for DeathTimer {
    type Output = bool;

    fn poll(&mut self, ctx: &FrameCtx) -> Poll<bool> {
        if self.cancel.is_cancelled() || !ctx.is_game_over {
            return Poll::Ready(false);
        }
        self.remaining -= ctx.dt;
        if self.remaining <= 0.0 {
            self.remaining = 0.0;
            Poll::Ready(true)
        } else {
            Poll::Pending
        }
    }
}

/// UI panels driven by lifecycle signals
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Panel {
    Title,
    LevelTracker,
    ScoreTracker,
    GameRestart,
    Congrats,
    DailyRewards,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PanelState {
    pub alpha: f32,
    pub active: bool,
}

/// Moves a panel's alpha toward a target
#[derive(Debug)]
pub struct Fade {
    pub panel: Panel,
    alpha: f32,
    target: f32,
    speed: f32,
    pub cancel: CancelToken,
}

impl Fade {
    pub fn new(panel: Panel, from: f32, to: f32, speed: f32) -> Self {
        Self {
            panel,
            alpha: from,
            target: to,
            speed,
            cancel: CancelToken::new(),
        }
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    fn fading_out(&self) -> bool {
        self.target < self.alpha
    }
}

impl Task for Fade {
    type Output = ();

    fn poll(&mut self, ctx: &FrameCtx) -> Poll<()> {
        if self.cancel.is_cancelled() {
            return Poll::Ready(());
        }
        let step = self.speed * ctx.dt;
        let delta = self.target - self.alpha;
        if delta.abs() <= step {
            self.alpha = self.target;
            Poll::Ready(())
        } else {
            self.alpha += step.copysign(delta);
            Poll::Pending
        }
    }
}

/// Outcome of a session poll the caller must act on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// The death timer ran out: reload the session
    RestartRequested,
}

/// Score, countdown and panel state for one play session
#[derive(Debug)]
pub struct Session {
    score: u64,
    score_task: Option<ScoreTracker>,
    death_timer: Option<DeathTimer>,
    fades: Vec<Fade>,
    panels: BTreeMap<Panel, PanelState>,
    cursor_visible: bool,
    score_interval: f32,
    death_duration: f32,
    fade_speed: f32,
}

impl Session {
    pub fn new(tuning: &Tuning) -> Self {
        let mut session = Self {
            score: 0,
            score_task: None,
            death_timer: None,
            fades: Vec::new(),
            panels: BTreeMap::new(),
            cursor_visible: true,
            score_interval: tuning.score_interval,
            death_duration: tuning.death_timer,
            fade_speed: tuning.fade_speed,
        };
        session.fade_in(Panel::Title);
        session
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn cursor_visible(&self) -> bool {
        self.cursor_visible
    }

    pub fn panel(&self, panel: Panel) -> PanelState {
        self.panels.get(&panel).copied().unwrap_or_default()
    }

    pub fn is_scoring(&self) -> bool {
        self.score_task.is_some()
    }

    pub fn death_timer(&self) -> Option<&DeathTimer> {
        self.death_timer.as_ref()
    }

    /// React to a lifecycle or UI signal
    pub fn on_signal(&mut self, signal: GameSignal) {
        match signal {
            GameSignal::Start | GameSignal::EndlessStart => {
                self.cursor_visible = false;
                self.fade_out(Panel::Title);
                self.fade_in(if signal == GameSignal::Start {
                    Panel::LevelTracker
                } else {
                    Panel::ScoreTracker
                });
                self.start_scoring();
            }
            GameSignal::GameOver => {
                self.cursor_visible = true;
                self.fade_in(Panel::GameRestart);
                self.stop_scoring();
                if self.death_timer.is_none() {
                    self.death_timer = Some(DeathTimer::new(self.death_duration));
                }
            }
            GameSignal::Continue => {
                self.cursor_visible = false;
                self.fade_out(Panel::GameRestart);
                if let Some(timer) = self.death_timer.take() {
                    timer.cancel.cancel();
                }
                self.start_scoring();
            }
            GameSignal::BonusOpen => self.fade_in(Panel::DailyRewards),
            GameSignal::Close => self.fade_out(Panel::DailyRewards),
            GameSignal::Finish | GameSignal::SoundToggle | GameSignal::Claim => {}
        }
    }

    /// The finish scenery has settled: wrap up the climb
    pub fn on_congrats(&mut self) {
        self.cursor_visible = true;
        self.fade_out(Panel::LevelTracker);
        self.fade_in(Panel::Congrats);
        self.stop_scoring();
    }

    /// Advance every task by one frame
    pub fn poll(&mut self, dt: f32, is_game_over: bool) -> Option<SessionEvent> {
        let ctx = FrameCtx { dt, is_game_over };
        let mut event = None;

        if let Some(task) = &mut self.score_task {
            let done = task.poll(&ctx).is_ready();
            self.score += task.take_points();
            if done {
                self.score_task = None;
            }
        }

        if let Some(timer) = &mut self.death_timer {
            if let Poll::Ready(expired) = timer.poll(&ctx) {
                self.death_timer = None;
                if expired {
                    log::info!("Death timer expired");
                    event = Some(SessionEvent::RestartRequested);
                }
            }
        }

        let panels = &mut self.panels;
        self.fades.retain_mut(|fade| {
            let done = fade.poll(&ctx).is_ready();
            let cancelled = fade.cancel.is_cancelled();
            let state = panels.entry(fade.panel).or_default();
            if !cancelled {
                state.alpha = fade.alpha();
            }
            if done && !cancelled && fade.alpha() <= 0.0 {
                state.active = false;
            }
            !done
        });

        event
    }

    fn start_scoring(&mut self) {
        if self.score_task.is_none() {
            self.score_task = Some(ScoreTracker::new(self.score_interval));
        }
    }

    fn stop_scoring(&mut self) {
        if let Some(task) = self.score_task.take() {
            task.cancel.cancel();
        }
    }

    fn fade_in(&mut self, panel: Panel) {
        self.start_fade(panel, 0.0, 1.0);
    }

    fn fade_out(&mut self, panel: Panel) {
        self.start_fade(panel, 1.0, 0.0);
    }

    fn start_fade(&mut self, panel: Panel, from: f32, to: f32) {
        for fade in self.fades.iter().filter(|f| f.panel == panel) {
            fade.cancel.cancel();
        }
        let fade = Fade::new(panel, from, to, self.fade_speed);
        let state = self.panels.entry(panel).or_default();
        state.alpha = from;
        if !fade.fading_out() {
            state.active = true;
        }
        self.fades.push(fade);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(dt: f32, is_game_over: bool) -> FrameCtx {
        FrameCtx { dt, is_game_over }
    }

    #[test]
    fn test_score_tracker_counts_intervals() {
        let mut tracker = ScoreTracker::new(0.25);
        assert!(tracker.poll(&ctx(0.0, false)).is_pending());
        assert_eq!(tracker.take_points(), 1);
        for _ in 0..4 {
            let _ = tracker.poll(&ctx(0.25, false));
        }
        assert_eq!(tracker.take_points(), 4);
        assert!(tracker.poll(&ctx(0.25, true)).is_ready());
        assert_eq!(tracker.take_points(), 0);
    }

    #[test]
    fn test_cancelled_task_does_no_work() {
        let mut timer = DeathTimer::new(10.0);
        let token = timer.cancel.clone();
        token.cancel();
        assert_eq!(timer.poll(&ctx(1.0, true)), Poll::Ready(false));
        assert_eq!(timer.display(), 10);
    }

    #[test]
    fn test_death_timer_expires() {
        let mut timer = DeathTimer::new(1.0);
        assert!(timer.poll(&ctx(0.5, true)).is_pending());
        assert_eq!(timer.display(), 1);
        assert!((timer.fill() - 0.5).abs() < 1e-6);
        assert_eq!(timer.poll(&ctx(0.5, true)), Poll::Ready(true));
    }

    #[test]
    fn test_fade_reaches_target() {
        let mut fade = Fade::new(Panel::Title, 0.0, 1.0, 5.0);
        let mut frames = 0;
        while fade.poll(&ctx(0.05, false)).is_pending() {
            frames += 1;
        }
        assert_eq!(fade.alpha(), 1.0);
        assert_eq!(frames, 3);
    }

    #[test]
    fn test_session_signal_flow() {
        let tuning = Tuning::default();
        let mut session = Session::new(&tuning);
        session.poll(1.0, false);
        assert_eq!(session.panel(Panel::Title).alpha, 1.0);

        session.on_signal(GameSignal::Start);
        assert!(!session.cursor_visible());
        session.poll(1.0, false);
        assert!(!session.panel(Panel::Title).active);
        assert!(session.panel(Panel::LevelTracker).active);
        assert_eq!(session.score(), 5);

        session.on_signal(GameSignal::GameOver);
        assert!(!session.is_scoring());
        session.poll(1.0, true);
        assert_eq!(session.score(), 5);
        assert_eq!(session.death_timer().map(|t| t.display()), Some(9));

        session.on_signal(GameSignal::Continue);
        assert!(session.death_timer().is_none());
        assert!(session.is_scoring());
        session.poll(1.0, false);
        assert!(!session.panel(Panel::GameRestart).active);
    }

    #[test]
    fn test_unanswered_game_over_requests_restart() {
        let tuning = Tuning::default();
        let mut session = Session::new(&tuning);
        session.on_signal(GameSignal::Start);
        session.on_signal(GameSignal::GameOver);

        let mut event = None;
        for _ in 0..11 {
            if let Some(e) = session.poll(1.0, true) {
                event = Some(e);
                break;
            }
        }
        assert_eq!(event, Some(SessionEvent::RestartRequested));
    }
}
