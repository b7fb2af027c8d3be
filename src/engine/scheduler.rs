//! Spin scheduler: commits the outcome, then animates onto it.
//!
//! The draw is synchronous and finishes before any frame exists; the
//! animation only ever receives an outcome that is already fixed. Frames are
//! stepped by a tokio task on a fixed interval and published on a `watch`
//! channel, so a renderer always sees the latest pose and never a backlog.

use crate::config::AnimationConfig;
use crate::engine::animation::{SpinPlan, WheelPose};
use crate::engine::pocket::{Pocket, WheelKind};
use crate::errors::SpinError;
use rand::{CryptoRng, Rng, RngCore};
use rand_core::OsRng;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, warn};

/// Scheduler lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", content = "outcome", rename_all = "lowercase")]
pub enum SpinState {
    /// No outcome pending
    #[default]
    Idle,
    /// Outcome drawn and frozen, animation not started
    Committing(Pocket),
    Animating(Pocket),
    /// Animation finished on the committed outcome
    Settled(Pocket),
}

/// Resolves with the committed outcome once the animation has finished.
///
/// Resolves to `SpinError::Preempted` if a newer spin replaced this one.
#[derive(Debug)]
pub struct SpinHandle {
    outcome: Pocket,
    receiver: oneshot::Receiver<Pocket>,
}

impl SpinHandle {
    /// Outcome this handle will resolve with. Known before the first frame.
    pub fn outcome(&self) -> Pocket {
        self.outcome
    }
}

impl Future for SpinHandle {
    type Output = Result<Pocket, SpinError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.receiver)
            .poll(cx)
            .map(|result| result.map_err(|_| SpinError::Preempted))
    }
}

/// Draws outcomes from a cryptographically strong source and animates them.
pub struct SpinScheduler<R = OsRng> {
    wheel: WheelKind,
    config: AnimationConfig,
    rng: R,
    state: Arc<watch::Sender<SpinState>>,
    poses: Arc<watch::Sender<WheelPose>>,
    in_flight: Option<JoinHandle<()>>,
}

impl SpinScheduler<OsRng> {
    /// Scheduler backed by the operating system's CSPRNG
    pub fn new(wheel: WheelKind, config: AnimationConfig) -> Self {
        Self::with_rng(wheel, config, OsRng)
    }
}

impl<R: RngCore + CryptoRng> SpinScheduler<R> {
    /// `config` must already have passed `config::validate`: spins draw their
    /// turn counts and duration from its min/max ranges.
    pub fn with_rng(wheel: WheelKind, config: AnimationConfig, rng: R) -> Self {
        let (state, _) = watch::channel(SpinState::Idle);
        let (poses, _) = watch::channel(WheelPose::default());
        Self {
            wheel,
            config,
            rng,
            state: Arc::new(state),
            poses: Arc::new(poses),
            in_flight: None,
        }
    }

    pub fn wheel(&self) -> WheelKind {
        self.wheel
    }

    pub fn state(&self) -> SpinState {
        *self.state.borrow()
    }

    /// Latest published pose
    pub fn pose(&self) -> WheelPose {
        *self.poses.borrow()
    }

    /// Frame stream for a renderer
    pub fn subscribe_poses(&self) -> watch::Receiver<WheelPose> {
        self.poses.subscribe()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<SpinState> {
        self.state.subscribe()
    }

    /// Follow the environment's reduced-motion preference.
    pub fn set_reduced_motion(&mut self, reduced: bool) {
        self.config.reduced_motion = reduced;
    }

    pub fn is_animating(&self) -> bool {
        matches!(self.state(), SpinState::Animating(_))
    }

    /// Aborts the in-flight animation task, if any.
    fn cancel_in_flight(&mut self) {
        if let Some(task) = self.in_flight.take() {
            if !task.is_finished() {
                warn!("Preempting in-flight spin animation");
                task.abort();
            }
        }
    }

    /// Draw the round's outcome, uniformly over the wheel's pockets.
    ///
    /// Once drawn, the outcome is frozen until it has been animated: calling
    /// this again while committing returns the same pocket.
    pub fn draw_outcome(&mut self) -> Pocket {
        if let SpinState::Committing(committed) = self.state() {
            debug!("Outcome {} already committed", committed);
            return committed;
        }

        self.cancel_in_flight();
        let index = self.rng.gen_range(0..self.wheel.pocket_count());
        let outcome = self.wheel.sequence()[index];
        self.state.send_replace(SpinState::Committing(outcome));
        debug!("Committed outcome {} on {} wheel", outcome, self.wheel);
        outcome
    }

    /// Animate the wheel and ball onto `outcome`.
    ///
    /// Must run inside a tokio runtime unless reduced motion is enabled.
    pub fn animate_to_outcome(&mut self, outcome: Pocket) -> Result<SpinHandle, SpinError> {
        if !self.wheel.contains(outcome) {
            return Err(SpinError::PocketNotOnWheel(outcome));
        }
        if let SpinState::Committing(committed) = self.state() {
            if committed != outcome {
                return Err(SpinError::OutcomeMismatch {
                    committed,
                    requested: outcome,
                });
            }
        }

        self.cancel_in_flight();
        let from = self.pose();
        let plan = SpinPlan::new(&mut self.rng, self.wheel, outcome, from, &self.config)?;
        let (sender, receiver) = oneshot::channel();
        let handle = SpinHandle { outcome, receiver };

        if self.config.reduced_motion {
            self.poses.send_replace(plan.end);
            self.state.send_replace(SpinState::Settled(outcome));
            let _ = sender.send(outcome);
            debug!("Reduced motion: settled on {} without animating", outcome);
            return Ok(handle);
        }

        self.state.send_replace(SpinState::Animating(outcome));
        debug!(
            "Animating to {}: {} wheel turns, {} ball turns, {}ms",
            outcome,
            plan.wheel_turns,
            plan.ball_turns,
            plan.total_duration_ms()
        );

        let state = Arc::clone(&self.state);
        let poses = Arc::clone(&self.poses);
        let frame = self.config.frame_interval().max(Duration::from_millis(1));
        self.in_flight = Some(tokio::spawn(async move {
            let started = Instant::now();
            let mut ticker = tokio::time::interval(frame);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                let elapsed = started.elapsed().as_millis() as u64;
                poses.send_replace(plan.pose_at(elapsed));
                if plan.is_complete(elapsed) {
                    break;
                }
            }
            state.send_replace(SpinState::Settled(outcome));
            let _ = sender.send(outcome);
        }));

        Ok(handle)
    }

    /// Draw and animate in one step.
    pub fn spin(&mut self) -> Result<SpinHandle, SpinError> {
        let outcome = self.draw_outcome();
        self.animate_to_outcome(outcome)
    }

    /// Return to idle for the next round, stopping any animation.
    pub fn reset(&mut self) {
        self.cancel_in_flight();
        self.state.send_replace(SpinState::Idle);
    }
}

impl<R> Drop for SpinScheduler<R> {
    fn drop(&mut self) {
        if let Some(task) = self.in_flight.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::animation::pocket_at_marker;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashMap;

    fn seeded(wheel: WheelKind, config: AnimationConfig) -> SpinScheduler<StdRng> {
        SpinScheduler::with_rng(wheel, config, StdRng::seed_from_u64(42))
    }

    fn instant() -> AnimationConfig {
        AnimationConfig {
            reduced_motion: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_draw_uniformity() {
        // Chi-square goodness of fit over 100k draws; 36 degrees of freedom.
        // The 0.999 quantile is ~67.99, so a correct draw fails about once in a thousand runs.
        let mut scheduler = SpinScheduler::new(WheelKind::European, instant());
        let draws = 100_000;
        let mut counts: HashMap<Pocket, u64> = HashMap::new();
        for _ in 0..draws {
            let outcome = scheduler.draw_outcome();
            assert!(WheelKind::European.contains(outcome));
            *counts.entry(outcome).or_default() += 1;
            scheduler.reset();
        }

        assert_eq!(counts.len(), 37);
        let expected = draws as f64 / 37.0;
        let chi_square: f64 = counts
            .values()
            .map(|&observed| (observed as f64 - expected).powi(2) / expected)
            .sum();
        assert!(chi_square < 68.0, "chi-square {} too large", chi_square);
    }

    #[test]
    fn test_draw_is_frozen_while_committing() {
        let mut scheduler = seeded(WheelKind::American, instant());
        let first = scheduler.draw_outcome();
        for _ in 0..20 {
            assert_eq!(scheduler.draw_outcome(), first);
        }
        assert_eq!(scheduler.state(), SpinState::Committing(first));
    }

    #[test]
    fn test_mismatched_outcome_rejected() {
        let mut scheduler = seeded(WheelKind::European, instant());
        let committed = scheduler.draw_outcome();
        let other = if committed == Pocket::Number(1) {
            Pocket::Number(2)
        } else {
            Pocket::Number(1)
        };
        assert_eq!(
            scheduler.animate_to_outcome(other).unwrap_err(),
            SpinError::OutcomeMismatch {
                committed,
                requested: other
            }
        );
        assert_eq!(
            seeded(WheelKind::European, instant())
                .animate_to_outcome(Pocket::DoubleZero)
                .unwrap_err(),
            SpinError::PocketNotOnWheel(Pocket::DoubleZero)
        );
    }

    #[tokio::test]
    async fn test_reduced_motion_settles_immediately() {
        let mut scheduler = seeded(WheelKind::European, instant());
        let handle = scheduler.spin().unwrap();
        let committed = handle.outcome();

        assert_eq!(scheduler.state(), SpinState::Settled(committed));
        assert_eq!(pocket_at_marker(WheelKind::European, scheduler.pose().wheel_angle), committed);
        assert_eq!(handle.await, Ok(committed));

        scheduler.reset();
        assert_eq!(scheduler.state(), SpinState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_animation_lands_on_committed_outcome() {
        let mut scheduler = seeded(WheelKind::American, AnimationConfig::default());
        let mut frames = scheduler.subscribe_poses();
        let outcome = scheduler.draw_outcome();
        let handle = scheduler.animate_to_outcome(outcome).unwrap();
        assert_eq!(scheduler.state(), SpinState::Animating(outcome));

        frames.changed().await.unwrap();
        assert!(scheduler.is_animating());

        assert_eq!(handle.await, Ok(outcome));
        assert_eq!(scheduler.state(), SpinState::Settled(outcome));
        assert_eq!(pocket_at_marker(WheelKind::American, scheduler.pose().wheel_angle), outcome);
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_spin_preempts_previous() {
        let mut scheduler = seeded(WheelKind::European, AnimationConfig::default());
        let first = scheduler.spin().unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;

        let second = scheduler.spin().unwrap();
        let second_outcome = second.outcome();

        assert_eq!(first.await, Err(SpinError::Preempted));
        assert_eq!(second.await, Ok(second_outcome));
        assert_eq!(scheduler.state(), SpinState::Settled(second_outcome));
    }
}
