//! Spin timelines.
//!
//! Angles are in degrees. The wheel turns clockwise (angles grow), the ball
//! travels counter-clockwise (angles shrink). A pocket at sequence index `i`
//! sits `i * arc` degrees clockwise from the wheel's zero pocket, so it is
//! under the marker (screen angle 0) when `wheel_angle ≡ -i * arc (mod 360)`.
//! The ball always comes to rest on the marker.

use crate::config::AnimationConfig;
use crate::engine::pocket::{wheel_index_of, Pocket, WheelKind};
use crate::errors::SpinError;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Wrap an angle into `[0, 360)`.
pub fn normalize_angle(degrees: f64) -> f64 {
    let angle = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if angle >= 360.0 {
        0.0
    } else {
        angle
    }
}

/// Cubic ease-out: fast start, velocity decays smoothly to zero at `t = 1`.
pub fn ease_out_cubic(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t).powi(3)
}

/// Wheel angle (in `[0, 360)`) that puts `pocket` under the marker.
pub fn aligned_wheel_angle(wheel: WheelKind, pocket: Pocket) -> Option<f64> {
    let index = wheel_index_of(wheel, pocket)?;
    Some(normalize_angle(-(index as f64) * wheel.pocket_arc()))
}

/// Pocket sitting under the marker for a given wheel angle.
pub fn pocket_at_marker(wheel: WheelKind, wheel_angle: f64) -> Pocket {
    let count = wheel.pocket_count();
    let offset = normalize_angle(-wheel_angle) / wheel.pocket_arc();
    let index = (offset.round() as usize) % count;
    wheel.sequence()[index]
}

/// Rendered position of wheel and ball at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WheelPose {
    pub wheel_angle: f64,
    pub ball_angle: f64,
}

/// Damped settle of the ball after the main deceleration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounce {
    pub duration_ms: u64,
    pub amplitude_deg: f64,
    pub oscillations: u32,
}

impl Bounce {
    /// Ball displacement at progress `u` in `[0, 1]`; zero at both ends.
    pub fn offset(&self, u: f64) -> f64 {
        let u = u.clamp(0.0, 1.0);
        let envelope = (1.0 - u).powi(2);
        self.amplitude_deg * envelope * (2.0 * PI * self.oscillations as f64 * u).sin()
    }
}

/// A complete, pre-computed timeline ending on a committed outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpinPlan {
    pub wheel: WheelKind,
    pub outcome: Pocket,
    pub start: WheelPose,
    pub end: WheelPose,
    pub wheel_turns: u32,
    pub ball_turns: u32,
    pub duration_ms: u64,
    pub bounce: Option<Bounce>,
}

impl SpinPlan {
    /// Builds the timeline from `from` to a rest pose showing `outcome`.
    pub fn new<R: Rng>(
        rng: &mut R,
        wheel: WheelKind,
        outcome: Pocket,
        from: WheelPose,
        config: &AnimationConfig,
    ) -> Result<Self, SpinError> {
        let target = aligned_wheel_angle(wheel, outcome).ok_or(SpinError::PocketNotOnWheel(outcome))?;

        let wheel_turns = rng.gen_range(config.min_wheel_turns..=config.max_wheel_turns);
        let ball_turns = rng.gen_range(config.min_ball_turns..=config.max_ball_turns);
        let duration_ms = rng.gen_range(config.min_duration_ms..=config.max_duration_ms);

        // Full turns plus the shortest forward rotation onto the target
        let extra = normalize_angle(target - normalize_angle(from.wheel_angle));
        let wheel_end = from.wheel_angle + wheel_turns as f64 * 360.0 + extra;

        // Ball runs backwards to the marker: the next multiple of 360 below its
        // start, then whole extra laps
        let ball_end = (from.ball_angle / 360.0).floor() * 360.0 - ball_turns as f64 * 360.0;

        let bounce = (config.bounce && config.bounce_duration_ms > 0).then(|| Bounce {
            duration_ms: config.bounce_duration_ms,
            amplitude_deg: config.bounce_amplitude_deg * rng.gen_range(0.5..=1.0),
            oscillations: config.bounce_oscillations.max(1),
        });

        Ok(Self {
            wheel,
            outcome,
            start: from,
            end: WheelPose {
                wheel_angle: wheel_end,
                ball_angle: ball_end,
            },
            wheel_turns,
            ball_turns,
            duration_ms,
            bounce,
        })
    }

    pub fn total_duration_ms(&self) -> u64 {
        self.duration_ms + self.bounce.map_or(0, |b| b.duration_ms)
    }

    pub fn is_complete(&self, elapsed_ms: u64) -> bool {
        elapsed_ms >= self.total_duration_ms()
    }

    /// Pose at `elapsed_ms` since the first frame. Exactly `end` once complete.
    pub fn pose_at(&self, elapsed_ms: u64) -> WheelPose {
        if self.is_complete(elapsed_ms) {
            return self.end;
        }

        if elapsed_ms < self.duration_ms {
            let progress = ease_out_cubic(elapsed_ms as f64 / self.duration_ms as f64);
            return WheelPose {
                wheel_angle: lerp(self.start.wheel_angle, self.end.wheel_angle, progress),
                ball_angle: lerp(self.start.ball_angle, self.end.ball_angle, progress),
            };
        }

        match self.bounce {
            Some(bounce) => {
                let u = (elapsed_ms - self.duration_ms) as f64 / bounce.duration_ms as f64;
                WheelPose {
                    wheel_angle: self.end.wheel_angle,
                    ball_angle: self.end.ball_angle + bounce.offset(u),
                }
            }
            None => self.end,
        }
    }

    /// Pocket the final pose shows under the marker.
    pub fn landed_pocket(&self) -> Pocket {
        pocket_at_marker(self.wheel, self.end.wheel_angle)
    }
}

fn lerp(from: f64, to: f64, t: f64) -> f64 {
    from + (to - from) * t
}
