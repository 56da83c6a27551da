//! The ball's animation state machine.
//!
//! The ball either bounces in place (automatic mode) or follows the scripted
//! trajectory into the goal. Automatic mode is derived from [`BallMode`], so the
//! two can never be active at the same time.

use log::debug;
use nalgebra::Vector3;

pub const DEFAULT_SPEED: f32 = 1.0;

/// Constants driving both animations, in scene units per tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BallParams {
    pub bounce_step: f32,
    /// The bounce turns upwards once the height drops below this.
    pub bounce_floor: f32,
    /// The bounce turns downwards once the height rises above this.
    pub bounce_ceiling: f32,
    /// Degrees of spin added per bouncing tick.
    pub spin_step: f32,
    /// Depth travelled per scripted tick at speed 1.
    pub goal_step: f32,
    /// Depth where the steep rising segment ends.
    pub near_band: f32,
    /// Depth where the scripted trajectory ends.
    pub far_band: f32,
    pub near_slope: f32,
    pub far_slope: f32,
    pub far_offset: f32,
}

impl Default for BallParams {
    fn default() -> Self {
        Self {
            bounce_step: 100.0,
            bounce_floor: -570.0,
            bounce_ceiling: 0.0,
            spin_step: 10.0,
            goal_step: 100.0,
            near_band: -1000.0,
            far_band: -3000.0,
            near_slope: -3.5,
            far_slope: 1.75,
            far_offset: 5250.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BallMode {
    /// Automatic mode, not yet ticked since the last reset.
    Idle,
    Bouncing,
    ScriptedGoal,
}

#[derive(Debug, Clone)]
pub struct BallAnimation {
    params: BallParams,
    mode: BallMode,
    position: Vector3<f32>,
    spin_deg: f32,
    descending: bool,
    speed: f32,
}

impl Default for BallAnimation {
    fn default() -> Self {
        Self::new(BallParams::default())
    }
}

impl BallAnimation {
    pub fn new(params: BallParams) -> Self {
        Self {
            params,
            mode: BallMode::Idle,
            position: Vector3::zeros(),
            spin_deg: 0.0,
            descending: true,
            speed: DEFAULT_SPEED,
        }
    }

    pub fn params(&self) -> &BallParams {
        &self.params
    }

    pub fn mode(&self) -> BallMode {
        self.mode
    }

    pub fn position(&self) -> Vector3<f32> {
        self.position
    }

    pub fn spin_degrees(&self) -> f32 {
        self.spin_deg
    }

    pub fn is_descending(&self) -> bool {
        self.descending
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn is_automatic(&self) -> bool {
        self.mode != BallMode::ScriptedGoal
    }

    pub fn is_scripted(&self) -> bool {
        self.mode == BallMode::ScriptedGoal
    }

    /// Speed multiplier for the scripted trajectory. Anything that would not move
    /// the ball forwards falls back to [`DEFAULT_SPEED`].
    pub fn set_speed(&mut self, speed: f32) {
        self.speed = if speed.is_finite() && speed > 0.0 {
            speed
        } else {
            DEFAULT_SPEED
        };
    }

    /// Puts the ball back on the spot and starts the shot.
    pub fn start_goal(&mut self) {
        self.position = Vector3::zeros();
        self.mode = BallMode::ScriptedGoal;
        debug!("Ball: scripted goal animation started (speed {})", self.speed);
    }

    /// Aborts the shot. Returns false if no shot was running.
    pub fn cancel_goal(&mut self) -> bool {
        if !self.is_scripted() {
            return false;
        }
        self.return_to_automatic();
        debug!("Ball: scripted goal animation cancelled");
        true
    }

    /// Advances the animation by one frame.
    pub fn tick(&mut self) {
        match self.mode {
            BallMode::Idle => {
                self.mode = BallMode::Bouncing;
                self.bounce();
            }
            BallMode::Bouncing => self.bounce(),
            BallMode::ScriptedGoal => self.advance_goal(),
        }
    }

    fn bounce(&mut self) {
        let p = &self.params;
        if self.descending {
            self.position.y -= p.bounce_step;
            if self.position.y < p.bounce_floor {
                self.descending = false;
            }
        } else {
            self.position.y += p.bounce_step;
            if self.position.y > p.bounce_ceiling {
                self.descending = true;
            }
        }
        self.spin_deg = (self.spin_deg + p.spin_step).rem_euclid(360.0);
    }

    fn advance_goal(&mut self) {
        let p = self.params;
        let z = self.position.z;
        let step = p.goal_step * self.speed;

        // Depth 0 is outside the near band, so the first step uses the far segment.
        if z < 0.0 && z > p.near_band {
            self.position.z = z - step;
            self.position.y = p.near_slope * self.position.z;
        } else if z > p.far_band {
            self.position.z = z - step;
            self.position.y = p.far_slope * self.position.z + p.far_offset;
        } else {
            self.return_to_automatic();
            debug!("Ball: scripted goal animation finished");
        }
    }

    fn return_to_automatic(&mut self) {
        self.mode = BallMode::Idle;
        self.position = Vector3::zeros();
        self.descending = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_tick_starts_bouncing_downwards() {
        let mut ball = BallAnimation::default();
        assert_eq!(ball.mode(), BallMode::Idle);
        ball.tick();
        assert_eq!(ball.mode(), BallMode::Bouncing);
        assert_eq!(ball.position().y, -100.0);
        assert_eq!(ball.spin_degrees(), 10.0);
    }

    #[test]
    fn bounce_alternates_between_floor_and_zero() {
        let mut ball = BallAnimation::default();
        let mut prev = ball.position().y;
        let mut direction_changes = 0;
        let mut was_descending = ball.is_descending();

        for _ in 0..200 {
            let descending_before = ball.is_descending();
            ball.tick();
            let y = ball.position().y;
            if descending_before {
                assert!(y < prev, "height must fall while descending");
            } else {
                assert!(y > prev, "height must rise while ascending");
            }
            if ball.is_descending() != was_descending {
                direction_changes += 1;
                if ball.is_descending() {
                    assert!(y > 0.0);
                } else {
                    assert!(y < -570.0);
                }
                was_descending = ball.is_descending();
            }
            assert_eq!(ball.mode(), BallMode::Bouncing);
            prev = y;
        }
        assert!(direction_changes >= 10);
    }

    #[test]
    fn spin_advances_every_bouncing_tick() {
        let mut ball = BallAnimation::default();
        for _ in 0..36 {
            ball.tick();
        }
        assert_eq!(ball.spin_degrees(), 0.0);
        ball.tick();
        assert_eq!(ball.spin_degrees(), 10.0);
    }

    #[test]
    fn start_goal_resets_position_and_leaves_automatic_mode() {
        let mut ball = BallAnimation::default();
        for _ in 0..3 {
            ball.tick();
        }
        assert_ne!(ball.position(), Vector3::zeros());

        ball.start_goal();
        assert_eq!(ball.position(), Vector3::zeros());
        assert!(ball.is_scripted());
        assert!(!ball.is_automatic());
    }

    #[test]
    fn first_scripted_tick_from_origin_takes_far_segment() {
        let mut ball = BallAnimation::default();
        ball.start_goal();

        ball.tick();
        assert_eq!(ball.position().z, -100.0);
        assert_eq!(ball.position().y, 5075.0);
    }

    #[test]
    fn scripted_trajectory_follows_both_segments() {
        let mut ball = BallAnimation::default();
        ball.start_goal();
        ball.tick();

        ball.tick();
        assert_eq!(ball.position().z, -200.0);
        assert_eq!(ball.position().y, 700.0);

        // Reach the band boundary at z = -1000
        for _ in 0..8 {
            ball.tick();
        }
        assert_eq!(ball.position().z, -1000.0);
        assert_eq!(ball.position().y, 3500.0);

        ball.tick();
        assert_eq!(ball.position().z, -1100.0);
        assert!((ball.position().y - (1.75 * -1100.0 + 5250.0)).abs() < 1e-3);
    }

    #[test]
    fn speed_multiplier_scales_the_scripted_step() {
        let mut ball = BallAnimation::default();
        ball.set_speed(2.5);
        ball.start_goal();

        ball.tick();
        assert_eq!(ball.position().z, -250.0);
        assert_eq!(ball.position().y, 4812.5);

        ball.tick();
        assert_eq!(ball.position().z, -500.0);
        assert_eq!(ball.position().y, 1750.0);

        // -750, -1000 (near), then eight far steps down to -3000
        for _ in 0..10 {
            ball.tick();
        }
        assert!(ball.is_scripted());
        assert_eq!(ball.position().z, -3000.0);

        ball.tick();
        assert_eq!(ball.mode(), BallMode::Idle);
        assert!(ball.is_automatic());
        assert_eq!(ball.position(), Vector3::zeros());
    }

    #[test]
    fn scripted_animation_terminates_and_resumes_bouncing() {
        for speed in [0.3, 1.0, 2.5, 40.0] {
            let mut ball = BallAnimation::default();
            ball.set_speed(speed);
            ball.start_goal();

            let mut ticks = 0;
            while ball.is_scripted() {
                let before = ball.position().z;
                ball.tick();
                if ball.is_scripted() {
                    assert!(ball.position().z < before);
                }
                ticks += 1;
                assert!(ticks < 1000, "scripted animation did not finish at speed {speed}");
            }

            assert_eq!(ball.mode(), BallMode::Idle);
            assert!(ball.is_automatic());
            ball.tick();
            assert_eq!(ball.mode(), BallMode::Bouncing);
        }
    }

    #[test]
    fn invalid_speed_falls_back_to_default() {
        let mut ball = BallAnimation::default();
        ball.set_speed(3.0);
        assert_eq!(ball.speed(), 3.0);
        for bad in [0.0, -2.0, f32::NAN, f32::INFINITY] {
            ball.set_speed(bad);
            assert_eq!(ball.speed(), DEFAULT_SPEED);
        }
    }

    #[test]
    fn cancel_only_applies_during_scripted_animation() {
        let mut ball = BallAnimation::default();
        assert!(!ball.cancel_goal());

        ball.start_goal();
        ball.tick();
        ball.tick();
        assert!(ball.cancel_goal());
        assert!(ball.is_automatic());
        assert_eq!(ball.position(), Vector3::zeros());
        assert!(ball.is_descending());
    }
}
