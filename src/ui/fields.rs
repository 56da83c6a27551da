//! The three numeric text inputs and how their text reaches the world.

use crate::scene::animation::DEFAULT_SPEED;
use crate::scene::world::{DEFAULT_GOAL_DISTANCE, DEFAULT_SCALE, World};
use log::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericField {
    Scale,
    GoalDistance,
    AnimationSpeed,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldOutcome {
    Applied(f32),
    /// The text was not a usable number: the value went back to its default and
    /// the field was cleared.
    Reset,
    /// The goal animation is running; nothing changed.
    Locked,
}

impl NumericField {
    pub const ALL: [NumericField; 3] = [
        NumericField::Scale,
        NumericField::GoalDistance,
        NumericField::AnimationSpeed,
    ];

    pub fn label(self) -> &'static str {
        match self {
            NumericField::Scale => "Ball scale",
            NumericField::GoalDistance => "Goal distance",
            NumericField::AnimationSpeed => "Animation speed",
        }
    }

    pub fn default_value(self) -> f32 {
        match self {
            NumericField::Scale => DEFAULT_SCALE,
            NumericField::GoalDistance => DEFAULT_GOAL_DISTANCE,
            NumericField::AnimationSpeed => DEFAULT_SPEED,
        }
    }

    fn accepts(self, value: f32) -> bool {
        match self {
            NumericField::AnimationSpeed => value.is_finite() && value > 0.0,
            _ => value.is_finite(),
        }
    }

    fn apply(self, world: &mut World, value: f32) -> bool {
        match self {
            NumericField::Scale => world.set_scale(value),
            NumericField::GoalDistance => world.set_goal_distance(value),
            NumericField::AnimationSpeed => world.set_speed(value),
        }
    }

    /// Pushes the field's text into the world.
    pub fn commit(self, world: &mut World, text: &mut String) -> FieldOutcome {
        if world.is_locked() {
            return FieldOutcome::Locked;
        }

        match text.parse::<f32>() {
            Ok(value) if self.accepts(value) => {
                self.apply(world, value);
                FieldOutcome::Applied(value)
            }
            _ => {
                debug!("{}: '{}' is not usable, resetting", self.label(), text);
                self.apply(world, self.default_value());
                text.clear();
                FieldOutcome::Reset
            }
        }
    }
}

/// Drops every character that cannot be typed into a numeric field.
pub fn retain_numeric(text: &mut String) {
    text.retain(|c| c.is_ascii_digit() || c == '.');
}
