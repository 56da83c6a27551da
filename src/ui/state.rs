use crate::scene::world::World;
use crate::ui::fields::{FieldOutcome, NumericField};
use crate::ui::input::Command;
use log::{error, info};
use std::collections::VecDeque;
use std::path::Path;

/// What the window has to do after a command was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Exit,
    /// Show the file picker and hand the result to [`ViewerState::open_model`].
    PickModel,
}

/// The world plus the UI-side state bound to it: field texts and pending error
/// notifications. Independent of any window so it can be driven directly.
pub struct ViewerState {
    pub world: World,
    field_texts: [String; 3],
    notifications: VecDeque<String>,
}

impl ViewerState {
    pub fn new(world: World) -> Self {
        Self {
            world,
            field_texts: Default::default(),
            notifications: VecDeque::new(),
        }
    }

    pub fn handle(&mut self, command: Command) -> Control {
        let world = &mut self.world;
        let step = world.rotation_step();
        match command {
            Command::Exit => return Control::Exit,
            Command::OpenModel => return Control::PickModel,
            Command::TiltUp => {
                world.rotate_x(step);
            }
            Command::TiltDown => {
                world.rotate_x(-step);
            }
            Command::TurnLeft => {
                world.rotate_y(step);
            }
            Command::TurnRight => {
                world.rotate_y(-step);
            }
            Command::ZoomIn => {
                world.zoom(-1.0);
            }
            Command::ZoomOut => {
                world.zoom(1.0);
            }
            Command::StartGoal => world.start_goal(),
            Command::CancelGoal => {
                world.cancel_goal();
            }
        }
        Control::Continue
    }

    /// Reloads the ball model. A failure keeps the current scene and queues one
    /// notification for the error dialog.
    pub fn open_model(&mut self, path: &Path) -> bool {
        match self.world.reload_scene(path) {
            Ok(()) => {
                info!("Model switched to {}", path.display());
                true
            }
            Err(e) => {
                error!("{}", e);
                self.notifications.push_back(e.to_string());
                false
            }
        }
    }

    /// Reports a failure that happened outside the world, e.g. in the file picker.
    pub fn notify(&mut self, message: impl Into<String>) {
        self.notifications.push_back(message.into());
    }

    pub fn pending_notifications(&self) -> usize {
        self.notifications.len()
    }

    pub fn next_notification(&mut self) -> Option<String> {
        self.notifications.pop_front()
    }

    fn slot(field: NumericField) -> usize {
        match field {
            NumericField::Scale => 0,
            NumericField::GoalDistance => 1,
            NumericField::AnimationSpeed => 2,
        }
    }

    pub fn field_text(&self, field: NumericField) -> &str {
        &self.field_texts[Self::slot(field)]
    }

    pub fn field_text_mut(&mut self, field: NumericField) -> &mut String {
        &mut self.field_texts[Self::slot(field)]
    }

    /// Applies the current text of `field` to the world.
    pub fn commit_field(&mut self, field: NumericField) -> FieldOutcome {
        let text = &mut self.field_texts[Self::slot(field)];
        field.commit(&mut self.world, text)
    }
}
