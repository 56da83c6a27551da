use egui::Key;

/// Everything the keyboard can ask of the viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Exit,
    TiltUp,
    TiltDown,
    TurnLeft,
    TurnRight,
    ZoomIn,
    ZoomOut,
    OpenModel,
    StartGoal,
    CancelGoal,
}

pub fn command_for_key(key: Key) -> Option<Command> {
    let command = match key {
        Key::F10 | Key::F2 => Command::Exit,
        Key::E => Command::TiltUp,
        Key::D => Command::TiltDown,
        Key::S => Command::TurnLeft,
        Key::F => Command::TurnRight,
        // '=' shares the key with '+' on most layouts
        Key::Plus | Key::Equals => Command::ZoomIn,
        Key::Minus => Command::ZoomOut,
        Key::F4 => Command::OpenModel,
        Key::V => Command::StartGoal,
        Key::B => Command::CancelGoal,
        _ => return None,
    };
    Some(command)
}

/// Commands for the keys pressed this frame, in press order. Nothing is reported
/// while a text field owns the keyboard.
pub fn pressed_commands(ctx: &egui::Context) -> Vec<Command> {
    if ctx.wants_keyboard_input() {
        return Vec::new();
    }
    ctx.input(|i| {
        i.events
            .iter()
            .filter_map(|event| match event {
                egui::Event::Key {
                    key, pressed: true, ..
                } => command_for_key(*key),
                _ => None,
            })
            .collect()
    })
}
