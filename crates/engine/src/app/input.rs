#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputAction {
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    Attack,
    Interact,
    Restart,
    Quit,
}

const ACTION_COUNT: usize = 8;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct ActionStates {
    down: [bool; ACTION_COUNT],
}

impl ActionStates {
    pub(crate) fn set(&mut self, action: InputAction, is_down: bool) {
        self.down[action.index()] = is_down;
    }

    pub(crate) fn is_down(&self, action: InputAction) -> bool {
        self.down[action.index()]
    }
}

impl InputAction {
    pub const ALL: [InputAction; ACTION_COUNT] = [
        InputAction::MoveUp,
        InputAction::MoveDown,
        InputAction::MoveLeft,
        InputAction::MoveRight,
        InputAction::Attack,
        InputAction::Interact,
        InputAction::Restart,
        InputAction::Quit,
    ];

    const fn index(self) -> usize {
        match self {
            InputAction::MoveUp => 0,
            InputAction::MoveDown => 1,
            InputAction::MoveLeft => 2,
            InputAction::MoveRight => 3,
            InputAction::Attack => 4,
            InputAction::Interact => 5,
            InputAction::Restart => 6,
            InputAction::Quit => 7,
        }
    }

    /// Maps a lowercased logical key identifier to the action it drives.
    pub fn from_key_name(key: &str) -> Option<Self> {
        match key {
            "w" | "arrowup" => Some(InputAction::MoveUp),
            "s" | "arrowdown" => Some(InputAction::MoveDown),
            "a" | "arrowleft" => Some(InputAction::MoveLeft),
            "d" | "arrowright" => Some(InputAction::MoveRight),
            " " | "space" => Some(InputAction::Attack),
            "e" => Some(InputAction::Interact),
            "r" => Some(InputAction::Restart),
            "escape" => Some(InputAction::Quit),
            _ => None,
        }
    }
}
