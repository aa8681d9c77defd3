//! Pointer, touch and keyboard input.
//!
//! Raw pointer events are fed through [`PointerFsm`], which tracks the active
//! gesture and turns each event into at most one [`InputAction`]. Keyboard
//! input maps to a [`Shortcut`].

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// What a primary drag does
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ToolMode {
    #[default]
    Paint,
    Move,
}

impl ToolMode {
    pub fn toggled(self) -> Self {
        match self {
            ToolMode::Paint => ToolMode::Move,
            ToolMode::Move => ToolMode::Paint,
        }
    }
}

/// Mouse button identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TouchPhase {
    Start,
    Move,
    End,
}

/// Pointer input in viewport pixels (origin top-left)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    Press { button: MouseButton, x: f32, y: f32 },
    Move { x: f32, y: f32 },
    Release,
    Leave,
    /// All touches currently on the screen after the change
    Touch { phase: TouchPhase, touches: Vec<Vec2> },
}

/// Active gesture
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum PointerState {
    #[default]
    Idle,
    Painting,
    Orbiting { last: Vec2 },
    Panning { last: Vec2 },
    /// Spread is the distance between the first two touches
    Pinching { spread: f32 },
}

/// What the session should do in response to an event
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputAction {
    None,
    BeginStroke { x: f32, y: f32 },
    PaintTo { x: f32, y: f32 },
    EndStroke,
    Orbit { dx: f32, dy: f32 },
    Pan { dx: f32, dy: f32 },
    /// Ratio of the new touch spread to the previous one
    Zoom { ratio: f32 },
}

#[derive(Debug, Clone, Default)]
pub struct PointerFsm {
    state: PointerState,
}

impl PointerFsm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> PointerState {
        self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == PointerState::Idle
    }

    /// Advance on one event. `accept_gestures` is false while the model is
    /// loading or animating in; new gestures are then ignored but running
    /// ones still end normally.
    pub fn handle(&mut self, event: &PointerEvent, mode: ToolMode, accept_gestures: bool) -> InputAction {
        match event {
            PointerEvent::Press { button, x, y } => {
                if !self.is_idle() || !accept_gestures {
                    return InputAction::None;
                }
                self.start(*button, Vec2::new(*x, *y), mode)
            }
            PointerEvent::Move { x, y } => self.move_to(Vec2::new(*x, *y)),
            PointerEvent::Release | PointerEvent::Leave => self.cancel(),
            PointerEvent::Touch { phase, touches } => self.touch(*phase, touches, mode, accept_gestures),
        }
    }

    /// Drop any gesture, ending a stroke in progress
    pub fn cancel(&mut self) -> InputAction {
        let was_painting = self.state == PointerState::Painting;
        self.state = PointerState::Idle;
        if was_painting {
            InputAction::EndStroke
        } else {
            InputAction::None
        }
    }

    fn start(&mut self, button: MouseButton, position: Vec2, mode: ToolMode) -> InputAction {
        match (button, mode) {
            (MouseButton::Left, ToolMode::Paint) => {
                self.state = PointerState::Painting;
                InputAction::BeginStroke {
                    x: position.x,
                    y: position.y,
                }
            }
            (MouseButton::Left, ToolMode::Move) => {
                self.state = PointerState::Orbiting { last: position };
                InputAction::None
            }
            (MouseButton::Right, ToolMode::Move) => {
                self.state = PointerState::Panning { last: position };
                InputAction::None
            }
            _ => InputAction::None,
        }
    }

    fn move_to(&mut self, position: Vec2) -> InputAction {
        match self.state {
            PointerState::Painting => InputAction::PaintTo {
                x: position.x,
                y: position.y,
            },
            PointerState::Orbiting { last } => {
                self.state = PointerState::Orbiting { last: position };
                let delta = position - last;
                InputAction::Orbit {
                    dx: delta.x,
                    dy: delta.y,
                }
            }
            PointerState::Panning { last } => {
                self.state = PointerState::Panning { last: position };
                let delta = position - last;
                InputAction::Pan {
                    dx: delta.x,
                    dy: delta.y,
                }
            }
            PointerState::Idle | PointerState::Pinching { .. } => InputAction::None,
        }
    }

    fn touch(&mut self, phase: TouchPhase, touches: &[Vec2], mode: ToolMode, accept_gestures: bool) -> InputAction {
        match touches {
            [] => self.cancel(),
            [first, second, ..] => {
                let spread = first.distance(*second);
                match self.state {
                    PointerState::Pinching { spread: previous } => {
                        self.state = PointerState::Pinching { spread };
                        if phase == TouchPhase::Move && previous > 0.0 && spread > 0.0 {
                            InputAction::Zoom {
                                ratio: spread / previous,
                            }
                        } else {
                            InputAction::None
                        }
                    }
                    PointerState::Idle if !accept_gestures => InputAction::None,
                    _ => {
                        let action = self.cancel();
                        self.state = PointerState::Pinching { spread };
                        action
                    }
                }
            }
            [single] => match self.state {
                // Lifting one finger of a pinch ends the gesture
                PointerState::Pinching { .. } => {
                    self.state = PointerState::Idle;
                    InputAction::None
                }
                PointerState::Idle if phase == TouchPhase::Start && accept_gestures => {
                    self.start(MouseButton::Left, *single, mode)
                }
                _ => self.move_to(*single),
            },
        }
    }
}

/// Modifier keys held with a key press
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

/// A key press. `key` is the produced character or a named key like
/// `"Space"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyInput {
    pub key: String,
    pub modifiers: Modifiers,
    /// A text field has keyboard focus
    pub text_focus: bool,
}

impl KeyInput {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            modifiers: Modifiers::default(),
            text_focus: false,
        }
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shortcut {
    ToggleMode,
    Undo,
    Redo,
}

impl Shortcut {
    pub fn from_key(input: &KeyInput) -> Option<Self> {
        if input.text_focus {
            return None;
        }

        let key = input.key.to_lowercase();
        if key == "space" || key == " " {
            return Some(Shortcut::ToggleMode);
        }

        let command = input.modifiers.ctrl || input.modifiers.meta;
        if !command {
            return None;
        }
        match (key.as_str(), input.modifiers.shift) {
            ("z", false) => Some(Shortcut::Undo),
            ("z", true) | ("y", _) => Some(Shortcut::Redo),
            _ => None,
        }
    }
}
