use std::borrow::Borrow;
use std::collections::{HashMap, HashSet};

use winit::{
    event::{ElementState, KeyEvent, MouseButton},
    keyboard::KeyCode,
};

use crate::math::{Rect, Vec2};

/// Tracks keyboard and mouse state across frames.
pub struct InputState {
    keys_down: HashSet<KeyCode>,
    keys_pressed: HashSet<KeyCode>,
    keys_released: HashSet<KeyCode>,

    mouse_x: f32,
    mouse_y: f32,
    mouse_down: [bool; 8],
    mouse_pressed: [bool; 8],
}

impl InputState {
    pub fn new() -> Self {
        Self {
            keys_down: HashSet::new(),
            keys_pressed: HashSet::new(),
            keys_released: HashSet::new(),
            mouse_x: 0.0,
            mouse_y: 0.0,
            mouse_down: [false; 8],
            mouse_pressed: [false; 8],
        }
    }

    /// Clear per-frame pressed/released flags.
    pub fn begin_frame(&mut self) {
        self.keys_pressed.clear();
        self.keys_released.clear();
        self.mouse_pressed.fill(false);
    }

    /// Handle a keyboard input event from winit.
    pub fn handle_key(&mut self, event: &KeyEvent) {
        if let winit::keyboard::PhysicalKey::Code(keycode) = event.physical_key {
            match event.state {
                ElementState::Pressed => self.press(keycode),
                ElementState::Released => self.release(keycode),
            }
        }
    }

    /// Marks `key` as held; it counts as pressed this frame unless it was already down.
    pub fn press(&mut self, key: KeyCode) {
        if self.keys_down.insert(key) {
            self.keys_pressed.insert(key);
        }
    }

    pub fn release(&mut self, key: KeyCode) {
        if self.keys_down.remove(&key) {
            self.keys_released.insert(key);
        }
    }

    /// Handle a mouse button input event from winit.
    pub fn handle_mouse_button(&mut self, button: MouseButton, state: ElementState) {
        if let Some(idx) = mouse_button_index(button) {
            match state {
                ElementState::Pressed => {
                    if !self.mouse_down[idx] {
                        self.mouse_pressed[idx] = true;
                    }
                    self.mouse_down[idx] = true;
                }
                ElementState::Released => self.mouse_down[idx] = false,
            }
        }
    }

    /// Handle mouse cursor movement from winit.
    pub fn handle_cursor_moved(&mut self, x: f64, y: f64) {
        self.mouse_x = x as f32;
        self.mouse_y = y as f32;
    }

    /// Returns true if the key is currently held down.
    pub fn is_key_down(&self, key: KeyCode) -> bool {
        self.keys_down.contains(&key)
    }

    /// Returns true if the key was pressed this frame.
    pub fn is_key_pressed(&self, key: KeyCode) -> bool {
        self.keys_pressed.contains(&key)
    }

    /// Returns true if the key was released this frame.
    pub fn is_key_released(&self, key: KeyCode) -> bool {
        self.keys_released.contains(&key)
    }

    /// Returns true if the mouse button was pressed this frame.
    pub fn is_mouse_pressed(&self, button: MouseButton) -> bool {
        mouse_button_index(button)
            .map(|idx| self.mouse_pressed[idx])
            .unwrap_or(false)
    }

    /// Current mouse cursor position in screen pixels.
    pub fn mouse_position(&self) -> Vec2 {
        Vec2::new(self.mouse_x, self.mouse_y)
    }

    /// True if the left button went down this frame inside the screen rectangle `rect`.
    pub fn clicked_in(&self, rect: &Rect) -> bool {
        if !self.is_mouse_pressed(MouseButton::Left) {
            return false;
        }
        let p = self.mouse_position();
        p.x >= rect.x && p.x <= rect.x + rect.w && p.y >= rect.y && p.y <= rect.y + rect.h
    }
}

impl Default for InputState {
    fn default() -> Self {
        Self::new()
    }
}

/// A named game action (e.g. "jump", "shoot") bound to one or more buttons.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ActionId(pub String);

impl ActionId {
    /// Create a new action identifier from any string-like value.
    pub fn new(name: impl Into<String>) -> Self {
        ActionId(name.into())
    }
}

impl Borrow<str> for ActionId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Action names used by the platformer bindings.
pub mod actions {
    pub const MOVE: &str = "move";
    pub const JUMP: &str = "jump";
    pub const SUPER_JUMP: &str = "super_jump";
    pub const SPRINT: &str = "sprint";
    pub const SHOOT: &str = "shoot";
    pub const TOGGLE_HITBOXES: &str = "toggle_hitboxes";
    pub const TOGGLE_SOUND: &str = "toggle_sound";
    pub const PAUSE: &str = "pause";
    pub const CONFIRM: &str = "confirm";
    pub const QUIT: &str = "quit";
}

/// A key that can be bound to an action or axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Button {
    Key(KeyCode),
}

impl Button {
    fn is_down(self, input: &InputState) -> bool {
        match self {
            Button::Key(k) => input.is_key_down(k),
        }
    }

    fn is_pressed(self, input: &InputState) -> bool {
        match self {
            Button::Key(k) => input.is_key_pressed(k),
        }
    }
}

/// A one-dimensional axis binding (e.g. -1..1 horizontal movement).
#[derive(Clone, Debug)]
pub struct AxisBinding {
    /// Buttons contributing negative direction (e.g. A, Left).
    pub negative: Vec<Button>,
    /// Buttons contributing positive direction (e.g. D, Right).
    pub positive: Vec<Button>,
}

impl AxisBinding {
    /// Create a new axis binding from negative and positive button sets.
    pub fn new(negative: Vec<Button>, positive: Vec<Button>) -> Self {
        Self { negative, positive }
    }
}

/// Maps actions and axes to physical inputs.
#[derive(Clone, Debug)]
pub struct InputMap {
    actions: HashMap<ActionId, Vec<Button>>,
    axes: HashMap<ActionId, AxisBinding>,
}

impl InputMap {
    /// Create an empty input map.
    pub fn new() -> Self {
        Self {
            actions: HashMap::new(),
            axes: HashMap::new(),
        }
    }

    /// Bind a key to an action.
    pub fn bind_key(&mut self, action: ActionId, key: KeyCode) -> &mut Self {
        self.actions
            .entry(action)
            .or_default()
            .push(Button::Key(key));
        self
    }

    /// Define or replace an axis binding.
    pub fn set_axis(&mut self, axis: ActionId, binding: AxisBinding) -> &mut Self {
        self.axes.insert(axis, binding);
        self
    }

    /// Bindings used by the game: arrows/WASD to move, Shift to sprint, Up/W to
    /// jump, P to super jump, Space to shoot.
    pub fn platformer() -> Self {
        let mut map = Self::new();
        map.set_axis(
            ActionId::new(actions::MOVE),
            AxisBinding::new(
                vec![Button::Key(KeyCode::ArrowLeft), Button::Key(KeyCode::KeyA)],
                vec![Button::Key(KeyCode::ArrowRight), Button::Key(KeyCode::KeyD)],
            ),
        );
        map.bind_key(ActionId::new(actions::JUMP), KeyCode::ArrowUp)
            .bind_key(ActionId::new(actions::JUMP), KeyCode::KeyW)
            .bind_key(ActionId::new(actions::SUPER_JUMP), KeyCode::KeyP)
            .bind_key(ActionId::new(actions::SPRINT), KeyCode::ShiftLeft)
            .bind_key(ActionId::new(actions::SPRINT), KeyCode::ShiftRight)
            .bind_key(ActionId::new(actions::SHOOT), KeyCode::Space)
            .bind_key(ActionId::new(actions::TOGGLE_HITBOXES), KeyCode::F9)
            .bind_key(ActionId::new(actions::TOGGLE_SOUND), KeyCode::KeyM)
            .bind_key(ActionId::new(actions::PAUSE), KeyCode::Tab)
            .bind_key(ActionId::new(actions::PAUSE), KeyCode::Pause)
            .bind_key(ActionId::new(actions::CONFIRM), KeyCode::Enter)
            .bind_key(ActionId::new(actions::QUIT), KeyCode::KeyQ);
        map
    }

    /// Check if an action is currently held down.
    pub fn action_down(&self, input: &InputState, action: &str) -> bool {
        self.actions
            .get(action)
            .map(|buttons| buttons.iter().any(|&b| b.is_down(input)))
            .unwrap_or(false)
    }

    /// Check if an action was pressed this frame.
    pub fn action_pressed(&self, input: &InputState, action: &str) -> bool {
        self.actions
            .get(action)
            .map(|buttons| buttons.iter().any(|&b| b.is_pressed(input)))
            .unwrap_or(false)
    }

    /// Get the value of an axis in the range [-1.0, 1.0].
    ///
    /// Negative buttons contribute -1.0, positive buttons +1.0.
    /// If both sides are pressed, they cancel out.
    pub fn axis(&self, input: &InputState, axis: &str) -> f32 {
        if let Some(binding) = self.axes.get(axis) {
            let mut value = 0.0;
            if binding.negative.iter().any(|&b| b.is_down(input)) {
                value -= 1.0;
            }
            if binding.positive.iter().any(|&b| b.is_down(input)) {
                value += 1.0;
            }
            value
        } else {
            0.0
        }
    }
}

impl Default for InputMap {
    fn default() -> Self {
        Self::new()
    }
}

fn mouse_button_index(button: MouseButton) -> Option<usize> {
    match button {
        MouseButton::Left => Some(0),
        MouseButton::Right => Some(1),
        MouseButton::Middle => Some(2),
        MouseButton::Back => Some(3),
        MouseButton::Forward => Some(4),
        MouseButton::Other(raw) => {
            let idx = raw as usize;
            let mapped = 5 + idx; // Reserve 0-4 for standard buttons
            (mapped < 8).then_some(mapped)
        }
    }
}
