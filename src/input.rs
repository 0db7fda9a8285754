use std::collections::{HashSet, VecDeque};
use std::hash::Hash;
use std::time::Duration;

use crate::protocol::{FPS_HIGH, FPS_LOW, FPS_MEDIUM};
use crate::service::ControllerButtons;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Escape,
    Numpad1,
    Numpad3,
    Numpad6,
    F2,
    F4,
    F6,
}

impl Key {
    pub const ALL: [Key; 7] = [
        Key::Escape,
        Key::Numpad1,
        Key::Numpad3,
        Key::Numpad6,
        Key::F2,
        Key::F4,
        Key::F6,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControllerButton {
    Move,
    Cross,
    Circle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Exit,
    SetFrameRate(u32),
    StartRecording,
    StopRecording,
    Center,
}

impl From<Key> for InputEvent {
    fn from(key: Key) -> Self {
        match key {
            Key::Escape => InputEvent::Exit,
            Key::Numpad1 => InputEvent::SetFrameRate(FPS_LOW),
            Key::Numpad3 => InputEvent::SetFrameRate(FPS_MEDIUM),
            Key::Numpad6 => InputEvent::SetFrameRate(FPS_HIGH),
            Key::F2 => InputEvent::StartRecording,
            Key::F4 => InputEvent::StopRecording,
            Key::F6 => InputEvent::Center,
        }
    }
}

impl From<ControllerButton> for InputEvent {
    fn from(button: ControllerButton) -> Self {
        match button {
            ControllerButton::Move => InputEvent::Center,
            ControllerButton::Cross => InputEvent::StartRecording,
            ControllerButton::Circle => InputEvent::StopRecording,
        }
    }
}

/// Reports what became held since the previous update.
#[derive(Debug)]
pub struct EdgeDetector<T> {
    held: HashSet<T>,
}

impl<T: Copy + Eq + Hash> EdgeDetector<T> {
    pub fn new() -> Self {
        Self {
            held: HashSet::new(),
        }
    }

    pub fn update<I: IntoIterator<Item = T>>(&mut self, held_now: I) -> Vec<T> {
        let held_now: HashSet<T> = held_now.into_iter().collect();
        let pressed = held_now
            .iter()
            .filter(|item| !self.held.contains(*item))
            .copied()
            .collect();
        self.held = held_now;
        pressed
    }
}

impl<T: Copy + Eq + Hash> Default for EdgeDetector<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Edge detection over the capture buttons of every controller.
#[derive(Debug, Default)]
pub struct ButtonTracker {
    edges: EdgeDetector<(usize, ControllerButton)>,
}

impl ButtonTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&mut self, buttons: &[(usize, ControllerButtons)]) -> Vec<InputEvent> {
        let held = buttons.iter().flat_map(|(index, b)| {
            [
                (ControllerButton::Move, b.move_button),
                (ControllerButton::Cross, b.cross),
                (ControllerButton::Circle, b.circle),
            ]
            .into_iter()
            .filter(|(_, state)| state.is_held())
            .map(move |(button, _)| (*index, button))
        });

        let mut pressed = self.edges.update(held);
        pressed.sort_by_key(|(index, button)| (*index, *button as u8));
        pressed
            .into_iter()
            .map(|(_, button)| InputEvent::from(button))
            .collect()
    }
}

pub trait InputSource {
    /// Waits up to `timeout` for the next event.
    fn next_event(&mut self, timeout: Duration) -> Option<InputEvent>;
}

impl<S: InputSource + ?Sized> InputSource for Box<S> {
    fn next_event(&mut self, timeout: Duration) -> Option<InputEvent> {
        (**self).next_event(timeout)
    }
}

/// Replays a fixed list of events, then reports `Exit` forever.
#[derive(Debug, Default)]
pub struct ScriptedInput {
    events: VecDeque<InputEvent>,
}

impl ScriptedInput {
    pub fn new<I: IntoIterator<Item = InputEvent>>(events: I) -> Self {
        Self {
            events: events.into_iter().collect(),
        }
    }
}

impl InputSource for ScriptedInput {
    fn next_event(&mut self, _timeout: Duration) -> Option<InputEvent> {
        Some(self.events.pop_front().unwrap_or(InputEvent::Exit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::ButtonState;

    #[test]
    fn key_bindings() {
        assert_eq!(InputEvent::from(Key::Escape), InputEvent::Exit);
        assert_eq!(InputEvent::from(Key::Numpad1), InputEvent::SetFrameRate(1));
        assert_eq!(InputEvent::from(Key::Numpad3), InputEvent::SetFrameRate(30));
        assert_eq!(InputEvent::from(Key::Numpad6), InputEvent::SetFrameRate(60));
        assert_eq!(InputEvent::from(Key::F2), InputEvent::StartRecording);
        assert_eq!(InputEvent::from(Key::F4), InputEvent::StopRecording);
        assert_eq!(InputEvent::from(Key::F6), InputEvent::Center);
    }

    #[test]
    fn held_key_fires_once() {
        let mut edges = EdgeDetector::new();
        assert_eq!(edges.update([Key::F2]), vec![Key::F2]);
        assert!(edges.update([Key::F2]).is_empty());
        assert!(edges.update([Key::F2]).is_empty());
        assert!(edges.update([]).is_empty());
        assert_eq!(edges.update([Key::F2]), vec![Key::F2]);
    }

    #[test]
    fn buttons_map_to_session_events() {
        let mut tracker = ButtonTracker::new();
        let pressed = ControllerButtons {
            move_button: ButtonState::Pressed,
            cross: ButtonState::Down,
            circle: ButtonState::Up,
        };
        assert_eq!(
            tracker.events(&[(0, pressed)]),
            vec![InputEvent::Center, InputEvent::StartRecording]
        );
        assert!(tracker.events(&[(0, pressed)]).is_empty());

        let circle = ControllerButtons {
            circle: ButtonState::Down,
            ..Default::default()
        };
        assert_eq!(
            tracker.events(&[(0, pressed), (1, circle)]),
            vec![InputEvent::StopRecording]
        );
    }

    #[test]
    fn scripted_input_ends_with_exit() {
        let mut input = ScriptedInput::new([InputEvent::Center]);
        assert_eq!(input.next_event(Duration::ZERO), Some(InputEvent::Center));
        assert_eq!(input.next_event(Duration::ZERO), Some(InputEvent::Exit));
        assert_eq!(input.next_event(Duration::ZERO), Some(InputEvent::Exit));
    }
}
