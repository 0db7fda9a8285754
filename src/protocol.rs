use std::fmt;
use std::time::Duration;

pub type ControllerId = i32;

pub const DEFAULT_ADDRESS: &str = "localhost";
pub const DEFAULT_PORT: &str = "9512";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(1000);

/// Capacity of the per-controller state table.
pub const MAX_CONTROLLER_COUNT: usize = 32;

/// The service reports positions in centimetres.
pub const CM_TO_METERS: f32 = 0.01;

pub const STREAM_INCLUDE_POSITION_DATA: u32 = 0x01;
pub const STREAM_INCLUDE_PHYSICS_DATA: u32 = 0x02;
pub const STREAM_INCLUDE_CALIBRATED_SENSOR_DATA: u32 = 0x08;
pub const STREAM_INCLUDE_RAW_TRACKER_DATA: u32 = 0x10;

pub const CAPTURE_STREAM_FLAGS: u32 = STREAM_INCLUDE_POSITION_DATA
    | STREAM_INCLUDE_PHYSICS_DATA
    | STREAM_INCLUDE_CALIBRATED_SENSOR_DATA
    | STREAM_INCLUDE_RAW_TRACKER_DATA;

pub const FPS_LOW: u32 = 1;
pub const FPS_MEDIUM: u32 = 30;
pub const FPS_HIGH: u32 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultCode {
    Error = -1,
    Success = 0,
    Timeout = 1,
    RequestSent = 2,
    Canceled = 3,
    NoData = 4,
}

impl From<i32> for ResultCode {
    fn from(value: i32) -> Self {
        match value {
            0 => ResultCode::Success,
            1 => ResultCode::Timeout,
            2 => ResultCode::RequestSent,
            3 => ResultCode::Canceled,
            4 => ResultCode::NoData,
            _ => ResultCode::Error,
        }
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResultCode::Error => "error",
            ResultCode::Success => "success",
            ResultCode::Timeout => "timeout",
            ResultCode::RequestSent => "request sent",
            ResultCode::Canceled => "canceled",
            ResultCode::NoData => "no data",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ButtonState {
    #[default]
    Up = 0,
    Pressed = 1,
    Down = 2,
    Released = 3,
}

impl ButtonState {
    /// Pressed is the first frame of a press, Down every frame after it.
    pub fn is_held(self) -> bool {
        matches!(self, ButtonState::Pressed | ButtonState::Down)
    }
}

impl From<i32> for ButtonState {
    fn from(value: i32) -> Self {
        match value & 0x3 {
            1 => ButtonState::Pressed,
            2 => ButtonState::Down,
            3 => ButtonState::Released,
            _ => ButtonState::Up,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_flags_request_position_physics_calibrated_and_tracker_data() {
        assert_eq!(CAPTURE_STREAM_FLAGS, 0x01 | 0x02 | 0x08 | 0x10);
        // raw sensor data (0x04) stays off
        assert_eq!(CAPTURE_STREAM_FLAGS & 0x04, 0);
    }

    #[test]
    fn result_codes_from_raw() {
        assert_eq!(ResultCode::from(0), ResultCode::Success);
        assert_eq!(ResultCode::from(1), ResultCode::Timeout);
        assert_eq!(ResultCode::from(-1), ResultCode::Error);
        assert_eq!(ResultCode::from(42), ResultCode::Error);
    }

    #[test]
    fn held_button_states() {
        assert!(ButtonState::from(1).is_held());
        assert!(ButtonState::from(2).is_held());
        assert!(!ButtonState::from(0).is_held());
        assert!(!ButtonState::from(3).is_held());
    }
}
