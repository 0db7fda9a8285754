// C layouts from PSMoveClient_CAPI.h (0.9 client series). Most fields only
// keep the offsets right.
#![allow(dead_code)]

use std::os::raw::{c_char, c_int};

use bytemuck::Zeroable;

use crate::pose::{Quaternion, Vector3};
use crate::protocol::ButtonState;
use crate::service::ControllerButtons;

pub const PSMOVESERVICE_MAX_CONTROLLER_COUNT: usize = 5;
pub const PSMOVESERVICE_MAX_TRACKER_COUNT: usize = 8;
pub const PSMOVESERVICE_CONTROLLER_SERIAL_LEN: usize = 18;

pub const PSM_CONTROLLER_MOVE: c_int = 0;

#[repr(C)]
#[derive(Clone, Copy, Zeroable)]
pub struct PSMControllerList {
    pub controller_id: [c_int; PSMOVESERVICE_MAX_CONTROLLER_COUNT],
    pub controller_type: [c_int; PSMOVESERVICE_MAX_CONTROLLER_COUNT],
    pub controller_hand: [c_int; PSMOVESERVICE_MAX_CONTROLLER_COUNT],
    pub controller_serial:
        [[c_char; PSMOVESERVICE_CONTROLLER_SERIAL_LEN]; PSMOVESERVICE_MAX_CONTROLLER_COUNT],
    pub parent_controller_serial:
        [[c_char; PSMOVESERVICE_CONTROLLER_SERIAL_LEN]; PSMOVESERVICE_MAX_CONTROLLER_COUNT],
    pub count: c_int,
}

#[repr(C)]
#[derive(Clone, Copy, Zeroable)]
pub struct PSMVector2f {
    x: f32,
    y: f32,
}

#[repr(C)]
#[derive(Clone, Copy, Zeroable)]
pub struct PSMVector3i {
    x: c_int,
    y: c_int,
    z: c_int,
}

#[repr(C)]
#[derive(Clone, Copy, Zeroable)]
pub struct PSMPosef {
    orientation: Quaternion,
    position: Vector3,
}

#[repr(C)]
#[derive(Clone, Copy, Zeroable)]
pub struct PSMPhysicsData {
    linear_velocity_cm_per_sec: Vector3,
    linear_acceleration_cm_per_sec_sqr: Vector3,
    angular_velocity_rad_per_sec: Vector3,
    angular_acceleration_rad_per_sec_sqr: Vector3,
    time_in_seconds: f64,
}

#[repr(C)]
#[derive(Clone, Copy, Zeroable)]
pub struct PSMPSMoveRawSensorData {
    accelerometer: PSMVector3i,
    gyroscope: PSMVector3i,
    magnetometer: PSMVector3i,
    time_in_seconds: f64,
}

#[repr(C)]
#[derive(Clone, Copy, Zeroable)]
pub struct PSMPSMoveCalibratedSensorData {
    magnetometer: Vector3,
    accelerometer: Vector3,
    gyroscope: Vector3,
    time_in_seconds: f64,
}

/// `shape` stands in for the ellipse/lightbar/point-cloud union. The point
/// cloud (seven points and a count) is its largest member.
#[repr(C)]
#[derive(Clone, Copy, Zeroable)]
pub struct PSMTrackingProjection {
    shape: [f32; 15],
    shape_type: c_int,
}

#[repr(C)]
#[derive(Clone, Copy, Zeroable)]
pub struct PSMRawTrackerData {
    screen_locations: [PSMVector2f; PSMOVESERVICE_MAX_TRACKER_COUNT],
    relative_positions_cm: [Vector3; PSMOVESERVICE_MAX_TRACKER_COUNT],
    relative_orientations: [Quaternion; PSMOVESERVICE_MAX_TRACKER_COUNT],
    tracking_projections: [PSMTrackingProjection; PSMOVESERVICE_MAX_TRACKER_COUNT],
    tracker_ids: [c_int; PSMOVESERVICE_MAX_TRACKER_COUNT],
    valid_tracker_bitmask: c_int,
    multicam_position_cm: Vector3,
    multicam_orientation: Quaternion,
    multicam_position_valid: u8,
    multicam_orientation_valid: u8,
}

/// Leading part of `PSMPSMove`, up to and including the trigger button.
/// C `bool` fields are read as bytes.
#[repr(C)]
#[derive(Clone, Copy, Zeroable)]
pub struct PSMPSMove {
    has_valid_hardware_calibration: u8,
    is_tracking_enabled: u8,
    is_currently_tracking: u8,
    is_orientation_valid: u8,
    is_position_valid: u8,
    has_unpublished_state: u8,
    device_path: [c_char; 256],
    device_serial: [c_char; 128],
    assigned_host_serial: [c_char; 128],
    paired_to_host: u8,
    connection_type: c_int,
    tracking_color_type: c_int,
    pose: PSMPosef,
    physics_data: PSMPhysicsData,
    raw_sensor_data: PSMPSMoveRawSensorData,
    calibrated_sensor_data: PSMPSMoveCalibratedSensorData,
    raw_tracker_data: PSMRawTrackerData,
    pub triangle_button: c_int,
    pub circle_button: c_int,
    pub cross_button: c_int,
    pub square_button: c_int,
    pub select_button: c_int,
    pub start_button: c_int,
    pub ps_button: c_int,
    pub move_button: c_int,
    pub trigger_button: c_int,
}

/// Leading part of `PSMController`. `controller_state` is the PSMove arm of
/// the per-type state union, which is at least this large.
#[repr(C)]
#[derive(Clone, Copy, Zeroable)]
pub struct PSMController {
    pub controller_id: c_int,
    pub controller_type: c_int,
    pub controller_hand: c_int,
    pub controller_state: PSMPSMove,
}

impl From<&PSMPSMove> for ControllerButtons {
    fn from(state: &PSMPSMove) -> Self {
        ControllerButtons {
            move_button: ButtonState::from(state.move_button),
            cross: ButtonState::from(state.cross_button),
            circle: ButtonState::from(state.circle_button),
        }
    }
}

impl PSMController {
    /// Button state, if this view holds a PSMove controller.
    pub fn psmove_buttons(&self) -> Option<ControllerButtons> {
        (self.controller_type == PSM_CONTROLLER_MOVE)
            .then(|| ControllerButtons::from(&self.controller_state))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::{align_of, size_of};

    fn offset<T, F>(base: &T, field: &F) -> usize {
        field as *const F as usize - base as *const T as usize
    }

    #[test]
    fn nested_layouts_follow_c_rules() {
        assert_eq!(size_of::<PSMPosef>(), 28);
        assert_eq!(size_of::<PSMPhysicsData>(), 56);
        assert_eq!(size_of::<PSMPSMoveRawSensorData>(), 48);
        assert_eq!(size_of::<PSMPSMoveCalibratedSensorData>(), 48);
        assert_eq!(size_of::<PSMTrackingProjection>(), 64);
        assert_eq!(size_of::<PSMRawTrackerData>(), 868);
        assert_eq!(align_of::<PSMPSMove>(), 8);
    }

    #[test]
    fn button_fields_sit_after_tracker_data() {
        let state = PSMPSMove::zeroed();
        assert_eq!(offset(&state, &state.pose), 528);
        assert_eq!(offset(&state, &state.physics_data), 560);
        assert_eq!(offset(&state, &state.raw_tracker_data), 712);
        assert_eq!(offset(&state, &state.circle_button), 1584);
        assert_eq!(offset(&state, &state.cross_button), 1588);
        assert_eq!(offset(&state, &state.move_button), 1608);

        let controller = PSMController::zeroed();
        assert_eq!(offset(&controller, &controller.controller_state), 16);
    }

    #[test]
    fn psmove_buttons_map_through_button_state() {
        let mut controller = PSMController::zeroed();
        assert_eq!(
            controller.psmove_buttons(),
            Some(ControllerButtons::default())
        );

        controller.controller_state.cross_button = 1;
        controller.controller_state.circle_button = 3;
        controller.controller_state.move_button = 2;
        let buttons = controller.psmove_buttons().unwrap();
        assert_eq!(buttons.cross, ButtonState::Pressed);
        assert_eq!(buttons.circle, ButtonState::Released);
        assert_eq!(buttons.move_button, ButtonState::Down);
    }

    #[test]
    fn other_controller_types_have_no_psmove_buttons() {
        let mut controller = PSMController::zeroed();
        controller.controller_type = 2;
        controller.controller_state.cross_button = 2;
        assert_eq!(controller.psmove_buttons(), None);
    }
}
