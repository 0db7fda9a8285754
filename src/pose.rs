use bytemuck::{Pod, Zeroable};

use crate::protocol::{ControllerId, CM_TO_METERS};

/// Position in service units (centimetres). Layout matches `PSMVector3f`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct Vector3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vector3 {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn scaled(&self, factor: f32) -> [f32; 3] {
        [self.x * factor, self.y * factor, self.z * factor]
    }
}

/// Orientation quaternion, scalar first. Layout matches `PSMQuatf`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Quaternion {
    pub w: f32,
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Quaternion {
    pub const IDENTITY: Quaternion = Quaternion {
        w: 1.0,
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub const fn new(w: f32, x: f32, y: f32, z: f32) -> Self {
        Self { w, x, y, z }
    }

    /// Rotation of `angle_degrees` around the unit axis `(ax, ay, az)`.
    pub fn from_axis_angle(ax: f32, ay: f32, az: f32, angle_degrees: f32) -> Self {
        let half = angle_degrees.to_radians() * 0.5;
        let (s, c) = half.sin_cos();
        Self {
            w: c,
            x: ax * s,
            y: ay * s,
            z: az * s,
        }
    }
}

impl Default for Quaternion {
    fn default() -> Self {
        Quaternion::IDENTITY
    }
}

/// Euler angles in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Ypr {
    pub yaw: f64,
    pub pitch: f64,
    pub roll: f64,
}

impl Ypr {
    pub const ZERO: Ypr = Ypr {
        yaw: 0.0,
        pitch: 0.0,
        roll: 0.0,
    };

    pub const fn new(yaw: f64, pitch: f64, roll: f64) -> Self {
        Self { yaw, pitch, roll }
    }

    /// Each angle minus the matching offset angle, wrapped into [-180, 180].
    pub fn relative_to(&self, offset: &Ypr) -> Ypr {
        Ypr {
            yaw: offset_angle(self.yaw, offset.yaw),
            pitch: offset_angle(self.pitch, offset.pitch),
            roll: offset_angle(self.roll, offset.roll),
        }
    }
}

impl From<Quaternion> for Ypr {
    /// Roll about X, pitch about Y, yaw about Z. Pitch saturates at exactly
    /// +/-90 degrees when the asin argument leaves [-1, 1].
    fn from(q: Quaternion) -> Self {
        let (w, x, y, z) = (q.w as f64, q.x as f64, q.y as f64, q.z as f64);

        let sinr_cosp = 2.0 * (w * x + y * z);
        let cosr_cosp = 1.0 - 2.0 * (x * x + y * y);
        let roll = sinr_cosp.atan2(cosr_cosp).to_degrees();

        let sinp = 2.0 * (w * y - z * x);
        let pitch = if sinp.abs() >= 1.0 {
            90.0_f64.copysign(sinp)
        } else {
            sinp.asin().to_degrees()
        };

        let siny_cosp = 2.0 * (w * z + x * y);
        let cosy_cosp = 1.0 - 2.0 * (y * y + z * z);
        let yaw = siny_cosp.atan2(cosy_cosp).to_degrees();

        Ypr { yaw, pitch, roll }
    }
}

/// `angle - offset`, folded back into [-180, 180].
pub fn offset_angle(angle: f64, offset: f64) -> f64 {
    let delta = angle - offset;
    if delta < -180.0 {
        delta + 360.0
    } else if delta > 180.0 {
        delta - 360.0
    } else {
        delta
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoseSample {
    pub index: usize,
    pub position_m: [f32; 3],
    pub rotation: Ypr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ControllerSlot {
    pub index: usize,
    pub controller_id: ControllerId,
    pub position_cm: Vector3,
    pub orientation: Quaternion,
    pub rotation: Ypr,
    pub offset: Ypr,
}

impl ControllerSlot {
    pub fn new(index: usize, controller_id: ControllerId) -> Self {
        Self {
            index,
            controller_id,
            position_cm: Vector3::default(),
            orientation: Quaternion::IDENTITY,
            rotation: Ypr::ZERO,
            offset: Ypr::ZERO,
        }
    }

    pub fn update(&mut self, position_cm: Vector3, orientation: Quaternion) {
        self.position_cm = position_cm;
        self.orientation = orientation;
        self.rotation = Ypr::from(orientation);
    }

    pub fn center(&mut self) {
        self.offset = self.rotation;
    }

    pub fn sample(&self) -> PoseSample {
        PoseSample {
            index: self.index,
            position_m: self.position_cm.scaled(CM_TO_METERS),
            rotation: self.rotation.relative_to(&self.offset),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn identity_quaternion_has_no_rotation() {
        let ypr = Ypr::from(Quaternion::IDENTITY);
        assert_eq!(ypr, Ypr::ZERO);
    }

    #[test]
    fn single_axis_rotations() {
        let yaw = Ypr::from(Quaternion::from_axis_angle(0.0, 0.0, 1.0, 45.0));
        assert_relative_eq!(yaw.yaw, 45.0, epsilon = 1e-4);
        assert_relative_eq!(yaw.pitch, 0.0, epsilon = 1e-4);
        assert_relative_eq!(yaw.roll, 0.0, epsilon = 1e-4);

        let pitch = Ypr::from(Quaternion::from_axis_angle(0.0, 1.0, 0.0, 30.0));
        assert_relative_eq!(pitch.pitch, 30.0, epsilon = 1e-4);

        let roll = Ypr::from(Quaternion::from_axis_angle(1.0, 0.0, 0.0, -60.0));
        assert_relative_eq!(roll.roll, -60.0, epsilon = 1e-4);
    }

    #[test]
    fn gimbal_lock_saturates_pitch() {
        let up = Ypr::from(Quaternion::new(1.0, 0.0, 1.0, 0.0));
        assert_eq!(up.pitch, 90.0);

        let down = Ypr::from(Quaternion::new(1.0, 0.0, -1.0, 0.0));
        assert_eq!(down.pitch, -90.0);

        let edge = Ypr::from(Quaternion::from_axis_angle(0.0, 1.0, 0.0, 90.0));
        assert!(!edge.pitch.is_nan());
        assert_relative_eq!(edge.pitch, 90.0, epsilon = 0.05);
    }

    #[test]
    fn offset_wraps_into_half_turn() {
        assert_eq!(offset_angle(190.0, 0.0), -170.0);
        assert_eq!(offset_angle(-190.0, 0.0), 170.0);
        assert_eq!(offset_angle(170.0, -20.0), -170.0);
        assert_eq!(offset_angle(180.0, 0.0), 180.0);
        assert_eq!(offset_angle(10.0, 30.0), -20.0);
    }

    #[test]
    fn centering_zeroes_current_rotation() {
        let mut slot = ControllerSlot::new(0, 7);
        let q = Quaternion::from_axis_angle(0.0, 0.0, 1.0, 120.0);
        slot.update(Vector3::new(100.0, -50.0, 25.0), q);
        assert_relative_eq!(slot.sample().rotation.yaw, 120.0, epsilon = 1e-3);

        slot.center();
        slot.update(Vector3::new(100.0, -50.0, 25.0), q);
        let sample = slot.sample();
        assert_relative_eq!(sample.rotation.yaw, 0.0, epsilon = 1e-9);
        assert_relative_eq!(sample.rotation.pitch, 0.0, epsilon = 1e-9);
        assert_relative_eq!(sample.rotation.roll, 0.0, epsilon = 1e-9);
        assert_eq!(sample.position_m, [1.0, -0.5, 0.25]);
    }
}
