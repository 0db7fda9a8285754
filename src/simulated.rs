use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::error::{Error, Result};
use crate::pose::{Quaternion, Vector3};
use crate::protocol::{ControllerId, ResultCode};
use crate::service::{ControllerButtons, TrackingService};

const STEP_DEGREES: f32 = 2.0;
const ORBIT_RADIUS_CM: f32 = 20.0;
const HEIGHT_CM: f32 = 100.0;

#[derive(Debug, Default)]
struct ControlState {
    buttons: HashMap<ControllerId, ControllerButtons>,
    lost: HashSet<ControllerId>,
}

/// Shared handle for pressing buttons and dropping tracking on a
/// `SimulatedService` that has already been handed off.
#[derive(Debug, Clone, Default)]
pub struct SimulatedControls {
    state: Arc<Mutex<ControlState>>,
}

impl SimulatedControls {
    fn state(&self) -> MutexGuard<'_, ControlState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_buttons(&self, controller: ControllerId, buttons: ControllerButtons) {
        self.state().buttons.insert(controller, buttons);
    }

    /// While lost, pose reads for the controller report no data.
    pub fn set_tracking_lost(&self, controller: ControllerId, lost: bool) {
        let mut state = self.state();
        if lost {
            state.lost.insert(controller);
        } else {
            state.lost.remove(&controller);
        }
    }
}

pub struct SimulatedService {
    controller_count: usize,
    stationary: bool,
    fail_initialize: bool,
    failing_streams: HashSet<ControllerId>,
    initialized: bool,
    shutdown_calls: usize,
    step: u64,
    listeners: HashSet<ControllerId>,
    streaming: HashSet<ControllerId>,
    controls: SimulatedControls,
    last_stream_flags: Option<u32>,
}

impl SimulatedService {
    pub fn new(controller_count: usize) -> Self {
        Self {
            controller_count,
            stationary: false,
            fail_initialize: false,
            failing_streams: HashSet::new(),
            initialized: false,
            shutdown_calls: 0,
            step: 0,
            listeners: HashSet::new(),
            streaming: HashSet::new(),
            controls: SimulatedControls::default(),
            last_stream_flags: None,
        }
    }

    /// Controllers hold their starting pose forever.
    pub fn stationary(mut self) -> Self {
        self.stationary = true;
        self
    }

    pub fn refuse_connection(mut self) -> Self {
        self.fail_initialize = true;
        self
    }

    /// `start_data_stream` for this controller will time out.
    pub fn fail_stream(mut self, controller: ControllerId) -> Self {
        self.failing_streams.insert(controller);
        self
    }

    pub fn controls(&self) -> SimulatedControls {
        self.controls.clone()
    }

    pub fn set_buttons(&self, controller: ControllerId, buttons: ControllerButtons) {
        self.controls.set_buttons(controller, buttons);
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn shutdown_calls(&self) -> usize {
        self.shutdown_calls
    }

    pub fn is_streaming(&self, controller: ControllerId) -> bool {
        self.streaming.contains(&controller)
    }

    pub fn has_listener(&self, controller: ControllerId) -> bool {
        self.listeners.contains(&controller)
    }

    pub fn last_stream_flags(&self) -> Option<u32> {
        self.last_stream_flags
    }

    fn known(&self, controller: ControllerId) -> Result<()> {
        if controller >= 0 && (controller as usize) < self.controller_count {
            Ok(())
        } else {
            Err(Error::ControllerNotFound(controller))
        }
    }

    fn require_stream(&self, controller: ControllerId, call: &'static str) -> Result<()> {
        self.known(controller)?;
        let tracked = !self.controls.state().lost.contains(&controller);
        if self.streaming.contains(&controller) && tracked {
            Ok(())
        } else {
            Err(Error::service(call, ResultCode::NoData))
        }
    }

    fn angle_degrees(&self, controller: ControllerId) -> f32 {
        let phase = controller as f32 * 45.0;
        if self.stationary {
            phase
        } else {
            phase + self.step as f32 * STEP_DEGREES
        }
    }
}

impl TrackingService for SimulatedService {
    fn initialize(&mut self, _address: &str, _port: &str, _timeout: Duration) -> Result<()> {
        if self.fail_initialize {
            return Err(Error::service("initialize", ResultCode::Timeout));
        }
        self.initialized = true;
        Ok(())
    }

    fn shutdown(&mut self) -> Result<()> {
        self.initialized = false;
        self.shutdown_calls += 1;
        Ok(())
    }

    fn controller_list(&mut self, _timeout: Duration) -> Result<Vec<ControllerId>> {
        if !self.initialized {
            return Err(Error::service("get_controller_list", ResultCode::Error));
        }
        Ok((0..self.controller_count as ControllerId).collect())
    }

    fn allocate_listener(&mut self, controller: ControllerId) -> Result<()> {
        self.known(controller)?;
        self.listeners.insert(controller);
        Ok(())
    }

    fn free_listener(&mut self, controller: ControllerId) -> Result<()> {
        self.known(controller)?;
        self.listeners.remove(&controller);
        Ok(())
    }

    fn start_data_stream(
        &mut self,
        controller: ControllerId,
        flags: u32,
        _timeout: Duration,
    ) -> Result<()> {
        self.known(controller)?;
        if !self.listeners.contains(&controller) {
            return Err(Error::ListenerAllocation(controller));
        }
        if self.failing_streams.contains(&controller) {
            return Err(Error::StreamStart {
                controller,
                code: ResultCode::Timeout,
            });
        }
        self.last_stream_flags = Some(flags);
        self.streaming.insert(controller);
        Ok(())
    }

    fn stop_data_stream(&mut self, controller: ControllerId, _timeout: Duration) -> Result<()> {
        self.known(controller)?;
        self.streaming.remove(&controller);
        Ok(())
    }

    fn update(&mut self) -> Result<()> {
        if !self.initialized {
            return Err(Error::service("update", ResultCode::Error));
        }
        self.step += 1;
        Ok(())
    }

    fn position(&self, controller: ControllerId) -> Result<Vector3> {
        self.require_stream(controller, "get_controller_position")?;
        let angle = self.angle_degrees(controller).to_radians();
        Ok(Vector3::new(
            ORBIT_RADIUS_CM * angle.cos(),
            HEIGHT_CM + 10.0 * controller as f32,
            ORBIT_RADIUS_CM * angle.sin(),
        ))
    }

    fn orientation(&self, controller: ControllerId) -> Result<Quaternion> {
        self.require_stream(controller, "get_controller_orientation")?;
        Ok(Quaternion::from_axis_angle(
            0.0,
            0.0,
            1.0,
            self.angle_degrees(controller),
        ))
    }

    fn buttons(&self, controller: ControllerId) -> Result<ControllerButtons> {
        self.known(controller)?;
        Ok(self
            .controls
            .state()
            .buttons
            .get(&controller)
            .copied()
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose::Ypr;
    use crate::protocol::{ButtonState, CAPTURE_STREAM_FLAGS, DEFAULT_TIMEOUT};

    fn started(count: usize) -> SimulatedService {
        let mut service = SimulatedService::new(count);
        service.initialize("localhost", "9512", DEFAULT_TIMEOUT).unwrap();
        for id in service.controller_list(DEFAULT_TIMEOUT).unwrap() {
            service.allocate_listener(id).unwrap();
            service
                .start_data_stream(id, CAPTURE_STREAM_FLAGS, DEFAULT_TIMEOUT)
                .unwrap();
        }
        service
    }

    #[test]
    fn list_requires_initialize() {
        let mut service = SimulatedService::new(2);
        assert!(service.controller_list(DEFAULT_TIMEOUT).is_err());
        service.initialize("localhost", "9512", DEFAULT_TIMEOUT).unwrap();
        assert_eq!(service.controller_list(DEFAULT_TIMEOUT).unwrap(), vec![0, 1]);
    }

    #[test]
    fn poses_need_a_stream() {
        let mut service = SimulatedService::new(1);
        service.initialize("localhost", "9512", DEFAULT_TIMEOUT).unwrap();
        assert!(service.position(0).is_err());
        assert!(matches!(
            service.orientation(5),
            Err(Error::ControllerNotFound(5))
        ));
    }

    #[test]
    fn moving_controllers_turn_each_update() {
        let mut service = started(1);
        let before = Ypr::from(service.orientation(0).unwrap()).yaw;
        service.update().unwrap();
        let after = Ypr::from(service.orientation(0).unwrap()).yaw;
        approx::assert_relative_eq!(after - before, STEP_DEGREES as f64, epsilon = 1e-3);
    }

    #[test]
    fn stationary_controllers_hold_pose() {
        let mut service = started(1).stationary();
        let before = service.orientation(0).unwrap();
        service.update().unwrap();
        assert_eq!(service.orientation(0).unwrap(), before);
    }

    #[test]
    fn lost_tracking_reports_no_data() {
        let service = started(2);
        let controls = service.controls();
        controls.set_tracking_lost(1, true);
        assert!(service.position(0).is_ok());
        assert!(matches!(
            service.orientation(1),
            Err(Error::Service {
                code: ResultCode::NoData,
                ..
            })
        ));
        controls.set_tracking_lost(1, false);
        assert!(service.orientation(1).is_ok());
    }

    #[test]
    fn buttons_default_to_up() {
        let service = started(2);
        assert_eq!(service.buttons(1).unwrap(), ControllerButtons::default());
        service.set_buttons(
            1,
            ControllerButtons {
                cross: ButtonState::Down,
                ..Default::default()
            },
        );
        assert_eq!(service.buttons(1).unwrap().cross, ButtonState::Down);
    }
}
