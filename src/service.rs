use std::time::Duration;

use crate::error::Result;
use crate::pose::{Quaternion, Vector3};
use crate::protocol::{ButtonState, ControllerId};

/// Buttons that drive the capture session from the controller itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ControllerButtons {
    pub move_button: ButtonState,
    pub cross: ButtonState,
    pub circle: ButtonState,
}

pub trait TrackingService {
    fn initialize(&mut self, address: &str, port: &str, timeout: Duration) -> Result<()>;

    fn shutdown(&mut self) -> Result<()>;

    fn controller_list(&mut self, timeout: Duration) -> Result<Vec<ControllerId>>;

    fn allocate_listener(&mut self, controller: ControllerId) -> Result<()>;

    fn free_listener(&mut self, controller: ControllerId) -> Result<()>;

    fn start_data_stream(
        &mut self,
        controller: ControllerId,
        flags: u32,
        timeout: Duration,
    ) -> Result<()>;

    fn stop_data_stream(&mut self, controller: ControllerId, timeout: Duration) -> Result<()>;

    /// Pulls pending state from the service into the local controller views.
    fn update(&mut self) -> Result<()>;

    fn position(&self, controller: ControllerId) -> Result<Vector3>;

    fn orientation(&self, controller: ControllerId) -> Result<Quaternion>;

    fn buttons(&self, controller: ControllerId) -> Result<ControllerButtons>;
}

impl<T: TrackingService + ?Sized> TrackingService for Box<T> {
    fn initialize(&mut self, address: &str, port: &str, timeout: Duration) -> Result<()> {
        (**self).initialize(address, port, timeout)
    }

    fn shutdown(&mut self) -> Result<()> {
        (**self).shutdown()
    }

    fn controller_list(&mut self, timeout: Duration) -> Result<Vec<ControllerId>> {
        (**self).controller_list(timeout)
    }

    fn allocate_listener(&mut self, controller: ControllerId) -> Result<()> {
        (**self).allocate_listener(controller)
    }

    fn free_listener(&mut self, controller: ControllerId) -> Result<()> {
        (**self).free_listener(controller)
    }

    fn start_data_stream(
        &mut self,
        controller: ControllerId,
        flags: u32,
        timeout: Duration,
    ) -> Result<()> {
        (**self).start_data_stream(controller, flags, timeout)
    }

    fn stop_data_stream(&mut self, controller: ControllerId, timeout: Duration) -> Result<()> {
        (**self).stop_data_stream(controller, timeout)
    }

    fn update(&mut self) -> Result<()> {
        (**self).update()
    }

    fn position(&self, controller: ControllerId) -> Result<Vector3> {
        (**self).position(controller)
    }

    fn orientation(&self, controller: ControllerId) -> Result<Quaternion> {
        (**self).orientation(controller)
    }

    fn buttons(&self, controller: ControllerId) -> Result<ControllerButtons> {
        (**self).buttons(controller)
    }
}
