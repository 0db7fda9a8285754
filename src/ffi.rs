use std::ffi::CString;
use std::os::raw::{c_char, c_int, c_uint};
use std::time::Duration;

use bytemuck::Zeroable;

use crate::capi::{PSMController, PSMControllerList, PSMOVESERVICE_MAX_CONTROLLER_COUNT};
use crate::error::{Error, Result};
use crate::pose::{Quaternion, Vector3};
use crate::protocol::{ControllerId, ResultCode};
use crate::service::{ControllerButtons, TrackingService};

#[link(name = "PSMoveClient_CAPI")]
extern "C" {
    fn PSM_Initialize(host: *const c_char, port: *const c_char, timeout_ms: c_int) -> c_int;
    fn PSM_Shutdown() -> c_int;
    fn PSM_Update() -> c_int;
    fn PSM_GetControllerList(out_list: *mut PSMControllerList, timeout_ms: c_int) -> c_int;
    fn PSM_GetController(controller_id: c_int) -> *mut PSMController;
    fn PSM_AllocateControllerListener(controller_id: c_int) -> c_int;
    fn PSM_FreeControllerListener(controller_id: c_int) -> c_int;
    fn PSM_StartControllerDataStream(controller_id: c_int, flags: c_uint, timeout_ms: c_int)
        -> c_int;
    fn PSM_StopControllerDataStream(controller_id: c_int, timeout_ms: c_int) -> c_int;
    fn PSM_GetControllerPosition(controller_id: c_int, out_position: *mut Vector3) -> c_int;
    fn PSM_GetControllerOrientation(controller_id: c_int, out_orientation: *mut Quaternion)
        -> c_int;
}

fn check(call: &'static str, raw: c_int) -> Result<()> {
    match ResultCode::from(raw) {
        ResultCode::Success => Ok(()),
        code => Err(Error::service(call, code)),
    }
}

fn timeout_ms(timeout: Duration) -> c_int {
    timeout.as_millis().min(c_int::MAX as u128) as c_int
}

/// Native client. The library keeps global state, so create only one.
#[derive(Debug, Default)]
pub struct PsmClient {
    initialized: bool,
}

impl PsmClient {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TrackingService for PsmClient {
    fn initialize(&mut self, address: &str, port: &str, timeout: Duration) -> Result<()> {
        let refused = || Error::ConnectionFailed {
            address: address.to_string(),
            port: port.to_string(),
        };
        let host = CString::new(address).map_err(|_| refused())?;
        let port_c = CString::new(port).map_err(|_| refused())?;
        // Safety: both strings are NUL terminated and outlive the call.
        check("initialize", unsafe {
            PSM_Initialize(host.as_ptr(), port_c.as_ptr(), timeout_ms(timeout))
        })?;
        self.initialized = true;
        Ok(())
    }

    fn shutdown(&mut self) -> Result<()> {
        if !self.initialized {
            return Ok(());
        }
        self.initialized = false;
        // Safety: the client was initialized by this instance.
        check("shutdown", unsafe { PSM_Shutdown() })
    }

    fn controller_list(&mut self, timeout: Duration) -> Result<Vec<ControllerId>> {
        let mut list = PSMControllerList::zeroed();
        // Safety: `list` is a valid, writable PSMControllerList.
        check("get_controller_list", unsafe {
            PSM_GetControllerList(&mut list, timeout_ms(timeout))
        })?;
        let count = (list.count.max(0) as usize).min(PSMOVESERVICE_MAX_CONTROLLER_COUNT);
        Ok(list.controller_id[..count].to_vec())
    }

    fn allocate_listener(&mut self, controller: ControllerId) -> Result<()> {
        // Safety: plain value arguments; the client checks the id.
        check("allocate_controller_listener", unsafe {
            PSM_AllocateControllerListener(controller)
        })
        .map_err(|_| Error::ListenerAllocation(controller))
    }

    fn free_listener(&mut self, controller: ControllerId) -> Result<()> {
        // Safety: plain value arguments; the client checks the id.
        check("free_controller_listener", unsafe {
            PSM_FreeControllerListener(controller)
        })
    }

    fn start_data_stream(
        &mut self,
        controller: ControllerId,
        flags: u32,
        timeout: Duration,
    ) -> Result<()> {
        // Safety: plain value arguments; the client checks the id.
        let raw = unsafe { PSM_StartControllerDataStream(controller, flags, timeout_ms(timeout)) };
        match ResultCode::from(raw) {
            ResultCode::Success => Ok(()),
            code => Err(Error::StreamStart { controller, code }),
        }
    }

    fn stop_data_stream(&mut self, controller: ControllerId, timeout: Duration) -> Result<()> {
        // Safety: plain value arguments; the client checks the id.
        check("stop_controller_data_stream", unsafe {
            PSM_StopControllerDataStream(controller, timeout_ms(timeout))
        })
    }

    fn update(&mut self) -> Result<()> {
        // Safety: no arguments; fails with a result code when not initialized.
        check("update", unsafe { PSM_Update() })
    }

    fn position(&self, controller: ControllerId) -> Result<Vector3> {
        let mut position = Vector3::zeroed();
        // Safety: Vector3 is repr(C) with the layout of PSMVector3f.
        check("get_controller_position", unsafe {
            PSM_GetControllerPosition(controller, &mut position)
        })?;
        Ok(position)
    }

    fn orientation(&self, controller: ControllerId) -> Result<Quaternion> {
        let mut orientation = Quaternion::zeroed();
        // Safety: Quaternion is repr(C) with the layout of PSMQuatf.
        check("get_controller_orientation", unsafe {
            PSM_GetControllerOrientation(controller, &mut orientation)
        })?;
        Ok(orientation)
    }

    fn buttons(&self, controller: ControllerId) -> Result<ControllerButtons> {
        // Safety: the client returns null or a view it owns until the listener
        // is freed. The view is only read, within its mirrored prefix.
        let view = unsafe { PSM_GetController(controller).as_ref() }
            .ok_or(Error::ControllerNotFound(controller))?;
        view.psmove_buttons()
            .ok_or(Error::Unsupported("buttons of a non-PSMove controller"))
    }
}

impl Drop for PsmClient {
    fn drop(&mut self) {
        let _ = self.shutdown();
    }
}
