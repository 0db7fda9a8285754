mod app;
#[cfg(any(test, feature = "psmoveservice"))]
mod capi;
mod config;
mod display;
mod error;
#[cfg(feature = "psmoveservice")]
mod ffi;
mod input;
mod keyboard;
mod manager;
mod pose;
mod protocol;
mod recorder;
mod service;
mod session;
mod simulated;
mod ticker;
mod worker;

pub use app::{apply_event, run, CaptureOptions, SessionSummary};
pub use config::Config;
pub use display::{render_frame, sample_line, status_line};
pub use error::{Error, Result};
#[cfg(feature = "psmoveservice")]
pub use ffi::PsmClient;
pub use input::{
    ButtonTracker, ControllerButton, EdgeDetector, InputEvent, InputSource, Key, ScriptedInput,
};
pub use keyboard::{platform_input, StdinCommands};
#[cfg(windows)]
pub use keyboard::AsyncKeyboard;
pub use manager::{ServiceConnection, StreamingController};
pub use pose::{offset_angle, ControllerSlot, PoseSample, Quaternion, Vector3, Ypr};
pub use protocol::{
    ButtonState, ControllerId, ResultCode, CAPTURE_STREAM_FLAGS, CM_TO_METERS, DEFAULT_ADDRESS,
    DEFAULT_PORT, DEFAULT_TIMEOUT, MAX_CONTROLLER_COUNT,
};
pub use recorder::{capture_file_name, CaptureRecorder};
pub use service::{ControllerButtons, TrackingService};
pub use session::SessionState;
pub use simulated::{SimulatedControls, SimulatedService};
pub use ticker::{frame_period, FrameTicker};
pub use worker::{CaptureLoop, FrameReport, PoseWorker};
