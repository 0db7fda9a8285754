use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::protocol::FPS_HIGH;

/// Flags shared between the input loop and the capture worker.
#[derive(Debug)]
pub struct SessionState {
    running: AtomicBool,
    recording: AtomicBool,
    centering: AtomicBool,
    target_fps: AtomicU32,
}

impl SessionState {
    pub fn new(target_fps: u32) -> Result<Arc<Self>> {
        if target_fps == 0 {
            return Err(Error::InvalidFrameRate(target_fps));
        }
        Ok(Arc::new(Self {
            running: AtomicBool::new(true),
            recording: AtomicBool::new(false),
            centering: AtomicBool::new(false),
            target_fps: AtomicU32::new(target_fps),
        }))
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    pub fn is_recording(&self) -> bool {
        self.recording.load(Ordering::SeqCst)
    }

    pub fn set_recording(&self, on: bool) {
        self.recording.store(on, Ordering::SeqCst);
    }

    pub fn request_centering(&self) {
        self.centering.store(true, Ordering::SeqCst);
    }

    /// Returns whether centering was requested and clears the request.
    pub fn take_centering(&self) -> bool {
        self.centering.swap(false, Ordering::SeqCst)
    }

    pub fn target_fps(&self) -> u32 {
        self.target_fps.load(Ordering::SeqCst)
    }

    pub fn set_target_fps(&self, fps: u32) -> Result<()> {
        if fps == 0 {
            return Err(Error::InvalidFrameRate(fps));
        }
        self.target_fps.store(fps, Ordering::SeqCst);
        Ok(())
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            running: AtomicBool::new(true),
            recording: AtomicBool::new(false),
            centering: AtomicBool::new(false),
            target_fps: AtomicU32::new(FPS_HIGH),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let state = SessionState::default();
        assert!(state.is_running());
        assert!(!state.is_recording());
        assert_eq!(state.target_fps(), 60);
    }

    #[test]
    fn centering_is_consumed_once() {
        let state = SessionState::new(30).unwrap();
        state.request_centering();
        state.request_centering();
        assert!(state.take_centering());
        assert!(!state.take_centering());
    }

    #[test]
    fn zero_fps_is_rejected() {
        assert!(matches!(
            SessionState::new(0),
            Err(Error::InvalidFrameRate(0))
        ));
        let state = SessionState::new(1).unwrap();
        assert!(state.set_target_fps(0).is_err());
        assert_eq!(state.target_fps(), 1);
    }
}
