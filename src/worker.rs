use std::io::{self, Write};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use log::{debug, warn};

use crate::display;
use crate::error::{Error, Result};
use crate::manager::{lock, StreamingController};
use crate::pose::{ControllerSlot, PoseSample};
use crate::recorder::CaptureRecorder;
use crate::service::TrackingService;
use crate::session::SessionState;
use crate::ticker::FrameTicker;

#[derive(Debug, Clone, PartialEq)]
pub struct FrameReport {
    pub fps: u32,
    pub recording: bool,
    pub centered: bool,
    pub samples: Vec<PoseSample>,
}

/// One pass of the capture loop: poll poses, apply centering, draw the
/// console and append to the capture file while recording.
pub struct CaptureLoop<S: TrackingService, W: Write> {
    service: Arc<Mutex<S>>,
    session: Arc<SessionState>,
    slots: Vec<ControllerSlot>,
    recorder: Option<CaptureRecorder<W>>,
    console: Box<dyn Write + Send>,
    shown_title: Option<bool>,
}

impl<S: TrackingService, W: Write> CaptureLoop<S, W> {
    pub fn new(
        service: Arc<Mutex<S>>,
        session: Arc<SessionState>,
        controllers: &[StreamingController],
        recorder: Option<CaptureRecorder<W>>,
    ) -> Self {
        Self {
            service,
            session,
            slots: controllers
                .iter()
                .map(|c| ControllerSlot::new(c.index, c.id))
                .collect(),
            recorder,
            console: Box::new(io::stdout()),
            shown_title: None,
        }
    }

    pub fn with_console(mut self, console: Box<dyn Write + Send>) -> Self {
        self.console = console;
        self
    }

    pub fn slots(&self) -> &[ControllerSlot] {
        &self.slots
    }

    pub fn samples_written(&self) -> u64 {
        self.recorder.as_ref().map_or(0, |r| r.samples_written())
    }

    pub fn step(&mut self) -> FrameReport {
        let centered = self.session.take_centering();
        let recording = self.session.is_recording();
        let fps = self.session.target_fps();

        let samples = self.poll_poses(centered);

        if self.shown_title != Some(recording) {
            if let Err(e) = display::set_console_title(&mut self.console, recording) {
                debug!("Console title update failed: {e}");
            }
            self.shown_title = Some(recording);
        }
        if let Err(e) = display::render_frame(&mut self.console, fps, recording, &samples) {
            debug!("Console write failed: {e}");
        }

        if recording {
            self.record(&samples);
        }

        FrameReport {
            fps,
            recording,
            centered,
            samples,
        }
    }

    fn poll_poses(&mut self, centered: bool) -> Vec<PoseSample> {
        let mut service = lock(&self.service);
        if let Err(e) = service.update() {
            warn!("Tracking service update failed: {e}");
        }

        let mut samples = Vec::with_capacity(self.slots.len());
        for slot in &mut self.slots {
            let pose = service
                .position(slot.controller_id)
                .and_then(|position| Ok((position, service.orientation(slot.controller_id)?)));

            let read = match pose {
                Ok((position, orientation)) => {
                    slot.update(position, orientation);
                    true
                }
                Err(e) => {
                    debug!("Controller {}: pose read failed: {e}", slot.controller_id);
                    false
                }
            };
            // a missed read centers on the last known rotation
            if centered {
                slot.center();
            }
            if read {
                samples.push(slot.sample());
            }
        }
        samples
    }

    fn record(&mut self, samples: &[PoseSample]) {
        let Some(recorder) = self.recorder.as_mut() else {
            return;
        };

        let written = samples
            .iter()
            .try_for_each(|sample| recorder.write_sample(sample))
            .and_then(|()| recorder.flush());

        if let Err(e) = written {
            warn!("Writing capture file failed, recording stopped: {e}");
            self.session.set_recording(false);
        }
    }

    pub fn finish(self) -> Result<Option<W>> {
        match self.recorder {
            Some(recorder) => Ok(Some(recorder.into_inner()?)),
            None => Ok(None),
        }
    }
}

/// Runs a `CaptureLoop` on its own thread at the session's target rate until
/// the session stops.
pub struct PoseWorker<S: TrackingService, W: Write> {
    session: Arc<SessionState>,
    handle: Option<JoinHandle<CaptureLoop<S, W>>>,
}

impl<S, W> PoseWorker<S, W>
where
    S: TrackingService + Send + 'static,
    W: Write + Send + 'static,
{
    pub fn spawn(mut capture: CaptureLoop<S, W>) -> Result<Self> {
        let session = Arc::clone(&capture.session);
        let loop_session = Arc::clone(&session);

        let handle = thread::Builder::new()
            .name("pose-worker".to_string())
            .spawn(move || {
                let mut ticker = FrameTicker::new();
                while loop_session.is_running() {
                    ticker.wait(loop_session.target_fps());
                    if !loop_session.is_running() {
                        break;
                    }
                    capture.step();
                }
                capture
            })?;

        Ok(Self {
            session,
            handle: Some(handle),
        })
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    pub fn join(mut self) -> Result<CaptureLoop<S, W>> {
        self.session.stop();
        let handle = self.handle.take().ok_or(Error::WorkerPanicked)?;
        handle.join().map_err(|_| Error::WorkerPanicked)
    }
}

impl<S: TrackingService, W: Write> Drop for PoseWorker<S, W> {
    fn drop(&mut self) {
        self.session.stop();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
