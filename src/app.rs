use std::fs::File;
use std::io::{self, BufWriter};
use std::ops::ControlFlow;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use log::{debug, info, warn};

use crate::display;
use crate::error::Result;
use crate::input::{ButtonTracker, InputEvent, InputSource};
use crate::manager::ServiceConnection;
use crate::protocol::{DEFAULT_ADDRESS, DEFAULT_PORT, DEFAULT_TIMEOUT, FPS_HIGH};
use crate::recorder::CaptureRecorder;
use crate::service::TrackingService;
use crate::session::SessionState;
use crate::worker::{CaptureLoop, PoseWorker};

const INPUT_POLL_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Debug, Clone)]
pub struct CaptureOptions {
    pub address: String,
    pub port: String,
    pub timeout: Duration,
    pub output_dir: PathBuf,
    pub target_fps: u32,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS.to_string(),
            port: DEFAULT_PORT.to_string(),
            timeout: DEFAULT_TIMEOUT,
            output_dir: PathBuf::from("."),
            target_fps: FPS_HIGH,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionSummary {
    pub connected: bool,
    pub controller_count: usize,
    pub capture_path: Option<PathBuf>,
    pub samples_written: u64,
}

/// Applies one input event to the session. `Break` means exit.
pub fn apply_event(session: &SessionState, event: InputEvent) -> ControlFlow<()> {
    match event {
        InputEvent::Exit => return ControlFlow::Break(()),
        InputEvent::SetFrameRate(fps) => {
            if let Err(e) = session.set_target_fps(fps) {
                warn!("{e}");
            }
        }
        InputEvent::StartRecording => session.set_recording(true),
        InputEvent::StopRecording => session.set_recording(false),
        InputEvent::Center => session.request_centering(),
    }
    ControlFlow::Continue(())
}

type FileRecorder = CaptureRecorder<BufWriter<File>>;

fn open_capture_file(
    options: &CaptureOptions,
    controller_count: usize,
) -> Option<(FileRecorder, PathBuf)> {
    match CaptureRecorder::create(&options.output_dir, &Local::now(), controller_count) {
        Ok((recorder, path)) => {
            info!("Capture file: {}", path.display());
            Some((recorder, path))
        }
        Err(e) => {
            warn!(
                "Could not create capture file in {}: {e}; recording disabled",
                options.output_dir.display()
            );
            None
        }
    }
}

/// Runs a whole capture session on `service` and returns once `input`
/// produces an exit event.
pub fn run<S, I>(service: S, input: &mut I, options: &CaptureOptions) -> Result<SessionSummary>
where
    S: TrackingService + Send + 'static,
    I: InputSource + ?Sized,
{
    if let Err(e) = display::set_console_title(&mut io::stdout(), false) {
        debug!("Console title update failed: {e}");
    }
    let session = SessionState::new(options.target_fps)?;

    let mut connection =
        match ServiceConnection::connect(service, &options.address, &options.port, options.timeout) {
            Ok(connection) => Some(connection),
            Err(e) => {
                warn!("{e}");
                None
            }
        };
    let connected = connection.as_ref().is_some_and(|c| c.is_connected());
    if connected {
        println!("PSM connected");
    } else {
        println!("PSM not connected");
    }

    let controller_count = connection.as_ref().map_or(0, |c| c.controller_count());
    let capture_file = open_capture_file(options, controller_count);
    let capture_path = capture_file.as_ref().map(|(_, path)| path.clone());
    println!("Controllers count = {controller_count}");

    let worker = match connection.as_ref().filter(|c| c.is_connected()) {
        Some(c) => {
            let capture = CaptureLoop::new(
                c.service(),
                Arc::clone(&session),
                c.streaming_controllers(),
                capture_file.map(|(recorder, _)| recorder),
            );
            Some(PoseWorker::spawn(capture)?)
        }
        None => {
            // header only; nothing will be sampled
            if let Some((recorder, _)) = capture_file {
                recorder.into_inner()?;
            }
            None
        }
    };

    let mut buttons = ButtonTracker::new();
    'input: loop {
        let mut events: Vec<InputEvent> =
            input.next_event(INPUT_POLL_INTERVAL).into_iter().collect();
        if let Some(c) = connection.as_ref().filter(|c| c.is_connected()) {
            events.extend(buttons.events(&c.poll_buttons()));
        }
        for event in events {
            if apply_event(&session, event).is_break() {
                break 'input;
            }
        }
    }

    session.stop();
    let samples_written = match worker {
        Some(worker) => {
            let capture = worker.join()?;
            let written = capture.samples_written();
            capture.finish()?;
            written
        }
        None => 0,
    };

    if let Some(connection) = connection.as_mut() {
        connection.close()?;
    }
    info!("Capture session ended, {samples_written} sample(s) recorded");

    Ok(SessionSummary {
        connected,
        controller_count,
        capture_path,
        samples_written,
    })
}
