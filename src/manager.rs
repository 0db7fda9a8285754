use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use log::{debug, info, warn};

use crate::error::{Error, Result};
use crate::protocol::{ControllerId, CAPTURE_STREAM_FLAGS, MAX_CONTROLLER_COUNT};
use crate::service::{ControllerButtons, TrackingService};

/// A controller whose data stream is running, with its position in the
/// service's controller list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamingController {
    pub index: usize,
    pub id: ControllerId,
}

/// Owns the client connection and every listener/stream opened on it.
/// Dropping it stops the streams, frees the listeners and shuts the client down.
pub struct ServiceConnection<S: TrackingService> {
    service: Arc<Mutex<S>>,
    controllers: Vec<ControllerId>,
    listeners: Vec<ControllerId>,
    streaming: Vec<StreamingController>,
    timeout: Duration,
    open: bool,
}

pub(crate) fn lock<S>(service: &Mutex<S>) -> MutexGuard<'_, S> {
    // a panicking worker must not block teardown
    service.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<S: TrackingService> ServiceConnection<S> {
    /// Initializes the client and starts a data stream for every listed
    /// controller. Individual controllers may fail; the connection counts as
    /// connected when at least one stream is running.
    pub fn connect(mut service: S, address: &str, port: &str, timeout: Duration) -> Result<Self> {
        if let Err(e) = service.initialize(address, port, timeout) {
            warn!("Tracking service initialize failed: {e}");
            return Err(Error::ConnectionFailed {
                address: address.to_string(),
                port: port.to_string(),
            });
        }

        let mut controllers = match service.controller_list(timeout) {
            Ok(list) => list,
            Err(e) => {
                warn!("Could not fetch controller list: {e}");
                Vec::new()
            }
        };
        if controllers.len() > MAX_CONTROLLER_COUNT {
            warn!(
                "Service reported {} controllers, only the first {} are captured",
                controllers.len(),
                MAX_CONTROLLER_COUNT
            );
            controllers.truncate(MAX_CONTROLLER_COUNT);
        }

        let mut connection = Self {
            service: Arc::new(Mutex::new(service)),
            controllers,
            listeners: Vec::new(),
            streaming: Vec::new(),
            timeout,
            open: true,
        };
        connection.start_all_streams();

        info!(
            "{} of {} controller stream(s) started",
            connection.streaming.len(),
            connection.controllers.len()
        );
        Ok(connection)
    }

    fn start_all_streams(&mut self) {
        let mut service = lock(&self.service);

        for (index, &id) in self.controllers.iter().enumerate() {
            if let Err(e) = service.allocate_listener(id) {
                warn!("Controller {id}: listener allocation failed: {e}");
                continue;
            }
            self.listeners.push(id);

            match service.start_data_stream(id, CAPTURE_STREAM_FLAGS, self.timeout) {
                Ok(()) => self.streaming.push(StreamingController { index, id }),
                Err(e) => warn!("Controller {id}: data stream did not start: {e}"),
            }
        }
    }

    pub fn is_connected(&self) -> bool {
        !self.streaming.is_empty()
    }

    pub fn controller_count(&self) -> usize {
        self.controllers.len()
    }

    pub fn streaming_controllers(&self) -> &[StreamingController] {
        &self.streaming
    }

    pub fn service(&self) -> Arc<Mutex<S>> {
        Arc::clone(&self.service)
    }

    pub fn poll_buttons(&self) -> Vec<(usize, ControllerButtons)> {
        let service = lock(&self.service);
        self.streaming
            .iter()
            .filter_map(|c| match service.buttons(c.id) {
                Ok(buttons) => Some((c.index, buttons)),
                Err(e) => {
                    debug!("Controller {}: button read failed: {e}", c.id);
                    None
                }
            })
            .collect()
    }

    pub fn close(&mut self) -> Result<()> {
        if !self.open {
            return Ok(());
        }
        self.open = false;

        let mut service = lock(&self.service);
        let mut first_error = None;

        for c in self.streaming.drain(..) {
            if let Err(e) = service.stop_data_stream(c.id, self.timeout) {
                warn!("Controller {}: stopping data stream failed: {e}", c.id);
                first_error.get_or_insert(e);
            }
        }
        for id in self.listeners.drain(..) {
            if let Err(e) = service.free_listener(id) {
                warn!("Controller {id}: freeing listener failed: {e}");
                first_error.get_or_insert(e);
            }
        }
        if let Err(e) = service.shutdown() {
            first_error.get_or_insert(e);
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl<S: TrackingService> Drop for ServiceConnection<S> {
    fn drop(&mut self) {
        let _ = self.close();
    }
}
