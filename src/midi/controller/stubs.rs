use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::bridge::shutdown::ShutdownTrigger;
use crate::midi::model::{ControlEvent, InputStream, MidiDevice, MidiTransport, TransportError};

pub enum ReadStep {
    Events(Vec<ControlEvent>),
    Fail,
    /// This read and every later read on the same stream fail, the way a
    /// stream behaves once its port is gone. The next stream resumes the script.
    Unplugged,
}

#[derive(Default)]
struct Shared {
    script: Mutex<VecDeque<ReadStep>>,
    on_drained: Mutex<Option<ShutdownTrigger>>,
    opened: AtomicUsize,
    closed: AtomicUsize,
}

/// In-memory transport replaying a fixed script of reads.
/// Once the script runs dry the shutdown trigger (if any) is fired.
pub struct ScriptedTransport {
    devices: Vec<Option<MidiDevice>>,
    open_results: Mutex<VecDeque<bool>>,
    shared: Arc<Shared>,
}

impl ScriptedTransport {
    pub fn new(devices: Vec<Option<MidiDevice>>) -> ScriptedTransport {
        let devices = devices
            .into_iter()
            .enumerate()
            .map(|(index, d)| d.map(|d| MidiDevice { index, ..d }))
            .collect();
        ScriptedTransport {
            devices,
            open_results: Mutex::new(VecDeque::new()),
            shared: Arc::new(Shared::default()),
        }
    }

    pub fn with_reads(self, steps: Vec<ReadStep>) -> ScriptedTransport {
        *self.shared.script.lock().unwrap() = steps.into();
        self
    }

    /// Outcomes of the next `open_input` calls; opens succeed once exhausted.
    pub fn with_open_results(self, results: Vec<bool>) -> ScriptedTransport {
        *self.open_results.lock().unwrap() = results.into();
        self
    }

    pub fn shutdown_when_drained(self, trigger: ShutdownTrigger) -> ScriptedTransport {
        *self.shared.on_drained.lock().unwrap() = Some(trigger);
        self
    }

    pub fn opened(&self) -> usize {
        self.shared.opened.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.shared.closed.load(Ordering::SeqCst)
    }
}

impl MidiTransport for ScriptedTransport {
    fn count_devices(&self) -> usize {
        self.devices.len()
    }

    fn device_info(&self, index: usize) -> Option<MidiDevice> {
        self.devices.get(index).cloned().flatten()
    }

    fn open_input(
        &self,
        device: &MidiDevice,
        _buffer_capacity: usize,
    ) -> Result<Box<dyn InputStream>, TransportError> {
        if !self.open_results.lock().unwrap().pop_front().unwrap_or(true) {
            return Err(TransportError::Open {
                name: device.name.clone(),
                reason: "scripted failure".to_string(),
            });
        }
        self.shared.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(ScriptedStream {
            name: device.name.clone(),
            shared: self.shared.clone(),
            unplugged: false,
        }))
    }
}

struct ScriptedStream {
    name: String,
    shared: Arc<Shared>,
    unplugged: bool,
}

impl InputStream for ScriptedStream {
    fn read(&mut self, max_events: usize) -> Result<Vec<ControlEvent>, TransportError> {
        if self.unplugged {
            return Err(TransportError::Disconnected(self.name.clone()));
        }
        let step = self.shared.script.lock().unwrap().pop_front();
        match step {
            Some(ReadStep::Events(mut events)) => {
                events.truncate(max_events);
                Ok(events)
            }
            Some(ReadStep::Fail) => Err(TransportError::Disconnected(self.name.clone())),
            Some(ReadStep::Unplugged) => {
                self.unplugged = true;
                Err(TransportError::Disconnected(self.name.clone()))
            }
            None => {
                if let Some(trigger) = self.shared.on_drained.lock().unwrap().take() {
                    trigger.fire();
                }
                Ok(Vec::new())
            }
        }
    }

    fn close(self: Box<Self>) {
        self.shared.closed.fetch_add(1, Ordering::SeqCst);
    }
}
