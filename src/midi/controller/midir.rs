use crossbeam_channel as cch;
use midir::{MidiInput, MidiInputConnection, MidiOutput};
use std::time::{Duration, Instant};
use tracing::{debug, info, trace, warn};

use crate::midi::model::{ControlEvent, InputStream, MidiDevice, MidiTransport, TransportError};

/// How often an open stream checks that its port is still enumerated.
const PORT_CHECK_INTERVAL: Duration = Duration::from_secs(1);

/// Transport handle backed by the system MIDI API through `midir`.
///
/// Devices are listed input ports first, then output ports. Output ports are
/// reported with `supports_input = false`.
pub struct MidirTransport {
    client_name: String,
}

impl MidirTransport {
    pub fn initialize(client_name: &str) -> Result<MidirTransport, TransportError> {
        MidiInput::new(client_name).map_err(|e| TransportError::Init(e.to_string()))?;
        info!("MIDI transport initialised as '{client_name}'");
        Ok(MidirTransport {
            client_name: client_name.to_string(),
        })
    }

    /// `None` marks a port whose name could not be read.
    fn enumerate(&self) -> Vec<Option<(String, bool)>> {
        let mut entries = Vec::new();

        match MidiInput::new(&self.client_name) {
            Ok(midi_in) => entries.extend(
                midi_in
                    .ports()
                    .iter()
                    .map(|p| midi_in.port_name(p).ok().map(|name| (name, true))),
            ),
            Err(e) => warn!("Failed to enumerate MIDI inputs: {e}"),
        }

        match MidiOutput::new(&self.client_name) {
            Ok(midi_out) => entries.extend(
                midi_out
                    .ports()
                    .iter()
                    .map(|p| midi_out.port_name(p).ok().map(|name| (name, false))),
            ),
            Err(e) => warn!("Failed to enumerate MIDI outputs: {e}"),
        }

        entries
    }
}

impl MidiTransport for MidirTransport {
    fn count_devices(&self) -> usize {
        self.enumerate().len()
    }

    fn device_info(&self, index: usize) -> Option<MidiDevice> {
        self.enumerate()
            .into_iter()
            .nth(index)
            .flatten()
            .map(|(name, supports_input)| MidiDevice {
                index,
                name,
                supports_input,
            })
    }

    fn open_input(
        &self,
        device: &MidiDevice,
        buffer_capacity: usize,
    ) -> Result<Box<dyn InputStream>, TransportError> {
        if !device.supports_input {
            return Err(TransportError::NotAnInput {
                index: device.index,
                name: device.name.clone(),
            });
        }

        let midi_in = MidiInput::new(&self.client_name)
            .map_err(|e| TransportError::Init(e.to_string()))?;
        let ports = midi_in.ports();
        // Input ports occupy the first indices, so the device index is the port index.
        let port = ports
            .get(device.index)
            .filter(|p| midi_in.port_name(p).ok().as_deref() == Some(device.name.as_str()))
            .ok_or(TransportError::NoSuchDevice(device.index))?
            .clone();

        let (sender, receiver) = cch::bounded(buffer_capacity);
        let connection = midi_in
            .connect(
                &port,
                &format!("{}-input", self.client_name),
                move |_timestamp, bytes, _| match ControlEvent::from_bytes(bytes) {
                    Some(event) => {
                        if let Err(cch::TrySendError::Full(_)) = sender.try_send(event) {
                            warn!("MIDI input buffer full, dropping {event}");
                        }
                    }
                    None => trace!("Ignoring MIDI message {bytes:02X?}"),
                },
                (),
            )
            .map_err(|e| TransportError::Open {
                name: device.name.clone(),
                reason: e.to_string(),
            })?;

        info!("Opened MIDI input stream for '{}'", device.name);
        let (client_name, port_name) = (self.client_name.clone(), device.name.clone());
        Ok(Box::new(MidirInputStream {
            name: device.name.clone(),
            connection: Some(connection),
            receiver,
            port_present: Box::new(move || port_listed(&client_name, &port_name)),
            last_port_check: Instant::now(),
            disconnected: false,
        }))
    }
}

impl Drop for MidirTransport {
    fn drop(&mut self) {
        debug!("MIDI transport released");
    }
}

/// Reports whether the stream's port is still enumerated.
type PortCheck = Box<dyn Fn() -> bool + Send>;

fn port_listed(client_name: &str, port_name: &str) -> bool {
    match MidiInput::new(client_name) {
        Ok(midi_in) => midi_in
            .ports()
            .iter()
            .any(|p| midi_in.port_name(p).map_or(false, |n| n == port_name)),
        // Can't tell; let the channel state decide.
        Err(_) => true,
    }
}

struct MidirInputStream {
    name: String,
    connection: Option<MidiInputConnection<()>>,
    receiver: cch::Receiver<ControlEvent>,
    port_present: PortCheck,
    last_port_check: Instant,
    /// Once set, every read fails until the stream is closed.
    disconnected: bool,
}

impl MidirInputStream {
    fn disconnect(&mut self) -> TransportError {
        self.disconnected = true;
        TransportError::Disconnected(self.name.clone())
    }
}

impl InputStream for MidirInputStream {
    fn read(&mut self, max_events: usize) -> Result<Vec<ControlEvent>, TransportError> {
        if self.disconnected {
            return Err(TransportError::Disconnected(self.name.clone()));
        }
        if self.last_port_check.elapsed() >= PORT_CHECK_INTERVAL {
            self.last_port_check = Instant::now();
            if !(self.port_present)() {
                return Err(self.disconnect());
            }
        }

        let mut events = Vec::new();
        while events.len() < max_events {
            match self.receiver.try_recv() {
                Ok(event) => events.push(event),
                Err(cch::TryRecvError::Empty) => break,
                Err(cch::TryRecvError::Disconnected) if events.is_empty() => {
                    return Err(self.disconnect());
                }
                Err(cch::TryRecvError::Disconnected) => break,
            }
        }
        Ok(events)
    }

    fn close(mut self: Box<Self>) {
        if let Some(connection) = self.connection.take() {
            connection.close();
        }
        info!("Closed MIDI input stream for '{}'", self.name);
    }
}
