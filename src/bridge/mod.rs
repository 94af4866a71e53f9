pub mod shutdown;

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::configuration::BridgeConfig;
use crate::extensions::option::OptionExt;
use crate::level::actuator::LevelActuator;
use crate::level::mapper::EventMapper;
use crate::midi::locator;
use crate::midi::model::{ControlEvent, InputStream, MidiDevice, MidiTransport, TransportError};
use shutdown::Shutdown;

// Thread safe type aliases
pub type BridgeTransport = Arc<dyn MidiTransport + Send + Sync + 'static>;
pub type BridgeActuator = Arc<dyn LevelActuator + Send + Sync + 'static>;

/// Upper bound on events pulled from the stream per poll cycle.
const READ_BATCH: usize = 1024;

#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("MIDI device not found: '{0}'")]
    DeviceNotFound(String),
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// The input loop: resolves the mixer, polls its stream and turns recognised
/// control changes into level changes.
pub struct Bridge {
    transport: BridgeTransport,
    actuator: BridgeActuator,
    mapper: EventMapper,
    config: BridgeConfig,
}

impl Bridge {
    pub fn new(
        transport: BridgeTransport,
        actuator: BridgeActuator,
        config: BridgeConfig,
    ) -> Bridge {
        Bridge {
            transport,
            actuator,
            mapper: EventMapper::new(config.status, config.scaling),
            config,
        }
    }

    /// Runs until `shutdown` fires. Failing to find or open the device at
    /// startup is an error; read and actuation failures afterwards are not.
    pub async fn run(&self, shutdown: Shutdown) -> Result<(), BridgeError> {
        let device = locator::locate(self.transport.as_ref(), &self.config.device_name)
            .or_fail(|| BridgeError::DeviceNotFound(self.config.device_name.clone()))?;
        let mut stream = match self.open(&device, &shutdown).await? {
            Some(stream) => stream,
            None => return Ok(()),
        };
        info!("Listening to MIDI input...");

        let mut failures: u32 = 0;
        'listen: while !shutdown.is_requested() {
            match stream.read(READ_BATCH) {
                Ok(events) => {
                    failures = 0;
                    for event in events {
                        // A pending actuation is abandoned; its process is killed on drop.
                        tokio::select! {
                            _ = shutdown.requested() => break 'listen,
                            _ = self.dispatch(&event) => {}
                        }
                    }
                }
                Err(e) => {
                    failures += 1;
                    warn!("Failed to read MIDI events: {e}");
                    if failures >= self.config.reconnect_after {
                        stream.close();
                        match self.reconnect(&shutdown).await {
                            Some(reopened) => stream = reopened,
                            None => return Ok(()),
                        }
                        failures = 0;
                        continue;
                    }
                }
            }

            tokio::select! {
                _ = shutdown.requested() => break,
                _ = tokio::time::sleep(self.config.poll_interval) => {}
            }
        }

        stream.close();
        Ok(())
    }

    /// Opens `device` after the settle delay. `None` means shutdown was
    /// requested while settling.
    async fn open(
        &self,
        device: &MidiDevice,
        shutdown: &Shutdown,
    ) -> Result<Option<Box<dyn InputStream>>, TransportError> {
        // Freshly plugged devices may not accept a connection right away.
        tokio::select! {
            _ = shutdown.requested() => return Ok(None),
            _ = tokio::time::sleep(self.config.settle_delay) => {}
        }
        self.transport
            .open_input(device, self.config.buffer_capacity)
            .map(Some)
    }

    /// Re-resolves the device until a stream opens. `None` means shutdown
    /// was requested first.
    async fn reconnect(&self, shutdown: &Shutdown) -> Option<Box<dyn InputStream>> {
        let name = &self.config.device_name;
        warn!("MIDI input for '{name}' looks lost, reconnecting");

        loop {
            if shutdown.is_requested() {
                return None;
            }

            match locator::locate(self.transport.as_ref(), name) {
                Some(device) => match self.open(&device, shutdown).await {
                    Ok(Some(stream)) => {
                        info!("Reconnected to '{}' at index {}", device.name, device.index);
                        return Some(stream);
                    }
                    Ok(None) => return None,
                    Err(e) => warn!("Failed to reopen MIDI input: {e}"),
                },
                None => debug!("'{name}' is not available yet"),
            }

            tokio::select! {
                _ = shutdown.requested() => return None,
                _ = tokio::time::sleep(self.config.reconnect_interval) => {}
            }
        }
    }

    async fn dispatch(&self, event: &ControlEvent) {
        debug!("Received MIDI event: {event}");
        if let Some(command) = self.mapper.map(event) {
            if let Err(e) = self.actuator.apply(command).await {
                warn!("Failed to set {} level to {}: {e}", command.target, command.level);
            }
        }
    }
}
