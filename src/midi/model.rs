use std::fmt;

use crate::extensions::option::OptionExt;

const U8_MSB_EXTRACTOR: u8 = 0x80;
const CONTROL_CHANGE: u8 = 0xB0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Status(u8);

impl Status {
    pub const CONTROL_CHANGE_CHANNEL_1: Status = Status(CONTROL_CHANGE);

    pub fn as_u8(&self) -> u8 {
        self.0
    }

    pub fn from_u8(status: u8) -> Option<Status> {
        Option::when(status & U8_MSB_EXTRACTOR == U8_MSB_EXTRACTOR, || {
            Status(status)
        })
    }

    /// Control-change status for a 1-based MIDI channel (1..=16).
    pub fn control_change(channel: u8) -> Option<Status> {
        Option::when((1..=16).contains(&channel), || {
            Status(CONTROL_CHANGE | (channel - 1))
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(transparent)]
pub struct DataByte(u8);

impl DataByte {
    pub fn as_u8(&self) -> u8 {
        self.0
    }

    pub fn from_u8(db: u8) -> Option<DataByte> {
        Option::when(db & U8_MSB_EXTRACTOR == 0, || DataByte(db))
    }
}

/// A decoded short channel message as delivered by the transport.
///
/// Two-byte messages (program change, channel pressure) carry a zero value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ControlEvent {
    pub status: Status,
    pub controller: DataByte,
    pub value: DataByte,
}

impl ControlEvent {
    pub fn new(status: Status, controller: DataByte, value: DataByte) -> ControlEvent {
        ControlEvent {
            status,
            controller,
            value,
        }
    }

    /// Decodes one raw message. System exclusive, real-time and malformed
    /// messages yield `None`.
    pub fn from_bytes(bytes: &[u8]) -> Option<ControlEvent> {
        match *bytes {
            [status, fst] => Self::decode(status, fst, 0),
            [status, fst, snd] => Self::decode(status, fst, snd),
            _ => None,
        }
    }

    fn decode(status: u8, fst: u8, snd: u8) -> Option<ControlEvent> {
        // 0xF0..=0xFF are system messages, not channel voice messages.
        if status >= 0xF0 {
            return None;
        }
        Some(ControlEvent::new(
            Status::from_u8(status)?,
            DataByte::from_u8(fst)?,
            DataByte::from_u8(snd)?,
        ))
    }
}

impl fmt::Display for ControlEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Status={}, Data1={}, Data2={}",
            self.status.as_u8(),
            self.controller.as_u8(),
            self.value.as_u8()
        )
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MidiDevice {
    pub index: usize,
    pub name: String,
    pub supports_input: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("MIDI backend could not be initialised: {0}")]
    Init(String),
    #[error("no MIDI device at index {0}")]
    NoSuchDevice(usize),
    #[error("MIDI device {index} ('{name}') does not provide input")]
    NotAnInput { index: usize, name: String },
    #[error("failed to open MIDI input stream for '{name}': {reason}")]
    Open { name: String, reason: String },
    #[error("MIDI input stream for '{0}' is disconnected")]
    Disconnected(String),
}

/// Device enumeration and stream opening, consumed by the locator and the bridge.
pub trait MidiTransport {
    fn count_devices(&self) -> usize;

    fn device_info(&self, index: usize) -> Option<MidiDevice>;

    fn open_input(
        &self,
        device: &MidiDevice,
        buffer_capacity: usize,
    ) -> Result<Box<dyn InputStream>, TransportError>;
}

pub trait InputStream {
    /// Returns up to `max_events` pending events in arrival order, without blocking.
    fn read(&mut self, max_events: usize) -> Result<Vec<ControlEvent>, TransportError>;

    fn close(self: Box<Self>);
}
