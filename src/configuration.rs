use std::time::Duration;

use crate::level::mapper::ScalingPolicy;
use crate::midi::model::Status;

pub const DEFAULT_DEVICE_NAME: &str = "MIX5R Pro ";
pub const DEFAULT_CHANNEL: u8 = 1;
pub const DEFAULT_BUFFER_CAPACITY: usize = 1024;
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(10);
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(100);
pub const DEFAULT_RECONNECT_AFTER: u32 = 25;
pub const DEFAULT_RECONNECT_INTERVAL: Duration = Duration::from_secs(1);
pub const DEFAULT_ACTUATION_TIMEOUT: Duration = Duration::from_secs(2);

/// Everything the input loop needs to know, fixed for the process lifetime.
#[derive(Clone, Debug)]
pub struct BridgeConfig {
    /// Matched exactly, trailing whitespace included.
    pub device_name: String,
    pub status: Status,
    pub scaling: ScalingPolicy,
    pub buffer_capacity: usize,
    pub poll_interval: Duration,
    pub settle_delay: Duration,
    /// Consecutive read failures tolerated before the stream is reopened.
    pub reconnect_after: u32,
    pub reconnect_interval: Duration,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        BridgeConfig {
            device_name: DEFAULT_DEVICE_NAME.to_string(),
            status: Status::CONTROL_CHANGE_CHANNEL_1,
            scaling: ScalingPolicy::default(),
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
            poll_interval: DEFAULT_POLL_INTERVAL,
            settle_delay: DEFAULT_SETTLE_DELAY,
            reconnect_after: DEFAULT_RECONNECT_AFTER,
            reconnect_interval: DEFAULT_RECONNECT_INTERVAL,
        }
    }
}
