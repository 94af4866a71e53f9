use crate::level::model::{LevelCommand, LevelTarget, Percentage};
use crate::midi::model::{ControlEvent, Status};

pub const SPEAKER_CONTROLLER: u8 = 11;
pub const MICROPHONE_CONTROLLER: u8 = 1;

const CONTROLLER_MAX: f64 = 127.0;

/// How a raw 0-127 controller value becomes a percentage.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum ScalingPolicy {
    /// The raw value is taken as a percentage and saturates at 100.
    #[default]
    Direct,
    /// The raw value is rescaled from 0-127 to 0-100 and rounded.
    Scaled,
}

impl ScalingPolicy {
    pub fn normalize(&self, raw: u8) -> Percentage {
        match self {
            ScalingPolicy::Direct => Percentage::saturating(raw.into()),
            ScalingPolicy::Scaled => {
                let scaled = (f64::from(raw) / CONTROLLER_MAX * 100.0).round();
                Percentage::saturating(scaled.max(0.0) as u32)
            }
        }
    }
}

/// Maps control-change events on one channel to level commands.
#[derive(Clone, Copy, Debug)]
pub struct EventMapper {
    status: Status,
    policy: ScalingPolicy,
}

impl EventMapper {
    pub fn new(status: Status, policy: ScalingPolicy) -> EventMapper {
        EventMapper { status, policy }
    }

    pub fn map(&self, event: &ControlEvent) -> Option<LevelCommand> {
        if event.status != self.status {
            return None;
        }
        let target = match event.controller.as_u8() {
            SPEAKER_CONTROLLER => LevelTarget::Speaker,
            MICROPHONE_CONTROLLER => LevelTarget::Microphone,
            _ => return None,
        };
        Some(LevelCommand {
            target,
            level: self.policy.normalize(event.value.as_u8()),
        })
    }
}
