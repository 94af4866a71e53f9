use std::fmt;

const MAX_PERCENT: u8 = 100;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LevelTarget {
    Speaker,
    Microphone,
}

impl fmt::Display for LevelTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LevelTarget::Speaker => f.write_str("speaker"),
            LevelTarget::Microphone => f.write_str("microphone"),
        }
    }
}

/// A level in `0..=100`; larger inputs saturate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Percentage(u8);

impl Percentage {
    pub fn saturating(value: u32) -> Percentage {
        Percentage(value.min(MAX_PERCENT as u32) as u8)
    }

    pub fn as_u8(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LevelCommand {
    pub target: LevelTarget,
    pub level: Percentage,
}
