use std::time::Duration;

use crate::level::model::LevelCommand;

#[derive(Debug, thiserror::Error)]
pub enum ActuationError {
    #[error("failed to run '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("'{program}' exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: String,
        stderr: String,
    },
    #[error("'{program}' did not finish within {timeout:?}")]
    TimedOut { program: String, timeout: Duration },
}

/// Sets the level of one audio endpoint. Implementations only ever receive
/// levels in `0..=100`.
#[async_trait::async_trait]
pub trait LevelActuator {
    async fn apply(&self, command: LevelCommand) -> Result<(), ActuationError>;
}
