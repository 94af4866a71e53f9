use std::time::Duration;
use tracing::{debug, info};

use crate::level::actuator::{ActuationError, LevelActuator};
use crate::level::model::{LevelCommand, LevelTarget};

pub struct Config {
    pub program: String,
    pub timeout: Duration,
}

/// Drives PulseAudio (or pipewire-pulse) through the `pactl` command line tool.
pub struct PactlActuator {
    config: Config,
}

impl PactlActuator {
    pub fn new(config: Config) -> PactlActuator {
        PactlActuator { config }
    }

    fn arguments(command: &LevelCommand) -> [String; 3] {
        let (subcommand, endpoint) = match command.target {
            LevelTarget::Speaker => ("set-sink-volume", "@DEFAULT_SINK@"),
            LevelTarget::Microphone => ("set-source-volume", "@DEFAULT_SOURCE@"),
        };
        [
            subcommand.to_string(),
            endpoint.to_string(),
            command.level.to_string(),
        ]
    }
}

#[async_trait::async_trait]
impl LevelActuator for PactlActuator {
    async fn apply(&self, command: LevelCommand) -> Result<(), ActuationError> {
        let program = &self.config.program;
        let args = Self::arguments(&command);
        debug!("Running {program} {}", args.join(" "));

        let mut process = async_process::Command::new(program);
        process.args(&args).kill_on_drop(true);

        let output = tokio::time::timeout(self.config.timeout, process.output())
            .await
            .map_err(|_| ActuationError::TimedOut {
                program: program.clone(),
                timeout: self.config.timeout,
            })?
            .map_err(|source| ActuationError::Spawn {
                program: program.clone(),
                source,
            })?;

        if output.status.success() {
            info!("{} level set to {}", command.target, command.level);
            Ok(())
        } else {
            Err(ActuationError::Failed {
                program: program.clone(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }
}
