use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::level::actuator::{ActuationError, LevelActuator};
use crate::level::model::LevelCommand;

/// Records every command it is asked to apply. The first `failures` calls
/// are recorded and then reported as failed.
#[derive(Default)]
pub struct RecordingActuator {
    applied: Mutex<Vec<LevelCommand>>,
    failures: AtomicUsize,
}

impl RecordingActuator {
    pub fn failing_first(failures: usize) -> RecordingActuator {
        RecordingActuator {
            applied: Mutex::new(Vec::new()),
            failures: AtomicUsize::new(failures),
        }
    }

    pub fn applied(&self) -> Vec<LevelCommand> {
        self.applied.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl LevelActuator for RecordingActuator {
    async fn apply(&self, command: LevelCommand) -> Result<(), ActuationError> {
        self.applied.lock().unwrap().push(command);
        let remaining = self.failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failures.store(remaining - 1, Ordering::SeqCst);
            return Err(ActuationError::Failed {
                program: "stub".to_string(),
                status: "exit status: 1".to_string(),
                stderr: String::new(),
            });
        }
        Ok(())
    }
}

/// Never completes, like a wedged audio backend.
#[derive(Default)]
pub struct HangingActuator {
    started: AtomicUsize,
}

impl HangingActuator {
    pub fn started(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl LevelActuator for HangingActuator {
    async fn apply(&self, _command: LevelCommand) -> Result<(), ActuationError> {
        self.started.fetch_add(1, Ordering::SeqCst);
        std::future::pending().await
    }
}
