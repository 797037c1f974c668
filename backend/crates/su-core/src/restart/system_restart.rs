use crate::restart::RestartTrigger;
use crate::{CoreError, CoreResult};

use std::process::Command;
use std::time::Duration;

/// Restart through the platform `shutdown` command.
#[derive(Debug, Clone, Copy)]
pub struct SystemRestart {
    delay: Duration,
}

impl SystemRestart {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Program and arguments for the restart request.
    ///
    /// Windows takes the delay in seconds. Unix `shutdown` only takes whole
    /// minutes, so the delay is rounded up (`now` when zero).
    pub fn command_line(&self) -> (&'static str, Vec<String>) {
        if cfg!(windows) {
            (
                "shutdown",
                vec![
                    String::from("/r"),
                    String::from("/t"),
                    self.delay.as_secs().to_string(),
                ],
            )
        } else {
            let secs = self.delay.as_secs();
            let when = if secs == 0 {
                String::from("now")
            } else {
                format!("+{}", secs.div_ceil(60))
            };
            ("shutdown", vec![String::from("-r"), when])
        }
    }
}

impl RestartTrigger for SystemRestart {
    fn request_restart(&self) -> CoreResult<()> {
        let (program, args) = self.command_line();

        let output = Command::new(program)
            .args(&args)
            .output()
            .map_err(|e| CoreError::restart(format!("failed to run {program}: {e}")))?;

        if output.status.success() {
            Ok(())
        } else {
            Err(CoreError::restart(format!(
                "{program} {} exited with {}: {}",
                args.join(" "),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )))
        }
    }
}
