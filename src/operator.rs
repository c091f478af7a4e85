use std::str::FromStr;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::error::MonitorError;
use crate::scheduler::SchedulerHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorCommand {
    EnterMaintenance,
    ExitMaintenance,
}

impl FromStr for OperatorCommand {
    type Err = MonitorError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.trim().to_lowercase().as_str() {
            "maintenance" => Ok(OperatorCommand::EnterMaintenance),
            "maintenance done" => Ok(OperatorCommand::ExitMaintenance),
            _ => Err(MonitorError::InvalidOperatorCommand(input.trim().to_string())),
        }
    }
}

/// Forward parsed lines to the scheduler until EOF or cancellation.
pub async fn run_command_reader<R>(
    reader: R,
    scheduler: SchedulerHandle,
    shutdown: CancellationToken,
) where
    R: AsyncBufRead + Unpin,
{
    info!("Operator commands: \"maintenance\", \"maintenance done\"");
    let mut lines = reader.lines();

    loop {
        let line = tokio::select! {
            _ = shutdown.cancelled() => break,
            line = lines.next_line() => line,
        };

        let line = match line {
            Ok(Some(line)) => line,
            Ok(None) => {
                debug!("Operator input closed");
                break;
            }
            Err(e) => {
                error!("Error reading operator input: {}", e);
                break;
            }
        };

        if line.trim().is_empty() {
            continue;
        }

        match line.parse::<OperatorCommand>() {
            Ok(command) => {
                if let Err(e) = scheduler.command(command) {
                    error!("Failed to dispatch {:?}: {}", command, e);
                    break;
                }
            }
            Err(e) => warn!("{}", e),
        }
    }
}
