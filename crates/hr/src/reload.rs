//! Reload actions run when the server's build changes.

use std::process::ExitStatus;

use hr_agent::{IdentifierChange, Reloader};
use tokio::process::Command;

use crate::output::Output;

/// Reload action error.
#[derive(Debug, thiserror::Error)]
pub(crate) enum ReloadError {
    #[error("Failed to run reload command '{program}': {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    #[error("Reload command '{program}' failed with {status}")]
    Failed { program: String, status: ExitStatus },
}

/// What to do once the build identifier changes.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum ReloadAction {
    /// Announce the change and let the CLI exit.
    Log,
    /// Run a program with arguments.
    Command { program: String, args: Vec<String> },
}

impl ReloadAction {
    /// Build the action from a configured command line.
    ///
    /// `None` or an empty command means [`ReloadAction::Log`].
    pub(crate) fn from_command(command: Option<Vec<String>>) -> Self {
        let mut parts = command.unwrap_or_default().into_iter();
        match parts.next() {
            Some(program) => Self::Command {
                program,
                args: parts.collect(),
            },
            None => Self::Log,
        }
    }

    /// Human-readable description for startup output.
    pub(crate) fn describe(&self) -> String {
        match self {
            Self::Log => "log and exit".to_owned(),
            Self::Command { program, args } if args.is_empty() => format!("run `{program}`"),
            Self::Command { program, args } => format!("run `{program} {}`", args.join(" ")),
        }
    }
}

impl Reloader for ReloadAction {
    type Error = ReloadError;

    async fn reload(&mut self, change: &IdentifierChange) -> Result<(), ReloadError> {
        let output = Output::new();
        output.highlight(&format!("[hr] Server changed ({change}), reloading"));

        let Self::Command { program, args } = self else {
            return Ok(());
        };

        tracing::info!(%program, ?args, "Running reload command");
        let status = Command::new(program.as_str())
            .args(args.iter())
            .env("HR_PREVIOUS_BUILD", &change.baseline)
            .env("HR_CURRENT_BUILD", &change.observed)
            .status()
            .await
            .map_err(|source| ReloadError::Spawn {
                program: program.clone(),
                source,
            })?;

        if !status.success() {
            return Err(ReloadError::Failed {
                program: program.clone(),
                status,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn change() -> IdentifierChange {
        IdentifierChange {
            baseline: "abc123".to_owned(),
            observed: "def456".to_owned(),
        }
    }

    #[test]
    fn test_from_command_none_is_log() {
        assert_eq!(ReloadAction::from_command(None), ReloadAction::Log);
        assert_eq!(ReloadAction::from_command(Some(Vec::new())), ReloadAction::Log);
    }

    #[test]
    fn test_from_command_splits_program_and_args() {
        let action = ReloadAction::from_command(Some(vec![
            "touch".to_owned(),
            "reload.stamp".to_owned(),
        ]));

        assert_eq!(
            action,
            ReloadAction::Command {
                program: "touch".to_owned(),
                args: vec!["reload.stamp".to_owned()],
            }
        );
        assert_eq!(action.describe(), "run `touch reload.stamp`");
    }

    #[test]
    fn test_describe_log() {
        assert_eq!(ReloadAction::Log.describe(), "log and exit");
    }

    #[tokio::test]
    async fn test_log_action_succeeds() {
        let mut action = ReloadAction::Log;
        assert!(action.reload(&change()).await.is_ok());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_command_receives_build_identifiers() {
        let mut action = ReloadAction::from_command(Some(vec![
            "sh".to_owned(),
            "-c".to_owned(),
            r#"test "$HR_PREVIOUS_BUILD" = abc123 && test "$HR_CURRENT_BUILD" = def456"#
                .to_owned(),
        ]));

        assert!(action.reload(&change()).await.is_ok());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_command_nonzero_exit_is_error() {
        let mut action = ReloadAction::from_command(Some(vec!["false".to_owned()]));

        let err = action.reload(&change()).await.unwrap_err();

        assert!(matches!(err, ReloadError::Failed { .. }), "{err:?}");
        assert!(err.to_string().contains("false"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_command_does_not_block_runtime() {
        let mut action = ReloadAction::from_command(Some(vec![
            "sleep".to_owned(),
            "0.2".to_owned(),
        ]));
        let ticker = tokio::spawn(async {
            let mut ticks = 0;
            while ticks < 3 {
                tokio::time::sleep(std::time::Duration::from_millis(10)).await;
                ticks += 1;
            }
            ticks
        });

        action.reload(&change()).await.unwrap();

        assert!(ticker.is_finished());
        assert_eq!(ticker.await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_missing_program_is_spawn_error() {
        let mut action =
            ReloadAction::from_command(Some(vec!["hr-test-no-such-program".to_owned()]));

        let err = action.reload(&change()).await.unwrap_err();

        assert!(matches!(err, ReloadError::Spawn { .. }), "{err:?}");
    }
}
