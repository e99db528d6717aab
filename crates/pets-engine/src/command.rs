//! Translation of script-level command values into argument vectors.

use crate::error::{EngineError, EngineResult};
use rhai::Dynamic;

/// Shell used to interpret command strings.
pub(crate) const SHELL: &str = "bash";

/// Translate a command value into an argument vector for the process bridge.
///
/// Commands are currently constrained to a single string, executed as
/// `[bash, -c, command]`. Any other value is an [`EngineError::ArgumentType`]
/// naming the builtin that received it, so script authors can see which call
/// went wrong.
pub fn shell_command(builtin: &'static str, command: &Dynamic) -> EngineResult<Vec<String>> {
    match command.clone().into_string() {
        Ok(command) => Ok(vec![SHELL.to_string(), "-c".to_string(), command]),
        Err(type_name) => Err(EngineError::ArgumentType {
            builtin,
            type_name: type_name.to_string(),
            value: command.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_becomes_shell_argv() {
        let argv = shell_command("run", &Dynamic::from("echo hi && sleep 1")).unwrap();
        assert_eq!(argv, vec!["bash", "-c", "echo hi && sleep 1"]);
    }

    #[test]
    fn test_non_strings_are_rejected() {
        for value in [
            Dynamic::from(5_i64),
            Dynamic::from(true),
            Dynamic::from(rhai::Map::new()),
            Dynamic::UNIT,
        ] {
            let err = shell_command("start", &value).unwrap_err();
            match err {
                EngineError::ArgumentType { builtin, .. } => assert_eq!(builtin, "start"),
                other => panic!("expected ArgumentType, got {other}"),
            }
        }
    }
}
