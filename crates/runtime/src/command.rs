use serde::{Deserialize, Serialize};

/// Control messages accepted by the controller.
///
/// On the wire each command is a JSON object tagged by `"command"`, e.g.
/// `{"command": "start_simulation", "training": true}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    StartSimulation {
        #[serde(default)]
        training: bool,
    },
    StopSimulation,
    ResetSimulation,
    ToggleTraining {
        #[serde(default)]
        training: bool,
    },
    /// The remote peer went away; behaves like a stop.
    Disconnect,
    /// Stop the run and exit the controller loop.
    Shutdown,
}

impl Command {
    /// Parses one JSON command line.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error for malformed or unknown commands.
    pub fn parse(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line.trim())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_wire_commands() {
        assert_eq!(
            Command::parse(r#"{"command":"start_simulation","training":true}"#).unwrap(),
            Command::StartSimulation { training: true }
        );
        assert_eq!(
            Command::parse(r#"{"command":"start_simulation"}"#).unwrap(),
            Command::StartSimulation { training: false }
        );
        assert_eq!(Command::parse(r#" {"command":"stop_simulation"} "#).unwrap(), Command::StopSimulation);
        assert_eq!(Command::parse(r#"{"command":"reset_simulation"}"#).unwrap(), Command::ResetSimulation);
        assert_eq!(
            Command::parse(r#"{"command":"toggle_training","training":false}"#).unwrap(),
            Command::ToggleTraining { training: false }
        );
        assert_eq!(Command::parse(r#"{"command":"shutdown"}"#).unwrap(), Command::Shutdown);
    }

    #[test]
    fn rejects_unknown_commands() {
        assert!(Command::parse(r#"{"command":"launch_rockets"}"#).is_err());
        assert!(Command::parse("not json").is_err());
    }
}
