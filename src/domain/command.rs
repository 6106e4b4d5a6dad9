// Command domain model - Operator instructions sent back over the stream
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CommandKind {
    #[serde(rename = "speedDelta")]
    SpeedDelta,
}

/// Outbound operator command, encoded as `{"type": "speedDelta", "value": n}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Command {
    #[serde(rename = "type")]
    pub kind: CommandKind,
    pub value: f64,
}

impl Command {
    pub fn speed_delta(value: f64) -> Self {
        Self {
            kind: CommandKind::SpeedDelta,
            value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_shape() {
        let json = serde_json::to_value(Command::speed_delta(-5.0)).unwrap();
        assert_eq!(json, serde_json::json!({"type": "speedDelta", "value": -5.0}));
    }
}
