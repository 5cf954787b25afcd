use thiserror::Error;

use crate::types::{Direction, QUEUE_CAP};

/// Modeling errors. Any of these means the simulation itself is wrong, so the
/// caller should abort the current run rather than continue.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SimError {
    #[error("queue for {direction} holds {length} vehicles, outside 0..={cap}", cap = QUEUE_CAP)]
    QueueOutOfRange { direction: Direction, length: i32 },
    #[error("light bits {lights:?} do not form a valid phase")]
    PhaseMismatch { lights: [i32; 4] },
}
