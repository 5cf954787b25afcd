use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::SimError;

/// Maximum number of vehicles that can wait in a single approach.
pub const QUEUE_CAP: u8 = 10;
/// Vehicles that can clear a green approach in one step.
pub const MAX_DEPARTURES: u8 = 2;
/// Fixed episode length in steps.
pub const EPISODE_LENGTH: u32 = 50;
/// Four queue lengths followed by four light bits.
pub const OBSERVATION_SIZE: usize = 8;

/// The four approaches of the intersection.
///
/// The declaration order is significant: it is the order used by
/// [`Observation`] and therefore by the discretized state ids of any value
/// table trained against this environment.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
    ];

    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Agent decision for one step.
///
/// On the wire `Hold` is labelled `"Keep"`, matching the action history the
/// UI has always displayed.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    #[serde(rename = "Keep")]
    Hold = 0,
    Switch = 1,
}

impl Action {
    pub const ALL: [Action; 2] = [Action::Hold, Action::Switch];
    pub const COUNT: usize = Self::ALL.len();

    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[must_use]
    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Action::Hold),
            1 => Some(Action::Switch),
            _ => None,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Action::Hold => "Keep",
            Action::Switch => "Switch",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The single binary phase variable. North/South always share one value and
/// East/West the complementary one, so the per-direction bits are derived
/// rather than stored.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum LightPhase {
    #[default]
    NorthSouthGreen,
    EastWestGreen,
}

impl LightPhase {
    #[must_use]
    pub const fn flipped(self) -> Self {
        match self {
            LightPhase::NorthSouthGreen => LightPhase::EastWestGreen,
            LightPhase::EastWestGreen => LightPhase::NorthSouthGreen,
        }
    }

    #[must_use]
    pub const fn is_green(self, direction: Direction) -> bool {
        matches!(
            (self, direction),
            (LightPhase::NorthSouthGreen, Direction::North | Direction::South)
                | (LightPhase::EastWestGreen, Direction::East | Direction::West)
        )
    }

    /// Red = 0, Green = 1.
    #[must_use]
    pub const fn bit(self, direction: Direction) -> u8 {
        if self.is_green(direction) {
            1
        } else {
            0
        }
    }

    #[must_use]
    pub fn lights(self) -> Lights {
        PerDirection::from_fn(|d| self.bit(d))
    }
}

/// One value per approach. Serializes as `{"North": .., "South": .., "East": .., "West": ..}`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PerDirection<T> {
    pub north: T,
    pub south: T,
    pub east: T,
    pub west: T,
}

impl<T: Copy> PerDirection<T> {
    #[must_use]
    pub const fn from_array(values: [T; 4]) -> Self {
        Self {
            north: values[0],
            south: values[1],
            east: values[2],
            west: values[3],
        }
    }

    pub fn from_fn(mut f: impl FnMut(Direction) -> T) -> Self {
        Self {
            north: f(Direction::North),
            south: f(Direction::South),
            east: f(Direction::East),
            west: f(Direction::West),
        }
    }

    #[must_use]
    pub const fn to_array(&self) -> [T; 4] {
        [self.north, self.south, self.east, self.west]
    }

    #[must_use]
    pub const fn get(&self, direction: Direction) -> T {
        match direction {
            Direction::North => self.north,
            Direction::South => self.south,
            Direction::East => self.east,
            Direction::West => self.west,
        }
    }

    pub fn get_mut(&mut self, direction: Direction) -> &mut T {
        match direction {
            Direction::North => &mut self.north,
            Direction::South => &mut self.south,
            Direction::East => &mut self.east,
            Direction::West => &mut self.west,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Direction, T)> + '_ {
        Direction::ALL.into_iter().map(|d| (d, self.get(d)))
    }
}

/// Vehicles waiting per approach, each in `0..=QUEUE_CAP`.
pub type QueueState = PerDirection<u8>;
/// Light bit per approach (Red = 0, Green = 1).
pub type Lights = PerDirection<u8>;

/// The RL-visible state: queue lengths then light bits, both in
/// [`Direction::ALL`] order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Observation([i32; OBSERVATION_SIZE]);

impl Observation {
    #[must_use]
    pub fn new(queues: &QueueState, phase: LightPhase) -> Self {
        let mut values = [0; OBSERVATION_SIZE];
        for d in Direction::ALL {
            values[d.index()] = i32::from(queues.get(d));
            values[4 + d.index()] = i32::from(phase.bit(d));
        }
        Self(values)
    }

    /// Wraps raw values without validation. Use [`Observation::validate`]
    /// before trusting values that did not come from the environment.
    #[must_use]
    pub const fn from_values(values: [i32; OBSERVATION_SIZE]) -> Self {
        Self(values)
    }

    #[must_use]
    pub const fn values(&self) -> &[i32; OBSERVATION_SIZE] {
        &self.0
    }

    #[must_use]
    pub fn queue(&self, direction: Direction) -> i32 {
        self.0[direction.index()]
    }

    #[must_use]
    pub fn light(&self, direction: Direction) -> i32 {
        self.0[4 + direction.index()]
    }

    /// Checks the queue bounds and the paired-phase invariant.
    ///
    /// # Errors
    ///
    /// [`SimError::QueueOutOfRange`] when a queue is negative or above the cap,
    /// [`SimError::PhaseMismatch`] when the light bits are not a valid phase.
    pub fn validate(&self) -> Result<(), SimError> {
        for d in Direction::ALL {
            let length = self.queue(d);
            if !(0..=i32::from(QUEUE_CAP)).contains(&length) {
                return Err(SimError::QueueOutOfRange { direction: d, length });
            }
        }
        let [n, s, e, w] = Direction::ALL.map(|d| self.light(d));
        let valid_bit = |b: i32| b == 0 || b == 1;
        if !(valid_bit(n) && n == s && e == w && e == 1 - n) {
            return Err(SimError::PhaseMismatch { lights: [n, s, e, w] });
        }
        Ok(())
    }
}

impl AsRef<[i32]> for Observation {
    fn as_ref(&self) -> &[i32] {
        &self.0
    }
}
