//! Per-approach arrival and departure dynamics.

use crate::types::{Direction, LightPhase, QueueState, MAX_DEPARTURES, QUEUE_CAP};

/// Source of new vehicles for one approach during one step.
///
/// The production source is [`WeightedArrivals`]; the deterministic sources
/// exist so scenarios can be replayed exactly.
pub trait ArrivalSource: Send {
    fn arrivals(&mut self, direction: Direction) -> u8;
}

/// Arrival counts and their probabilities. Small arrivals dominate, which
/// models moderate traffic.
const ARRIVAL_WEIGHTS: [(u8, f32); 4] = [(0, 0.4), (1, 0.3), (2, 0.2), (3, 0.1)];

/// Draws each approach's arrivals independently from [`ARRIVAL_WEIGHTS`].
pub struct WeightedArrivals {
    rng: fastrand::Rng,
}

impl WeightedArrivals {
    #[must_use]
    pub fn new() -> Self {
        Self { rng: fastrand::Rng::new() }
    }

    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self { rng: fastrand::Rng::with_seed(seed) }
    }
}

impl Default for WeightedArrivals {
    fn default() -> Self {
        Self::new()
    }
}

impl ArrivalSource for WeightedArrivals {
    fn arrivals(&mut self, _direction: Direction) -> u8 {
        let roll = self.rng.f32();
        let mut cumulative = 0.0;
        for (count, weight) in ARRIVAL_WEIGHTS {
            cumulative += weight;
            if roll < cumulative {
                return count;
            }
        }
        // Float rounding can leave the cumulative sum just under 1.0.
        ARRIVAL_WEIGHTS[ARRIVAL_WEIGHTS.len() - 1].0
    }
}

/// Every approach receives the same count every step.
#[derive(Copy, Clone, Debug, Default)]
pub struct FixedArrivals(pub u8);

impl ArrivalSource for FixedArrivals {
    fn arrivals(&mut self, _direction: Direction) -> u8 {
        self.0
    }
}

/// Replays a script of counts, one entry per approach per step, cycling when
/// exhausted. An empty script yields no arrivals.
#[derive(Clone, Debug, Default)]
pub struct ScriptedArrivals {
    script: Vec<u8>,
    cursor: usize,
}

impl ScriptedArrivals {
    #[must_use]
    pub fn new(script: Vec<u8>) -> Self {
        Self { script, cursor: 0 }
    }
}

impl ArrivalSource for ScriptedArrivals {
    fn arrivals(&mut self, _direction: Direction) -> u8 {
        if self.script.is_empty() {
            return 0;
        }
        let count = self.script[self.cursor % self.script.len()];
        self.cursor = (self.cursor + 1) % self.script.len();
        count
    }
}

/// Queue lengths plus the arrival source that feeds them.
pub struct QueueModel {
    queues: QueueState,
    arrivals: Box<dyn ArrivalSource>,
}

impl QueueModel {
    #[must_use]
    pub fn new(arrivals: Box<dyn ArrivalSource>) -> Self {
        Self { queues: QueueState::default(), arrivals }
    }

    #[must_use]
    pub fn queues(&self) -> QueueState {
        self.queues
    }

    /// Overwrites the queue lengths, clamping each to [`QUEUE_CAP`].
    pub fn set_queues(&mut self, queues: QueueState) {
        self.queues = QueueState::from_fn(|d| queues.get(d).min(QUEUE_CAP));
    }

    pub fn clear(&mut self) {
        self.queues = QueueState::default();
    }

    /// Adds one draw of arrivals to every approach, saturating at the cap.
    pub fn arrive(&mut self) {
        for d in Direction::ALL {
            let incoming = self.arrivals.arrivals(d);
            let queue = self.queues.get_mut(d);
            *queue = queue.saturating_add(incoming).min(QUEUE_CAP);
        }
    }

    /// Releases up to [`MAX_DEPARTURES`] vehicles from every green approach.
    /// Returns how many vehicles left the intersection.
    pub fn depart(&mut self, phase: LightPhase) -> u32 {
        let mut departed = 0;
        for d in Direction::ALL {
            if !phase.is_green(d) {
                continue;
            }
            let queue = self.queues.get_mut(d);
            let leaving = (*queue).min(MAX_DEPARTURES);
            *queue -= leaving;
            departed += u32::from(leaving);
        }
        departed
    }

    /// Vehicles currently waiting across all approaches.
    #[must_use]
    pub fn total_waiting(&self) -> u32 {
        self.queues.to_array().iter().map(|&q| u32::from(q)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arrivals_saturate_at_cap() {
        let mut model = QueueModel::new(Box::new(FixedArrivals(3)));
        for _ in 0..10 {
            model.arrive();
        }
        assert_eq!(model.queues().to_array(), [QUEUE_CAP; 4]);
    }

    #[test]
    fn departures_only_on_green_and_capped() {
        let mut model = QueueModel::new(Box::new(FixedArrivals(0)));
        model.set_queues(QueueState::from_array([5, 1, 5, 5]));
        let departed = model.depart(LightPhase::NorthSouthGreen);
        assert_eq!(departed, 3);
        assert_eq!(model.queues().to_array(), [3, 0, 5, 5]);

        let departed = model.depart(LightPhase::EastWestGreen);
        assert_eq!(departed, 4);
        assert_eq!(model.queues().to_array(), [3, 0, 3, 3]);
    }

    #[test]
    fn set_queues_clamps() {
        let mut model = QueueModel::new(Box::new(FixedArrivals(0)));
        model.set_queues(QueueState::from_array([200, 0, 10, 11]));
        assert_eq!(model.queues().to_array(), [10, 0, 10, 10]);
    }

    #[test]
    fn weighted_arrivals_match_their_weights() {
        const DRAWS: u32 = 10_000;
        const EXPECTED: [f64; 4] = [0.4, 0.3, 0.2, 0.1];
        for seed in [7, 1234] {
            let mut source = WeightedArrivals::with_seed(seed);
            let mut histogram = [0_u32; 4];
            for i in 0..DRAWS {
                let n = source.arrivals(Direction::ALL[i as usize % 4]);
                assert!(n <= 3);
                histogram[usize::from(n)] += 1;
            }
            for (count, weight) in EXPECTED.into_iter().enumerate() {
                let observed = f64::from(histogram[count]) / f64::from(DRAWS);
                assert!(
                    (observed - weight).abs() < 0.02,
                    "seed {seed}: {count} arrivals drawn {observed:.3} of the time, expected {weight}"
                );
            }
        }
    }

    #[test]
    fn scripted_arrivals_cycle() {
        let mut source = ScriptedArrivals::new(vec![1, 2]);
        let draws: Vec<u8> = (0..5).map(|_| source.arrivals(Direction::West)).collect();
        assert_eq!(draws, vec![1, 2, 1, 2, 1]);
        assert_eq!(ScriptedArrivals::default().arrivals(Direction::East), 0);
    }
}
