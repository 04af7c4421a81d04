//! Scenario simulation controller.
//!
//! Each tick advances simulated time by one minute scaled by the speed
//! multiplier and records one to five processed events. While paused, ticks
//! change nothing.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use tracing::{debug, info};

use crate::clock::{Clock, Ticker};
use crate::error::SimError;

pub const SCENARIOS: &[&str] = &[
    "Urban Flood Response",
    "Wildfire Evacuation",
    "Earthquake Emergency",
    "Hurricane Landfall",
    "Multi-Hazard Event",
];

/// Simulated-time multiplier. One tick at `X1` is one simulated minute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Speed {
    Half,
    #[default]
    X1,
    X2,
    X5,
    X10,
}

/// Allowed speed multipliers, slowest first.
pub const SPEEDS: &[Speed] = &[Speed::Half, Speed::X1, Speed::X2, Speed::X5, Speed::X10];

impl Speed {
    /// Simulated time covered by one tick.
    pub fn step(&self) -> Duration {
        match self {
            Self::Half => Duration::seconds(30),
            Self::X1 => Duration::minutes(1),
            Self::X2 => Duration::minutes(2),
            Self::X5 => Duration::minutes(5),
            Self::X10 => Duration::minutes(10),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Half => "0.5",
            Self::X1 => "1",
            Self::X2 => "2",
            Self::X5 => "5",
            Self::X10 => "10",
        }
    }
}

impl fmt::Display for Speed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses `0.5`, `1`, `2`, `5` or `10`, with an optional trailing `x`.
impl FromStr for Speed {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim();
        let value = value.strip_suffix(['x', 'X']).unwrap_or(value);
        SPEEDS
            .iter()
            .copied()
            .find(|speed| speed.as_str() == value || (*speed == Self::Half && value == ".5"))
            .ok_or_else(|| SimError::InvalidSpeed(s.to_string()))
    }
}

const DEFAULT_PARTICIPANTS: u32 = 1250;

#[derive(Debug, Clone)]
pub struct Simulation {
    scenario: &'static str,
    running: bool,
    speed: Speed,
    current_time: DateTime<Utc>,
    participants: u32,
    processed_events: u64,
    ticker: Ticker,
}

impl Simulation {
    /// Paused, at speed 1, on the first scenario, with simulated time at `clock.now()`.
    pub fn new(clock: &dyn Clock) -> Self {
        let now = clock.now();
        Self {
            scenario: SCENARIOS[0],
            running: false,
            speed: Speed::X1,
            current_time: now,
            participants: DEFAULT_PARTICIPANTS,
            processed_events: 0,
            ticker: Self::ticker_from(now),
        }
    }

    fn ticker_from(now: DateTime<Utc>) -> Ticker {
        Ticker::every_second(now)
    }

    pub fn scenario(&self) -> &'static str {
        self.scenario
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn speed(&self) -> Speed {
        self.speed
    }

    pub fn current_time(&self) -> DateTime<Utc> {
        self.current_time
    }

    pub fn participants(&self) -> u32 {
        self.participants
    }

    pub fn processed_events(&self) -> u64 {
        self.processed_events
    }

    /// Start ticking; the first real-time tick falls one period after `clock.now()`.
    pub fn start(&mut self, clock: &dyn Clock) {
        self.running = true;
        self.ticker.restart(clock.now());
        info!(scenario = self.scenario, speed = %self.speed, "simulation started");
    }

    pub fn pause(&mut self) {
        self.running = false;
        info!(
            processed_events = self.processed_events,
            "simulation paused"
        );
    }

    /// Stop, rewind simulated time to `clock.now()`, and clear the event count.
    pub fn reset(&mut self, clock: &dyn Clock) {
        let now = clock.now();
        self.running = false;
        self.current_time = now;
        self.processed_events = 0;
        self.ticker.restart(now);
        info!("simulation reset");
    }

    pub fn set_speed(&mut self, speed: Speed) {
        self.speed = speed;
    }

    /// Switch scenario. Participant count is re-drawn in `500..2500`.
    pub fn set_scenario<R: Rng + ?Sized>(
        &mut self,
        name: &str,
        rng: &mut R,
    ) -> Result<(), SimError> {
        let scenario = SCENARIOS
            .iter()
            .copied()
            .find(|s| s.eq_ignore_ascii_case(name))
            .ok_or_else(|| SimError::UnknownScenario(name.to_string()))?;
        self.scenario = scenario;
        self.participants = rng.gen_range(500..2500);
        info!(
            scenario,
            participants = self.participants,
            "scenario changed"
        );
        Ok(())
    }

    /// Advance one step. Returns `false` (and changes nothing) while paused.
    pub fn tick<R: Rng + ?Sized>(&mut self, rng: &mut R) -> bool {
        if !self.running {
            return false;
        }
        self.current_time += self.speed.step();
        self.processed_events += rng.gen_range(1..=5);
        debug!(
            current_time = %self.current_time,
            processed_events = self.processed_events,
            "simulation tick"
        );
        true
    }

    /// Apply every tick that fell due on the real-time schedule up to `now`.
    pub fn catch_up<R: Rng + ?Sized>(&mut self, now: DateTime<Utc>, rng: &mut R) -> u32 {
        if !self.running {
            return 0;
        }
        let due = self.ticker.poll(now);
        for _ in 0..due {
            self.tick(rng);
        }
        due
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use chrono::TimeZone;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn clock() -> ManualClock {
        ManualClock::new(Utc.with_ymd_and_hms(2026, 3, 14, 12, 0, 0).unwrap())
    }

    #[test]
    fn starts_paused_with_defaults() {
        let sim = Simulation::new(&clock());
        assert!(!sim.is_running());
        assert_eq!(sim.scenario(), "Urban Flood Response");
        assert_eq!(sim.speed(), Speed::X1);
        assert_eq!(sim.participants(), 1250);
        assert_eq!(sim.processed_events(), 0);
    }

    #[test]
    fn paused_tick_is_a_no_op() {
        let clock = clock();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut sim = Simulation::new(&clock);
        assert!(!sim.tick(&mut rng));
        assert_eq!(sim.current_time(), clock.now());
        assert_eq!(sim.processed_events(), 0);
    }

    #[test]
    fn tick_advances_by_speed_minutes() {
        let clock = clock();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut sim = Simulation::new(&clock);
        sim.set_speed(Speed::X5);
        sim.start(&clock);

        for n in 1..=10 {
            let before = sim.processed_events();
            assert!(sim.tick(&mut rng));
            assert_eq!(sim.current_time(), clock.now() + Duration::minutes(5 * n));
            let added = sim.processed_events() - before;
            assert!((1..=5).contains(&added), "added {added}");
        }
    }

    #[test]
    fn same_seed_same_run() {
        let clock = clock();
        let run = |seed| {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let mut sim = Simulation::new(&clock);
            sim.start(&clock);
            for _ in 0..20 {
                sim.tick(&mut rng);
            }
            sim.processed_events()
        };
        assert_eq!(run(7), run(7));
    }

    #[test]
    fn half_speed_tick_is_thirty_seconds() {
        let clock = clock();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut sim = Simulation::new(&clock);
        sim.set_speed(Speed::Half);
        sim.start(&clock);

        assert!(sim.tick(&mut rng));
        assert_eq!(sim.current_time(), clock.now() + Duration::seconds(30));
        assert!(sim.tick(&mut rng));
        assert_eq!(sim.current_time(), clock.now() + Duration::minutes(1));
    }

    #[test]
    fn five_speeds_slowest_first() {
        let steps: Vec<i64> = SPEEDS.iter().map(|s| s.step().num_seconds()).collect();
        assert_eq!(steps, [30, 60, 120, 300, 600]);
    }

    #[test]
    fn speed_parsing() {
        assert_eq!("0.5".parse::<Speed>(), Ok(Speed::Half));
        assert_eq!(".5".parse::<Speed>(), Ok(Speed::Half));
        assert_eq!("10x".parse::<Speed>(), Ok(Speed::X10));
        assert_eq!(" 2 ".parse::<Speed>(), Ok(Speed::X2));
        assert_eq!("3".parse::<Speed>(), Err(SimError::InvalidSpeed("3".into())));
        assert_eq!(Speed::Half.to_string(), "0.5");
    }

    #[test]
    fn scenario_change_redraws_participants() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut sim = Simulation::new(&clock());
        sim.set_scenario("wildfire evacuation", &mut rng).unwrap();
        assert_eq!(sim.scenario(), "Wildfire Evacuation");
        assert!((500..2500).contains(&sim.participants()));

        assert_eq!(
            sim.set_scenario("Volcano", &mut rng),
            Err(SimError::UnknownScenario("Volcano".into()))
        );
        assert_eq!(sim.scenario(), "Wildfire Evacuation");
    }

    #[test]
    fn reset_rewinds_to_clock() {
        let clock = clock();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut sim = Simulation::new(&clock);
        sim.start(&clock);
        sim.tick(&mut rng);
        sim.tick(&mut rng);

        clock.advance(Duration::minutes(90));
        sim.reset(&clock);
        assert!(!sim.is_running());
        assert_eq!(sim.processed_events(), 0);
        assert_eq!(sim.current_time(), clock.now());
    }

    #[test]
    fn catch_up_follows_real_time() {
        let clock = clock();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut sim = Simulation::new(&clock);

        clock.advance(Duration::seconds(5));
        assert_eq!(sim.catch_up(clock.now(), &mut rng), 0);

        sim.start(&clock);
        clock.advance(Duration::seconds(3));
        assert_eq!(sim.catch_up(clock.now(), &mut rng), 3);
        assert_eq!(
            sim.current_time(),
            Utc.with_ymd_and_hms(2026, 3, 14, 12, 3, 0).unwrap()
        );

        sim.pause();
        clock.advance(Duration::seconds(10));
        assert_eq!(sim.catch_up(clock.now(), &mut rng), 0);
    }
}
