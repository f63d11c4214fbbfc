use rand::Rng;

use crate::error::{EnergyError, ensure_non_negative, ensure_positive};

/// Hours in the daily EV profile.
pub const HOURS_PER_DAY: usize = 24;

/// Hour windows (inclusive) in which EVs arrive and leave.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChargingWindow {
    pub arrival_start: usize,
    pub arrival_end: usize,
    pub departure_start: usize,
    pub departure_end: usize,
}

impl Default for ChargingWindow {
    fn default() -> Self {
        Self {
            arrival_start: 8,
            arrival_end: 10,
            departure_start: 17,
            departure_end: 20,
        }
    }
}

impl ChargingWindow {
    /// Checks that both windows are ordered and fit inside one day.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` naming the first inconsistent bound.
    pub fn validate(&self) -> Result<(), EnergyError> {
        if self.arrival_start > self.arrival_end {
            return Err(EnergyError::invalid(
                "arrival_start",
                "must be <= arrival_end",
            ));
        }
        if self.departure_start > self.departure_end {
            return Err(EnergyError::invalid(
                "departure_start",
                "must be <= departure_end",
            ));
        }
        if self.arrival_end >= HOURS_PER_DAY {
            return Err(EnergyError::invalid(
                "arrival_end",
                format!("must be < {HOURS_PER_DAY}"),
            ));
        }
        if self.departure_end >= HOURS_PER_DAY {
            return Err(EnergyError::invalid(
                "departure_end",
                format!("must be < {HOURS_PER_DAY}"),
            ));
        }
        Ok(())
    }
}

/// One sampled charging session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvSession {
    /// Arrival hour (inclusive).
    pub arrival: usize,
    /// Departure hour (exclusive).
    pub departure: usize,
    /// Energy delivered in each connected hour.
    pub kwh_per_hour: f64,
}

impl EvSession {
    /// Energy delivered over the whole session.
    pub fn energy_kwh(&self) -> f64 {
        self.kwh_per_hour * (self.departure - self.arrival) as f64
    }
}

/// Hourly EV charging demand of one umbrella for one day.
#[derive(Debug, Clone, PartialEq)]
pub struct EvProfile {
    pub sessions: Vec<EvSession>,
    pub hourly_kwh: [f64; HOURS_PER_DAY],
}

impl EvProfile {
    /// Total daily energy in kWh.
    pub fn total_kwh(&self) -> f64 {
        self.hourly_kwh.iter().sum()
    }
}

/// EV fleet parked at each umbrella of a node.
///
/// Each EV arrives and leaves at random hours inside the configured
/// windows and charges at a flat rate between the two, capped by the
/// charger power. Randomness comes from the caller's RNG so a seeded
/// generator gives a reproducible profile.
#[derive(Debug, Clone, PartialEq)]
pub struct EvFleet {
    /// EVs per umbrella.
    pub evs_per_umbrella: u32,

    /// Average energy each EV needs per day in kWh.
    pub avg_kwh_per_ev: f64,

    /// Charger power limit in kW (one hour at this power is the per-hour cap).
    pub max_charge_kw: f64,

    pub window: ChargingWindow,
}

impl EvFleet {
    /// Creates a fleet using the default arrival/departure windows.
    pub fn new(evs_per_umbrella: u32, avg_kwh_per_ev: f64, max_charge_kw: f64) -> Self {
        Self {
            evs_per_umbrella,
            avg_kwh_per_ev,
            max_charge_kw,
            window: ChargingWindow::default(),
        }
    }

    /// Replaces the arrival/departure windows.
    pub fn with_window(mut self, window: ChargingWindow) -> Self {
        self.window = window;
        self
    }

    /// Checks fleet parameters.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` for negative demand, non-positive charger
    /// power, or inconsistent windows.
    pub fn validate(&self) -> Result<(), EnergyError> {
        ensure_non_negative("avg_kwh_per_ev", self.avg_kwh_per_ev)?;
        ensure_positive("max_ev_charge_kw", self.max_charge_kw)?;
        self.window.validate()
    }

    fn sample_session<R: Rng + ?Sized>(&self, rng: &mut R) -> EvSession {
        let w = &self.window;
        let arrival = rng.random_range(w.arrival_start..=w.arrival_end);
        let mut departure = rng.random_range(w.departure_start..=w.departure_end);
        if departure <= arrival {
            departure = (arrival + 1).min(HOURS_PER_DAY);
        }
        let charging_hours = (departure - arrival).max(1);
        let kwh_per_hour = (self.avg_kwh_per_ev / charging_hours as f64).min(self.max_charge_kw);

        EvSession {
            arrival,
            departure,
            kwh_per_hour,
        }
    }

    /// Samples the hourly charging profile of one umbrella.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if the fleet parameters are invalid.
    pub fn sample_profile<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<EvProfile, EnergyError> {
        self.validate()?;

        let mut hourly_kwh = [0.0; HOURS_PER_DAY];
        let mut sessions = Vec::with_capacity(self.evs_per_umbrella as usize);
        for _ in 0..self.evs_per_umbrella {
            let session = self.sample_session(rng);
            for slot in &mut hourly_kwh[session.arrival..session.departure] {
                *slot += session.kwh_per_hour;
            }
            sessions.push(session);
        }

        Ok(EvProfile {
            sessions,
            hourly_kwh,
        })
    }

    /// Samples one umbrella's profile and scales it to `umbrellas` units.
    ///
    /// All umbrellas of a node share the sampled arrival pattern.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if the fleet parameters are invalid.
    pub fn daily_demand_kwh<R: Rng + ?Sized>(
        &self,
        umbrellas: u32,
        rng: &mut R,
    ) -> Result<(EvProfile, f64), EnergyError> {
        let profile = self.sample_profile(rng)?;
        let total = profile.total_kwh() * f64::from(umbrellas);
        Ok((profile, total))
    }
}
