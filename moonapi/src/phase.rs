use chrono::prelude::*;
use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::ephemeris::Ephemeris;
use crate::error::{MoonError, Result};

/// Length of the lunation used to turn the moon's age into a cycle fraction.
pub const SYNODIC_MONTH: f64 = 29.53;

/// Half width of the band around 0.25 / 0.5 / 0.75 reported as a quarter or
/// full moon.
pub const QUARTER_TOLERANCE: f64 = 0.02;

#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, Serialize, Deserialize)]
pub enum Phase {
    NewMoon,
    WaxingCrescent,
    FirstQuarter,
    WaxingGibbous,
    FullMoon,
    WaningGibbous,
    LastQuarter,
    WaningCrescent,
}

impl Phase {
    pub const ALL: [Phase; 8] = [
        Phase::NewMoon,
        Phase::WaxingCrescent,
        Phase::FirstQuarter,
        Phase::WaxingGibbous,
        Phase::FullMoon,
        Phase::WaningGibbous,
        Phase::LastQuarter,
        Phase::WaningCrescent,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Phase::NewMoon => "New Moon",
            Phase::WaxingCrescent => "Waxing Crescent",
            Phase::FirstQuarter => "First Quarter",
            Phase::WaxingGibbous => "Waxing Gibbous",
            Phase::FullMoon => "Full Moon",
            Phase::WaningGibbous => "Waning Gibbous",
            Phase::LastQuarter => "Last Quarter",
            Phase::WaningCrescent => "Waning Crescent",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Phase::NewMoon => "🌑",
            Phase::WaxingCrescent => "🌒",
            Phase::FirstQuarter => "🌓",
            Phase::WaxingGibbous => "🌔",
            Phase::FullMoon => "🌕",
            Phase::WaningGibbous => "🌖",
            Phase::LastQuarter => "🌗",
            Phase::WaningCrescent => "🌘",
        }
    }

    pub fn ascii_art(&self) -> &'static str {
        match self {
            Phase::NewMoon => "   ●   ",
            Phase::WaxingCrescent => "  🌘   ",
            Phase::FirstQuarter => "  ◐    ",
            Phase::WaxingGibbous => "  🌖   ",
            Phase::FullMoon => "   ○   ",
            Phase::WaningGibbous => "  🌕   ",
            Phase::LastQuarter => "  ◑    ",
            Phase::WaningCrescent => "  🌒   ",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for Phase {
    type Err = String;

    fn from_str(input: &str) -> std::result::Result<Self, Self::Err> {
        let wanted: String = input
            .chars()
            .filter(|c| c.is_alphanumeric())
            .collect::<String>()
            .to_lowercase();
        Phase::ALL
            .iter()
            .find(|phase| phase.name().replace(' ', "").to_lowercase() == wanted)
            .copied()
            .ok_or_else(|| format!("Cannot convert {:?} to Phase", input))
    }
}

/// Maps illumination (percent) and the position in the lunation (0..1) onto a
/// phase. The first matching rule wins: near zero illumination is always a new
/// moon, then the open intervals and quarter bands are checked in cycle order.
///
/// Because the open "waxing" interval below each quarter is tested before the
/// quarter band, a band only catches fractions at or above its center, e.g.
/// 0.24 is still a waxing crescent while 0.26 is a first quarter.
pub fn classify(illumination: f64, fraction: f64) -> Phase {
    if illumination < 1.0 {
        Phase::NewMoon
    } else if 0.0 < fraction && fraction < 0.25 {
        Phase::WaxingCrescent
    } else if (fraction - 0.25).abs() < QUARTER_TOLERANCE {
        Phase::FirstQuarter
    } else if 0.25 < fraction && fraction < 0.5 {
        Phase::WaxingGibbous
    } else if (fraction - 0.5).abs() < QUARTER_TOLERANCE {
        Phase::FullMoon
    } else if 0.5 < fraction && fraction < 0.75 {
        Phase::WaningGibbous
    } else if (fraction - 0.75).abs() < QUARTER_TOLERANCE {
        Phase::LastQuarter
    } else {
        Phase::WaningCrescent
    }
}

/// Rounds to one decimal, half away from zero, and clamps to 0..=100.
pub fn round_illumination(percent: f64) -> f64 {
    ((percent * 10.0).round() / 10.0).clamp(0.0, 100.0)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhaseObservation {
    pub date: NaiveDate,
    pub instant: DateTime<Utc>,
    /// Rounded to one decimal.
    pub illumination_percent: f64,
    pub lunation_fraction: f64,
    pub phase: Phase,
}

impl PhaseObservation {
    /// Illumination with exactly one decimal digit, e.g. `"0.3"`.
    pub fn illumination_display(&self) -> String {
        format!("{:.1}", self.illumination_percent)
    }
}

/// Classifies instants using an [`Ephemeris`].
#[derive(Debug, Clone)]
pub struct PhaseClassifier<E> {
    ephemeris: E,
}

impl<E: Ephemeris> PhaseClassifier<E> {
    pub fn new(ephemeris: E) -> Self {
        Self { ephemeris }
    }

    pub fn ephemeris(&self) -> &E {
        &self.ephemeris
    }

    /// Observation for midnight UTC of `date`.
    pub fn observe(&self, date: NaiveDate) -> PhaseObservation {
        self.observe_at(date.and_time(NaiveTime::default()).and_utc())
    }

    pub fn observe_at(&self, at: DateTime<Utc>) -> PhaseObservation {
        let illumination = self.ephemeris.illumination(at);
        let new_moon = self.ephemeris.previous_new_moon(at);
        let age_days = (at - new_moon).num_milliseconds() as f64 / 86_400_000.0;
        let fraction = age_days / SYNODIC_MONTH;
        let phase = classify(illumination, fraction);

        debug!(
            "{}: illumination {:.3}%, age {:.3} days, fraction {:.4} -> {}",
            at, illumination, age_days, fraction, phase
        );

        PhaseObservation {
            date: at.date_naive(),
            instant: at,
            illumination_percent: round_illumination(illumination),
            lunation_fraction: fraction,
            phase,
        }
    }

    /// Observations for `days` consecutive days starting at `start`.
    pub fn observe_days(&self, start: DateTime<Utc>, days: u32) -> Result<Vec<PhaseObservation>> {
        (0..days)
            .map(|n| {
                start
                    .checked_add_signed(Duration::days(i64::from(n)))
                    .map(|at| self.observe_at(at))
                    .ok_or_else(|| MoonError::DateOutOfRange(start.date_naive()))
            })
            .collect()
    }
}

/// Parses `YYYY-MM-DD` (midnight UTC) or `YYYY-MM-DDTHH:MM[:SS]` (UTC).
pub fn parse_instant(input: &str) -> Result<DateTime<Utc>> {
    let input = input.trim();
    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return Ok(date.and_time(NaiveTime::default()).and_utc());
    }
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok())
        .map(|time| time.and_utc())
        .ok_or_else(|| MoonError::InvalidDate(input.to_string()))
}

// -=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-
