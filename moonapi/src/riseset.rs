use chrono::prelude::*;
use serde::Serialize;

use crate::ephemeris::{Ephemeris, HorizonEvent, Observer};

/// Shown in place of a time when the moon does not cross the horizon.
pub const NOT_OBSERVED: &str = "N/A";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RiseSetTimes {
    #[serde(serialize_with = "serialize_event")]
    pub rise: HorizonEvent,
    #[serde(serialize_with = "serialize_event")]
    pub set: HorizonEvent,
}

impl RiseSetTimes {
    pub fn rise_time(&self) -> Option<DateTime<Utc>> {
        self.rise.time()
    }

    pub fn set_time(&self) -> Option<DateTime<Utc>> {
        self.set.time()
    }

    /// Moonrise as local `HH:MM` in `tz`, or [`NOT_OBSERVED`].
    pub fn format_rise<Tz: TimeZone>(&self, tz: &Tz) -> String
    where
        Tz::Offset: std::fmt::Display,
    {
        format_event(&self.rise, tz)
    }

    /// Moonset as local `HH:MM` in `tz`, or [`NOT_OBSERVED`].
    pub fn format_set<Tz: TimeZone>(&self, tz: &Tz) -> String
    where
        Tz::Offset: std::fmt::Display,
    {
        format_event(&self.set, tz)
    }
}

pub fn format_event<Tz: TimeZone>(event: &HorizonEvent, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    match event.time() {
        Some(time) => time.with_timezone(tz).format("%H:%M").to_string(),
        None => NOT_OBSERVED.to_string(),
    }
}

fn serialize_event<S>(event: &HorizonEvent, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    match event.time() {
        Some(time) => serializer.serialize_str(&time.to_rfc3339()),
        None => serializer.serialize_none(),
    }
}

/// Computes the next moonrise and moonset for an observer.
#[derive(Debug, Clone)]
pub struct RiseSetCalculator<E> {
    ephemeris: E,
}

impl<E: Ephemeris> RiseSetCalculator<E> {
    pub fn new(ephemeris: E) -> Self {
        Self { ephemeris }
    }

    /// Rise and set are searched independently, one may be missing while the
    /// other is found.
    pub fn compute(&self, observer: &Observer, after: DateTime<Utc>) -> RiseSetTimes {
        let rise = self.ephemeris.next_rising(observer, after);
        let set = self.ephemeris.next_setting(observer, after);
        debug!(
            "rise/set at ({:.3}, {:.3}) after {}: {:?} / {:?}",
            observer.latitude, observer.longitude, after, rise, set
        );
        RiseSetTimes { rise, set }
    }
}

// -=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ephemeris::{AnalyticEphemeris, Circumpolar};
    use chrono::Duration;

    /// Never rises but reports a set two hours after the query.
    struct HalfVisible;

    impl Ephemeris for HalfVisible {
        fn illumination(&self, _at: DateTime<Utc>) -> f64 {
            50.0
        }

        fn previous_new_moon(&self, at: DateTime<Utc>) -> DateTime<Utc> {
            at
        }

        fn next_rising(&self, _observer: &Observer, _after: DateTime<Utc>) -> HorizonEvent {
            HorizonEvent::NotObserved(Circumpolar::NeverUp)
        }

        fn next_setting(&self, _observer: &Observer, after: DateTime<Utc>) -> HorizonEvent {
            HorizonEvent::Set(after + Duration::hours(2))
        }
    }

    fn midnight(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn rise_and_set_are_independent() {
        let calc = RiseSetCalculator::new(HalfVisible);
        let times = calc.compute(&Observer::new(70.0, 20.0), midnight(2024, 6, 1));
        assert_eq!(times.format_rise(&Utc), NOT_OBSERVED);
        assert_eq!(times.format_set(&Utc), "02:00");
        assert_eq!(times.rise_time(), None);
    }

    #[test]
    fn formats_in_local_time() {
        let calc = RiseSetCalculator::new(HalfVisible);
        let times = calc.compute(&Observer::new(70.0, 20.0), midnight(2024, 6, 1));
        let tz = FixedOffset::east_opt(5 * 3600 + 30 * 60).unwrap();
        assert_eq!(times.format_set(&tz), "07:30");
    }

    #[test]
    fn mid_latitude_has_rise_and_set() {
        let calc = RiseSetCalculator::new(AnalyticEphemeris::new());
        let berlin = Observer::new(52.52, 13.405);
        for day in 1..=10 {
            let start = midnight(2024, 3, day);
            let times = calc.compute(&berlin, start);
            let rise = times.rise_time().expect("moonrise");
            let set = times.set_time().expect("moonset");
            for time in [rise, set] {
                assert!(time > start);
                assert!(time - start < Duration::hours(26));
            }
            assert!(matches!(times.rise, HorizonEvent::Rise(_)));
            assert!(matches!(times.set, HorizonEvent::Set(_)));
        }
    }

    #[test]
    fn full_moon_rises_at_sunset() {
        // full moon 2024-01-25 17:54 UTC
        let calc = RiseSetCalculator::new(AnalyticEphemeris::new());
        let (lat, lon) = (52.52, 13.405);
        let times = calc.compute(&Observer::new(lat, lon), midnight(2024, 1, 25));
        let (sunrise, sunset) = sunrise::sunrise_sunset(lat, lon, 2024, 1, 25);

        let rise = times.rise_time().unwrap().timestamp();
        let set = times.set_time().unwrap().timestamp();
        assert!((rise - sunset).abs() < 60 * 60, "moonrise {} sunset {}", rise, sunset);
        assert!((set - sunrise).abs() < 90 * 60, "moonset {} sunrise {}", set, sunrise);
    }

    #[test]
    fn polar_moon_below_horizon() {
        let ephemeris = AnalyticEphemeris::new();
        let calc = RiseSetCalculator::new(ephemeris);
        let pole = Observer::new(89.9, 0.0);

        let start = (1..=31)
            .map(|day| midnight(2025, 1, day))
            .find(|at| ephemeris.moon_position(*at).declination < -15.0)
            .expect("a day with southern declination");

        let times = calc.compute(&pole, start);
        assert_eq!(times.rise, HorizonEvent::NotObserved(Circumpolar::NeverUp));
        assert_eq!(times.set, HorizonEvent::NotObserved(Circumpolar::NeverUp));
        assert_eq!(times.format_rise(&Utc), NOT_OBSERVED);
        assert_eq!(times.format_set(&Utc), NOT_OBSERVED);
    }

    #[test]
    fn polar_moon_above_horizon() {
        let ephemeris = AnalyticEphemeris::new();
        let calc = RiseSetCalculator::new(ephemeris);
        let pole = Observer::new(89.9, 0.0);

        let start = (1..=31)
            .map(|day| midnight(2025, 1, day))
            .find(|at| ephemeris.moon_position(*at).declination > 15.0)
            .expect("a day with northern declination");

        let times = calc.compute(&pole, start);
        assert_eq!(times.rise, HorizonEvent::NotObserved(Circumpolar::AlwaysUp));
        assert_eq!(times.set, HorizonEvent::NotObserved(Circumpolar::AlwaysUp));
    }
}
