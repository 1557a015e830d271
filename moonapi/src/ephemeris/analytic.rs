use chrono::prelude::*;
use chrono::Duration;

use super::lunar_terms::{LATITUDE, LONGITUDE_DISTANCE};
use super::{Circumpolar, Ephemeris, HorizonEvent, Observer};

const UNIX_EPOCH_JD: f64 = 2_440_587.5;
const J2000_JD: f64 = 2_451_545.0;
const DAYS_PER_CENTURY: f64 = 36_525.0;
const AU_KM: f64 = 149_597_870.7;
const EARTH_EQUATORIAL_RADIUS_KM: f64 = 6_378.14;
const MEAN_SYNODIC_MONTH: f64 = 29.530_588_853;

const SCAN_STEP_MINUTES: i64 = 10;
const SCAN_WINDOW_MINUTES: i64 = 26 * 60;

/// Low precision analytical ephemeris of the sun and the moon.
///
/// The sun follows the simple solar theory (mean elements plus equation of
/// center), the moon the principal terms of the lunar theory. Moon positions
/// are good to a few arc minutes, which puts new moons within minutes and
/// rise / set times within a minute or two of a full ephemeris.
#[derive(Debug, Default, Clone, Copy)]
pub struct AnalyticEphemeris;

/// Geocentric apparent position of the moon.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoonPosition {
    /// Ecliptic longitude in degrees, 0..360.
    pub longitude: f64,
    /// Ecliptic latitude in degrees.
    pub latitude: f64,
    pub distance_km: f64,
    /// Right ascension in degrees, 0..360.
    pub right_ascension: f64,
    /// Declination in degrees.
    pub declination: f64,
}

impl MoonPosition {
    /// Equatorial horizontal parallax in degrees.
    pub fn parallax(&self) -> f64 {
        (EARTH_EQUATORIAL_RADIUS_KM / self.distance_km)
            .asin()
            .to_degrees()
    }
}

#[derive(Debug, Clone, Copy)]
struct SunPosition {
    longitude: f64,
    distance_km: f64,
}

impl AnalyticEphemeris {
    pub fn new() -> Self {
        AnalyticEphemeris
    }

    pub fn moon_position(&self, at: DateTime<Utc>) -> MoonPosition {
        moon_position(julian_day(at))
    }

    /// Angle between the apparent longitudes of moon and sun, 0..360. New
    /// moon is at 0, full moon at 180.
    pub fn elongation(&self, at: DateTime<Utc>) -> f64 {
        elongation(julian_day(at))
    }

    fn next_crossing(&self, observer: &Observer, after: DateTime<Utc>, rising: bool) -> HorizonEvent {
        let start = julian_day(after);
        let step = SCAN_STEP_MINUTES as f64 / 1_440.0;
        let steps = SCAN_WINDOW_MINUTES / SCAN_STEP_MINUTES;

        let mut prev_jd = start;
        let mut prev = height_above_horizon(observer, start);

        for n in 1..=steps {
            let jd = start + n as f64 * step;
            let height = height_above_horizon(observer, jd);
            let crossed = if rising {
                prev < 0.0 && height >= 0.0
            } else {
                prev >= 0.0 && height < 0.0
            };
            if crossed {
                let root = refine_crossing(observer, prev_jd, jd, rising);
                let time = after + Duration::seconds(((root - start) * 86_400.0).round() as i64);
                return if rising {
                    HorizonEvent::Rise(time)
                } else {
                    HorizonEvent::Set(time)
                };
            }
            prev_jd = jd;
            prev = height;
        }

        // without a crossing the moon can only have stayed on one side since
        // the last (opposite) event, so the final sample decides
        if prev >= 0.0 {
            HorizonEvent::NotObserved(Circumpolar::AlwaysUp)
        } else {
            HorizonEvent::NotObserved(Circumpolar::NeverUp)
        }
    }
}

impl Ephemeris for AnalyticEphemeris {
    fn illumination(&self, at: DateTime<Utc>) -> f64 {
        illuminated_fraction(julian_day(at)) * 100.0
    }

    fn previous_new_moon(&self, at: DateTime<Utc>) -> DateTime<Utc> {
        let jd = julian_day(at);
        let mut new_moon = refine_new_moon(jd - elongation(jd) / 360.0 * MEAN_SYNODIC_MONTH);
        if new_moon > jd {
            new_moon = refine_new_moon(new_moon - MEAN_SYNODIC_MONTH);
        }
        trace!("previous new moon for jd {:.5}: {:.5}", jd, new_moon);
        at + Duration::milliseconds(((new_moon - jd) * 86_400_000.0).round() as i64)
    }

    fn next_rising(&self, observer: &Observer, after: DateTime<Utc>) -> HorizonEvent {
        self.next_crossing(observer, after, true)
    }

    fn next_setting(&self, observer: &Observer, after: DateTime<Utc>) -> HorizonEvent {
        self.next_crossing(observer, after, false)
    }
}

// -=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-

pub(crate) fn julian_day(at: DateTime<Utc>) -> f64 {
    let seconds = at.timestamp() as f64 + f64::from(at.timestamp_subsec_nanos()) * 1e-9;
    seconds / 86_400.0 + UNIX_EPOCH_JD
}

fn centuries(jd: f64) -> f64 {
    (jd - J2000_JD) / DAYS_PER_CENTURY
}

fn normalize(degrees: f64) -> f64 {
    degrees.rem_euclid(360.0)
}

/// Maps an angle onto -180..180.
fn wrap_180(degrees: f64) -> f64 {
    let d = normalize(degrees);
    if d > 180.0 {
        d - 360.0
    } else {
        d
    }
}

fn sin_deg(degrees: f64) -> f64 {
    degrees.to_radians().sin()
}

fn cos_deg(degrees: f64) -> f64 {
    degrees.to_radians().cos()
}

fn sun_position(jd: f64) -> SunPosition {
    let t = centuries(jd);
    let l0 = normalize(280.466_46 + 36_000.769_83 * t + 0.000_303_2 * t * t);
    let m = normalize(357.529_11 + 35_999.050_29 * t - 0.000_153_7 * t * t);
    let e = 0.016_708_634 - 0.000_042_037 * t - 0.000_000_126_7 * t * t;
    let c = (1.914_602 - 0.004_817 * t - 0.000_014 * t * t) * sin_deg(m)
        + (0.019_993 - 0.000_101 * t) * sin_deg(2.0 * m)
        + 0.000_289 * sin_deg(3.0 * m);
    let true_longitude = l0 + c;
    let true_anomaly = m + c;
    let radius_au = 1.000_001_018 * (1.0 - e * e) / (1.0 + e * cos_deg(true_anomaly));
    let omega = 125.04 - 1_934.136 * t;

    SunPosition {
        longitude: normalize(true_longitude - 0.005_69 - 0.004_78 * sin_deg(omega)),
        distance_km: radius_au * AU_KM,
    }
}

/// Nutation in longitude and true obliquity of the ecliptic, both in degrees.
fn nutation_and_obliquity(t: f64, moon_mean_longitude: f64) -> (f64, f64) {
    let omega = 125.044_52 - 1_934.136_261 * t;
    let sun_mean_longitude = 280.466_5 + 36_000.769_8 * t;

    let delta_psi = (-17.20 * sin_deg(omega) - 1.32 * sin_deg(2.0 * sun_mean_longitude)
        - 0.23 * sin_deg(2.0 * moon_mean_longitude)
        + 0.21 * sin_deg(2.0 * omega))
        / 3_600.0;
    let delta_epsilon = (9.20 * cos_deg(omega)
        + 0.57 * cos_deg(2.0 * sun_mean_longitude)
        + 0.10 * cos_deg(2.0 * moon_mean_longitude)
        - 0.09 * cos_deg(2.0 * omega))
        / 3_600.0;
    let epsilon_0 = 23.439_291_1 - 0.013_004_2 * t - 1.64e-7 * t * t + 5.04e-7 * t * t * t;

    (delta_psi, epsilon_0 + delta_epsilon)
}

fn ecliptic_to_equatorial(longitude: f64, latitude: f64, obliquity: f64) -> (f64, f64) {
    let lambda = longitude.to_radians();
    let beta = latitude.to_radians();
    let epsilon = obliquity.to_radians();

    let ra = (lambda.sin() * epsilon.cos() - beta.tan() * epsilon.sin()).atan2(lambda.cos());
    let dec = (beta.sin() * epsilon.cos() + beta.cos() * epsilon.sin() * lambda.sin()).asin();
    (normalize(ra.to_degrees()), dec.to_degrees())
}

fn moon_position(jd: f64) -> MoonPosition {
    let t = centuries(jd);
    let t2 = t * t;
    let t3 = t2 * t;
    let t4 = t3 * t;

    // mean elements
    let l = normalize(
        218.316_447_7 + 481_267.881_234_21 * t - 0.001_578_6 * t2 + t3 / 538_841.0
            - t4 / 65_194_000.0,
    );
    let d = normalize(
        297.850_192_1 + 445_267.111_403_4 * t - 0.001_881_9 * t2 + t3 / 545_868.0
            - t4 / 113_065_000.0,
    );
    let m = normalize(357.529_109_2 + 35_999.050_290_9 * t - 0.000_153_6 * t2 + t3 / 24_490_000.0);
    let mp = normalize(
        134.963_396_4 + 477_198.867_505_5 * t + 0.008_741_4 * t2 + t3 / 69_699.0
            - t4 / 14_712_000.0,
    );
    let f = normalize(
        93.272_095_0 + 483_202.017_523_3 * t - 0.003_653_9 * t2 - t3 / 3_526_000.0
            + t4 / 863_310_000.0,
    );
    let e = 1.0 - 0.002_516 * t - 0.000_007_4 * t2;
    let a1 = normalize(119.75 + 131.849 * t);
    let a2 = normalize(53.09 + 479_264.290 * t);
    let a3 = normalize(313.45 + 481_266.484 * t);

    let eccentricity = |m_multiple: i8| match m_multiple.abs() {
        1 => e,
        2 => e * e,
        _ => 1.0,
    };
    let argument = |cd: i8, cm: i8, cmp: i8, cf: i8| {
        f64::from(cd) * d + f64::from(cm) * m + f64::from(cmp) * mp + f64::from(cf) * f
    };

    let mut sigma_l = 0.0;
    let mut sigma_r = 0.0;
    for &(cd, cm, cmp, cf, coeff_l, coeff_r) in LONGITUDE_DISTANCE.iter() {
        let arg = argument(cd, cm, cmp, cf);
        let factor = eccentricity(cm);
        sigma_l += coeff_l * factor * sin_deg(arg);
        sigma_r += coeff_r * factor * cos_deg(arg);
    }

    let mut sigma_b = 0.0;
    for &(cd, cm, cmp, cf, coeff_b) in LATITUDE.iter() {
        sigma_b += coeff_b * eccentricity(cm) * sin_deg(argument(cd, cm, cmp, cf));
    }

    // venus, jupiter and the flattening of the earth
    sigma_l += 3_958.0 * sin_deg(a1) + 1_962.0 * sin_deg(l - f) + 318.0 * sin_deg(a2);
    sigma_b += -2_235.0 * sin_deg(l)
        + 382.0 * sin_deg(a3)
        + 175.0 * sin_deg(a1 - f)
        + 175.0 * sin_deg(a1 + f)
        + 127.0 * sin_deg(l - mp)
        - 115.0 * sin_deg(l + mp);

    let (delta_psi, obliquity) = nutation_and_obliquity(t, l);
    let longitude = normalize(l + sigma_l / 1_000_000.0 + delta_psi);
    let latitude = sigma_b / 1_000_000.0;
    let (right_ascension, declination) = ecliptic_to_equatorial(longitude, latitude, obliquity);

    MoonPosition {
        longitude,
        latitude,
        distance_km: 385_000.56 + sigma_r / 1_000.0,
        right_ascension,
        declination,
    }
}

fn elongation(jd: f64) -> f64 {
    normalize(moon_position(jd).longitude - sun_position(jd).longitude)
}

fn illuminated_fraction(jd: f64) -> f64 {
    let moon = moon_position(jd);
    let sun = sun_position(jd);

    let cos_psi = (cos_deg(moon.latitude) * cos_deg(moon.longitude - sun.longitude)).clamp(-1.0, 1.0);
    let psi = cos_psi.acos();
    let phase_angle = (sun.distance_km * psi.sin()).atan2(moon.distance_km - sun.distance_km * cos_psi);
    ((1.0 + phase_angle.cos()) / 2.0).clamp(0.0, 1.0)
}

/// Newton iteration on the elongation, assuming its mean rate of change.
fn refine_new_moon(mut jd: f64) -> f64 {
    for _ in 0..12 {
        let correction = wrap_180(elongation(jd)) / 360.0 * MEAN_SYNODIC_MONTH;
        jd -= correction;
        if correction.abs() < 1e-6 {
            break;
        }
    }
    jd
}

fn greenwich_sidereal_time(jd: f64) -> f64 {
    let t = centuries(jd);
    normalize(
        280.460_618_37 + 360.985_647_366_29 * (jd - J2000_JD) + 0.000_387_933 * t * t
            - t * t * t / 38_710_000.0,
    )
}

/// Geocentric altitude of the moon's center relative to the standard altitude
/// of rise and set (parallax, refraction and semi diameter), in degrees.
fn height_above_horizon(observer: &Observer, jd: f64) -> f64 {
    let moon = moon_position(jd);
    let hour_angle = greenwich_sidereal_time(jd) + observer.longitude - moon.right_ascension;
    let sin_altitude = sin_deg(observer.latitude) * sin_deg(moon.declination)
        + cos_deg(observer.latitude) * cos_deg(moon.declination) * cos_deg(hour_angle);
    let altitude = sin_altitude.clamp(-1.0, 1.0).asin().to_degrees();
    let standard_altitude = 0.7275 * moon.parallax() - 0.5667;
    altitude - standard_altitude
}

fn refine_crossing(observer: &Observer, mut lo: f64, mut hi: f64, rising: bool) -> f64 {
    for _ in 0..30 {
        let mid = (lo + hi) / 2.0;
        let above = height_above_horizon(observer, mid) >= 0.0;
        if above == rising {
            hi = mid;
        } else {
            lo = mid;
        }
    }
    (lo + hi) / 2.0
}

// -=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(s: &str) -> DateTime<Utc> {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
            .unwrap()
            .and_utc()
    }

    #[test]
    fn julian_day_of_j2000() {
        assert_eq!(julian_day(utc("2000-01-01 12:00:00")), J2000_JD);
        assert_eq!(julian_day(utc("1970-01-01 00:00:00")), UNIX_EPOCH_JD);
    }

    #[test]
    fn sidereal_time_at_midnight() {
        // 1987-04-10 0h UT: 13h10m46.3668s
        let theta = greenwich_sidereal_time(2_446_895.5);
        assert!((theta - 197.693_195).abs() < 1e-4, "{}", theta);
    }

    #[test]
    fn sun_longitude_and_distance() {
        // 1992-10-13 0h
        let sun = sun_position(2_448_908.5);
        assert!((sun.longitude - 199.909).abs() < 0.01, "{}", sun.longitude);
        assert!((sun.distance_km / AU_KM - 0.99766).abs() < 1e-4);
    }

    #[test]
    fn moon_position_reference() {
        // 1992-04-12 0h
        let moon = moon_position(2_448_724.5);
        assert!((moon.longitude - 133.167).abs() < 0.05, "{}", moon.longitude);
        assert!((moon.latitude + 3.229).abs() < 0.05, "{}", moon.latitude);
        assert!((moon.distance_km - 368_409.7).abs() < 100.0, "{}", moon.distance_km);
        assert!((moon.right_ascension - 134.688).abs() < 0.05);
        assert!((moon.declination - 13.768).abs() < 0.05);
        assert!((moon.parallax() - 0.991_990).abs() < 0.001);
    }

    #[test]
    fn illuminated_fraction_reference() {
        // 1992-04-12 0h, k = 0.6786
        let k = illuminated_fraction(2_448_724.5);
        assert!((k - 0.6786).abs() < 0.005, "{}", k);
    }

    #[test]
    fn wrap_into_half_circle() {
        assert_eq!(wrap_180(350.0), -10.0);
        assert_eq!(wrap_180(-10.0), -10.0);
        assert_eq!(wrap_180(90.0), 90.0);
        assert_eq!(wrap_180(540.0), 180.0);
    }
}
