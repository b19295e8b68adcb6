//! Keplerian planetary ephemeris.
//!
//! Mean elements and secular rates from JPL's "approximate positions of the
//! planets" (valid 1800–2050 AD). Positions are heliocentric ecliptic J2000
//! in AU; Earth is the Earth–Moon barycentre. Accuracy is tens of arcseconds
//! for the inner planets, plenty for placing bodies in a scene.

use glam::DVec3;

use crate::{BodyId, EphemerisError, HeliocentricVector, Timestamp};

const MODEL_NAME: &str = "analytic";

/// Mean orbital elements at J2000 with rates per Julian century.
///
/// Angles in degrees.
#[derive(Debug, Clone, Copy)]
struct MeanElements {
    a: f64,
    a_dot: f64,
    e: f64,
    e_dot: f64,
    /// Inclination.
    i: f64,
    i_dot: f64,
    /// Mean longitude.
    l: f64,
    l_dot: f64,
    /// Longitude of perihelion.
    peri: f64,
    peri_dot: f64,
    /// Longitude of the ascending node.
    node: f64,
    node_dot: f64,
}

#[rustfmt::skip]
const MERCURY: MeanElements = MeanElements {
    a: 0.387_099_27, a_dot: 0.000_000_37,
    e: 0.205_635_93, e_dot: 0.000_019_06,
    i: 7.004_979_02, i_dot: -0.005_947_49,
    l: 252.250_323_50, l_dot: 149_472.674_111_75,
    peri: 77.457_796_28, peri_dot: 0.160_476_89,
    node: 48.330_765_93, node_dot: -0.125_340_81,
};

#[rustfmt::skip]
const VENUS: MeanElements = MeanElements {
    a: 0.723_335_66, a_dot: 0.000_003_90,
    e: 0.006_776_72, e_dot: -0.000_041_07,
    i: 3.394_676_05, i_dot: -0.000_788_90,
    l: 181.979_099_50, l_dot: 58_517.815_387_29,
    peri: 131.602_467_18, peri_dot: 0.002_683_29,
    node: 76.679_842_55, node_dot: -0.277_694_18,
};

#[rustfmt::skip]
const EARTH_MOON_BARYCENTER: MeanElements = MeanElements {
    a: 1.000_002_61, a_dot: 0.000_005_62,
    e: 0.016_711_23, e_dot: -0.000_043_92,
    i: -0.000_015_31, i_dot: -0.012_946_68,
    l: 100.464_571_66, l_dot: 35_999.372_449_81,
    peri: 102.937_681_93, peri_dot: 0.323_273_64,
    node: 0.0, node_dot: 0.0,
};

#[rustfmt::skip]
const MARS: MeanElements = MeanElements {
    a: 1.523_710_34, a_dot: 0.000_018_47,
    e: 0.093_394_10, e_dot: 0.000_078_82,
    i: 1.849_691_42, i_dot: -0.008_131_31,
    l: -4.553_432_05, l_dot: 19_140.302_684_99,
    peri: -23.943_629_59, peri_dot: 0.444_410_88,
    node: 49.559_538_91, node_dot: -0.292_573_43,
};

#[rustfmt::skip]
const JUPITER: MeanElements = MeanElements {
    a: 5.202_887_00, a_dot: -0.000_116_07,
    e: 0.048_386_24, e_dot: -0.000_132_53,
    i: 1.304_396_95, i_dot: -0.001_837_14,
    l: 34.396_440_51, l_dot: 3_034.746_127_75,
    peri: 14.728_479_83, peri_dot: 0.212_526_68,
    node: 100.473_909_09, node_dot: 0.204_691_06,
};

#[rustfmt::skip]
const SATURN: MeanElements = MeanElements {
    a: 9.536_675_94, a_dot: -0.001_250_60,
    e: 0.053_861_79, e_dot: -0.000_509_91,
    i: 2.485_991_87, i_dot: 0.001_936_09,
    l: 49.954_244_23, l_dot: 1_222.493_622_01,
    peri: 92.598_878_31, peri_dot: -0.418_972_16,
    node: 113.662_424_48, node_dot: -0.288_677_94,
};

#[rustfmt::skip]
const URANUS: MeanElements = MeanElements {
    a: 19.189_164_64, a_dot: -0.001_961_76,
    e: 0.047_257_44, e_dot: -0.000_043_97,
    i: 0.772_637_83, i_dot: -0.002_429_39,
    l: 313.238_104_51, l_dot: 428.482_027_85,
    peri: 170.954_276_30, peri_dot: 0.408_052_81,
    node: 74.016_925_03, node_dot: 0.042_405_89,
};

#[rustfmt::skip]
const NEPTUNE: MeanElements = MeanElements {
    a: 30.069_922_76, a_dot: 0.000_262_91,
    e: 0.008_590_48, e_dot: 0.000_051_05,
    i: 1.770_043_47, i_dot: 0.000_353_72,
    l: -55.120_029_69, l_dot: 218.459_453_25,
    peri: 44.964_762_27, peri_dot: -0.322_414_64,
    node: 131.784_225_74, node_dot: -0.012_627_24,
};

const MIN_SEMI_MAJOR_AXIS_AU: f64 = 0.01;
const MAX_ECCENTRICITY: f64 = 0.99;

fn elements_for(body: BodyId) -> Option<&'static MeanElements> {
    match body {
        BodyId::Mercury => Some(&MERCURY),
        BodyId::Venus => Some(&VENUS),
        BodyId::Earth => Some(&EARTH_MOON_BARYCENTER),
        BodyId::Mars => Some(&MARS),
        BodyId::Jupiter => Some(&JUPITER),
        BodyId::Saturn => Some(&SATURN),
        BodyId::Uranus => Some(&URANUS),
        BodyId::Neptune => Some(&NEPTUNE),
        BodyId::Sun | BodyId::Moon | BodyId::Pluto | BodyId::Iss => None,
    }
}

/// Solve Kepler's equation `E - e·sin(E) = M` by Newton-Raphson.
///
/// `mean_anomaly` in radians; returns the eccentric anomaly in radians.
pub fn solve_kepler(mean_anomaly: f64, eccentricity: f64) -> f64 {
    let mut e_anom = if eccentricity > 0.8 {
        std::f64::consts::PI
    } else {
        mean_anomaly
    };
    for _ in 0..30 {
        let delta = e_anom - eccentricity * e_anom.sin() - mean_anomaly;
        let derivative = 1.0 - eccentricity * e_anom.cos();
        e_anom -= delta / derivative;
        if delta.abs() < 1e-13 {
            break;
        }
    }
    e_anom
}

/// Stateless Keplerian model for Mercury through Neptune.
///
/// Pluto, the Sun, the Moon, and spacecraft are rejected with
/// [`EphemerisError::UnsupportedBody`].
#[derive(Debug, Clone, Copy, Default)]
pub struct AnalyticEphemerisModel;

impl AnalyticEphemerisModel {
    pub fn supports(body: BodyId) -> bool {
        elements_for(body).is_some()
    }

    /// Heliocentric ecliptic position (AU) and velocity (AU/day).
    pub fn position(body: BodyId, time: Timestamp) -> Result<HeliocentricVector, EphemerisError> {
        let elements = elements_for(body).ok_or(EphemerisError::UnsupportedBody {
            body,
            model: MODEL_NAME,
        })?;
        let vector = propagate(elements, time.centuries_since_j2000());
        if !vector.is_finite() {
            return Err(EphemerisError::NonFinite {
                body,
                quantity: "position",
            });
        }
        Ok(vector)
    }
}

fn propagate(el: &MeanElements, t: f64) -> HeliocentricVector {
    // Linear drift leaves the valid range far outside 1800-2050; keep the
    // orbit bound so every timestamp still yields a finite vector.
    let a = (el.a + el.a_dot * t).max(MIN_SEMI_MAJOR_AXIS_AU);
    let e = (el.e + el.e_dot * t).clamp(0.0, MAX_ECCENTRICITY);
    let i = (el.i + el.i_dot * t).to_radians();
    let l = el.l + el.l_dot * t;
    let peri = el.peri + el.peri_dot * t;
    let node = (el.node + el.node_dot * t).to_radians();

    let arg_peri = peri.to_radians() - node;
    let mean_anomaly = (l - peri).rem_euclid(360.0).to_radians();
    let e_anom = solve_kepler(mean_anomaly, e);

    // Position and velocity in the orbital plane, perihelion along +x.
    let (sin_e, cos_e) = e_anom.sin_cos();
    let b = a * (1.0 - e * e).sqrt();
    let x_orb = a * (cos_e - e);
    let y_orb = b * sin_e;

    // Mean motion in rad/day from the mean-longitude rate.
    let n = (el.l_dot - el.peri_dot).to_radians() / crate::time::DAYS_PER_JULIAN_CENTURY;
    let e_dot = n / (1.0 - e * cos_e);
    let vx_orb = -a * sin_e * e_dot;
    let vy_orb = b * cos_e * e_dot;

    let (sin_w, cos_w) = arg_peri.sin_cos();
    let (sin_o, cos_o) = node.sin_cos();
    let (sin_i, cos_i) = i.sin_cos();

    let rotate = |xo: f64, yo: f64| {
        DVec3::new(
            (cos_w * cos_o - sin_w * sin_o * cos_i) * xo
                + (-sin_w * cos_o - cos_w * sin_o * cos_i) * yo,
            (cos_w * sin_o + sin_w * cos_o * cos_i) * xo
                + (-sin_w * sin_o + cos_w * cos_o * cos_i) * yo,
            (sin_w * sin_i) * xo + (cos_w * sin_i) * yo,
        )
    };

    HeliocentricVector {
        position: rotate(x_orb, y_orb),
        velocity: Some(rotate(vx_orb, vy_orb)),
    }
}
