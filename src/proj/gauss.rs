//! Gauss conform plane conversions for the South African survey system.
//!
//! The series constants date back to the BASIC-era Cape datum survey
//! programs (Clarke 1880 ellipsoid, odd-degree reference meridians) and are
//! kept bit-for-bit, including the plane's south-positive x axis and the
//! positive-south latitude convention on both sides of the pair. Used by
//! the station range-ring generator.

use geo_types::Coord;

/// Forward conversion: latitude/longitude (degrees, latitude positive
/// south) to the Gauss conform plane for the given reference meridian.
///
/// Returns `(x, y)` where x is the south-positive northing and y the
/// meridian offset, both in meters.
pub fn gauss(lat: f64, lon: f64, ref_meridian: f64) -> (f64, f64) {
    const D1: f64 = 29413.44944959;
    const D2: f64 = -4314.31353082;
    const D3: f64 = 4.60197112;
    const D4: f64 = -0.00610875;
    const D5: f64 = 0.00000880;
    const C: f64 = 1693913.586052;
    const DEL: f64 = 0.006850085445147;
    let con = 3.28086933456 / 12.396;

    let fir = (-lat).to_radians();
    let al = (ref_meridian - lon).to_radians();
    let al2 = al * al;
    let al4 = al2 * al2;

    let cosc = fir.cos() * fir.cos();
    let cosa = cosc * fir.cos();
    let cosb = cosc * cosa;
    let vsq = 1.0 + DEL * cosc;
    let etsq = vsq - 1.0;
    let tor = fir.tan();
    let an = C / vsq.abs().sqrt();

    let f1 = al2 * an / 2.0;
    let f2 = f1 * al2 * (5.0 - tor.powi(2) + 9.0 * etsq + 4.0 * etsq.powi(2)) / 12.0;
    let f3 = f1
        * al4
        * (61.0 - 58.0 * tor.powi(2) + tor.powi(4) + 270.0 * etsq - 330.0 * etsq * tor.powi(2)
            + 445.0 * etsq.powi(2))
        / 360.0;
    let b = D1 * fir.to_degrees()
        + D2 * (2.0 * fir).sin()
        + D3 * (4.0 * fir).sin()
        + D4 * (6.0 * fir).sin()
        + D5 * (8.0 * fir).sin();
    let xd = b + f1 * fir.sin() * fir.cos() + f2 * fir.sin() * cosa + f3 * fir.sin() * cosb;

    let f4 = al * an;
    let f5 = f1 * al * (1.0 - tor.powi(2) + etsq) / 3.0;
    // f6 grouping reproduces the survey series as published, loose terms
    // and all; re-deriving it would change plane coordinates.
    let f6 = f1 * al * al2 * (5.0 - 18.0 * tor.powi(2)) + tor.powi(4) + 14.0 * etsq
        - 58.0 * etsq * tor.powi(2)
        + 13.0 * etsq.powi(2) / 60.0;
    let yd = f4 * fir.cos() + f5 * cosa + f6 * cosb;

    (-xd / con, yd / con)
}

/// Inverse conversion: Gauss conform plane back to latitude/longitude
/// (degrees, latitude positive south).
///
/// The latitude estimate is refined by Newton iteration, at most ten
/// passes with a 2e-10 rad convergence threshold; on non-convergence the
/// last estimate is used without signaling.
pub fn invgauss(x: f64, y: f64, ref_meridian: f64) -> (f64, f64) {
    const A: f64 = 6378249.145;
    const CHI: f64 = 0.001706680847;
    const ECCEN: f64 = 0.006803480882;
    const ECCEN1: f64 = 0.006850085306;
    const ECCEN2: f64 = 0.006850085249;

    let xn = -x;

    let chisqr = CHI * CHI;
    let amult = A * (1.0 - CHI) * (1.0 - chisqr);
    let a0 = amult * (1.0 + chisqr * (2.25 + chisqr * 225.0 / 64.0));

    let mut phi = xn / a0;
    let mut delta_phi = 1.0_f64;
    for _ in 0..10 {
        if delta_phi.abs() <= 2.0e-10 {
            break;
        }
        let mut delta_b = phi * (1.0 + chisqr * (2.25 + chisqr * (225.0 / 64.0)));
        delta_b -=
            CHI * (1.5 + chisqr * (45.0 / 16.0 + chisqr * (525.0 / 128.0))) * (2.0 * phi).sin();
        delta_b += 0.5 * chisqr * (15.0 / 8.0 + chisqr * (105.0 / 32.0)) * (4.0 * phi).sin();
        delta_b = xn - delta_b * amult;
        let a1 = chisqr
            * (1.5 + chisqr * (45.0 / 16.0 + chisqr * (525.0 / 128.0)))
            * (-2.0 * (2.0 * CHI * phi).cos());
        let a2 = CHI * chisqr * (15.0 / 8.0 + chisqr * (105.0 / 32.0)) * (2.0 * CHI * phi).cos();
        delta_phi = delta_b / (a0 + a1 + a2);
        phi += delta_phi;
    }

    let gamma = phi.tan();
    let gamsqr = gamma * gamma;
    let cosphi = phi.cos();
    let ksi = ECCEN2 * cosphi * cosphi;
    let etasqr = ECCEN1 * cosphi * cosphi;

    let s = phi.sin();
    let w = 1.0 - ECCEN * s * s;
    let m = A * (1.0 - ECCEN) / w.powf(1.5);
    let n = A / w.sqrt();

    let a1 = -gamma / (2.0 * m * n);
    let a2 =
        gamma * (5.0 + 3.0 * gamsqr + ksi - etasqr * (9.0 + etasqr * 4.0)) / (24.0 * m * n * n * n);
    let b1 = 1.0 / (n * cosphi);
    let b2 = -(1.0 + 2.0 * gamsqr + etasqr) / (6.0 * cosphi * n * n * n);

    let lat = -(phi + y * y * (a1 + y * y * a2)).to_degrees();
    let lon = ref_meridian - (y * (b1 + y * y * b2)).to_degrees();
    (lat, lon)
}

/// Walks a full circle of azimuths around a station, offsetting by
/// `range_m` in the Gauss plane and inverting each point back to
/// latitude/longitude (positive-south convention, like the pair above).
///
/// Yields `360 / azimuth_step_deg` points; the ring is left open.
pub fn gauss_ring(
    lat: f64,
    lon: f64,
    ref_meridian: f64,
    range_m: f64,
    azimuth_step_deg: f64,
) -> Vec<Coord<f64>> {
    if azimuth_step_deg <= 0.0 {
        log::warn!("gauss_ring: non-positive azimuth step {azimuth_step_deg}, no ring generated");
        return Vec::new();
    }

    let (x0, y0) = gauss(lat, lon, ref_meridian);
    let steps = (360.0 / azimuth_step_deg) as usize;
    let mut points = Vec::with_capacity(steps);
    let mut azimuth = 0.0_f64;
    for _ in 0..steps {
        let az = azimuth.to_radians();
        let x = x0 + range_m * az.cos();
        let y = y0 + range_m * az.sin();
        let (rlat, rlon) = invgauss(x, y, ref_meridian);
        points.push(Coord { x: rlon, y: rlat });
        azimuth += azimuth_step_deg;
    }
    points
}
