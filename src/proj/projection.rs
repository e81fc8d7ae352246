//! Cartographic projections used by the display.
//!
//! One `Projection` is active at a time; it maps geographic coordinates
//! (degrees) to local display coordinates (kilometers, or degrees for the
//! cylindrical lat-lon case) and back. All math is spherical, radius
//! [`EARTH_RADIUS_KM`]. Angles are degrees at the public boundary and
//! radians internally.

use super::great_circle::{destination, range_bearing, EARTH_RADIUS_KM};

/// Which pole a polar stereographic projection is tangent at.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pole {
    North,
    South,
}

/// Shifts `lon` by a whole cycle when it sits more than half a world away
/// from `ref_lon`, so both ends of a transform live in the same 360° cycle.
pub fn condition_lon(lon: f64, ref_lon: f64) -> f64 {
    let diff = ref_lon - lon;
    if diff > 180.0 {
        lon + 360.0
    } else if diff < -180.0 {
        lon - 360.0
    } else {
        lon
    }
}

/// Projection kind plus the constants precomputed at construction time.
#[derive(Clone, Debug)]
enum ProjKind {
    /// Azimuthal equidistant plane, optionally rotated from true north.
    Flat { rotation: f64 },
    /// Cylindrical equidistant; local coordinates are degrees, not km.
    LatLon,
    LambertConformal {
        lam0: f64,
        n: f64,
        big_f: f64,
        rho0: f64,
    },
    ObliqueStereo {
        lam_t: f64,
        sin_t: f64,
        cos_t: f64,
        scale: f64,
    },
    PolarStereo {
        lam_t: f64,
        pole: Pole,
        scale: f64,
    },
    Mercator { y0: f64 },
    TransverseMercator { scale: f64 },
    Albers {
        n: f64,
        big_c: f64,
        rho0: f64,
    },
    LambertAzimuthal { sin0: f64, cos0: f64 },
}

/// The active display projection.
///
/// Constructed once from configuration; replaced wholesale on a projection
/// change, which invalidates every cached local coordinate in the display.
#[derive(Clone, Debug)]
pub struct Projection {
    kind: ProjKind,
    origin_lat: f64,
    origin_lon: f64,
    offset_x: f64,
    offset_y: f64,
}

impl Projection {
    /// Azimuthal equidistant "flat earth" plane centered on the origin,
    /// with `rotation` degrees between grid north and true north.
    pub fn flat(origin_lat: f64, origin_lon: f64, rotation: f64) -> Self {
        Self::new(origin_lat, origin_lon, ProjKind::Flat { rotation })
    }

    /// Cylindrical lat-lon; x is longitude conditioned into the origin's
    /// cycle, y is latitude, both in degrees.
    pub fn latlon(origin_lat: f64, origin_lon: f64) -> Self {
        Self::new(origin_lat, origin_lon, ProjKind::LatLon)
    }

    /// Lambert conformal conic with standard parallels `lat1` and `lat2`
    /// (equal parallels give the tangent form). Parallels at the equator
    /// are degenerate and are rejected by the configuration loader before
    /// this is reached.
    pub fn lambert_conformal(origin_lat: f64, origin_lon: f64, lat1: f64, lat2: f64) -> Self {
        let phi0 = origin_lat.to_radians();
        let phi1 = lat1.to_radians();
        let phi2 = lat2.to_radians();
        let n = if (lat1 - lat2).abs() < 1e-8 {
            phi1.sin()
        } else {
            (phi1.cos() / phi2.cos()).ln()
                / ((std::f64::consts::FRAC_PI_4 + phi2 / 2.0).tan()
                    / (std::f64::consts::FRAC_PI_4 + phi1 / 2.0).tan())
                .ln()
        };
        let big_f = phi1.cos() * (std::f64::consts::FRAC_PI_4 + phi1 / 2.0).tan().powf(n) / n;
        let rho0 = EARTH_RADIUS_KM * big_f
            / (std::f64::consts::FRAC_PI_4 + phi0 / 2.0).tan().powf(n);
        Self::new(
            origin_lat,
            origin_lon,
            ProjKind::LambertConformal {
                lam0: origin_lon.to_radians(),
                n,
                big_f,
                rho0,
            },
        )
    }

    /// Oblique stereographic, tangent at (`tangent_lat`, `tangent_lon`)
    /// with the given central scale. Local (0,0) is placed at the origin,
    /// not the tangent point.
    pub fn oblique_stereo(
        origin_lat: f64,
        origin_lon: f64,
        tangent_lat: f64,
        tangent_lon: f64,
        central_scale: f64,
    ) -> Self {
        let phi_t = tangent_lat.to_radians();
        let mut proj = Self::new(
            origin_lat,
            origin_lon,
            ProjKind::ObliqueStereo {
                lam_t: tangent_lon.to_radians(),
                sin_t: phi_t.sin(),
                cos_t: phi_t.cos(),
                scale: central_scale,
            },
        );
        proj.set_offset_origin(origin_lat, origin_lon);
        proj
    }

    /// Polar stereographic tangent at the given pole. Local (0,0) is
    /// placed at the origin, not the pole.
    pub fn polar_stereo(
        origin_lat: f64,
        origin_lon: f64,
        tangent_lon: f64,
        pole: Pole,
        central_scale: f64,
    ) -> Self {
        let mut proj = Self::new(
            origin_lat,
            origin_lon,
            ProjKind::PolarStereo {
                lam_t: tangent_lon.to_radians(),
                pole,
                scale: central_scale,
            },
        );
        proj.set_offset_origin(origin_lat, origin_lon);
        proj
    }

    /// Mercator cylinder; the origin latitude maps to y = 0.
    pub fn mercator(origin_lat: f64, origin_lon: f64) -> Self {
        let phi0 = origin_lat.to_radians();
        let y0 = EARTH_RADIUS_KM * (std::f64::consts::FRAC_PI_4 + phi0 / 2.0).tan().ln();
        Self::new(origin_lat, origin_lon, ProjKind::Mercator { y0 })
    }

    /// Transverse Mercator with the central meridian at the origin.
    pub fn transverse_mercator(origin_lat: f64, origin_lon: f64, central_scale: f64) -> Self {
        Self::new(
            origin_lat,
            origin_lon,
            ProjKind::TransverseMercator {
                scale: central_scale,
            },
        )
    }

    /// Albers equal-area conic with standard parallels `lat1` and `lat2`.
    pub fn albers(origin_lat: f64, origin_lon: f64, lat1: f64, lat2: f64) -> Self {
        let phi0 = origin_lat.to_radians();
        let phi1 = lat1.to_radians();
        let phi2 = lat2.to_radians();
        let n = (phi1.sin() + phi2.sin()) / 2.0;
        let big_c = phi1.cos().powi(2) + 2.0 * n * phi1.sin();
        let rho0 = EARTH_RADIUS_KM * (big_c - 2.0 * n * phi0.sin()).sqrt() / n;
        Self::new(
            origin_lat,
            origin_lon,
            ProjKind::Albers { n, big_c, rho0 },
        )
    }

    /// Lambert azimuthal equal-area centered on the origin.
    pub fn lambert_azimuthal(origin_lat: f64, origin_lon: f64) -> Self {
        let phi0 = origin_lat.to_radians();
        Self::new(
            origin_lat,
            origin_lon,
            ProjKind::LambertAzimuthal {
                sin0: phi0.sin(),
                cos0: phi0.cos(),
            },
        )
    }

    fn new(origin_lat: f64, origin_lon: f64, kind: ProjKind) -> Self {
        Self {
            kind,
            origin_lat,
            origin_lon,
            offset_x: 0.0,
            offset_y: 0.0,
        }
    }

    /// Moves local (0,0) to the given geographic point. The offset is
    /// measured with the forward transform itself, so it composes with
    /// whatever reference point the projection kind uses natively.
    pub fn set_offset_origin(&mut self, lat: f64, lon: f64) {
        self.offset_x = 0.0;
        self.offset_y = 0.0;
        let (x, y) = self.latlon2xy(lat, lon);
        self.offset_x = x;
        self.offset_y = y;
    }

    /// Configured origin (degrees), whatever the kind's native reference.
    pub fn origin(&self) -> (f64, f64) {
        (self.origin_lat, self.origin_lon)
    }

    /// True for the cylindrical lat-lon kind, whose local units are
    /// degrees rather than kilometers.
    pub fn is_latlon(&self) -> bool {
        matches!(self.kind, ProjKind::LatLon)
    }

    /// True for the stereographic kinds, whose inverse-projected display
    /// corners cannot be trusted to bound the visible world.
    pub fn is_stereographic(&self) -> bool {
        matches!(
            self.kind,
            ProjKind::ObliqueStereo { .. } | ProjKind::PolarStereo { .. }
        )
    }

    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            ProjKind::Flat { .. } => "flat",
            ProjKind::LatLon => "latlon",
            ProjKind::LambertConformal { .. } => "lambert_conformal",
            ProjKind::ObliqueStereo { .. } => "oblique_stereo",
            ProjKind::PolarStereo { .. } => "polar_stereo",
            ProjKind::Mercator { .. } => "mercator",
            ProjKind::TransverseMercator { .. } => "transverse_mercator",
            ProjKind::Albers { .. } => "albers",
            ProjKind::LambertAzimuthal { .. } => "lambert_azimuthal",
        }
    }

    /// Forward transform, degrees in, local coordinates out.
    pub fn latlon2xy(&self, lat: f64, lon: f64) -> (f64, f64) {
        let r = EARTH_RADIUS_KM;
        let (x, y) = match &self.kind {
            ProjKind::Flat { rotation } => {
                let (range, bearing) =
                    range_bearing(self.origin_lat, self.origin_lon, lat, lon);
                let theta = (bearing - rotation).to_radians();
                (range * theta.sin(), range * theta.cos())
            }
            ProjKind::LatLon => (condition_lon(lon, self.origin_lon), lat),
            ProjKind::LambertConformal {
                lam0,
                n,
                big_f,
                rho0,
            } => {
                let lam = condition_lon(lon, self.origin_lon).to_radians();
                let phi = lat.to_radians();
                let rho =
                    r * big_f / (std::f64::consts::FRAC_PI_4 + phi / 2.0).tan().powf(*n);
                let theta = n * (lam - lam0);
                (rho * theta.sin(), rho0 - rho * theta.cos())
            }
            ProjKind::ObliqueStereo {
                lam_t,
                sin_t,
                cos_t,
                scale,
            } => {
                let phi = lat.to_radians();
                let dlam = lon.to_radians() - lam_t;
                let k = 2.0 * scale
                    / (1.0 + sin_t * phi.sin() + cos_t * phi.cos() * dlam.cos());
                (
                    r * k * phi.cos() * dlam.sin(),
                    r * k * (cos_t * phi.sin() - sin_t * phi.cos() * dlam.cos()),
                )
            }
            ProjKind::PolarStereo { lam_t, pole, scale } => {
                let phi = lat.to_radians();
                let dlam = lon.to_radians() - lam_t;
                match pole {
                    Pole::North => {
                        let t = (std::f64::consts::FRAC_PI_4 - phi / 2.0).tan();
                        let rho = 2.0 * r * scale * t;
                        (rho * dlam.sin(), -rho * dlam.cos())
                    }
                    Pole::South => {
                        let t = (std::f64::consts::FRAC_PI_4 + phi / 2.0).tan();
                        let rho = 2.0 * r * scale * t;
                        (rho * dlam.sin(), rho * dlam.cos())
                    }
                }
            }
            ProjKind::Mercator { y0 } => {
                let lam = condition_lon(lon, self.origin_lon).to_radians();
                let phi = lat.to_radians();
                let x = r * (lam - self.origin_lon.to_radians());
                let y = r * (std::f64::consts::FRAC_PI_4 + phi / 2.0).tan().ln() - y0;
                (x, y)
            }
            ProjKind::TransverseMercator { scale } => {
                let phi = lat.to_radians();
                let dlam = lon.to_radians() - self.origin_lon.to_radians();
                let b = phi.cos() * dlam.sin();
                let x = r * scale * ((1.0 + b) / (1.0 - b)).ln() / 2.0;
                let y = r
                    * scale
                    * (phi.tan().atan2(dlam.cos()) - self.origin_lat.to_radians());
                (x, y)
            }
            ProjKind::Albers { n, big_c, rho0 } => {
                let lam = condition_lon(lon, self.origin_lon).to_radians();
                let phi = lat.to_radians();
                let rho = r * (big_c - 2.0 * n * phi.sin()).sqrt() / n;
                let theta = n * (lam - self.origin_lon.to_radians());
                (rho * theta.sin(), rho0 - rho * theta.cos())
            }
            ProjKind::LambertAzimuthal { sin0, cos0 } => {
                let phi = lat.to_radians();
                let dlam = lon.to_radians() - self.origin_lon.to_radians();
                let kp = (2.0
                    / (1.0 + sin0 * phi.sin() + cos0 * phi.cos() * dlam.cos()))
                .sqrt();
                (
                    r * kp * phi.cos() * dlam.sin(),
                    r * kp * (cos0 * phi.sin() - sin0 * phi.cos() * dlam.cos()),
                )
            }
        };
        (x - self.offset_x, y - self.offset_y)
    }

    /// Inverse transform, local coordinates in, degrees out.
    pub fn xy2latlon(&self, x: f64, y: f64) -> (f64, f64) {
        let x = x + self.offset_x;
        let y = y + self.offset_y;
        let r = EARTH_RADIUS_KM;
        match &self.kind {
            ProjKind::Flat { rotation } => {
                let range = x.hypot(y);
                if range < 1e-10 {
                    return (self.origin_lat, self.origin_lon);
                }
                let bearing = x.atan2(y).to_degrees() + rotation;
                let p = destination(self.origin_lat, self.origin_lon, range, bearing);
                (p.y, p.x)
            }
            ProjKind::LatLon => (y, x),
            ProjKind::LambertConformal {
                lam0,
                n,
                big_f,
                rho0,
            } => {
                let sign = n.signum();
                let rho = sign * (x * x + (rho0 - y) * (rho0 - y)).sqrt();
                if rho.abs() < 1e-10 {
                    return (sign * 90.0, lam0.to_degrees());
                }
                let theta = (sign * x).atan2(sign * (rho0 - y));
                let phi = 2.0 * (r * big_f / rho).powf(1.0 / n).atan()
                    - std::f64::consts::FRAC_PI_2;
                (phi.to_degrees(), (lam0 + theta / n).to_degrees())
            }
            ProjKind::ObliqueStereo {
                lam_t,
                sin_t,
                cos_t,
                scale,
            } => {
                let rho = x.hypot(y);
                if rho < 1e-10 {
                    return (sin_t.atan2(*cos_t).to_degrees(), lam_t.to_degrees());
                }
                let c = 2.0 * (rho / (2.0 * r * scale)).atan();
                let phi = (c.cos() * sin_t + y * c.sin() * cos_t / rho)
                    .clamp(-1.0, 1.0)
                    .asin();
                let lam = lam_t
                    + (x * c.sin()).atan2(rho * cos_t * c.cos() - y * sin_t * c.sin());
                (phi.to_degrees(), lam.to_degrees())
            }
            ProjKind::PolarStereo { lam_t, pole, scale } => {
                let rho = x.hypot(y);
                let c = 2.0 * (rho / (2.0 * r * scale)).atan();
                match pole {
                    Pole::North => {
                        if rho < 1e-10 {
                            return (90.0, lam_t.to_degrees());
                        }
                        let lam = lam_t + x.atan2(-y);
                        ((std::f64::consts::FRAC_PI_2 - c).to_degrees(), lam.to_degrees())
                    }
                    Pole::South => {
                        if rho < 1e-10 {
                            return (-90.0, lam_t.to_degrees());
                        }
                        let lam = lam_t + x.atan2(y);
                        ((c - std::f64::consts::FRAC_PI_2).to_degrees(), lam.to_degrees())
                    }
                }
            }
            ProjKind::Mercator { y0 } => {
                let lam = self.origin_lon.to_radians() + x / r;
                let phi =
                    2.0 * ((y + y0) / r).exp().atan() - std::f64::consts::FRAC_PI_2;
                (phi.to_degrees(), lam.to_degrees())
            }
            ProjKind::TransverseMercator { scale } => {
                let xr = x / (r * scale);
                let d = y / (r * scale) + self.origin_lat.to_radians();
                let phi = (d.sin() / xr.cosh()).clamp(-1.0, 1.0).asin();
                let lam = self.origin_lon.to_radians() + xr.sinh().atan2(d.cos());
                (phi.to_degrees(), lam.to_degrees())
            }
            ProjKind::Albers { n, big_c, rho0 } => {
                let sign = n.signum();
                let rho = (x * x + (rho0 - y) * (rho0 - y)).sqrt();
                let theta = (sign * x).atan2(sign * (rho0 - y));
                let phi = ((big_c - (rho * n / r).powi(2)) / (2.0 * n))
                    .clamp(-1.0, 1.0)
                    .asin();
                let lam = self.origin_lon.to_radians() + theta / n;
                (phi.to_degrees(), lam.to_degrees())
            }
            ProjKind::LambertAzimuthal { sin0, cos0 } => {
                let rho = x.hypot(y);
                if rho < 1e-10 {
                    return (self.origin_lat, self.origin_lon);
                }
                let c = 2.0 * (rho / (2.0 * r)).clamp(-1.0, 1.0).asin();
                let phi = (c.cos() * sin0 + y * c.sin() * cos0 / rho)
                    .clamp(-1.0, 1.0)
                    .asin();
                let lam = self.origin_lon.to_radians()
                    + (x * c.sin()).atan2(rho * cos0 * c.cos() - y * sin0 * c.sin());
                (phi.to_degrees(), lam.to_degrees())
            }
        }
    }
}
