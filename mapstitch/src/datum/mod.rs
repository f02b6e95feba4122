//! Datum conversion module
//!
//! Conversions between WGS84 and the regionally-distorted datums used by
//! Chinese map providers: GCJ02 ("Mars coordinates") and BD09 (Baidu).
//! All functions are pure `GeoPoint -> GeoPoint` transforms and compose.
//!
//! The GCJ02 distortion is only defined inside a fixed geographic
//! rectangle (roughly mainland China). Points outside that rectangle pass
//! through every transform unchanged, so round-tripping any of these
//! conversions outside coverage is an exact identity.
//!
//! `gcj02_to_wgs84` is an approximate inverse: it applies a single
//! fixed-point correction step (re-distort the input and subtract the
//! offset), which recovers the original point to well under 1e-3 degrees.

use crate::coord::GeoPoint;
use std::f64::consts::PI;

/// Semi-major axis of the Krasovsky 1940 ellipsoid used by GCJ02.
const KRASOVSKY_A: f64 = 6378245.0;

/// First eccentricity squared of the Krasovsky 1940 ellipsoid.
const KRASOVSKY_EE: f64 = 0.00669342162296594323;

/// Scaled π used by the BD09 offset formulas.
const X_PI: f64 = PI * 3000.0 / 180.0;

/// Coverage rectangle of the GCJ02 distortion.
const COVERAGE_LNG_MIN: f64 = 72.004;
const COVERAGE_LNG_MAX: f64 = 137.8347;
const COVERAGE_LAT_MIN: f64 = 0.8293;
const COVERAGE_LAT_MAX: f64 = 55.8271;

/// Returns true when a point lies outside the rectangle in which the
/// GCJ02 distortion is defined. Such points bypass every transform.
#[inline]
pub fn out_of_coverage(point: GeoPoint) -> bool {
    point.lng < COVERAGE_LNG_MIN
        || point.lng > COVERAGE_LNG_MAX
        || point.lat < COVERAGE_LAT_MIN
        || point.lat > COVERAGE_LAT_MAX
}

fn transform_lat(x: f64, y: f64) -> f64 {
    let mut ret =
        -100.0 + 2.0 * x + 3.0 * y + 0.2 * y * y + 0.1 * x * y + 0.2 * x.abs().sqrt();
    ret += (20.0 * (6.0 * x * PI).sin() + 20.0 * (2.0 * x * PI).sin()) * 2.0 / 3.0;
    ret += (20.0 * (y * PI).sin() + 40.0 * (y / 3.0 * PI).sin()) * 2.0 / 3.0;
    ret += (160.0 * (y / 12.0 * PI).sin() + 320.0 * (y * PI / 30.0).sin()) * 2.0 / 3.0;
    ret
}

fn transform_lng(x: f64, y: f64) -> f64 {
    let mut ret = 300.0 + x + 2.0 * y + 0.1 * x * x + 0.1 * x * y + 0.1 * x.abs().sqrt();
    ret += (20.0 * (6.0 * x * PI).sin() + 20.0 * (2.0 * x * PI).sin()) * 2.0 / 3.0;
    ret += (20.0 * (x * PI).sin() + 40.0 * (x / 3.0 * PI).sin()) * 2.0 / 3.0;
    ret += (150.0 * (x / 12.0 * PI).sin() + 300.0 * (x / 30.0 * PI).sin()) * 2.0 / 3.0;
    ret
}

/// Applies the forward GCJ02 offset to a point assumed to be WGS84.
///
/// Callers are responsible for the coverage check.
fn distort(point: GeoPoint) -> GeoPoint {
    let d_lat = transform_lat(point.lng - 105.0, point.lat - 35.0);
    let d_lng = transform_lng(point.lng - 105.0, point.lat - 35.0);

    let rad_lat = point.lat / 180.0 * PI;
    let mut magic = rad_lat.sin();
    magic = 1.0 - KRASOVSKY_EE * magic * magic;
    let sqrt_magic = magic.sqrt();

    let d_lat = d_lat * 180.0 / (KRASOVSKY_A * (1.0 - KRASOVSKY_EE) / (magic * sqrt_magic) * PI);
    let d_lng = d_lng * 180.0 / (KRASOVSKY_A / sqrt_magic * rad_lat.cos() * PI);

    GeoPoint::new(point.lng + d_lng, point.lat + d_lat)
}

/// WGS84 to GCJ02.
pub fn wgs84_to_gcj02(point: GeoPoint) -> GeoPoint {
    if out_of_coverage(point) {
        return point;
    }
    distort(point)
}

/// GCJ02 to WGS84, via one fixed-point correction step.
///
/// Not an exact inverse: the offset is re-computed at the distorted point
/// rather than the unknown original, leaving a residual of roughly 1e-5
/// degrees inside coverage.
pub fn gcj02_to_wgs84(point: GeoPoint) -> GeoPoint {
    if out_of_coverage(point) {
        return point;
    }
    let shifted = distort(point);
    GeoPoint::new(
        point.lng * 2.0 - shifted.lng,
        point.lat * 2.0 - shifted.lat,
    )
}

/// GCJ02 to BD09.
pub fn gcj02_to_bd09(point: GeoPoint) -> GeoPoint {
    if out_of_coverage(point) {
        return point;
    }
    let x = point.lng;
    let y = point.lat;
    let z = (x * x + y * y).sqrt() + 0.00002 * (y * X_PI).sin();
    let theta = y.atan2(x) + 0.000003 * (x * X_PI).cos();
    GeoPoint::new(z * theta.cos() + 0.0065, z * theta.sin() + 0.006)
}

/// BD09 to GCJ02.
pub fn bd09_to_gcj02(point: GeoPoint) -> GeoPoint {
    if out_of_coverage(point) {
        return point;
    }
    let x = point.lng - 0.0065;
    let y = point.lat - 0.006;
    let z = (x * x + y * y).sqrt() - 0.00002 * (y * X_PI).sin();
    let theta = y.atan2(x) - 0.000003 * (x * X_PI).cos();
    GeoPoint::new(z * theta.cos(), z * theta.sin())
}

/// WGS84 to BD09.
pub fn wgs84_to_bd09(point: GeoPoint) -> GeoPoint {
    gcj02_to_bd09(wgs84_to_gcj02(point))
}

/// BD09 to WGS84.
pub fn bd09_to_wgs84(point: GeoPoint) -> GeoPoint {
    gcj02_to_wgs84(bd09_to_gcj02(point))
}
