//! Location bias parsing.
//!
//! Map-search location bias strings follow the `@lat,lng,zoomz` format
//! (e.g. `@18.5654075,73.9445731,14z`). The leading `@` and the zoom
//! component are optional.

use std::sync::LazyLock;

use hotel_safety_models::Coordinates;
use regex::Regex;

static LAT_LNG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^@?[ ]*(-?[0-9]+(?:\.[0-9]+)?)[ ]*,[ ]*(-?[0-9]+(?:\.[0-9]+)?)(?:[ ]*,.*)?$")
        .expect("valid regex")
});

/// Extracts coordinates from a location bias string.
///
/// Returns `None` for free-text locations and out-of-range values.
#[must_use]
pub fn parse_location_bias(bias: &str) -> Option<Coordinates> {
    let caps = LAT_LNG_RE.captures(bias.trim())?;
    let latitude: f64 = caps.get(1)?.as_str().parse().ok()?;
    let longitude: f64 = caps.get(2)?.as_str().parse().ok()?;

    if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
        log::debug!("Ignoring out-of-range location bias: {bias}");
        return None;
    }

    Some(Coordinates {
        latitude,
        longitude,
    })
}
