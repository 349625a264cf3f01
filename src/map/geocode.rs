//! Address search gateway. One best-match lookup against a Nominatim-style
//! service; the caller recenters the viewport on success and shows a
//! non-blocking notice otherwise. Failures are never retried automatically.

use gloo_net::http::Request;
use serde::Deserialize;

use crate::geo::LatLng;

const ENDPOINT: &str = "https://nominatim.openstreetmap.org/search";

/// Fixed locality qualifier appended to every query.
pub const LOCALITY: &str = "Cheongju";

#[derive(Debug, Clone, Deserialize)]
struct SearchHit {
    lat: String,
    lon: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GeocodeOutcome {
    Found(LatLng),
    NotFound,
}

pub async fn search(query: &str) -> Result<GeocodeOutcome, gloo_net::Error> {
    let q = format!("{} {}", query.trim(), LOCALITY);
    let hits: Vec<SearchHit> = Request::get(ENDPOINT)
        .query([("q", q.as_str()), ("format", "json"), ("limit", "1")])
        .send()
        .await?
        .json()
        .await?;
    Ok(match hits.first().and_then(parse_hit) {
        Some(pos) => GeocodeOutcome::Found(pos),
        None => GeocodeOutcome::NotFound,
    })
}

// Nominatim serializes coordinates as strings; a malformed pair counts as
// no match rather than an error.
fn parse_hit(hit: &SearchHit) -> Option<LatLng> {
    let lat = hit.lat.parse::<f64>().ok()?;
    let lon = hit.lon.parse::<f64>().ok()?;
    Some(LatLng::new(lat, lon))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn well_formed_hit_parses() {
        let hit = SearchHit { lat: "36.6424".into(), lon: "127.489".into() };
        assert_eq!(parse_hit(&hit), Some(LatLng::new(36.6424, 127.489)));
    }

    #[test]
    fn malformed_coordinates_count_as_no_match() {
        let hit = SearchHit { lat: "n/a".into(), lon: "127.489".into() };
        assert_eq!(parse_hit(&hit), None);
    }
}
