//! Resolve free-text film locations to coordinates.
//!
//! Location strings in film catalogs are often too specific for a geocoder
//! (`Stage 5, Pinewood Studios, Iver Heath, Buckinghamshire, England, UK`).
//! When a lookup fails the query is coarsened by dropping its leftmost,
//! most specific component, and retried until a match is found or nothing is
//! left to drop. The crate is decoupled from any particular service: it only
//! depends on the [`Geocoder`] trait, with [`NominatimClient`] as the bundled
//! HTTP implementation.
//!
//! # How it works
//! 1. Query the full location string.
//! 2. On "not found" or an error, drop everything up to and including the
//!    first comma and query again.
//! 3. Stop once coarsening no longer changes the query; the name is logged
//!    as unresolved.
//!
//! # Example
//! ```no_run
//! use filmloc_geocode::{NominatimClient, NominatimConfig, resolve};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let client = NominatimClient::new(NominatimConfig::default())?;
//! if let Some(found) = resolve(&client, "Culver City, California, USA").await {
//!     println!("{:?} via {:?}: {}", found.query, found.source, found.coordinates);
//! }
//! # Ok(()) }
//! ```
//!
//! For a runnable demo, see `cargo run -p filmloc-geocode --example lookup -- "<place>"`.

mod nominatim;
mod throttle;

use async_trait::async_trait;
use filmloc_types::Coordinates;
use thiserror::Error;
use tracing::{debug, warn};

pub use nominatim::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT, NominatimClient, NominatimConfig};
pub use throttle::Throttle;

#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("geocoding request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid geocoder base url {0}")]
    InvalidBaseUrl(String),
    #[error("invalid {field} in geocoder response: {value}")]
    InvalidCoordinate { field: &'static str, value: String },
}

/// A service turning a place name into coordinates.
///
/// `Ok(None)` means the service answered but knows no such place.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, place: &str) -> Result<Option<Coordinates>, GeocodeError>;
}

/// Which rung of the ladder produced a match.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum QuerySource {
    /// The full location string.
    Exact,
    /// The location with its `dropped` leftmost components removed.
    Coarsened { dropped: usize },
}

/// A successful lookup paired with the query that produced it.
#[derive(Clone, Debug, PartialEq)]
pub struct Resolution<'a> {
    pub query: &'a str,
    pub source: QuerySource,
    pub coordinates: Coordinates,
}

/// Drop everything up to and including the first comma.
///
/// A name without a comma is returned unchanged, which ends the ladder.
pub fn coarsen(name: &str) -> &str {
    match name.find(',') {
        Some(idx) => &name[idx + 1..],
        None => name,
    }
}

/// Iterate over the queries tried for `name`, most specific first.
pub fn ladder(name: &str) -> Ladder<'_> {
    Ladder {
        next: Some(name),
        source: QuerySource::Exact,
    }
}

/// Iterator returned by [`ladder`]. Yields at most one query per comma, plus one.
#[derive(Clone, Debug)]
pub struct Ladder<'a> {
    next: Option<&'a str>,
    source: QuerySource,
}

impl<'a> Iterator for Ladder<'a> {
    type Item = (QuerySource, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        let source = self.source;
        let coarser = coarsen(current);
        if coarser == current {
            self.next = None;
        } else {
            self.next = Some(coarser);
            self.source = match source {
                QuerySource::Exact => QuerySource::Coarsened { dropped: 1 },
                QuerySource::Coarsened { dropped } => QuerySource::Coarsened {
                    dropped: dropped + 1,
                },
            };
        }
        Some((source, current))
    }
}

/// Walk the coarsening ladder until `geocoder` finds a match.
///
/// Errors are treated like "not found" and move on to the next rung. Returns
/// `None`, after logging the unresolved name, once the ladder is exhausted.
pub async fn resolve<'a, G>(geocoder: &G, name: &'a str) -> Option<Resolution<'a>>
where
    G: Geocoder + ?Sized,
{
    let mut last = name;
    for (source, query) in ladder(name) {
        last = query;
        match geocoder.geocode(query).await {
            Ok(Some(coordinates)) => {
                return Some(Resolution {
                    query,
                    source,
                    coordinates,
                });
            }
            Ok(None) => debug!(query, "no geocoding match"),
            Err(err) => debug!(query, error = %err, "geocoding failed"),
        }
    }
    warn!("location not found: {last:?} (from {name:?})");
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    struct FakeGeocoder {
        known: HashMap<&'static str, Coordinates>,
        failing: Vec<&'static str>,
        asked: Mutex<Vec<String>>,
    }

    impl FakeGeocoder {
        fn new(known: &[(&'static str, f64, f64)]) -> Self {
            Self {
                known: known
                    .iter()
                    .map(|(name, lat, lon)| {
                        (
                            *name,
                            Coordinates {
                                latitude: *lat,
                                longitude: *lon,
                            },
                        )
                    })
                    .collect(),
                failing: Vec::new(),
                asked: Mutex::new(Vec::new()),
            }
        }

        fn asked(&self) -> Vec<String> {
            self.asked.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Geocoder for FakeGeocoder {
        async fn geocode(&self, place: &str) -> Result<Option<Coordinates>, GeocodeError> {
            self.asked.lock().unwrap().push(place.to_string());
            if self.failing.iter().any(|f| *f == place) {
                return Err(GeocodeError::InvalidCoordinate {
                    field: "lat",
                    value: "timeout".into(),
                });
            }
            Ok(self.known.get(place).copied())
        }
    }

    #[test]
    fn coarsen_drops_leftmost_component() {
        assert_eq!(coarsen("a, b, c"), " b, c");
        assert_eq!(coarsen(" c"), " c");
        assert_eq!(coarsen("a,"), "");
        assert_eq!(coarsen(""), "");
    }

    #[test]
    fn ladder_is_bounded_by_commas() {
        let rungs: Vec<_> = ladder("a, b, c").collect();
        assert_eq!(
            rungs,
            vec![
                (QuerySource::Exact, "a, b, c"),
                (QuerySource::Coarsened { dropped: 1 }, " b, c"),
                (QuerySource::Coarsened { dropped: 2 }, " c"),
            ]
        );
        assert_eq!(ladder("Marrakech").count(), 1);
        assert_eq!(ladder("").count(), 1);
        assert_eq!(ladder(",,,").count(), 4);
    }

    #[tokio::test]
    async fn exact_match_needs_one_query() {
        let geo = FakeGeocoder::new(&[("Paris, France", 48.85, 2.35)]);
        let found = resolve(&geo, "Paris, France").await.expect("resolved");
        assert_eq!(found.source, QuerySource::Exact);
        assert_eq!(found.coordinates.latitude, 48.85);
        assert_eq!(geo.asked(), vec!["Paris, France"]);
    }

    #[tokio::test]
    async fn falls_back_to_coarser_names() {
        let geo = FakeGeocoder::new(&[(" California, USA", 36.7, -119.4)]);
        let found = resolve(&geo, "Stage 5, California, USA").await.expect("resolved");
        assert_eq!(found.query, " California, USA");
        assert_eq!(found.source, QuerySource::Coarsened { dropped: 1 });
    }

    #[tokio::test]
    async fn errors_are_retried_coarser() {
        let mut geo = FakeGeocoder::new(&[(" France", 46.2, 2.2)]);
        geo.failing.push("Paris, France");
        let found = resolve(&geo, "Paris, France").await.expect("resolved");
        assert_eq!(found.query, " France");
        assert_eq!(geo.asked(), vec!["Paris, France", " France"]);
    }

    #[tokio::test]
    async fn gives_up_when_nothing_left_to_drop() {
        let geo = FakeGeocoder::new(&[]);
        assert!(resolve(&geo, "Nowhere, Atlantis").await.is_none());
        assert_eq!(geo.asked(), vec!["Nowhere, Atlantis", " Atlantis"]);

        let geo = FakeGeocoder::new(&[]);
        assert!(resolve(&geo, "Atlantis").await.is_none());
        assert_eq!(geo.asked(), vec!["Atlantis"]);
    }
}
