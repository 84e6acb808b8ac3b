use filmloc_catalog::count_for;
use filmloc_geocode::{Geocoder, resolve};
use filmloc_types::{Coordinates, CountryCountMap, Tier, YearLocationMap};
use geojson::FeatureCollection;
use tracing::{debug, info};

/// Initial map view.
pub const MAP_CENTER: Coordinates = Coordinates {
    latitude: 48.314775,
    longitude: 25.082925,
};
pub const MAP_ZOOM: u8 = 2;

/// Boundary feature property holding the country name.
pub const NAME_PROPERTY: &str = "NAME";

/// A resolved location with its popup text.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub location: String,
    pub label: String,
    pub coordinates: Coordinates,
}

/// Everything the renderer needs for one artifact.
#[derive(Debug, Clone)]
pub struct ComposedMap {
    pub year: i32,
    pub center: Coordinates,
    pub zoom: u8,
    /// Boundaries with `film_count`, `tier` and `fillColor` set on every feature.
    pub boundaries: FeatureCollection,
    pub markers: Vec<Marker>,
    /// Locations the geocoder could not place, even after coarsening.
    pub unresolved: Vec<String>,
}

/// Popup text: every title followed by `", "`.
pub fn marker_label<S: AsRef<str>>(titles: &[S]) -> String {
    let mut label = String::new();
    for title in titles {
        label.push_str(title.as_ref());
        label.push_str(", ");
    }
    label
}

/// Tier of a boundary feature name; unknown names count as zero films.
pub fn tier_for(name: &str, counts: &CountryCountMap<'_>) -> Tier {
    Tier::for_count(count_for(name, counts))
}

/// Annotate each boundary feature with its film count and tier styling.
pub fn style_boundaries(
    mut boundaries: FeatureCollection,
    counts: &CountryCountMap<'_>,
) -> FeatureCollection {
    for feature in &mut boundaries.features {
        let count = feature
            .property(NAME_PROPERTY)
            .and_then(|v| v.as_str())
            .map(|name| count_for(name, counts))
            .unwrap_or(0);
        let tier = Tier::for_count(count);
        feature.set_property("film_count", count);
        feature.set_property("tier", tier.to_string());
        feature.set_property("fillColor", tier.fill_color());
    }
    boundaries
}

/// Geocode every location of the year map, one request at a time.
///
/// Returns the placed markers and the locations that stayed unresolved.
pub async fn place_markers<G>(
    by_year: &YearLocationMap<'_>,
    geocoder: &G,
) -> (Vec<Marker>, Vec<String>)
where
    G: Geocoder + ?Sized,
{
    let mut markers = Vec::with_capacity(by_year.len());
    let mut unresolved = Vec::new();
    for (location, titles) in by_year {
        match resolve(geocoder, location).await {
            Some(found) => {
                debug!(location, query = found.query, "placed marker");
                markers.push(Marker {
                    location: location.to_string(),
                    label: marker_label(titles),
                    coordinates: found.coordinates,
                });
            }
            None => unresolved.push(location.to_string()),
        }
    }
    (markers, unresolved)
}

/// Combine both aggregates, the boundaries and a geocoder into a renderable map.
pub async fn compose<G>(
    year: i32,
    by_year: &YearLocationMap<'_>,
    counts: &CountryCountMap<'_>,
    boundaries: FeatureCollection,
    geocoder: &G,
) -> ComposedMap
where
    G: Geocoder + ?Sized,
{
    let boundaries = style_boundaries(boundaries, counts);
    let (markers, unresolved) = place_markers(by_year, geocoder).await;
    info!(
        "{} of {} locations placed for {year}",
        markers.len(),
        by_year.len()
    );
    ComposedMap {
        year,
        center: MAP_CENTER,
        zoom: MAP_ZOOM,
        boundaries,
        markers,
        unresolved,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::borrow::Cow;

    #[test]
    fn label_keeps_trailing_separator() {
        let titles: Vec<Cow<str>> = vec!["\"A\"".into(), "\"B\"".into()];
        assert_eq!(marker_label(&titles), "\"A\", \"B\", ");
        assert_eq!(marker_label::<&str>(&[]), "");
    }

    #[test]
    fn tiers_follow_counts() {
        let counts = CountryCountMap::from([("France", 2999), ("United States", 20001)]);
        assert_eq!(tier_for("France", &counts), Tier::A);
        assert_eq!(tier_for("United States", &counts), Tier::C);
        assert_eq!(tier_for("Atlantis", &counts), Tier::A);
    }

    #[test]
    fn styles_every_feature() {
        let boundaries: FeatureCollection = r#"{
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "geometry": null, "properties": {"NAME": "France"}},
                {"type": "Feature", "geometry": null, "properties": {"NAME": "Germany"}},
                {"type": "Feature", "geometry": null, "properties": {}}
            ]
        }"#
        .parse::<geojson::GeoJson>()
        .and_then(FeatureCollection::try_from)
        .unwrap();
        let counts = CountryCountMap::from([("France", 3000), ("Germany", 25000)]);

        let styled = style_boundaries(boundaries, &counts);
        let colors: Vec<&str> = styled
            .features
            .iter()
            .map(|f| f.property("fillColor").and_then(|v| v.as_str()).unwrap())
            .collect();
        assert_eq!(colors, vec!["orange", "red", "green"]);
        assert_eq!(
            styled.features[0].property("film_count"),
            Some(&serde_json::json!(3000))
        );
        assert_eq!(
            styled.features[2].property("tier"),
            Some(&serde_json::json!("A"))
        );
    }
}
