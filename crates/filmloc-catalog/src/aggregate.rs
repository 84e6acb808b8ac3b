use std::borrow::Cow;

use filmloc_types::{CountryCountMap, RawRecord, YearLocationMap};

/// Marker searched for in title fields: `(` followed by the year digits.
///
/// Left unclosed so suffixed markers such as `(1994/II)` also match.
pub fn year_marker(year: i32) -> String {
    format!("({year}")
}

/// Group the titles released in `year` by their raw location string.
pub fn aggregate_by_year<'a, I>(records: I, year: i32) -> YearLocationMap<'a>
where
    I: IntoIterator<Item = RawRecord<'a>>,
{
    let marker = year_marker(year);
    let mut map = YearLocationMap::new();
    for record in records {
        if let Some(idx) = record.title.find(&marker) {
            let name = film_name(&record.title[..idx]);
            map.entry(record.location).or_default().push(name);
        }
    }
    map
}

/// Count every record once under its normalized country.
pub fn aggregate_by_country<'a, I>(records: I) -> CountryCountMap<'a>
where
    I: IntoIterator<Item = RawRecord<'a>>,
{
    let mut counts = CountryCountMap::new();
    for record in records {
        *counts.entry(normalize_country(record.location)).or_insert(0) += 1;
    }
    counts
}

/// Stored count for `country`, or 0.
pub fn count_for(country: &str, counts: &CountryCountMap<'_>) -> u64 {
    counts.get(country).copied().unwrap_or(0)
}

/// Reduce a location string to the country key used by [`aggregate_by_country`].
///
/// Equivalent to replacing every `". "` with `","`, keeping what follows the
/// last comma and trimming leading whitespace, then mapping anything that
/// mentions `USA` or `UK` to the full country name. Works on the borrowed
/// slice instead of building the replaced string.
pub fn normalize_country(location: &str) -> &str {
    let after_comma = location.rfind(',').map(|i| i + 1);
    let after_abbrev = location.rfind(". ").map(|i| i + 2);
    let start = after_comma.max(after_abbrev).unwrap_or(0);
    let country = location[start..].trim_start();

    if country.contains("USA") {
        "United States"
    } else if country.contains("UK") {
        "United Kingdom"
    } else {
        country
    }
}

fn film_name(raw: &str) -> Cow<'_, str> {
    if raw.contains('\'') {
        Cow::Owned(raw.replace('\'', "\""))
    } else {
        Cow::Borrowed(raw)
    }
}
