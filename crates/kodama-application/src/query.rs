// SPDX-License-Identifier: GPL-3.0-or-later

//! Client-side film query engine.
//!
//! [`query_films`] filters the catalog against the user's metadata and the active
//! [`FilmFilters`], then orders the result by [`FilmSort`]. It is pure and
//! synchronous, cheap enough to run on every keystroke over the full catalog.

use std::cmp::Ordering;

use kodama_domain::{FilmEntity, FilmFilters, FilmSort, MetaStore, SortKey, StarsFilter};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Filter and sort `films`. Inputs are only borrowed; the result references
/// entries of `films` in display order.
pub fn query_films<'a>(
    films: &'a [FilmEntity],
    meta: &MetaStore,
    filters: &FilmFilters,
    sort: &FilmSort,
) -> Vec<&'a FilmEntity> {
    let text = TextQuery::new(&filters.query, filters.include_synopsis);

    let mut keyed: Vec<(SortValue, &FilmEntity)> = films
        .iter()
        .filter(|film| passes_meta_filters(film, meta, filters))
        .filter(|film| text.matches(film))
        .map(|film| (SortValue::of(film, meta, sort.key), film))
        .collect();

    // `sort_by` is stable, so equal keys keep catalog order.
    keyed.sort_by(|(a, _), (b, _)| a.compare(b, sort));

    keyed.into_iter().map(|(_, film)| film).collect()
}

fn passes_meta_filters(film: &FilmEntity, meta: &MetaStore, filters: &FilmFilters) -> bool {
    let meta = meta.get(film.id());

    if filters.watched_only && !meta.watched {
        return false;
    }
    if filters.favorite_only && !meta.favorite {
        return false;
    }
    if filters.noted_only && !meta.has_note() {
        return false;
    }

    match filters.stars {
        Some(StarsFilter::Unrated) => meta.rating.is_none(),
        Some(StarsFilter::Rating(stars)) => meta.rating == Some(stars),
        None => true,
    }
}

struct TextQuery {
    needle: Option<String>,
    include_synopsis: bool,
}

impl TextQuery {
    fn new(query: &str, include_synopsis: bool) -> Self {
        let trimmed = query.trim();
        Self {
            needle: (!trimmed.is_empty()).then(|| trimmed.to_lowercase()),
            include_synopsis,
        }
    }

    fn matches(&self, film: &FilmEntity) -> bool {
        let Some(needle) = self.needle.as_deref() else {
            return true;
        };

        if film.title().to_lowercase().contains(needle) {
            return true;
        }

        self.include_synopsis && film.description().to_lowercase().contains(needle)
    }
}

/// Precomputed sort key for one film.
enum SortValue {
    Text { folded: String, tiebreak: String },
    Number(Option<f64>),
}

impl SortValue {
    fn of(film: &FilmEntity, meta: &MetaStore, key: SortKey) -> Self {
        match key {
            SortKey::Title => Self::Text {
                folded: collation_key(film.title()),
                tiebreak: case_tiebreak_key(film.title()),
            },
            SortKey::Duration => Self::Number(film.running_time_minutes()),
            SortKey::PersonalRating => {
                Self::Number(meta.get(film.id()).rating.map(|r| f64::from(r.value())))
            }
            SortKey::RtScore => Self::Number(film.rt_score()),
        }
    }

    fn compare(&self, other: &Self, sort: &FilmSort) -> Ordering {
        match (self, other) {
            (
                Self::Text { folded, tiebreak },
                Self::Text {
                    folded: other_folded,
                    tiebreak: other_tiebreak,
                },
            ) => sort
                .direction
                .apply(folded.cmp(other_folded).then_with(|| tiebreak.cmp(other_tiebreak))),
            (Self::Number(a), Self::Number(b)) => compare_nullable_number(*a, *b, sort),
            // Keys are built from a single SortKey, so mixed variants never meet.
            _ => Ordering::Equal,
        }
    }
}

/// Missing values go last in either direction; the direction only applies
/// once both sides have a value.
fn compare_nullable_number(a: Option<f64>, b: Option<f64>, sort: &FilmSort) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => sort.direction.apply(a.total_cmp(&b)),
    }
}

/// Accent- and case-insensitive key: NFKD, combining marks dropped, lowercased.
pub(crate) fn collation_key(value: &str) -> String {
    value
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Tie-break for titles whose collation keys are equal. Case is swapped so
/// that lowercase sorts before uppercase ("totoro" < "Totoro").
fn case_tiebreak_key(value: &str) -> String {
    value
        .chars()
        .flat_map(|c| {
            let swapped: Vec<char> = if c.is_lowercase() {
                c.to_uppercase().collect()
            } else if c.is_uppercase() {
                c.to_lowercase().collect()
            } else {
                vec![c]
            };
            swapped
        })
        .collect()
}
