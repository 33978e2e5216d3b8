// SPDX-License-Identifier: GPL-3.0-or-later
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("personal rating must be between 1 and 5, got {0}")]
    InvalidRating(u8),

    #[error("unknown sort key: {0}")]
    UnknownSortKey(String),

    #[error("unknown sort direction: {0}")]
    UnknownSortDirection(String),

    #[error("unknown stars filter: {0}")]
    UnknownStarsFilter(String),

    #[error("unknown theme mode: {0}")]
    UnknownThemeMode(String),
}

// ============================================================================
// Film Record
// ============================================================================

/// A film as returned by the Studio Ghibli API. Numeric fields arrive as strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Film {
    pub id: String,
    pub title: String,
    pub original_title: String,
    pub original_title_romanised: String,
    pub image: String,
    pub movie_banner: String,
    pub description: String,
    pub director: String,
    pub producer: String,
    pub release_date: String,
    pub running_time: String,
    pub rt_score: String,
    #[serde(default)]
    pub people: Vec<String>,
    #[serde(default)]
    pub species: Vec<String>,
    #[serde(default)]
    pub locations: Vec<String>,
    #[serde(default)]
    pub vehicles: Vec<String>,
    pub url: String,
}

/// Read-side wrapper around [`Film`] with numeric conversions and display helpers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilmEntity(Film);

impl FilmEntity {
    pub fn new(film: Film) -> Self {
        Self(film)
    }

    pub fn raw(&self) -> &Film {
        &self.0
    }

    pub fn id(&self) -> &str {
        &self.0.id
    }

    pub fn title(&self) -> &str {
        &self.0.title
    }

    pub fn description(&self) -> &str {
        &self.0.description
    }

    pub fn director(&self) -> &str {
        &self.0.director
    }

    pub fn producer(&self) -> &str {
        &self.0.producer
    }

    /// Release year, or `None` when the field is not numeric.
    pub fn release_year(&self) -> Option<f64> {
        parse_numeric(&self.0.release_date)
    }

    /// Running time in minutes, or `None` when the field is not numeric.
    pub fn running_time_minutes(&self) -> Option<f64> {
        parse_numeric(&self.0.running_time)
    }

    /// Rotten Tomatoes score (0-100), or `None` when the field is not numeric.
    pub fn rt_score(&self) -> Option<f64> {
        parse_numeric(&self.0.rt_score)
    }

    /// `"125 min"`, or `"—"` without a running time.
    pub fn running_time_label(&self) -> String {
        match self.running_time_minutes() {
            Some(minutes) => format!("{} min", minutes),
            None => "—".to_string(),
        }
    }

    /// `"2h 5m"`, `"45m"` under an hour, or `"—"` without a running time.
    pub fn running_time_hh_mm_label(&self) -> String {
        let Some(minutes) = self.running_time_minutes() else {
            return "—".to_string();
        };

        let hours = (minutes / 60.0).floor();
        let rest = minutes % 60.0;

        if hours <= 0.0 {
            format!("{}m", rest)
        } else {
            format!("{}h {}m", hours, rest)
        }
    }
}

impl From<Film> for FilmEntity {
    fn from(film: Film) -> Self {
        Self::new(film)
    }
}

/// Numeric-string coercion used for API fields. Blank input counts as zero,
/// anything that does not parse to a finite number is `None`.
pub fn parse_numeric(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Some(0.0);
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

// ============================================================================
// Film Metadata
// ============================================================================

/// A personal star rating, 1 through 5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct PersonalRating(u8);

impl PersonalRating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(value: u8) -> Result<Self, DomainError> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(DomainError::InvalidRating(value))
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for PersonalRating {
    type Error = DomainError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PersonalRating> for u8 {
    fn from(rating: PersonalRating) -> Self {
        rating.0
    }
}

impl fmt::Display for PersonalRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// User-authored annotations for a single film.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FilmMeta {
    pub watched: bool,
    pub favorite: bool,
    pub note: String,
    #[serde(deserialize_with = "Option::deserialize")]
    pub rating: Option<PersonalRating>,
}

static DEFAULT_FILM_META: FilmMeta = FilmMeta {
    watched: false,
    favorite: false,
    note: String::new(),
    rating: None,
};

impl FilmMeta {
    /// Shared default returned for films without an entry.
    pub fn default_ref() -> &'static FilmMeta {
        &DEFAULT_FILM_META
    }

    pub fn has_note(&self) -> bool {
        !self.note.trim().is_empty()
    }

    fn merged(&self, patch: FilmMetaPatch) -> FilmMeta {
        FilmMeta {
            watched: patch.watched.unwrap_or(self.watched),
            favorite: patch.favorite.unwrap_or(self.favorite),
            note: patch.note.unwrap_or_else(|| self.note.clone()),
            rating: patch.rating.unwrap_or(self.rating),
        }
    }
}

/// Partial update applied by [`MetaStore::set`]. `None` leaves a field as is;
/// `rating: Some(None)` clears the rating.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilmMetaPatch {
    pub watched: Option<bool>,
    pub favorite: Option<bool>,
    pub note: Option<String>,
    pub rating: Option<Option<PersonalRating>>,
}

/// Metadata keyed by film id. Mutations return a new store and leave `self` untouched.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetaStore {
    entries: HashMap<String, FilmMeta>,
}

impl MetaStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entry for `id`, or the shared default when there is none.
    pub fn get(&self, id: &str) -> &FilmMeta {
        self.entries.get(id).unwrap_or(FilmMeta::default_ref())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Merge `patch` over the current entry (or the default) and return the new
    /// store along with the resulting entry.
    pub fn set(&self, id: &str, patch: FilmMetaPatch) -> (MetaStore, FilmMeta) {
        let next = self.get(id).merged(patch);
        let mut entries = self.entries.clone();
        entries.insert(id.to_string(), next.clone());
        (MetaStore { entries }, next)
    }

    /// Flip `favorite`; returns the new store and the new value.
    pub fn toggle_favorite(&self, id: &str) -> (MetaStore, bool) {
        let next = !self.get(id).favorite;
        let (store, _) = self.set(
            id,
            FilmMetaPatch {
                favorite: Some(next),
                ..FilmMetaPatch::default()
            },
        );
        (store, next)
    }

    /// Flip `watched`; returns the new store and the new value.
    pub fn toggle_watched(&self, id: &str) -> (MetaStore, bool) {
        let next = !self.get(id).watched;
        let (store, _) = self.set(
            id,
            FilmMetaPatch {
                watched: Some(next),
                ..FilmMetaPatch::default()
            },
        );
        (store, next)
    }

    pub fn save_note(&self, id: &str, note: impl Into<String>, rating: PersonalRating) -> MetaStore {
        self.set(
            id,
            FilmMetaPatch {
                note: Some(note.into()),
                rating: Some(Some(rating)),
                ..FilmMetaPatch::default()
            },
        )
        .0
    }

    /// Clear note and rating; watched/favorite are kept.
    pub fn remove_note(&self, id: &str) -> MetaStore {
        self.set(
            id,
            FilmMetaPatch {
                note: Some(String::new()),
                rating: Some(None),
                ..FilmMetaPatch::default()
            },
        )
        .0
    }
}

impl FromIterator<(String, FilmMeta)> for MetaStore {
    fn from_iter<I: IntoIterator<Item = (String, FilmMeta)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

// ============================================================================
// Filters
// ============================================================================

const UNRATED: &str = "unrated";

/// Star constraint on the personal rating. Serialized as `1..5` or `"unrated"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "StarsFilterRepr", into = "StarsFilterRepr")]
pub enum StarsFilter {
    Rating(PersonalRating),
    Unrated,
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum StarsFilterRepr {
    Rating(u8),
    Keyword(String),
}

impl TryFrom<StarsFilterRepr> for StarsFilter {
    type Error = DomainError;

    fn try_from(repr: StarsFilterRepr) -> Result<Self, Self::Error> {
        match repr {
            StarsFilterRepr::Rating(value) => Ok(Self::Rating(PersonalRating::new(value)?)),
            StarsFilterRepr::Keyword(keyword) => keyword.parse(),
        }
    }
}

impl From<StarsFilter> for StarsFilterRepr {
    fn from(filter: StarsFilter) -> Self {
        match filter {
            StarsFilter::Rating(rating) => Self::Rating(rating.value()),
            StarsFilter::Unrated => Self::Keyword(UNRATED.to_string()),
        }
    }
}

impl FromStr for StarsFilter {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case(UNRATED) {
            return Ok(Self::Unrated);
        }
        let value: u8 = s
            .parse()
            .map_err(|_| DomainError::UnknownStarsFilter(s.to_string()))?;
        Ok(Self::Rating(PersonalRating::new(value)?))
    }
}

/// Active filter shape. Update it by building a new value with the `with_*` methods.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilmFilters {
    pub query: String,
    pub include_synopsis: bool,
    pub watched_only: bool,
    pub favorite_only: bool,
    pub noted_only: bool,
    #[serde(deserialize_with = "Option::deserialize")]
    pub stars: Option<StarsFilter>,
}

impl FilmFilters {
    pub fn with_query(&self, query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..self.clone()
        }
    }

    pub fn with_include_synopsis(&self, include_synopsis: bool) -> Self {
        Self {
            include_synopsis,
            ..self.clone()
        }
    }

    pub fn with_watched_only(&self, watched_only: bool) -> Self {
        Self {
            watched_only,
            ..self.clone()
        }
    }

    pub fn with_favorite_only(&self, favorite_only: bool) -> Self {
        Self {
            favorite_only,
            ..self.clone()
        }
    }

    pub fn with_noted_only(&self, noted_only: bool) -> Self {
        Self {
            noted_only,
            ..self.clone()
        }
    }

    pub fn with_stars(&self, stars: Option<StarsFilter>) -> Self {
        Self {
            stars,
            ..self.clone()
        }
    }
}

// ============================================================================
// Sorting
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    Title,
    Duration,
    PersonalRating,
    RtScore,
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Title => write!(f, "title"),
            Self::Duration => write!(f, "duration"),
            Self::PersonalRating => write!(f, "personal_rating"),
            Self::RtScore => write!(f, "rt_score"),
        }
    }
}

impl FromStr for SortKey {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "title" => Ok(Self::Title),
            "duration" => Ok(Self::Duration),
            "personal_rating" => Ok(Self::PersonalRating),
            "rt_score" => Ok(Self::RtScore),
            other => Err(DomainError::UnknownSortKey(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// Apply the direction to an ascending comparison result.
    pub fn apply(self, ordering: std::cmp::Ordering) -> std::cmp::Ordering {
        match self {
            Self::Asc => ordering,
            Self::Desc => ordering.reverse(),
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Asc => write!(f, "asc"),
            Self::Desc => write!(f, "desc"),
        }
    }
}

impl FromStr for SortDirection {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(DomainError::UnknownSortDirection(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FilmSort {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl FilmSort {
    pub fn new(key: SortKey, direction: SortDirection) -> Self {
        Self { key, direction }
    }

    pub fn with_key(self, key: SortKey) -> Self {
        Self { key, ..self }
    }

    pub fn with_direction(self, direction: SortDirection) -> Self {
        Self { direction, ..self }
    }
}

// ============================================================================
// Catalog Snapshot
// ============================================================================

/// Last successfully fetched film list and when it was stored (epoch millis).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilmCatalog {
    pub items: Vec<FilmEntity>,
    #[serde(deserialize_with = "Option::deserialize")]
    pub updated_at: Option<i64>,
}

impl FilmCatalog {
    pub fn new(items: Vec<FilmEntity>, updated_at: i64) -> Self {
        Self {
            items,
            updated_at: Some(updated_at),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

// ============================================================================
// Theme
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Light,
    Dark,
}

impl ThemeMode {
    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

impl fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Light => write!(f, "light"),
            Self::Dark => write!(f, "dark"),
        }
    }
}

impl FromStr for ThemeMode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            other => Err(DomainError::UnknownThemeMode(other.to_string())),
        }
    }
}
