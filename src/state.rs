//! Core data types shared across cinesea's modules: movie descriptors,
//! search coordination types, the favorites ledger entry, filters, and
//! notification events. Several of these are persisted between runs.

use std::time::{Duration, Instant};

/// Minimal movie summary as returned by catalog search and trending listings.
///
/// Compact enough for result lists; for a richer record see [`MovieDetails`].
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct MovieSummary {
    /// Catalog-assigned movie identifier.
    pub id: u64,
    /// Display title.
    pub title: String,
    /// One-paragraph synopsis (may be empty).
    pub overview: String,
    /// Poster image path relative to the catalog's image host.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster_path: Option<String>,
    /// Release date in `YYYY-MM-DD` form when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
    /// Average user rating on the catalog's 0–10 scale.
    pub vote_average: f64,
    /// Genre identifiers this movie belongs to.
    #[serde(default)]
    pub genre_ids: Vec<u64>,
}

/// Full details for a single movie, suitable for a dedicated info view.
#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct MovieDetails {
    /// Catalog-assigned movie identifier.
    pub id: u64,
    /// Display title.
    pub title: String,
    /// Marketing tagline (may be empty).
    pub tagline: String,
    /// Long synopsis.
    pub overview: String,
    /// Release date in `YYYY-MM-DD` form when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
    /// Runtime in minutes when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime: Option<u64>,
    /// Average user rating.
    pub vote_average: f64,
    /// Number of votes behind `vote_average`.
    pub vote_count: u64,
    /// Resolved genre names.
    pub genres: Vec<Genre>,
    /// Upstream homepage URL (may be empty).
    pub homepage: String,
    /// YouTube key of the first trailer video, when one exists.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trailer_key: Option<String>,
}

/// A named genre from the catalog's genre listing.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Genre {
    /// Catalog genre identifier.
    pub id: u64,
    /// Human-readable name.
    pub name: String,
}

/// One credited cast member of a movie.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct CastMember {
    /// Actor name.
    pub name: String,
    /// Character played.
    pub character: String,
    /// Profile image path, when available.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_path: Option<String>,
}

/// One entry in the user's favorites ledger.
///
/// Only the fixed field subset below is retained, not the full catalog
/// record. Entries are unique by `id` and kept in insertion order.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct FavoriteEntry {
    /// Catalog movie identifier; unique within the ledger.
    pub id: u64,
    /// Title at the time the favorite was added.
    pub title: String,
    /// Poster path at the time the favorite was added.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster_path: Option<String>,
    /// Release date at the time the favorite was added.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
    /// Rating at the time the favorite was added.
    pub vote_average: f64,
    /// Epoch milliseconds when the entry was created. Destroyed with the
    /// entry; a remove-and-re-add gets a fresh timestamp.
    pub added_at: i64,
}

impl FavoriteEntry {
    /// Build a ledger entry from a catalog summary, stamped `now`.
    pub fn from_summary(movie: &MovieSummary, now: i64) -> Self {
        Self {
            id: movie.id,
            title: movie.title.clone(),
            poster_path: movie.poster_path.clone(),
            release_date: movie.release_date.clone(),
            vote_average: movie.vote_average,
            added_at: now,
        }
    }
}

/// Client-side result filters. All constraints combine with AND semantics;
/// `None` means unconstrained.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FilterSet {
    /// Keep only movies carrying this genre id.
    pub genre: Option<u64>,
    /// Keep only movies whose release date starts with this year.
    pub year: Option<i32>,
    /// Keep only movies rated at least this highly.
    pub min_rating: Option<f64>,
}

impl FilterSet {
    /// Whether `movie` passes every active constraint.
    pub fn matches(&self, movie: &MovieSummary) -> bool {
        if let Some(g) = self.genre
            && !movie.genre_ids.contains(&g)
        {
            return false;
        }
        if let Some(y) = self.year {
            let prefix = format!("{y:04}");
            if !movie
                .release_date
                .as_deref()
                .is_some_and(|d| d.starts_with(&prefix))
            {
                return false;
            }
        }
        if let Some(min) = self.min_rating
            && movie.vote_average < min
        {
            return false;
        }
        true
    }

    /// Whether no constraint is active.
    pub fn is_empty(&self) -> bool {
        self.genre.is_none() && self.year.is_none() && self.min_rating.is_none()
    }
}

/// Severity of a user-facing notification.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    /// Neutral information.
    Info,
    /// A completed action.
    Success,
    /// Something the user should look at.
    Warning,
    /// A failed action.
    Error,
}

impl Severity {
    /// Short lowercase label for logs and plain-text display.
    pub fn label(self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Success => "success",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

/// A short-lived user-facing message.
#[derive(Clone, Debug)]
pub struct NotificationEvent {
    /// Message text.
    pub message: String,
    /// Severity tag.
    pub severity: Severity,
    /// When the message was shown.
    pub created_at: Instant,
    /// How long the message stays visible unless dismissed earlier.
    pub ttl: Duration,
}

impl NotificationEvent {
    /// Whether the message has outlived its TTL at `now`.
    pub fn expired_at(&self, now: Instant) -> bool {
        now.duration_since(self.created_at) >= self.ttl
    }
}

/// A catalog fetch issued by the search engine to the background worker.
///
/// `id` is monotonically increasing and echoed back in [`FetchOutcome`] so
/// the engine can discard responses that no longer match its current target.
#[derive(Clone, Debug)]
pub struct FetchRequest {
    /// Stale-suppression token for this fetch.
    pub id: u64,
    /// Committed query text; empty means a trending listing.
    pub query: String,
    /// 1-based page to fetch. Ignored for trending.
    pub page: u32,
}

/// One page of catalog results.
#[derive(Clone, Debug, Default)]
pub struct FetchedPage {
    /// 1-based page number this data covers.
    pub page: u32,
    /// Total pages available for the originating query.
    pub total_pages: u32,
    /// Results in catalog rank order.
    pub results: Vec<MovieSummary>,
}

/// Completion of a prior [`FetchRequest`], successful or not.
#[derive(Debug)]
pub struct FetchOutcome {
    /// Echoed identifier from the originating request.
    pub id: u64,
    /// Echoed query text, for logging.
    pub query: String,
    /// Echoed page number.
    pub page: u32,
    /// Fetched page or the transport-level failure.
    pub result: Result<FetchedPage, crate::catalog::CatalogError>,
}

/// A signed-in (mock) user restored from or persisted to storage.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct UserSession {
    /// Opaque user identifier.
    pub id: String,
    /// Email address as entered at login.
    pub email: String,
    /// Display name derived from the email local part.
    pub name: String,
    /// Deterministic avatar URL.
    pub avatar_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie(id: u64, genres: &[u64], date: Option<&str>, rating: f64) -> MovieSummary {
        MovieSummary {
            id,
            title: format!("movie-{id}"),
            overview: String::new(),
            poster_path: None,
            release_date: date.map(str::to_owned),
            vote_average: rating,
            genre_ids: genres.to_vec(),
        }
    }

    #[test]
    fn filters_combine_with_and_semantics() {
        let f = FilterSet {
            genre: Some(28),
            year: None,
            min_rating: Some(7.0),
        };
        // Genre 28 and rating >= 7, year unconstrained.
        assert!(f.matches(&movie(1, &[28, 12], Some("1999-03-31"), 8.7)));
        assert!(f.matches(&movie(2, &[28], None, 7.0)));
        assert!(!f.matches(&movie(3, &[12], Some("1999-03-31"), 8.7)));
        assert!(!f.matches(&movie(4, &[28], Some("1999-03-31"), 6.9)));
    }

    #[test]
    fn year_filter_is_prefix_equality_on_release_date() {
        let f = FilterSet {
            genre: None,
            year: Some(1999),
            min_rating: None,
        };
        assert!(f.matches(&movie(1, &[], Some("1999-03-31"), 0.0)));
        assert!(!f.matches(&movie(2, &[], Some("2009-03-31"), 0.0)));
        // Missing release date never matches a year constraint.
        assert!(!f.matches(&movie(3, &[], None, 0.0)));
    }

    #[test]
    fn empty_filter_set_matches_everything() {
        let f = FilterSet::default();
        assert!(f.is_empty());
        assert!(f.matches(&movie(1, &[], None, 0.0)));
    }

    #[test]
    fn notification_expiry_is_ttl_based() {
        let n = NotificationEvent {
            message: "hello".into(),
            severity: Severity::Info,
            created_at: Instant::now(),
            ttl: Duration::from_secs(6),
        };
        assert!(!n.expired_at(n.created_at + Duration::from_secs(5)));
        assert!(n.expired_at(n.created_at + Duration::from_secs(6)));
    }
}
