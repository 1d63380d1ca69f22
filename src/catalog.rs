//! The remote movie catalog collaborator.
//!
//! [`CatalogProvider`] is the seam the search engine and runtime depend on;
//! [`TmdbClient`] is the production implementation over TMDB's v3 HTTP API.
//! Payloads are parsed from `serde_json::Value` with the tolerant accessors
//! in [`crate::util`], so a missing or oddly typed field degrades to a
//! default instead of failing the whole response.

use std::time::Duration;

use futures::future::BoxFuture;
use serde_json::Value;

use crate::state::{CastMember, FetchedPage, Genre, MovieDetails, MovieSummary};
use crate::util::{arr_u64, f64_of, opt_s, percent_encode, s, u64_of};

/// A catalog call failed. Never fatal: the engine surfaces these as a
/// retryable error flag and keeps its prior state.
#[derive(Debug, Clone)]
pub enum CatalogError {
    /// The provider was unreachable (connect, timeout, I/O).
    Transport(String),
    /// The provider answered with a non-success HTTP status.
    Status(u16),
    /// The response body was not the expected JSON shape.
    Decode(String),
}

impl std::fmt::Display for CatalogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogError::Transport(e) => write!(f, "catalog unreachable: {e}"),
            CatalogError::Status(code) => write!(f, "catalog returned HTTP {code}"),
            CatalogError::Decode(e) => write!(f, "catalog response unreadable: {e}"),
        }
    }
}

impl std::error::Error for CatalogError {}

/// Abstract movie catalog. Object-safe so fakes can stand in for the real
/// client in tests; futures are boxed at this seam for the same reason.
pub trait CatalogProvider: Send + Sync {
    /// Current trending listing (single page).
    fn trending(&self) -> BoxFuture<'_, Result<Vec<MovieSummary>, CatalogError>>;
    /// Text search, 1-based `page`.
    fn search<'a>(
        &'a self,
        query: &'a str,
        page: u32,
    ) -> BoxFuture<'a, Result<FetchedPage, CatalogError>>;
    /// Genre id/name listing.
    fn genres(&self) -> BoxFuture<'_, Result<Vec<Genre>, CatalogError>>;
    /// Full details for one movie.
    fn details(&self, id: u64) -> BoxFuture<'_, Result<MovieDetails, CatalogError>>;
    /// Top-billed cast for one movie.
    fn credits(&self, id: u64) -> BoxFuture<'_, Result<Vec<CastMember>, CatalogError>>;
    /// Movies similar to the given one.
    fn similar(&self, id: u64) -> BoxFuture<'_, Result<Vec<MovieSummary>, CatalogError>>;
}

/// Catalog stand-in for offline operation: every fetch fails with a
/// retryable transport error, so the favorites ledger, recent searches, and
/// settings stay fully usable without network access.
pub struct OfflineCatalog;

impl OfflineCatalog {
    fn unavailable<T>() -> BoxFuture<'static, Result<T, CatalogError>>
    where
        T: Send + 'static,
    {
        Box::pin(async { Err(CatalogError::Transport("offline mode".to_owned())) })
    }
}

impl CatalogProvider for OfflineCatalog {
    fn trending(&self) -> BoxFuture<'_, Result<Vec<MovieSummary>, CatalogError>> {
        Self::unavailable()
    }

    fn search<'a>(
        &'a self,
        _query: &'a str,
        _page: u32,
    ) -> BoxFuture<'a, Result<FetchedPage, CatalogError>> {
        Self::unavailable()
    }

    fn genres(&self) -> BoxFuture<'_, Result<Vec<Genre>, CatalogError>> {
        Self::unavailable()
    }

    fn details(&self, _id: u64) -> BoxFuture<'_, Result<MovieDetails, CatalogError>> {
        Self::unavailable()
    }

    fn credits(&self, _id: u64) -> BoxFuture<'_, Result<Vec<CastMember>, CatalogError>> {
        Self::unavailable()
    }

    fn similar(&self, _id: u64) -> BoxFuture<'_, Result<Vec<MovieSummary>, CatalogError>> {
        Self::unavailable()
    }
}

/// TMDB v3 client.
pub struct TmdbClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    language: String,
}

impl TmdbClient {
    /// Default API endpoint.
    pub const DEFAULT_BASE_URL: &'static str = "https://api.themoviedb.org/3";

    /// Client against the public API.
    pub fn new(api_key: String, language: String) -> Self {
        Self::with_base_url(Self::DEFAULT_BASE_URL.to_owned(), api_key, language)
    }

    /// Client against an alternate endpoint (tests, proxies).
    pub fn with_base_url(base_url: String, api_key: String, language: String) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_default();
        Self {
            http,
            base_url,
            api_key,
            language,
        }
    }

    /// GET `path` with the common auth/language parameters plus `extra`
    /// query parameters, and parse the body as JSON.
    async fn get_json(&self, path: &str, extra: &[(&str, String)]) -> Result<Value, CatalogError> {
        let mut url = format!(
            "{}{}?api_key={}&language={}",
            self.base_url, path, self.api_key, self.language
        );
        for (k, v) in extra {
            url.push('&');
            url.push_str(k);
            url.push('=');
            url.push_str(v);
        }
        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| CatalogError::Transport(e.to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(CatalogError::Status(status.as_u16()));
        }
        resp.json::<Value>()
            .await
            .map_err(|e| CatalogError::Decode(e.to_string()))
    }
}

impl CatalogProvider for TmdbClient {
    fn trending(&self) -> BoxFuture<'_, Result<Vec<MovieSummary>, CatalogError>> {
        Box::pin(async move {
            let v = self.get_json("/trending/movie/week", &[]).await?;
            Ok(parse_summaries(&v))
        })
    }

    fn search<'a>(
        &'a self,
        query: &'a str,
        page: u32,
    ) -> BoxFuture<'a, Result<FetchedPage, CatalogError>> {
        Box::pin(async move {
            let v = self
                .get_json(
                    "/search/movie",
                    &[
                        ("query", percent_encode(query.trim())),
                        ("page", page.to_string()),
                    ],
                )
                .await?;
            Ok(parse_search_page(&v, page))
        })
    }

    fn genres(&self) -> BoxFuture<'_, Result<Vec<Genre>, CatalogError>> {
        Box::pin(async move {
            let v = self.get_json("/genre/movie/list", &[]).await?;
            Ok(parse_genres(&v))
        })
    }

    fn details(&self, id: u64) -> BoxFuture<'_, Result<MovieDetails, CatalogError>> {
        Box::pin(async move {
            let v = self
                .get_json(
                    &format!("/movie/{id}"),
                    &[("append_to_response", "videos".to_owned())],
                )
                .await?;
            Ok(parse_details(&v))
        })
    }

    fn credits(&self, id: u64) -> BoxFuture<'_, Result<Vec<CastMember>, CatalogError>> {
        Box::pin(async move {
            let v = self.get_json(&format!("/movie/{id}/credits"), &[]).await?;
            Ok(parse_cast(&v))
        })
    }

    fn similar(&self, id: u64) -> BoxFuture<'_, Result<Vec<MovieSummary>, CatalogError>> {
        Box::pin(async move {
            let v = self.get_json(&format!("/movie/{id}/similar"), &[]).await?;
            Ok(parse_summaries(&v))
        })
    }
}

/// Parse one movie summary object. Entries without an id are dropped.
fn parse_summary(v: &Value) -> Option<MovieSummary> {
    let id = u64_of(v, "id")?;
    Some(MovieSummary {
        id,
        title: s(v, "title"),
        overview: s(v, "overview"),
        poster_path: opt_s(v, "poster_path"),
        release_date: opt_s(v, "release_date"),
        vote_average: f64_of(v, "vote_average"),
        genre_ids: arr_u64(v, "genre_ids"),
    })
}

fn parse_summaries(v: &Value) -> Vec<MovieSummary> {
    v.get("results")
        .and_then(Value::as_array)
        .map(|arr| arr.iter().filter_map(parse_summary).collect())
        .unwrap_or_default()
}

fn parse_search_page(v: &Value, requested_page: u32) -> FetchedPage {
    FetchedPage {
        page: u64_of(v, "page").map_or(requested_page, |p| p as u32),
        total_pages: u64_of(v, "total_pages").map_or(1, |p| (p as u32).max(1)),
        results: parse_summaries(v),
    }
}

fn parse_genres(v: &Value) -> Vec<Genre> {
    v.get("genres")
        .and_then(Value::as_array)
        .map(|arr| {
            arr.iter()
                .filter_map(|g| {
                    Some(Genre {
                        id: u64_of(g, "id")?,
                        name: s(g, "name"),
                    })
                })
                .collect()
        })
        .unwrap_or_default()
}

fn parse_details(v: &Value) -> MovieDetails {
    // First YouTube trailer from the appended videos list, if any.
    let trailer_key = v
        .get("videos")
        .and_then(|x| x.get("results"))
        .and_then(Value::as_array)
        .and_then(|arr| {
            arr.iter()
                .find(|c| s(c, "site") == "YouTube" && s(c, "type") == "Trailer")
                .and_then(|c| opt_s(c, "key"))
        });
    MovieDetails {
        id: u64_of(v, "id").unwrap_or_default(),
        title: s(v, "title"),
        tagline: s(v, "tagline"),
        overview: s(v, "overview"),
        release_date: opt_s(v, "release_date"),
        runtime: u64_of(v, "runtime"),
        vote_average: f64_of(v, "vote_average"),
        vote_count: u64_of(v, "vote_count").unwrap_or_default(),
        genres: parse_genres(v),
        homepage: s(v, "homepage"),
        trailer_key,
    }
}

fn parse_cast(v: &Value) -> Vec<CastMember> {
    v.get("cast")
        .and_then(Value::as_array)
        .map(|arr| {
            arr.iter()
                .map(|c| CastMember {
                    name: s(c, "name"),
                    character: s(c, "character"),
                    profile_path: opt_s(c, "profile_path"),
                })
                .collect()
        })
        .unwrap_or_default()
}
