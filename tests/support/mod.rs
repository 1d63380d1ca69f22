//! Shared fakes for the integration suites.

// Each suite uses a different subset of these helpers.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use futures::future::BoxFuture;

use cinesea::catalog::{CatalogError, CatalogProvider};
use cinesea::state::{CastMember, FetchedPage, Genre, MovieDetails, MovieSummary};

/// Build a bare summary with the given id.
pub fn movie(id: u64) -> MovieSummary {
    MovieSummary {
        id,
        title: format!("movie-{id}"),
        overview: String::new(),
        poster_path: None,
        release_date: Some("2014-11-05".to_owned()),
        vote_average: 7.0,
        genre_ids: vec![878],
    }
}

/// Scripted in-memory catalog. Pages are keyed by `(query, page)`; unknown
/// tuples answer an empty single page. Per-query delays let tests overlap
/// in-flight fetches deterministically.
#[derive(Default)]
pub struct FakeCatalog {
    pages: Mutex<HashMap<(String, u32), FetchedPage>>,
    delays: Mutex<HashMap<String, Duration>>,
    trending: Mutex<Vec<MovieSummary>>,
    pub search_calls: AtomicUsize,
    pub trending_calls: AtomicUsize,
}

impl FakeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script_page(&self, query: &str, page: u32, total_pages: u32, ids: &[u64]) {
        self.pages
            .lock()
            .expect("pages lock")
            .insert((query.to_owned(), page), FetchedPage {
                page,
                total_pages,
                results: ids.iter().copied().map(movie).collect(),
            });
    }

    pub fn script_trending(&self, ids: &[u64]) {
        *self.trending.lock().expect("trending lock") = ids.iter().copied().map(movie).collect();
    }

    pub fn delay(&self, query: &str, delay: Duration) {
        self.delays
            .lock()
            .expect("delays lock")
            .insert(query.to_owned(), delay);
    }
}

impl CatalogProvider for FakeCatalog {
    fn trending(&self) -> BoxFuture<'_, Result<Vec<MovieSummary>, CatalogError>> {
        self.trending_calls.fetch_add(1, Ordering::SeqCst);
        let listing = self.trending.lock().expect("trending lock").clone();
        Box::pin(async move { Ok(listing) })
    }

    fn search<'a>(
        &'a self,
        query: &'a str,
        page: u32,
    ) -> BoxFuture<'a, Result<FetchedPage, CatalogError>> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        let delay = self
            .delays
            .lock()
            .expect("delays lock")
            .get(query)
            .copied();
        let scripted = self
            .pages
            .lock()
            .expect("pages lock")
            .get(&(query.to_owned(), page))
            .cloned();
        Box::pin(async move {
            if let Some(d) = delay {
                tokio::time::sleep(d).await;
            }
            Ok(scripted.unwrap_or(FetchedPage {
                page,
                total_pages: 1,
                results: Vec::new(),
            }))
        })
    }

    fn genres(&self) -> BoxFuture<'_, Result<Vec<Genre>, CatalogError>> {
        Box::pin(async {
            Ok(vec![Genre {
                id: 878,
                name: "Science Fiction".to_owned(),
            }])
        })
    }

    fn details(&self, id: u64) -> BoxFuture<'_, Result<MovieDetails, CatalogError>> {
        Box::pin(async move {
            Ok(MovieDetails {
                id,
                title: format!("movie-{id}"),
                ..MovieDetails::default()
            })
        })
    }

    fn credits(&self, _id: u64) -> BoxFuture<'_, Result<Vec<CastMember>, CatalogError>> {
        Box::pin(async { Ok(Vec::new()) })
    }

    fn similar(&self, _id: u64) -> BoxFuture<'_, Result<Vec<MovieSummary>, CatalogError>> {
        Box::pin(async { Ok(Vec::new()) })
    }
}

/// A catalog that always fails with a transport error.
pub struct DownCatalog;

impl CatalogProvider for DownCatalog {
    fn trending(&self) -> BoxFuture<'_, Result<Vec<MovieSummary>, CatalogError>> {
        Box::pin(async { Err(CatalogError::Transport("connection refused".into())) })
    }

    fn search<'a>(
        &'a self,
        _query: &'a str,
        _page: u32,
    ) -> BoxFuture<'a, Result<FetchedPage, CatalogError>> {
        Box::pin(async { Err(CatalogError::Transport("connection refused".into())) })
    }

    fn genres(&self) -> BoxFuture<'_, Result<Vec<Genre>, CatalogError>> {
        Box::pin(async { Err(CatalogError::Transport("connection refused".into())) })
    }

    fn details(&self, _id: u64) -> BoxFuture<'_, Result<MovieDetails, CatalogError>> {
        Box::pin(async { Err(CatalogError::Transport("connection refused".into())) })
    }

    fn credits(&self, _id: u64) -> BoxFuture<'_, Result<Vec<CastMember>, CatalogError>> {
        Box::pin(async { Err(CatalogError::Transport("connection refused".into())) })
    }

    fn similar(&self, _id: u64) -> BoxFuture<'_, Result<Vec<MovieSummary>, CatalogError>> {
        Box::pin(async { Err(CatalogError::Transport("connection refused".into())) })
    }
}
