//! Background catalog fetch worker.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::catalog::CatalogProvider;
use crate::state::{FetchOutcome, FetchRequest, FetchedPage};

/// What: Spawn the background worker that services catalog fetches.
///
/// Inputs:
/// - `req_rx`: Channel receiver for fetch requests from the engine
/// - `outcome_tx`: Channel sender for completed fetches
/// - `provider`: Catalog implementation to call
///
/// Details:
/// - An empty query fetches the trending listing (forced to a single page);
///   anything else runs a paged text search.
/// - Each request is serviced on its own task, so a slow response never
///   blocks a later one. Ordering does not matter: the engine discards any
///   outcome whose id is no longer the latest.
pub fn spawn_catalog_worker(
    mut req_rx: mpsc::UnboundedReceiver<FetchRequest>,
    outcome_tx: mpsc::UnboundedSender<FetchOutcome>,
    provider: Arc<dyn CatalogProvider>,
) {
    tokio::spawn(async move {
        while let Some(req) = req_rx.recv().await {
            let provider = provider.clone();
            let tx = outcome_tx.clone();
            tokio::spawn(async move {
                tracing::debug!(id = req.id, query = %req.query, page = req.page, "fetching");
                let result = if req.query.is_empty() {
                    provider.trending().await.map(|results| FetchedPage {
                        page: 1,
                        total_pages: 1,
                        results,
                    })
                } else {
                    provider.search(&req.query, req.page).await
                };
                let _ = tx.send(FetchOutcome {
                    id: req.id,
                    query: req.query,
                    page: req.page,
                    result,
                });
            });
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogError;
    use crate::state::{CastMember, Genre, MovieDetails, MovieSummary};
    use futures::future::BoxFuture;

    /// Scripted provider: searches echo the query hash as a movie id,
    /// trending returns a fixed listing.
    struct ScriptedCatalog;

    fn movie(id: u64) -> MovieSummary {
        MovieSummary {
            id,
            title: format!("movie-{id}"),
            overview: String::new(),
            poster_path: None,
            release_date: None,
            vote_average: 5.0,
            genre_ids: Vec::new(),
        }
    }

    impl CatalogProvider for ScriptedCatalog {
        fn trending(&self) -> BoxFuture<'_, Result<Vec<MovieSummary>, CatalogError>> {
            Box::pin(async { Ok(vec![movie(100), movie(101)]) })
        }

        fn search<'a>(
            &'a self,
            query: &'a str,
            page: u32,
        ) -> BoxFuture<'a, Result<FetchedPage, CatalogError>> {
            Box::pin(async move {
                if query == "down" {
                    return Err(CatalogError::Transport("down".into()));
                }
                Ok(FetchedPage {
                    page,
                    total_pages: 3,
                    results: vec![movie(u64::from(page))],
                })
            })
        }

        fn genres(&self) -> BoxFuture<'_, Result<Vec<Genre>, CatalogError>> {
            Box::pin(async { Ok(Vec::new()) })
        }

        fn details(&self, id: u64) -> BoxFuture<'_, Result<MovieDetails, CatalogError>> {
            Box::pin(async move {
                Ok(MovieDetails {
                    id,
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

    #[tokio::test]
    async fn worker_routes_empty_query_to_trending() {
        let (req_tx, req_rx) = mpsc::unbounded_channel();
        let (outcome_tx, mut outcome_rx) = mpsc::unbounded_channel();
        spawn_catalog_worker(req_rx, outcome_tx, Arc::new(ScriptedCatalog));

        req_tx
            .send(FetchRequest {
                id: 1,
                query: String::new(),
                page: 1,
            })
            .expect("send");
        let outcome = outcome_rx.recv().await.expect("outcome");
        assert_eq!(outcome.id, 1);
        let page = outcome.result.expect("trending ok");
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.results.len(), 2);
    }

    #[tokio::test]
    async fn worker_echoes_ids_and_propagates_failures() {
        let (req_tx, req_rx) = mpsc::unbounded_channel();
        let (outcome_tx, mut outcome_rx) = mpsc::unbounded_channel();
        spawn_catalog_worker(req_rx, outcome_tx, Arc::new(ScriptedCatalog));

        req_tx
            .send(FetchRequest {
                id: 7,
                query: "down".into(),
                page: 2,
            })
            .expect("send");
        let outcome = outcome_rx.recv().await.expect("outcome");
        assert_eq!(outcome.id, 7);
        assert_eq!(outcome.page, 2);
        assert!(outcome.result.is_err());
    }
}
