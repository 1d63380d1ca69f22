//! Channel plumbing between the event loop and the catalog worker.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::catalog::CatalogProvider;
use crate::state::{FetchOutcome, FetchRequest};

/// What: Channels used for runtime communication.
///
/// Details:
/// - The engine sends [`FetchRequest`]s on `fetch_tx`; the worker answers
///   with [`FetchOutcome`]s on `outcome_rx`.
pub struct Channels {
    /// Fetch requests into the catalog worker.
    pub fetch_tx: mpsc::UnboundedSender<FetchRequest>,
    /// Completed fetches back from the worker.
    pub outcome_rx: mpsc::UnboundedReceiver<FetchOutcome>,
}

impl Channels {
    /// Create the channel pairs and spawn the catalog worker over them.
    pub fn new(provider: Arc<dyn CatalogProvider>) -> Self {
        let (fetch_tx, fetch_rx) = mpsc::unbounded_channel::<FetchRequest>();
        let (outcome_tx, outcome_rx) = mpsc::unbounded_channel::<FetchOutcome>();
        super::workers::spawn_catalog_worker(fetch_rx, outcome_tx, provider);
        Self {
            fetch_tx,
            outcome_rx,
        }
    }
}
