//! Background searches with stale-result suppression.
//!
//! Every call to [`Searcher::search`] takes the next generation number and
//! cancels the search it supersedes. Outcomes, successful or not, arrive on
//! the paired [`Deliveries`] receiver, which only yields the latest
//! generation.

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use tokio::{select, sync::mpsc};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::flickr::{self, Client, SearchResult};

#[derive(Debug)]
pub struct Delivery {
    pub generation: u64,
    pub term: String,
    pub outcome: flickr::Result<SearchResult>,
}

pub struct Searcher {
    client: Client,
    latest: Arc<AtomicU64>,
    current: Option<CancellationToken>,
    tx: mpsc::UnboundedSender<Delivery>,
}

impl Searcher {
    pub fn new(client: Client) -> (Self, Deliveries) {
        let (tx, rx) = mpsc::unbounded_channel();
        let latest = Arc::new(AtomicU64::new(0));

        let searcher = Self {
            client,
            latest: latest.clone(),
            current: None,
            tx,
        };

        (searcher, Deliveries { latest, rx })
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn latest(&self) -> u64 {
        self.latest.load(Ordering::SeqCst)
    }

    /// Starts a search on the current tokio runtime and returns its
    /// generation.
    pub fn search<T: Into<String>>(&mut self, term: T) -> u64 {
        let term = term.into();
        let generation = self.latest.fetch_add(1, Ordering::SeqCst) + 1;

        let token = CancellationToken::new();
        if let Some(previous) = self.current.replace(token.clone()) {
            previous.cancel();
        }

        let client = self.client.clone();
        let latest = self.latest.clone();
        let tx = self.tx.clone();

        tokio::spawn(async move {
            let outcome = select! {
                _ = token.cancelled() => {
                    debug!(generation, term = %term, "search superseded before completion");
                    return;
                }
                outcome = client.search(&term) => outcome,
            };

            if latest.load(Ordering::SeqCst) != generation {
                debug!(generation, term = %term, "dropping stale search result");
                return;
            }

            let _ = tx.send(Delivery {
                generation,
                term,
                outcome,
            });
        });

        generation
    }

    pub fn cancel(&mut self) {
        if let Some(token) = self.current.take() {
            token.cancel();
        }
    }
}

impl Drop for Searcher {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Receiving side of a [`Searcher`]; drained by whoever presents results.
pub struct Deliveries {
    latest: Arc<AtomicU64>,
    rx: mpsc::UnboundedReceiver<Delivery>,
}

impl Deliveries {
    pub fn is_current(&self, generation: u64) -> bool {
        self.latest.load(Ordering::SeqCst) == generation
    }

    /// Next delivery for the latest search. `None` once the searcher and
    /// all of its tasks are gone.
    pub async fn recv(&mut self) -> Option<Delivery> {
        while let Some(delivery) = self.rx.recv().await {
            if self.is_current(delivery.generation) {
                return Some(delivery);
            }

            debug!(
                generation = delivery.generation,
                term = %delivery.term,
                "discarding superseded delivery"
            );
        }

        None
    }
}
