use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::models::PlaceSuggestion;
use crate::services::proxy::GeocodingService;

/// Runs only the last submitted job, after a quiet period
#[derive(Debug)]
pub struct Debouncer {
    quiet: Duration,
    pending: Option<JoinHandle<()>>,
}

impl Debouncer {
    pub fn new(quiet: Duration) -> Self {
        Self { quiet, pending: None }
    }

    /// Replace any pending job with `job`
    pub fn call<F>(&mut self, job: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.cancel();
        let quiet = self.quiet;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(quiet).await;
            job.await;
        }));
    }

    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Location input with debounced autocomplete
///
/// Suggestions are published on a watch channel; an empty list means the
/// dropdown is closed.
pub struct LocationAutocomplete<G> {
    geocoder: Arc<G>,
    debouncer: Debouncer,
    min_chars: usize,
    results: Arc<watch::Sender<Vec<PlaceSuggestion>>>,
}

impl<G> LocationAutocomplete<G>
where
    G: GeocodingService + 'static,
{
    pub fn new(geocoder: Arc<G>, quiet: Duration, min_chars: usize) -> Self {
        let (tx, _rx) = watch::channel(Vec::new());
        Self {
            geocoder,
            debouncer: Debouncer::new(quiet),
            min_chars,
            results: Arc::new(tx),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<PlaceSuggestion>> {
        self.results.subscribe()
    }

    /// Feed the current input text
    pub fn on_input(&mut self, text: &str) {
        let query = text.trim().to_string();

        if query.chars().count() < self.min_chars {
            self.debouncer.cancel();
            self.results.send_replace(Vec::new());
            return;
        }

        let geocoder = Arc::clone(&self.geocoder);
        let results = Arc::clone(&self.results);
        self.debouncer.call(async move {
            let suggestions = match geocoder.suggest(&query).await {
                Ok(suggestions) => suggestions,
                Err(e) => {
                    tracing::error!("Location suggestions for {:?} failed: {}", query, e);
                    Vec::new()
                }
            };
            tracing::debug!("{} suggestions for {:?}", suggestions.len(), query);
            results.send_replace(suggestions);
        });
    }
}
