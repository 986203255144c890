use std::collections::BTreeMap;
use std::time::Duration;

use tokio::time::Instant;

use crate::core::ResultsView;

/// Card display state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CardState {
    pub visible: bool,
    pub loading: bool,
}

#[derive(Debug, Clone)]
struct TransientMessage {
    text: String,
    shown_at: Instant,
}

/// In-memory results page
///
/// Stands in for the DOM: one entry per card, the counter text, a lazily
/// created empty-state block and a transient error banner.
#[derive(Debug, Clone)]
pub struct ResultsPage {
    cards: BTreeMap<i64, CardState>,
    results_text: String,
    empty_state: Option<bool>,
    empty_state_created: usize,
    loading: bool,
    error: Option<TransientMessage>,
    error_ttl: Duration,
}

impl Default for ResultsPage {
    fn default() -> Self {
        Self::new(Duration::from_secs(3))
    }
}

impl ResultsPage {
    pub fn new(error_ttl: Duration) -> Self {
        Self {
            cards: BTreeMap::new(),
            results_text: String::new(),
            empty_state: None,
            empty_state_created: 0,
            loading: false,
            error: None,
            error_ttl,
        }
    }

    pub fn card(&self, listing_id: i64) -> Option<CardState> {
        self.cards.get(&listing_id).copied()
    }

    /// Ids of visible cards in id order
    pub fn visible_ids(&self) -> Vec<i64> {
        self.cards
            .iter()
            .filter(|(_, card)| card.visible)
            .map(|(id, _)| *id)
            .collect()
    }

    pub fn results_text(&self) -> &str {
        &self.results_text
    }

    pub fn empty_state_visible(&self) -> bool {
        self.empty_state.unwrap_or(false)
    }

    /// How many times the empty-state block was created; at most one
    pub fn empty_state_created(&self) -> usize {
        self.empty_state_created
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Current error banner, if it has not been dismissed yet
    pub fn active_error(&self) -> Option<&str> {
        self.error
            .as_ref()
            .filter(|e| e.shown_at.elapsed() < self.error_ttl)
            .map(|e| e.text.as_str())
    }

    /// Reveal every card regardless of filters
    pub fn show_all(&mut self) {
        for card in self.cards.values_mut() {
            card.visible = true;
        }
    }
}

impl ResultsView for ResultsPage {
    fn set_card_visible(&mut self, listing_id: i64, visible: bool) {
        let loading = self.loading;
        self.cards
            .entry(listing_id)
            .or_insert(CardState { visible, loading })
            .visible = visible;
    }

    fn set_results_text(&mut self, text: &str) {
        if self.results_text != text {
            self.results_text = text.to_string();
        }
    }

    fn set_empty_state(&mut self, visible: bool) {
        match self.empty_state.as_mut() {
            Some(shown) => *shown = visible,
            None if visible => {
                self.empty_state = Some(true);
                self.empty_state_created += 1;
            }
            None => {}
        }
    }

    fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
        for card in self.cards.values_mut() {
            card.loading = loading;
        }
    }

    fn show_error(&mut self, message: &str) {
        tracing::info!("Search error shown: {}", message);
        self.error = Some(TransientMessage {
            text: message.to_string(),
            shown_at: Instant::now(),
        });
    }
}
