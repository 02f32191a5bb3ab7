use crate::client::{LookupClient, LookupError};
use oms_shared::Order;
use std::sync::atomic::{AtomicBool, Ordering};

/// Outcome of one submission of the lookup form
#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    /// Blank input; nothing was sent
    EmptyInput,
    /// A previous lookup has not finished yet; nothing was sent
    InFlight,
    Found(Order),
    Failed(LookupError),
}

/// Clears the loading flag however the request ends
struct LoadingGuard<'a>(&'a AtomicBool);

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// The lookup form: one outstanding request at a time.
pub struct OrderLookup {
    client: LookupClient,
    loading: AtomicBool,
}

impl OrderLookup {
    pub fn new(client: LookupClient) -> Self {
        Self {
            client,
            loading: AtomicBool::new(false),
        }
    }

    /// Whether a lookup is in flight, i.e. the search button is disabled
    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Acquire)
    }

    pub async fn submit(&self, input: &str) -> Submission {
        let uid = input.trim();
        if uid.is_empty() {
            return Submission::EmptyInput;
        }

        if self
            .loading
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Submission::InFlight;
        }
        let _loading = LoadingGuard(&self.loading);

        match self.client.fetch_order(uid).await {
            Ok(order) => Submission::Found(order),
            Err(err) => Submission::Failed(err),
        }
    }
}

/// What the page shows: at most one of an error message or an order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LookupView {
    pub error: Option<String>,
    pub order: Option<Order>,
}

impl LookupView {
    /// Applies a submission. Submissions that never reached the server leave the view as it was.
    pub fn apply(&mut self, submission: Submission) {
        match submission {
            Submission::EmptyInput | Submission::InFlight => {}
            Submission::Found(order) => {
                self.error = None;
                self.order = Some(order);
            }
            Submission::Failed(err) => {
                self.order = None;
                self.error = Some(err.to_string());
            }
        }
    }
}
