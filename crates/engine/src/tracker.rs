//! Latest-fetch-wins bookkeeping for interactive clients.
//!
//! Every fetch takes a [`Ticket`] before it starts. When it completes, its
//! result is published only if no newer ticket has been issued meanwhile, so
//! a slow, stale fetch can never overwrite the result of a newer one.

use std::sync::{
    Mutex, PoisonError,
    atomic::{AtomicU64, Ordering},
};

use crate::{
    Engine, Expense, ExpenseFilter, ExpenseSummary, Fetched, ResultEngine, stats::summarize,
};

/// Generation number of one fetch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

/// A slot holding the result of the most recently issued fetch.
#[derive(Debug, Default)]
pub struct Latest<T> {
    issued: AtomicU64,
    slot: Mutex<Option<(Ticket, T)>>,
}

impl<T> Latest<T> {
    pub fn new() -> Self {
        Self {
            issued: AtomicU64::new(0),
            slot: Mutex::new(None),
        }
    }

    /// Issues the next ticket. Tickets are strictly increasing.
    pub fn issue(&self) -> Ticket {
        Ticket(self.issued.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Whether `ticket` is still the newest one issued.
    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.issued.load(Ordering::SeqCst) == ticket.0
    }

    /// Stores `value` if `ticket` is still current; returns whether it did.
    pub fn publish(&self, ticket: Ticket, value: T) -> bool {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        if !self.is_current(ticket) {
            tracing::debug!("discarding stale fetch {ticket:?}");
            return false;
        }
        *slot = Some((ticket, value));
        true
    }

    /// Reads the published value through `f`.
    pub fn with<R>(&self, f: impl FnOnce(Option<&T>) -> R) -> R {
        let slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        f(slot.as_ref().map(|(_, value)| value))
    }
}

impl<T: Clone> Latest<T> {
    pub fn current(&self) -> Option<T> {
        self.with(|value| value.cloned())
    }
}

/// Expense-tracking state of one user: which farm is selected and the last
/// snapshot fetched for it.
#[derive(Debug)]
pub struct ExpenseTracker {
    engine: Engine,
    user_id: String,
    /// Farm of the newest request, set together with its ticket.
    requested: Mutex<Option<String>>,
    snapshot: Latest<Fetched>,
}

impl ExpenseTracker {
    pub fn new(engine: Engine, user_id: impl Into<String>) -> Self {
        Self {
            engine,
            user_id: user_id.into(),
            requested: Mutex::new(None),
            snapshot: Latest::new(),
        }
    }

    /// Selects a farm (or none) and fetches fresh data for it.
    ///
    /// Returns `Ok(false)` when a newer selection superseded this one before
    /// the fetch completed.
    pub async fn select(&self, farm_id: Option<&str>) -> ResultEngine<bool> {
        let (ticket, farm_id) = self.request(Some(farm_id));
        self.fetch_as(ticket, farm_id.as_deref()).await
    }

    /// Re-fetches the most recently requested farm, e.g. after an expense was
    /// added. A selection still in flight is refreshed, not the one on screen.
    pub async fn refresh(&self) -> ResultEngine<bool> {
        let (ticket, farm_id) = self.request(None);
        self.fetch_as(ticket, farm_id.as_deref()).await
    }

    /// Issues a ticket under the request lock, so ticket order and request
    /// order agree. `None` keeps the current request.
    fn request(&self, farm_id: Option<Option<&str>>) -> (Ticket, Option<String>) {
        let mut requested = self
            .requested
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(farm_id) = farm_id {
            *requested = farm_id.map(str::to_string);
        }
        (self.snapshot.issue(), requested.clone())
    }

    async fn fetch_as(&self, ticket: Ticket, farm_id: Option<&str>) -> ResultEngine<bool> {
        let fetched = self.engine.fetch(farm_id, &self.user_id).await?;
        Ok(self.snapshot.publish(ticket, fetched))
    }

    pub fn selected_farm(&self) -> Option<String> {
        self.snapshot
            .with(|fetched| fetched.and_then(|f| f.selected_farm.clone()))
    }

    /// Filtered, sorted expenses of the latest snapshot.
    pub fn view(&self, filter: &ExpenseFilter) -> Vec<Expense> {
        self.snapshot.with(|fetched| {
            fetched
                .map(|f| filter.apply(&f.expenses))
                .unwrap_or_default()
        })
    }

    /// Summary of the filtered view.
    pub fn summary(&self, filter: &ExpenseFilter) -> ResultEngine<ExpenseSummary> {
        summarize(&self.view(filter))
    }

    /// Name of the selected farm, if it is in the latest snapshot.
    pub fn selected_farm_name(&self) -> Option<String> {
        self.snapshot.with(|fetched| {
            let fetched = fetched?;
            let selected = fetched.selected_farm.as_deref()?;
            fetched
                .farms
                .iter()
                .find(|farm| farm.id == selected)
                .map(|farm| farm.name.clone())
        })
    }
}
