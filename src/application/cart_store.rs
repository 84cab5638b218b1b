use crate::domain::cart::CartLineItem;

use super::tracker::{Epoch, RequestTracker, Ticket};

/// Local view of the remote cart.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CartState {
    pub cart_items: Vec<CartLineItem>,
    pub loading: bool,
    pub error: Option<String>,
}

/// Cart slice. Only fetch results replace line items; mutations are applied
/// by re-fetching, never by patching locally.
#[derive(Debug, Default)]
pub struct CartStore {
    state: CartState,
    requests: RequestTracker,
}

impl CartStore {
    pub fn state(&self) -> &CartState {
        &self.state
    }

    pub fn items(&self) -> &[CartLineItem] {
        &self.state.cart_items
    }

    pub fn begin(&mut self) -> Ticket {
        self.state.loading = true;
        self.requests.issue()
    }

    pub fn epoch(&self) -> Epoch {
        self.requests.epoch()
    }

    /// Starts the fetch that follows a mutation or purchase. `None` when the
    /// cart was reset since `origin`, in which case nothing should be sent.
    pub fn begin_in(&mut self, origin: Epoch) -> Option<Ticket> {
        let ticket = self.requests.issue_in(origin)?;
        self.state.loading = true;
        Some(ticket)
    }

    /// Replaces every line item with the server's cart. Returns `false` when
    /// the response is stale and was discarded.
    pub fn fulfil(&mut self, ticket: Ticket, items: Vec<CartLineItem>) -> bool {
        if !self.requests.is_current(ticket) {
            return false;
        }
        self.state.cart_items = items;
        self.state.loading = false;
        self.state.error = None;
        true
    }

    /// Records a failed request; prior line items are kept.
    pub fn reject(&mut self, ticket: Ticket, message: String) -> bool {
        if !self.requests.is_current(ticket) {
            return false;
        }
        self.state.loading = false;
        self.state.error = Some(message);
        true
    }

    /// Records the error of a mutation whose follow-up fetch has already been
    /// issued. Ignored after a reset.
    pub fn record_error(&mut self, ticket: Ticket, message: String) -> bool {
        if !self.requests.same_epoch(ticket) {
            return false;
        }
        self.state.error = Some(message);
        true
    }

    /// Local-only reset to the initial state. Requests still in flight can no
    /// longer apply their results.
    pub fn clear(&mut self) {
        self.state = CartState::default();
        self.requests.invalidate();
    }
}
