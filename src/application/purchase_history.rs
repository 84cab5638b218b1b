use crate::domain::purchase::{Purchase, PurchasePage};

use super::tracker::{Epoch, RequestTracker, Ticket};

/// Which order list a pull-to-refresh applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrdersTab {
    Active,
    Previous,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PurchaseState {
    pub active_orders: Vec<Purchase>,
    pub previous_orders: Vec<Purchase>,
    /// Last loaded page of previous orders; 0 before the first load.
    pub page: u32,
    pub has_next: bool,
    pub loading_active: bool,
    pub loading_previous: bool,
    pub error: Option<String>,
}

#[derive(Debug, Default)]
pub struct PurchaseHistory {
    state: PurchaseState,
    active_requests: RequestTracker,
    previous_requests: RequestTracker,
}

impl PurchaseHistory {
    pub fn state(&self) -> &PurchaseState {
        &self.state
    }

    pub fn begin_active(&mut self) -> Ticket {
        self.state.loading_active = true;
        self.active_requests.issue()
    }

    pub fn active_epoch(&self) -> Epoch {
        self.active_requests.epoch()
    }

    /// Like [`Self::begin_active`], but only while no reset happened since
    /// `origin`.
    pub fn begin_active_in(&mut self, origin: Epoch) -> Option<Ticket> {
        let ticket = self.active_requests.issue_in(origin)?;
        self.state.loading_active = true;
        Some(ticket)
    }

    pub fn fulfil_active(&mut self, ticket: Ticket, purchases: Vec<Purchase>) -> bool {
        if !self.active_requests.is_current(ticket) {
            return false;
        }
        self.state.active_orders = purchases;
        self.state.loading_active = false;
        self.state.error = None;
        true
    }

    pub fn reject_active(&mut self, ticket: Ticket, message: String) -> bool {
        if !self.active_requests.is_current(ticket) {
            return false;
        }
        self.state.loading_active = false;
        self.state.error = Some(message);
        true
    }

    pub fn begin_previous(&mut self) -> Ticket {
        self.state.loading_previous = true;
        self.previous_requests.issue()
    }

    /// Starts loading the page after the last loaded one. Returns `None`
    /// while a page is loading or when the server reported no further pages.
    pub fn begin_next_page(&mut self) -> Option<(Ticket, u32)> {
        if self.state.loading_previous {
            return None;
        }
        if self.state.page > 0 && !self.state.has_next {
            return None;
        }
        let page = self.state.page + 1;
        Some((self.begin_previous(), page))
    }

    /// Page 1 replaces the list; later pages are appended, skipping orders
    /// already present.
    pub fn fulfil_previous(&mut self, ticket: Ticket, page_number: u32, page: PurchasePage) -> bool {
        if !self.previous_requests.is_current(ticket) {
            return false;
        }
        if page_number <= 1 {
            self.state.previous_orders = page.purchases;
        } else {
            for purchase in page.purchases {
                let known = self
                    .state
                    .previous_orders
                    .iter()
                    .any(|p| p.purchase_id == purchase.purchase_id);
                if !known {
                    self.state.previous_orders.push(purchase);
                }
            }
        }
        self.state.page = page_number;
        self.state.has_next = page.has_next;
        self.state.loading_previous = false;
        self.state.error = None;
        true
    }

    pub fn reject_previous(&mut self, ticket: Ticket, message: String) -> bool {
        if !self.previous_requests.is_current(ticket) {
            return false;
        }
        self.state.loading_previous = false;
        self.state.error = Some(message);
        true
    }

    pub fn reset(&mut self) {
        self.state = PurchaseState::default();
        self.active_requests.invalidate();
        self.previous_requests.invalidate();
    }
}
