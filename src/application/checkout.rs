use std::time::{Duration, Instant};

use bigdecimal::BigDecimal;
use chrono::NaiveDateTime;

use crate::domain::cart::{CheckoutTotals, FulfilmentMode};
use crate::domain::errors::DomainError;
use crate::domain::hours::HoursStatus;
use crate::domain::ports::RemoteGateway;
use crate::domain::purchase::{Purchase, PurchaseRequest};
use crate::errors::AppError;

use super::reconciler::{CartView, RestaurantResolution};
use super::session::Session;

/// How long the card confirmation animation runs after choosing "card".
pub const CARD_CONFIRMATION: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentMethod {
    Card,
    Cash,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutPhase {
    Reviewing,
    PaymentSelected,
    Submitting,
    Success,
}

/// First reason the order cannot be submitted right now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitBlocker {
    EmptyCart,
    RestaurantUnavailable,
    /// A listing in the cart is not offered in the selected mode.
    NotOffered { title: String, mode: FulfilmentMode },
    HoursUnavailable,
    PaymentMethodMissing,
    Closed(HoursStatus),
    AlreadySubmitted,
}

impl SubmitBlocker {
    pub fn message(&self) -> String {
        self.to_domain_error().to_string()
    }

    fn to_domain_error(&self) -> DomainError {
        match self {
            SubmitBlocker::EmptyCart => DomainError::EmptyCart,
            SubmitBlocker::RestaurantUnavailable => DomainError::RestaurantUnavailable,
            SubmitBlocker::NotOffered { title, mode } => DomainError::NotOffered {
                title: title.clone(),
                mode: *mode,
            },
            SubmitBlocker::HoursUnavailable => {
                DomainError::RestaurantClosed("Opening hours are unavailable".to_string())
            }
            SubmitBlocker::PaymentMethodMissing => DomainError::PaymentMethodMissing,
            SubmitBlocker::Closed(status) => DomainError::RestaurantClosed(status.message()),
            SubmitBlocker::AlreadySubmitted => DomainError::CheckoutCompleted,
        }
    }
}

impl From<SubmitBlocker> for AppError {
    fn from(blocker: SubmitBlocker) -> Self {
        AppError::Conflict(blocker.to_domain_error())
    }
}

/// Hooks for the screen around the checkout, e.g. haptics.
pub trait CheckoutObserver {
    fn on_success(&self, _purchase: &Purchase) {}
    fn on_failure(&self, _message: &str) {}
}

#[derive(Debug, Default)]
pub struct NoopObserver;

impl CheckoutObserver for NoopObserver {}

/// Screen-local checkout state. Never persisted; [`CheckoutMachine::finish`]
/// consumes it once the success animation completes.
#[derive(Debug)]
pub struct CheckoutMachine {
    phase: CheckoutPhase,
    payment_method: Option<PaymentMethod>,
    delivery_notes: String,
    card_confirmation_until: Option<Instant>,
    last_error: Option<String>,
    purchase: Option<Purchase>,
}

impl Default for CheckoutMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl CheckoutMachine {
    pub fn new() -> Self {
        Self {
            phase: CheckoutPhase::Reviewing,
            payment_method: None,
            delivery_notes: String::new(),
            card_confirmation_until: None,
            last_error: None,
            purchase: None,
        }
    }

    pub fn phase(&self) -> CheckoutPhase {
        self.phase
    }

    pub fn payment_method(&self) -> Option<PaymentMethod> {
        self.payment_method
    }

    pub fn delivery_notes(&self) -> &str {
        &self.delivery_notes
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Brings cart and restaurants up to date before anything can be
    /// submitted.
    pub async fn enter<G: RemoteGateway>(&mut self, session: &Session<G>) -> Result<(), AppError> {
        if let Err(e) = session.refresh_for_checkout().await {
            self.last_error = Some(e.to_string());
            return Err(e);
        }
        self.last_error = None;
        Ok(())
    }

    pub fn select_payment(&mut self, method: PaymentMethod, now: Instant) {
        if self.is_locked() {
            return;
        }
        self.payment_method = Some(method);
        self.card_confirmation_until = match method {
            PaymentMethod::Card => Some(now + CARD_CONFIRMATION),
            PaymentMethod::Cash => None,
        };
        self.phase = CheckoutPhase::PaymentSelected;
    }

    /// True while the card confirmation animation should be shown.
    pub fn is_confirming_card(&self, now: Instant) -> bool {
        self.card_confirmation_until
            .is_some_and(|until| now < until)
    }

    pub fn set_delivery_notes(&mut self, notes: impl Into<String>) {
        self.delivery_notes = notes.into();
    }

    pub fn hours_status(view: &CartView, now: NaiveDateTime) -> Option<HoursStatus> {
        view.restaurant()
            .and_then(|r| r.hours.as_ref())
            .map(|hours| hours.classify(now))
    }

    pub fn blocker(&self, view: &CartView, now: NaiveDateTime) -> Option<SubmitBlocker> {
        if self.is_locked() {
            return Some(SubmitBlocker::AlreadySubmitted);
        }
        if view.is_empty() {
            return Some(SubmitBlocker::EmptyCart);
        }
        let restaurant = match &view.restaurant {
            RestaurantResolution::Resolved(r) => r,
            _ => return Some(SubmitBlocker::RestaurantUnavailable),
        };
        if let Some(entry) = view.unavailable_entry() {
            return Some(SubmitBlocker::NotOffered {
                title: entry.listing.title.clone(),
                mode: view.mode,
            });
        }
        if self.payment_method.is_none() {
            return Some(SubmitBlocker::PaymentMethodMissing);
        }
        let Some(hours) = &restaurant.hours else {
            return Some(SubmitBlocker::HoursUnavailable);
        };
        let status = hours.classify(now);
        if !status.accepts_orders() {
            return Some(SubmitBlocker::Closed(status));
        }
        None
    }

    pub fn can_submit(&self, view: &CartView, now: NaiveDateTime) -> bool {
        self.blocker(view, now).is_none()
    }

    /// Subtotal for the active mode plus the delivery fee when delivering.
    pub fn totals(view: &CartView, mode: FulfilmentMode) -> CheckoutTotals {
        let subtotal = view.total(mode);
        let delivery_fee = match (mode, view.restaurant()) {
            (FulfilmentMode::Delivery, Some(r)) => r.delivery_fee.clone(),
            _ => BigDecimal::from(0),
        };
        let total = &subtotal + &delivery_fee;
        CheckoutTotals {
            subtotal,
            delivery_fee,
            total,
        }
    }

    /// Places the order. On failure the machine returns to
    /// [`CheckoutPhase::Reviewing`] with the error message kept for display.
    pub async fn submit<G: RemoteGateway>(
        &mut self,
        session: &Session<G>,
        now: NaiveDateTime,
        observer: &dyn CheckoutObserver,
    ) -> Result<&Purchase, AppError> {
        let view = session.cart_view();
        if let Some(blocker) = self.blocker(&view, now) {
            let message = blocker.message();
            observer.on_failure(&message);
            self.last_error = Some(message);
            if blocker != SubmitBlocker::AlreadySubmitted {
                self.phase = CheckoutPhase::Reviewing;
            }
            return Err(blocker.into());
        }

        self.phase = CheckoutPhase::Submitting;
        let request = PurchaseRequest {
            is_delivery: session.mode().is_delivery(),
            notes: self.delivery_notes.clone(),
        };
        match session.create_purchase(request).await {
            Ok(purchase) => {
                self.phase = CheckoutPhase::Success;
                self.last_error = None;
                observer.on_success(&purchase);
                Ok(&*self.purchase.insert(purchase))
            }
            Err(e) => {
                log::warn!("purchase failed: {e}");
                let message = e.to_string();
                observer.on_failure(&message);
                self.last_error = Some(message);
                self.phase = CheckoutPhase::Reviewing;
                Err(e)
            }
        }
    }

    /// Ends the checkout after the success animation; the caller navigates
    /// back home.
    pub fn finish(self) -> Option<Purchase> {
        self.purchase
    }

    fn is_locked(&self) -> bool {
        matches!(
            self.phase,
            CheckoutPhase::Submitting | CheckoutPhase::Success
        )
    }
}
