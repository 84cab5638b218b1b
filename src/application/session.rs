//! Async operations over the shared client state.
//!
//! Every operation follows the same shape: take a ticket from the slice under
//! the state lock, release the lock, await the gateway, then reduce the
//! result into the slice if the ticket is still current. The lock is never
//! held across a request.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::domain::cart::{CartMutation, FulfilmentMode};
use crate::domain::catalog::{ListingId, ProximityQuery, RestaurantId};
use crate::domain::errors::DomainError;
use crate::domain::ports::RemoteGateway;
use crate::domain::purchase::{Purchase, PurchaseRequest};
use crate::errors::AppError;

use super::cart_store::{CartState, CartStore};
use super::catalog::{CatalogState, RestaurantCatalog};
use super::purchase_history::{OrdersTab, PurchaseHistory, PurchaseState};
use super::reconciler::{self, CartView};
use super::tracker::{Epoch, Ticket};

pub const DEFAULT_ORDERS_PER_PAGE: u32 = 10;

#[derive(Debug, Default)]
pub struct AppState {
    pub cart: CartStore,
    pub catalog: RestaurantCatalog,
    pub purchases: PurchaseHistory,
}

/// Owned copy of every slice, for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct AppSnapshot {
    pub cart: CartState,
    pub catalog: CatalogState,
    pub purchases: PurchaseState,
}

pub struct Session<G> {
    gateway: G,
    state: Mutex<AppState>,
    busy_listings: Mutex<HashSet<ListingId>>,
    orders_per_page: u32,
}

/// Marks a listing as having a cart mutation in flight until dropped.
struct ListingLock<'a> {
    busy: &'a Mutex<HashSet<ListingId>>,
    listing_id: ListingId,
}

impl Drop for ListingLock<'_> {
    fn drop(&mut self) {
        self.busy
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.listing_id);
    }
}

impl<G: RemoteGateway> Session<G> {
    pub fn new(gateway: G) -> Self {
        Self {
            gateway,
            state: Mutex::new(AppState::default()),
            busy_listings: Mutex::new(HashSet::new()),
            orders_per_page: DEFAULT_ORDERS_PER_PAGE,
        }
    }

    pub fn with_orders_per_page(mut self, per_page: u32) -> Self {
        self.orders_per_page = per_page.max(1);
        self
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    fn state(&self) -> MutexGuard<'_, AppState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn snapshot(&self) -> AppSnapshot {
        let state = self.state();
        AppSnapshot {
            cart: state.cart.state().clone(),
            catalog: state.catalog.state().clone(),
            purchases: state.purchases.state().clone(),
        }
    }

    pub fn cart_view(&self) -> CartView {
        let state = self.state();
        CartView::derive(state.cart.state(), state.catalog.state())
    }

    pub fn mode(&self) -> FulfilmentMode {
        self.state().catalog.state().mode
    }

    // ── Cart ─────────────────────────────────────────────────────────────────

    pub async fn fetch_cart(&self) -> Result<(), AppError> {
        let ticket = self.state().cart.begin();
        self.load_cart(ticket).await
    }

    /// Cart fetch belonging to an operation that started in `origin`. Skipped
    /// when the cart was reset in the meantime, so a logout cannot be undone
    /// by an operation that was already running.
    async fn refetch_cart(&self, origin: Epoch) -> Result<(), AppError> {
        let ticket = self.state().cart.begin_in(origin);
        match ticket {
            Some(ticket) => self.load_cart(ticket).await,
            None => {
                log::debug!("cart was reset; skipping refetch");
                Ok(())
            }
        }
    }

    async fn load_cart(&self, ticket: Ticket) -> Result<(), AppError> {
        match self.gateway.fetch_cart().await {
            Ok(items) => {
                let applied = self.state().cart.fulfil(ticket, items);
                if !applied {
                    log::warn!("discarding stale cart response");
                }
                Ok(())
            }
            Err(e) => {
                log::warn!("cart fetch failed: {e}");
                self.state().cart.reject(ticket, e.to_string());
                Err(e)
            }
        }
    }

    /// Adds one unit of a listing of the selected restaurant.
    pub async fn add_item(&self, listing_id: ListingId) -> Result<(), AppError> {
        self.add_units(listing_id, 1).await
    }

    async fn add_units(&self, listing_id: ListingId, quantity: u32) -> Result<(), AppError> {
        let _lock = self.lock_listing(listing_id)?;
        let ticket = {
            let mut guard = self.state();
            let state = &mut *guard;
            let listing = state
                .catalog
                .state()
                .listing(listing_id)
                .ok_or(DomainError::UnknownListing(listing_id))?;
            reconciler::check_add(state.cart.items(), listing)?;
            let in_cart = reconciler::count_in_cart(state.cart.items(), listing_id);
            reconciler::check_target_quantity(listing, in_cart + quantity)?;
            state.cart.begin()
        };
        log::debug!("adding {quantity} x listing {listing_id} to cart");
        let outcome = self.gateway.add_to_cart(listing_id, quantity).await;
        self.settle_mutation(ticket, outcome).await
    }

    pub async fn update_item(&self, listing_id: ListingId, count: u32) -> Result<(), AppError> {
        if count == 0 {
            return self.remove_item(listing_id).await;
        }
        let _lock = self.lock_listing(listing_id)?;
        let ticket = {
            let mut guard = self.state();
            let state = &mut *guard;
            if let Some(listing) = state.catalog.state().listing(listing_id) {
                reconciler::check_target_quantity(listing, count)?;
            }
            state.cart.begin()
        };
        log::debug!("updating listing {listing_id} to {count}");
        let outcome = self.gateway.update_cart_item(listing_id, count).await;
        self.settle_mutation(ticket, outcome).await
    }

    pub async fn remove_item(&self, listing_id: ListingId) -> Result<(), AppError> {
        let _lock = self.lock_listing(listing_id)?;
        let ticket = self.state().cart.begin();
        log::debug!("removing listing {listing_id} from cart");
        let outcome = self.gateway.remove_from_cart(listing_id).await;
        self.settle_mutation(ticket, outcome).await
    }

    /// Moves a listing's quantity to `target` using whichever of add, update
    /// or remove the change calls for.
    pub async fn set_quantity(&self, listing_id: ListingId, target: u32) -> Result<(), AppError> {
        let current = {
            let state = self.state();
            if target > 0 {
                if let Some(listing) = state.catalog.state().listing(listing_id) {
                    reconciler::check_target_quantity(listing, target)?;
                }
            }
            reconciler::count_in_cart(state.cart.items(), listing_id)
        };
        match reconciler::plan_quantity_change(current, target) {
            None => Ok(()),
            Some(CartMutation::Add) => self.add_units(listing_id, target).await,
            Some(CartMutation::Update(count)) => self.update_item(listing_id, count).await,
            Some(CartMutation::Remove) => self.remove_item(listing_id).await,
        }
    }

    pub async fn increment(&self, listing_id: ListingId) -> Result<(), AppError> {
        let current = reconciler::count_in_cart(self.state().cart.items(), listing_id);
        self.set_quantity(listing_id, current + 1).await
    }

    pub async fn decrement(&self, listing_id: ListingId) -> Result<(), AppError> {
        let current = reconciler::count_in_cart(self.state().cart.items(), listing_id);
        self.set_quantity(listing_id, current.saturating_sub(1)).await
    }

    pub fn clear_cart(&self) {
        self.state().cart.clear();
    }

    /// Clears the local cart when its restaurant is no longer nearby.
    /// Returns whether the cart was cleared.
    pub fn discard_orphaned_cart(&self) -> bool {
        let mut state = self.state();
        let orphaned = matches!(
            reconciler::resolve_restaurant(
                &state.catalog.state().restaurants,
                state.cart.items()
            ),
            Some(Err(_))
        );
        if orphaned {
            log::warn!("clearing cart: its restaurant is no longer in proximity");
            state.cart.clear();
        }
        orphaned
    }

    fn lock_listing(&self, listing_id: ListingId) -> Result<ListingLock<'_>, DomainError> {
        let mut busy = self
            .busy_listings
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if !busy.insert(listing_id) {
            return Err(DomainError::MutationInFlight(listing_id));
        }
        Ok(ListingLock {
            busy: &self.busy_listings,
            listing_id,
        })
    }

    /// Re-fetches the cart after a mutation whatever its outcome; the
    /// mutation's own error wins over the re-fetch result.
    async fn settle_mutation(
        &self,
        ticket: Ticket,
        outcome: Result<(), AppError>,
    ) -> Result<(), AppError> {
        let refetch = self.refetch_cart(ticket.epoch()).await;
        match outcome {
            Ok(()) => refetch,
            Err(e) => {
                log::warn!("cart mutation failed: {e}");
                self.state().cart.record_error(ticket, e.to_string());
                Err(e)
            }
        }
    }

    // ── Catalog ──────────────────────────────────────────────────────────────

    pub async fn fetch_nearby_restaurants(&self, query: ProximityQuery) -> Result<(), AppError> {
        let ticket = self.state().catalog.begin_restaurants(query);
        match self.gateway.nearby_restaurants(query).await {
            Ok(restaurants) => {
                log::debug!("{} restaurants nearby", restaurants.len());
                let mut guard = self.state();
                let state = &mut *guard;
                if state.catalog.fulfil_restaurants(ticket, restaurants) {
                    let resolved = reconciler::resolve_restaurant(
                        &state.catalog.state().restaurants,
                        state.cart.items(),
                    );
                    if let Some(Err(id)) = resolved {
                        log::warn!("restaurant {id} of the current cart is not in proximity");
                    }
                }
                Ok(())
            }
            Err(e) => {
                self.state().catalog.reject_restaurants(ticket, e.to_string());
                Err(e)
            }
        }
    }

    /// Selects a nearby restaurant and loads its listings.
    pub async fn select_restaurant(&self, restaurant_id: RestaurantId) -> Result<(), AppError> {
        let ticket = {
            let mut state = self.state();
            let restaurant = state
                .catalog
                .state()
                .restaurant(restaurant_id)
                .cloned()
                .ok_or(DomainError::RestaurantUnavailable)?;
            state.catalog.begin_listings(restaurant)
        };
        match self.gateway.restaurant_listings(restaurant_id).await {
            Ok(listings) => {
                self.state().catalog.fulfil_listings(ticket, listings);
                Ok(())
            }
            Err(e) => {
                self.state().catalog.reject_listings(ticket, e.to_string());
                Err(e)
            }
        }
    }

    pub fn set_mode(&self, mode: FulfilmentMode) {
        self.state().catalog.set_mode(mode);
    }

    pub fn toggle_pickup(&self) -> FulfilmentMode {
        self.state().catalog.toggle_pickup()
    }

    /// Brings cart, nearby restaurants and the cart restaurant's listings up
    /// to date before checkout.
    ///
    /// Stops early when the cart is reset (e.g. by logout) along the way.
    pub async fn refresh_for_checkout(&self) -> Result<(), AppError> {
        let origin = self.state().cart.begin();
        self.load_cart(origin).await?;
        let query = self.state().catalog.state().proximity;
        if let Some(query) = query {
            if self.state().cart.epoch() != origin.epoch() {
                return Ok(());
            }
            self.fetch_nearby_restaurants(query).await?;
        }
        let cart_restaurant = {
            let state = self.state();
            if state.cart.epoch() != origin.epoch() {
                return Ok(());
            }
            match reconciler::resolve_restaurant(
                &state.catalog.state().restaurants,
                state.cart.items(),
            ) {
                Some(Ok(r)) => Some(r.id),
                _ => None,
            }
        };
        match cart_restaurant {
            Some(id) => self.select_restaurant(id).await,
            None => Ok(()),
        }
    }

    // ── Purchases ────────────────────────────────────────────────────────────

    /// Places the order for the current cart. Afterwards the cart and the
    /// active orders are re-fetched.
    pub async fn create_purchase(&self, request: PurchaseRequest) -> Result<Purchase, AppError> {
        let (cart_origin, orders_origin) = {
            let state = self.state();
            (state.cart.epoch(), state.purchases.active_epoch())
        };
        let purchase = self.gateway.create_purchase(request).await?;
        log::info!("purchase {} created", purchase.purchase_id);
        let orders_ticket = self.state().purchases.begin_active_in(orders_origin);
        if let Some(ticket) = orders_ticket {
            if let Err(e) = self.load_active(ticket).await {
                log::warn!("could not refresh active orders after purchase: {e}");
            }
        }
        if let Err(e) = self.refetch_cart(cart_origin).await {
            log::warn!("could not refresh cart after purchase: {e}");
        }
        Ok(purchase)
    }

    pub async fn fetch_active_orders(&self) -> Result<(), AppError> {
        let ticket = self.state().purchases.begin_active();
        self.load_active(ticket).await
    }

    async fn load_active(&self, ticket: Ticket) -> Result<(), AppError> {
        match self.gateway.active_purchases().await {
            Ok(purchases) => {
                self.state().purchases.fulfil_active(ticket, purchases);
                Ok(())
            }
            Err(e) => {
                self.state().purchases.reject_active(ticket, e.to_string());
                Err(e)
            }
        }
    }

    pub async fn fetch_previous_orders(&self, page: u32) -> Result<(), AppError> {
        let ticket = self.state().purchases.begin_previous();
        self.load_previous(ticket, page.max(1)).await
    }

    /// Infinite-scroll trigger. Returns whether a page was requested.
    pub async fn load_more_previous_orders(&self) -> Result<bool, AppError> {
        let next = self.state().purchases.begin_next_page();
        match next {
            None => Ok(false),
            Some((ticket, page)) => {
                self.load_previous(ticket, page).await?;
                Ok(true)
            }
        }
    }

    pub async fn refresh_orders(&self, tab: OrdersTab) -> Result<(), AppError> {
        match tab {
            OrdersTab::Active => self.fetch_active_orders().await,
            OrdersTab::Previous => self.fetch_previous_orders(1).await,
        }
    }

    async fn load_previous(&self, ticket: Ticket, page: u32) -> Result<(), AppError> {
        match self
            .gateway
            .previous_purchases(page, self.orders_per_page)
            .await
        {
            Ok(result) => {
                self.state().purchases.fulfil_previous(ticket, page, result);
                Ok(())
            }
            Err(e) => {
                self.state().purchases.reject_previous(ticket, e.to_string());
                Err(e)
            }
        }
    }

    // ── Identity ─────────────────────────────────────────────────────────────

    /// Resets every identity-bound slice and invalidates all requests still
    /// in flight so none of them can write afterwards.
    pub fn logout(&self) {
        let mut state = self.state();
        state.cart.clear();
        state.purchases.reset();
        state.catalog.invalidate_requests();
        log::info!("session reset on logout");
    }
}
