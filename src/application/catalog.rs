use crate::domain::cart::FulfilmentMode;
use crate::domain::catalog::{Listing, ListingId, ProximityQuery, Restaurant, RestaurantId};

use super::tracker::{RequestTracker, Ticket};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogState {
    pub restaurants: Vec<Restaurant>,
    pub selected_restaurant: Option<Restaurant>,
    /// Listings of `selected_restaurant`.
    pub listings: Vec<Listing>,
    pub mode: FulfilmentMode,
    /// Last proximity query, replayed when checkout refreshes the catalog.
    pub proximity: Option<ProximityQuery>,
    pub loading: bool,
    pub error: Option<String>,
}

impl CatalogState {
    pub fn is_pickup(&self) -> bool {
        self.mode.is_pickup()
    }

    pub fn listing(&self, id: ListingId) -> Option<&Listing> {
        self.listings.iter().find(|l| l.id == id)
    }

    pub fn restaurant(&self, id: RestaurantId) -> Option<&Restaurant> {
        self.restaurants.iter().find(|r| r.id == id)
    }
}

/// Nearby restaurants, the selected one with its listings, and the
/// pickup/delivery toggle.
#[derive(Debug, Default)]
pub struct RestaurantCatalog {
    state: CatalogState,
    restaurant_requests: RequestTracker,
    listing_requests: RequestTracker,
}

impl RestaurantCatalog {
    pub fn state(&self) -> &CatalogState {
        &self.state
    }

    pub fn begin_restaurants(&mut self, query: ProximityQuery) -> Ticket {
        self.state.proximity = Some(query);
        self.state.loading = true;
        self.restaurant_requests.issue()
    }

    pub fn fulfil_restaurants(&mut self, ticket: Ticket, restaurants: Vec<Restaurant>) -> bool {
        if !self.restaurant_requests.is_current(ticket) {
            return false;
        }
        // Keep the selection pointing at fresh data when it is still nearby.
        if let Some(selected) = &self.state.selected_restaurant {
            if let Some(fresh) = restaurants.iter().find(|r| r.id == selected.id) {
                self.state.selected_restaurant = Some(fresh.clone());
            }
        }
        self.state.restaurants = restaurants;
        self.state.loading = false;
        self.state.error = None;
        true
    }

    pub fn reject_restaurants(&mut self, ticket: Ticket, message: String) -> bool {
        if !self.restaurant_requests.is_current(ticket) {
            return false;
        }
        self.state.loading = false;
        self.state.error = Some(message);
        true
    }

    /// Selects a restaurant and starts loading its listings. Listings of a
    /// previously selected restaurant are dropped.
    pub fn begin_listings(&mut self, restaurant: Restaurant) -> Ticket {
        let changed = self
            .state
            .selected_restaurant
            .as_ref()
            .map_or(true, |current| current.id != restaurant.id);
        if changed {
            self.state.listings.clear();
        }
        self.state.selected_restaurant = Some(restaurant);
        self.state.loading = true;
        self.listing_requests.issue()
    }

    pub fn fulfil_listings(&mut self, ticket: Ticket, listings: Vec<Listing>) -> bool {
        if !self.listing_requests.is_current(ticket) {
            return false;
        }
        self.state.listings = listings;
        self.state.loading = false;
        self.state.error = None;
        true
    }

    pub fn reject_listings(&mut self, ticket: Ticket, message: String) -> bool {
        if !self.listing_requests.is_current(ticket) {
            return false;
        }
        self.state.loading = false;
        self.state.error = Some(message);
        true
    }

    pub fn set_mode(&mut self, mode: FulfilmentMode) {
        self.state.mode = mode;
    }

    pub fn toggle_pickup(&mut self) -> FulfilmentMode {
        self.state.mode = FulfilmentMode::from_is_pickup(!self.state.mode.is_pickup());
        self.state.mode
    }

    /// Stops in-flight requests from landing without discarding browsed data.
    pub fn invalidate_requests(&mut self) {
        self.restaurant_requests.invalidate();
        self.listing_requests.invalidate();
        self.state.loading = false;
    }
}
