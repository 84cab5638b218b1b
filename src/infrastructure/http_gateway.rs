use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::ClientConfig;
use crate::domain::cart::CartLineItem;
use crate::domain::catalog::{Listing, ListingId, ProximityQuery, Restaurant, RestaurantId};
use crate::domain::ports::{RemoteGateway, TokenSource};
use crate::domain::purchase::{Purchase, PurchasePage, PurchaseRequest};
use crate::errors::AppError;

use super::models::{
    AddToCartBody, CartLineItemDto, CreatePurchaseBody, ErrorBody, ListingDto, PurchaseDto,
    PurchasePageDto, RemoveFromCartBody, RestaurantDto, UpdateCartBody,
};

/// [`RemoteGateway`] over HTTP/JSON with bearer authentication.
#[derive(Debug, Clone)]
pub struct HttpGateway<T> {
    base_url: String,
    http: Client,
    tokens: T,
}

impl<T: TokenSource> HttpGateway<T> {
    pub fn new(config: &ClientConfig, tokens: T) -> Result<Self, AppError> {
        let http = Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            base_url: config.api_base_url.clone(),
            http,
            tokens,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Attaches the bearer token; fails before anything is sent when the user
    /// is signed out.
    fn authorized(&self, request: RequestBuilder) -> Result<RequestBuilder, AppError> {
        let token = self.tokens.token().ok_or(AppError::AuthMissing)?;
        Ok(request.bearer_auth(token))
    }

    async fn get<R: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<R, AppError> {
        let request = self.authorized(self.http.get(self.url(path)).query(query))?;
        log::debug!("GET {path}");
        let response = request.send().await?;
        Self::read_json(path, response).await
    }

    async fn post<B: Serialize + Sync, R: DeserializeOwned>(&self, path: &str, body: &B) -> Result<R, AppError> {
        let request = self.authorized(self.http.post(self.url(path)).json(body))?;
        log::debug!("POST {path}");
        let response = request.send().await?;
        Self::read_json(path, response).await
    }

    /// POST whose response body is only an acknowledgement.
    async fn post_ack<B: Serialize + Sync>(&self, path: &str, body: &B) -> Result<(), AppError> {
        let request = self.authorized(self.http.post(self.url(path)).json(body))?;
        log::debug!("POST {path}");
        let response = request.send().await?;
        Self::ensure_success(path, response).await.map(|_| ())
    }

    async fn ensure_success(path: &str, response: Response) -> Result<Response, AppError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let text = response.text().await.unwrap_or_default();
        let message = ErrorBody::message_from(&text);
        log::warn!("{path} rejected with {status}: {message}");
        Err(AppError::ServerRejection {
            status: status.as_u16(),
            message,
        })
    }

    async fn read_json<R: DeserializeOwned>(path: &str, response: Response) -> Result<R, AppError> {
        let response = Self::ensure_success(path, response).await?;
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| AppError::Decode(format!("{path}: {e}")))
    }
}

#[async_trait]
impl<T: TokenSource> RemoteGateway for HttpGateway<T> {
    async fn fetch_cart(&self) -> Result<Vec<CartLineItem>, AppError> {
        let items: Vec<CartLineItemDto> = self.get("/cart", &[]).await?;
        Ok(items.into_iter().map(CartLineItem::from).collect())
    }

    async fn add_to_cart(&self, listing_id: ListingId, quantity: u32) -> Result<(), AppError> {
        self.post_ack("/cart/add", &AddToCartBody { listing_id, quantity })
            .await
    }

    async fn update_cart_item(&self, listing_id: ListingId, count: u32) -> Result<(), AppError> {
        self.post_ack("/cart/update", &UpdateCartBody { listing_id, count })
            .await
    }

    async fn remove_from_cart(&self, listing_id: ListingId) -> Result<(), AppError> {
        self.post_ack("/cart/remove", &RemoveFromCartBody { listing_id })
            .await
    }

    async fn nearby_restaurants(&self, query: ProximityQuery) -> Result<Vec<Restaurant>, AppError> {
        let params = [
            ("lat", query.latitude.to_string()),
            ("lng", query.longitude.to_string()),
            ("radius", query.radius_km.to_string()),
        ];
        let restaurants: Vec<RestaurantDto> = self.get("/restaurants/proximity", &params).await?;
        Ok(restaurants.into_iter().map(Restaurant::from).collect())
    }

    async fn restaurant_listings(&self, restaurant_id: RestaurantId) -> Result<Vec<Listing>, AppError> {
        let path = format!("/restaurants/{restaurant_id}/listings");
        let listings: Vec<ListingDto> = self.get(&path, &[]).await?;
        Ok(listings.into_iter().map(Listing::from).collect())
    }

    async fn create_purchase(&self, request: PurchaseRequest) -> Result<Purchase, AppError> {
        let body = CreatePurchaseBody {
            is_delivery: request.is_delivery,
            notes: request.notes,
        };
        let purchase: PurchaseDto = self.post("/purchases", &body).await?;
        Ok(purchase.into())
    }

    async fn active_purchases(&self) -> Result<Vec<Purchase>, AppError> {
        let purchases: Vec<PurchaseDto> = self.get("/purchases/active", &[]).await?;
        Ok(purchases.into_iter().map(Purchase::from).collect())
    }

    async fn previous_purchases(&self, page: u32, per_page: u32) -> Result<PurchasePage, AppError> {
        let params = [("page", page.to_string()), ("per_page", per_page.to_string())];
        let result: PurchasePageDto = self.get("/purchases/previous", &params).await?;
        Ok(result.into())
    }
}
