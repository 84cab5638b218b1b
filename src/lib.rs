pub mod application;
pub mod config;
pub mod domain;
pub mod errors;
pub mod infrastructure;

pub use application::checkout::{CheckoutMachine, CheckoutPhase, PaymentMethod};
pub use application::reconciler::CartView;
pub use application::session::Session;
pub use config::ClientConfig;
pub use errors::AppError;
pub use infrastructure::http_gateway::HttpGateway;
pub use infrastructure::token::TokenStore;

/// Build a session talking to the configured API. The returned token store
/// shares state with the gateway, so signing in or out through it takes
/// effect on the next request.
pub fn connect(config: &ClientConfig) -> Result<(Session<HttpGateway<TokenStore>>, TokenStore), AppError> {
    let tokens = TokenStore::new(config.api_token.clone());
    let gateway = HttpGateway::new(config, tokens.clone())?;
    let session = Session::new(gateway).with_orders_per_page(config.orders_per_page);
    Ok((session, tokens))
}
