pub mod http_gateway;
pub mod models;
pub mod token;
