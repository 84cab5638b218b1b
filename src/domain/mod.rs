pub mod cart;
pub mod catalog;
pub mod errors;
pub mod hours;
pub mod ports;
pub mod purchase;
