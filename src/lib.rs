pub mod app;
pub mod auth;
pub mod categories;
pub mod config;
pub mod dates;
pub mod db;
pub mod error;
pub mod extract;
pub mod gifts;
pub mod mahjong;
pub mod query;
pub mod records;
pub mod response;
pub mod shopping;
pub mod state;
pub mod validation;

#[cfg(test)]
mod test_support;
