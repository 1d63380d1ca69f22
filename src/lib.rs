//! Library entry for cinesea exposing the client core for integration tests.

pub mod app;
pub mod catalog;
pub mod config;
pub mod favorites;
pub mod notify;
pub mod recent;
pub mod search;
pub mod session;
pub mod state;
pub mod storage;
pub mod util;
