// Public API for integration tests and embedding in a lobby service

pub mod api;
pub mod clock;
pub mod config;
pub mod error;
pub mod protocol;
pub mod providers;
pub mod state;
pub mod suggest;
pub mod types;
