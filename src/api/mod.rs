pub mod client;
pub mod handlers;
pub mod routes;

pub use client::ApiClient;
pub use routes::{router, AppState};
