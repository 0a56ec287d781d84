//! HTTP handlers for the Agri Advisor platform

pub mod crop;
pub mod health;
pub mod location;
pub mod options;
pub mod pages;
pub mod solution;

pub use crop::recommend_crop;
pub use health::health_check;
pub use location::{clear_locations, get_locations, process_location, replace_locations};
pub use options::get_options;
pub use pages::{chatbot_page, crop_recommendation_page, home_page, location_picker_page};
pub use solution::generate_solution;

use axum::extract::ConnectInfo;
use std::net::SocketAddr;

/// Address recorded when the connection info is unavailable
const UNKNOWN_CLIENT: &str = "unknown";

/// Caller address as seen by the server
pub(crate) fn client_ip(connect_info: Option<ConnectInfo<SocketAddr>>) -> String {
    connect_info
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}
