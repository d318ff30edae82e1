//! HTTP clients for the external collaborators

pub mod acr_client;
pub mod raar_client;

pub use acr_client::AcrClient;
pub use raar_client::RaarClient;

/// User-Agent sent with every request
pub(crate) const USER_AGENT: &str = concat!("playsync/", env!("CARGO_PKG_VERSION"));
