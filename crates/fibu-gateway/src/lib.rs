//! # Fibu Gateway
//!
//! HTTP implementations of the fibubot query gateway:
//! - [`TempusClient`]: the Tempus ranking API ([`RankingService`](fibu_core::RankingService))
//! - [`HelixClient`]: the chat platform API ([`ChatPlatform`](fibu_core::ChatPlatform))
//!
//! Both map HTTP 404 to `NotFound` and every other failure (transport errors,
//! non-success statuses, undecodable bodies) to `Unavailable`.

pub mod config;
pub mod helix;
mod http;
pub mod tempus;

use std::sync::Arc;

use fibu_core::{Gateway, GatewayResult};

pub use config::{HelixConfig, TempusConfig};
pub use helix::HelixClient;
pub use tempus::TempusClient;

/// Builds a [`Gateway`] backed by both HTTP clients.
///
/// `bot_login` is the account the bot follows channels as.
pub fn http_gateway(
    tempus: &TempusConfig,
    helix: &HelixConfig,
    bot_login: &str,
) -> GatewayResult<Gateway> {
    let ranking = TempusClient::new(tempus)?;
    let platform = HelixClient::new(helix, bot_login)?;
    Ok(Gateway::new(Arc::new(platform), Arc::new(ranking)))
}
