use tracing::{debug, warn};

use crate::cache::{CachedTicket, TicketCache};
use crate::infra::shortcut::TicketClient;

/// Fetches `key` and records the outcome, success or failure, in the cache.
pub async fn fetch_into_cache(client: &TicketClient, cache: &TicketCache, key: &str) -> CachedTicket {
    let payload = match client.get_ticket(key).await {
        Ok(ticket) => {
            debug!(key, "ticket resolved");
            CachedTicket::Ticket(ticket)
        }
        Err(err) => {
            warn!(key, "ticket fetch failed: {err}");
            CachedTicket::Error(err.to_string())
        }
    };
    cache.add(key, payload).payload
}
