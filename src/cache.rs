use std::cell::RefCell;
use std::collections::HashMap;

use chrono::Utc;

use crate::domain::ticket::{Ticket, TicketView};

/// How long a fetched ticket (or fetch failure) stays valid, in milliseconds.
pub const TICKET_TTL_MS: i64 = 900_000;

pub trait Clock {
    fn now_millis(&self) -> i64;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// The outcome of the last fetch for a key.
#[derive(Debug, Clone, PartialEq)]
pub enum CachedTicket {
    Ticket(Ticket),
    Error(String),
}

impl CachedTicket {
    pub fn is_error(&self) -> bool {
        matches!(self, CachedTicket::Error(_))
    }

    pub fn to_view(&self, key: &str) -> TicketView {
        match self {
            CachedTicket::Ticket(ticket) => TicketView::Ready(ticket.clone()),
            CachedTicket::Error(message) => TicketView::Failed {
                key: key.to_string(),
                message: message.clone(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub key: String,
    pub payload: CachedTicket,
    pub timestamp: i64,
}

impl CacheEntry {
    pub fn is_error(&self) -> bool {
        self.payload.is_error()
    }
}

/// In-memory ticket store shared by every renderer on the event thread.
///
/// Entries older than [`TICKET_TTL_MS`] read as misses but are never evicted;
/// only [`TicketCache::clear`] drops them.
pub struct TicketCache {
    entries: RefCell<HashMap<String, CacheEntry>>,
    clock: Box<dyn Clock>,
}

impl TicketCache {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }

    pub fn with_clock(clock: impl Clock + 'static) -> Self {
        Self {
            entries: RefCell::new(HashMap::new()),
            clock: Box::new(clock),
        }
    }

    pub fn add(&self, key: impl Into<String>, payload: CachedTicket) -> CacheEntry {
        let key = key.into();
        let entry = CacheEntry {
            key: key.clone(),
            payload,
            timestamp: self.clock.now_millis(),
        };
        self.entries.borrow_mut().insert(key, entry.clone());
        entry
    }

    pub fn get(&self, key: &str) -> Option<CacheEntry> {
        let now = self.clock.now_millis();
        self.entries
            .borrow()
            .get(key)
            .filter(|entry| now - entry.timestamp < TICKET_TTL_MS)
            .cloned()
    }

    pub fn get_time(&self, key: &str) -> Option<i64> {
        self.entries.borrow().get(key).map(|entry| entry.timestamp)
    }

    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl Default for TicketCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{ManualClock, sample_ticket};

    #[test]
    fn entry_is_valid_until_ttl_boundary() {
        let clock = ManualClock::at(1_000);
        let cache = TicketCache::with_clock(clock.clone());
        cache.add("42", CachedTicket::Ticket(sample_ticket("42", 500)));

        clock.advance(TICKET_TTL_MS - 1);
        let entry = cache.get("42").expect("entry before expiry");
        assert_eq!(entry.payload, CachedTicket::Ticket(sample_ticket("42", 500)));

        clock.advance(1);
        assert!(cache.get("42").is_none());
    }

    #[test]
    fn expired_entries_keep_their_insertion_time() {
        let clock = ManualClock::at(5_000);
        let cache = TicketCache::with_clock(clock.clone());
        cache.add("7", CachedTicket::Error("boom".to_string()));

        clock.advance(TICKET_TTL_MS * 3);
        assert!(cache.get("7").is_none());
        assert_eq!(cache.get_time("7"), Some(5_000));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn add_overwrites_previous_entry() {
        let clock = ManualClock::at(0);
        let cache = TicketCache::with_clock(clock.clone());
        cache.add("42", CachedTicket::Error("first".to_string()));
        clock.advance(10);
        let stored = cache.add("42", CachedTicket::Ticket(sample_ticket("42", 1)));

        assert_eq!(stored.timestamp, 10);
        let entry = cache.get("42").expect("entry");
        assert!(!entry.is_error());
        assert_eq!(entry, stored);
    }

    #[test]
    fn error_entries_report_flag() {
        let cache = TicketCache::new();
        let entry = cache.add("9", CachedTicket::Error("Error getting issue 9: 404".to_string()));
        assert!(entry.is_error());
        assert_eq!(
            entry.payload.to_view("9"),
            TicketView::Failed {
                key: "9".to_string(),
                message: "Error getting issue 9: 404".to_string(),
            }
        );
    }

    #[test]
    fn clear_drops_everything() {
        let cache = TicketCache::new();
        cache.add("1", CachedTicket::Error("x".to_string()));
        cache.add("2", CachedTicket::Error("y".to_string()));
        cache.clear();
        assert!(cache.is_empty());
        assert!(cache.get_time("1").is_none());
    }
}
