use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};
use tracing::debug;

use crate::mql::ast::Filter;
use crate::mql::error::SyntaxError;
use crate::mql::parser::parse_filter;

type Parsed = Result<Arc<Filter>, SyntaxError>;

/// Longest filter text, in bytes, that is kept in the cache.
pub const MAX_CACHED_TEXT_LEN: usize = 4 * 1024;

/// Parsed filters keyed by their exact text.
///
/// Each distinct text is parsed at most once while it is held: concurrent
/// callers asking for the same text wait on the first parse and share its
/// result. Syntax errors are cached as well. When `capacity` distinct texts are
/// held the cache is cleared before the next insert. Texts longer than
/// [`MAX_CACHED_TEXT_LEN`] are parsed on every call and never stored.
#[derive(Debug)]
pub struct FilterCache {
    capacity: usize,
    entries: Mutex<HashMap<String, Arc<OnceLock<Parsed>>>>,
    parses: AtomicUsize,
}

impl FilterCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: Mutex::new(HashMap::new()),
            parses: AtomicUsize::new(0),
        }
    }

    pub fn get_or_parse(&self, text: &str) -> Parsed {
        if self.capacity == 0 || text.len() > MAX_CACHED_TEXT_LEN {
            return self.parse(text);
        }

        // The map lock is held only long enough to find or reserve the slot;
        // parsing happens inside the slot's OnceLock.
        let slot = {
            let mut entries = self.entries.lock();
            match entries.get(text) {
                Some(slot) => Arc::clone(slot),
                None => {
                    if entries.len() >= self.capacity {
                        debug!("filter cache full, clearing {} entries", entries.len());
                        entries.clear();
                    }
                    let slot = Arc::new(OnceLock::new());
                    entries.insert(text.to_owned(), Arc::clone(&slot));
                    slot
                }
            }
        };

        slot.get_or_init(|| self.parse(text)).clone()
    }

    /// Distinct texts currently held.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total parses performed through this cache.
    pub fn parse_count(&self) -> usize {
        self.parses.load(Ordering::Relaxed)
    }

    fn parse(&self, text: &str) -> Parsed {
        self.parses.fetch_add(1, Ordering::Relaxed);
        parse_filter(text).map(Arc::new)
    }
}
