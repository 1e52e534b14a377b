use std::collections::HashMap;

use parking_lot::Mutex;

/// FQDN -> provider record ID for records created and not yet removed
///
/// Every access takes the lock for the duration of the map operation only;
/// callers never hold it across a network request.
#[derive(Debug, Default)]
pub struct RecordIds {
    ids: Mutex<HashMap<String, u64>>,
}

impl RecordIds {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track `record_id` for `fqdn`, returning the ID it replaced
    pub fn track(&self, fqdn: &str, record_id: u64) -> Option<u64> {
        self.ids.lock().insert(fqdn.to_string(), record_id)
    }

    pub fn get(&self, fqdn: &str) -> Option<u64> {
        self.ids.lock().get(fqdn).copied()
    }

    /// Stop tracking `fqdn`
    pub fn forget(&self, fqdn: &str) -> Option<u64> {
        self.ids.lock().remove(fqdn)
    }

    pub fn len(&self) -> usize {
        self.ids.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_track_and_forget() {
        let ids = RecordIds::new();
        assert_eq!(ids.len(), 0);

        assert_eq!(ids.track("example.com", 123), None);
        assert_eq!(ids.get("example.com"), Some(123));
        assert_eq!(ids.len(), 1);

        assert_eq!(ids.forget("example.com"), Some(123));
        assert_eq!(ids.get("example.com"), None);
        assert_eq!(ids.len(), 0);
    }

    #[test]
    fn test_track_overwrites_previous_id() {
        let ids = RecordIds::new();
        ids.track("example.com", 1);
        assert_eq!(ids.track("example.com", 2), Some(1));
        assert_eq!(ids.get("example.com"), Some(2));
        assert_eq!(ids.len(), 1);
    }

    #[test]
    fn test_entries_are_independent() {
        let ids = RecordIds::new();
        ids.track("a.example.com", 10);
        ids.track("b.example.com", 20);

        ids.forget("a.example.com");
        assert_eq!(ids.get("a.example.com"), None);
        assert_eq!(ids.get("b.example.com"), Some(20));
    }

    #[test]
    fn test_concurrent_tracking_from_threads() {
        let ids = std::sync::Arc::new(RecordIds::new());
        let handles: Vec<_> = (0..8u64)
            .map(|i| {
                let ids = ids.clone();
                std::thread::spawn(move || {
                    ids.track(&format!("d{}.example.com", i), i);
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(ids.len(), 8);
        for i in 0..8u64 {
            assert_eq!(ids.get(&format!("d{}.example.com", i)), Some(i));
        }
    }
}
