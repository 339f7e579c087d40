use std::collections::HashSet;
use std::sync::Mutex;

/// Admission gate between the scanner and the validation pool.
///
/// An identifier recurring in many revisions is validated at most once per
/// run: the first `admit` for an identifier returns true, every later call
/// returns false. Safe under concurrent callers.
pub struct CandidateDeduplicator {
    seen: Mutex<HashSet<String>>,
}

impl CandidateDeduplicator {
    pub fn new() -> Self {
        Self {
            seen: Mutex::new(HashSet::new()),
        }
    }

    pub fn admit(&self, identifier: &str) -> bool {
        self.seen.lock().unwrap().insert(identifier.to_string())
    }

    pub fn seen_count(&self) -> usize {
        self.seen.lock().unwrap().len()
    }
}

impl Default for CandidateDeduplicator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn admits_each_identifier_exactly_once() {
        let dedup = CandidateDeduplicator::new();

        assert!(dedup.admit("AKIA1234567890ABCD12"));
        assert!(!dedup.admit("AKIA1234567890ABCD12"));
        assert!(dedup.admit("ASIA0000111122223333"));
        assert_eq!(dedup.seen_count(), 2);
    }

    #[test]
    fn concurrent_admits_grant_a_single_winner() {
        let dedup = Arc::new(CandidateDeduplicator::new());

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let dedup = dedup.clone();
                std::thread::spawn(move || dedup.admit("AKIA1234567890ABCD12"))
            })
            .collect();

        let admitted = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|&won| won)
            .count();
        assert_eq!(admitted, 1);
    }
}
