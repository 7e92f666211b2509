use std::sync::atomic::{AtomicBool, Ordering};

/// Marks an operation as running until dropped.
///
/// `acquire` returns `None` while another guard on the same flag is alive,
/// so a second submission made during a pending one is ignored.
pub(crate) struct InFlight<'a> {
    flag: &'a AtomicBool,
}

impl<'a> InFlight<'a> {
    pub(crate) fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_acquire_blocked_until_release() {
        let flag = AtomicBool::new(false);

        let first = InFlight::acquire(&flag);
        assert!(first.is_some());
        assert!(InFlight::acquire(&flag).is_none());

        drop(first);
        assert!(InFlight::acquire(&flag).is_some());
    }
}
