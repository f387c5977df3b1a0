// Deletion queue - stack-discipline resource arena
//
// Resources are pushed in acquisition order and released in exact reverse
// order when the queue is flushed or dropped. Entries are owning values whose
// own Drop performs the release, so nothing here can capture a stale handle.
//
// The queue is Send but not Sync. Sharing one across threads needs external
// locking.

use std::any::Any;

/// Runs a closure exactly once when dropped
pub struct Deferred<F: FnOnce()> {
    action: Option<F>,
}

impl<F: FnOnce()> Deferred<F> {
    pub fn new(action: F) -> Self {
        Self { action: Some(action) }
    }
}

impl<F: FnOnce()> Drop for Deferred<F> {
    fn drop(&mut self) {
        if let Some(action) = self.action.take() {
            action();
        }
    }
}

#[derive(Default)]
pub struct DeletionQueue {
    entries: Vec<Box<dyn Any + Send>>,
}

impl DeletionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of a resource; it is released when the queue drains
    pub fn push<R: Send + 'static>(&mut self, resource: R) {
        self.entries.push(Box::new(resource));
    }

    /// Register a bare cleanup action
    pub fn defer<F: FnOnce() + Send + 'static>(&mut self, action: F) {
        self.push(Deferred::new(action));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Release everything, newest first
    pub fn flush(&mut self) {
        if self.entries.is_empty() {
            return;
        }

        log::debug!("Flushing deletion queue ({} entries)", self.entries.len());

        // pop() keeps the queue consistent even if a release panics midway
        while let Some(entry) = self.entries.pop() {
            drop(entry);
        }
    }
}

impl Drop for DeletionQueue {
    fn drop(&mut self) {
        self.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    fn recorder() -> Arc<Mutex<Vec<&'static str>>> {
        Arc::new(Mutex::new(Vec::new()))
    }

    #[test]
    fn flush_runs_in_reverse_order() {
        let log = recorder();
        let mut queue = DeletionQueue::new();

        for name in ["A", "B", "C"] {
            let log = log.clone();
            queue.defer(move || log.lock().push(name));
        }
        assert_eq!(queue.len(), 3);

        queue.flush();

        assert_eq!(*log.lock(), vec!["C", "B", "A"]);
        assert!(queue.is_empty());
    }

    #[test]
    fn flush_twice_runs_each_action_once() {
        let log = recorder();
        let mut queue = DeletionQueue::new();
        {
            let log = log.clone();
            queue.defer(move || log.lock().push("only"));
        }

        queue.flush();
        queue.flush();

        assert_eq!(*log.lock(), vec!["only"]);
    }

    #[test]
    fn drop_flushes_remaining_entries() {
        let log = recorder();
        {
            let mut queue = DeletionQueue::new();
            let first = log.clone();
            let second = log.clone();
            queue.defer(move || first.lock().push("first"));
            queue.defer(move || second.lock().push("second"));
        }

        assert_eq!(*log.lock(), vec!["second", "first"]);
    }

    struct Tracked {
        name: &'static str,
        log: Arc<Mutex<Vec<&'static str>>>,
    }

    impl Drop for Tracked {
        fn drop(&mut self) {
            self.log.lock().push(self.name);
        }
    }

    #[test]
    fn owned_resources_and_actions_share_one_order() {
        let log = recorder();
        let mut queue = DeletionQueue::new();

        queue.push(Tracked { name: "instance", log: log.clone() });
        {
            let log = log.clone();
            queue.defer(move || log.lock().push("surface"));
        }
        queue.push(Tracked { name: "device", log: log.clone() });

        drop(queue);

        assert_eq!(*log.lock(), vec!["device", "surface", "instance"]);
    }

    #[test]
    fn deferred_runs_once_on_drop() {
        let log = recorder();
        let deferred = {
            let log = log.clone();
            Deferred::new(move || log.lock().push("ran"))
        };
        assert!(log.lock().is_empty());

        drop(deferred);
        assert_eq!(*log.lock(), vec!["ran"]);
    }
}
