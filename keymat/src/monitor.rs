//! Non-owning registry of size-change monitors
//!
//! The registry holds `Weak` handles: it never extends a listener's
//! lifetime, attaching the same listener twice has no extra effect, and
//! detaching an unregistered (or already dropped) listener is a no-op.
//! All mutation happens through the owning matrix, so access is
//! single-writer by construction.

use std::sync::{Arc, Weak};

use keymat_core::{SizeChange, SizeMonitor, SparseAccess};

/// Weakly held set of [`SizeMonitor`] listeners
#[derive(Default)]
pub struct MonitorRegistry {
    entries: Vec<Weak<dyn SizeMonitor>>,
}

impl MonitorRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener; idempotent
    pub fn attach(&mut self, monitor: &Arc<dyn SizeMonitor>) {
        self.entries.retain(|entry| entry.strong_count() > 0);
        let handle = Arc::downgrade(monitor);
        if !self.entries.iter().any(|entry| entry.ptr_eq(&handle)) {
            self.entries.push(handle);
        }
    }

    /// Unregister a listener; no-op when it was never attached
    pub fn detach(&mut self, monitor: &Arc<dyn SizeMonitor>) {
        let handle = Arc::downgrade(monitor);
        self.entries
            .retain(|entry| entry.strong_count() > 0 && !entry.ptr_eq(&handle));
    }

    /// Number of live registered listeners
    pub fn len(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.strong_count() > 0)
            .count()
    }

    /// Whether no live listener is registered
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Deliver one transition to every live listener
    pub fn notify(&self, matrix: &dyn SparseAccess, change: SizeChange) {
        for entry in &self.entries {
            if let Some(monitor) = entry.upgrade() {
                monitor.notify_size_changed(matrix, change);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use keymat_core::{Layout, Orientation};

    use super::*;

    struct Recorder {
        changes: Mutex<Vec<SizeChange>>,
    }

    impl Recorder {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                changes: Mutex::new(Vec::new()),
            })
        }
    }

    impl SizeMonitor for Recorder {
        fn notify_size_changed(&self, _matrix: &dyn SparseAccess, change: SizeChange) {
            self.changes.lock().unwrap().push(change);
        }
    }

    struct Probe {
        layout: Layout,
    }

    impl SparseAccess for Probe {
        fn row_size(&self) -> u32 {
            self.layout.row_size()
        }
        fn column_size(&self) -> u32 {
            self.layout.column_size()
        }
        fn orientation(&self) -> Orientation {
            self.layout.orientation()
        }
        fn element_size(&self) -> usize {
            0
        }
        fn try_get(&self, _row: u32, _column: u32) -> Option<f32> {
            None
        }
    }

    fn probe() -> Probe {
        Probe {
            layout: Layout::new(Orientation::RowMajor, 2, 2).unwrap(),
        }
    }

    #[test]
    fn attach_is_idempotent() {
        let recorder = Recorder::new();
        let monitor: Arc<dyn SizeMonitor> = recorder.clone();
        let mut registry = MonitorRegistry::new();
        registry.attach(&monitor);
        registry.attach(&monitor);
        assert_eq!(registry.len(), 1);

        registry.notify(&probe(), SizeChange::between(4, 1, 0));
        assert_eq!(recorder.changes.lock().unwrap().len(), 1);
    }

    #[test]
    fn detach_unknown_is_noop() {
        let attached: Arc<dyn SizeMonitor> = Recorder::new();
        let stranger: Arc<dyn SizeMonitor> = Recorder::new();
        let mut registry = MonitorRegistry::new();
        registry.attach(&attached);
        registry.detach(&stranger);
        assert_eq!(registry.len(), 1);
        registry.detach(&attached);
        assert!(registry.is_empty());
    }

    #[test]
    fn dropped_listener_is_not_kept_alive() {
        let recorder = Recorder::new();
        let weak = Arc::downgrade(&recorder);
        let monitor: Arc<dyn SizeMonitor> = recorder;
        let mut registry = MonitorRegistry::new();
        registry.attach(&monitor);
        drop(monitor);
        assert_eq!(weak.strong_count(), 0);
        assert!(registry.is_empty());
        registry.notify(&probe(), SizeChange::between(4, 1, 0));
    }
}
