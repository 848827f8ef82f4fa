// Release ordering
//
// Backend objects must be released in reverse dependency order:
//   swapchain -> logical device -> surface -> debug messenger -> instance
// ReleaseOrder records each release and panics on a violation, so a
// use-after-destroy bug shows up at the call that caused it.

/// Releasable backend objects, in the order they must be released
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Swapchain,
    LogicalDevice,
    Surface,
    DebugMessenger,
    Instance,
}

#[derive(Debug, Default)]
pub struct ReleaseOrder {
    released: Vec<Stage>,
}

impl ReleaseOrder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a release. Stages may be skipped, never revisited or reordered.
    pub fn release(&mut self, stage: Stage) {
        if let Some(&last) = self.released.last() {
            assert!(
                stage > last,
                "{:?} released after {:?}: teardown order violated",
                stage,
                last
            );
        }
        log::debug!("Released {:?}", stage);
        self.released.push(stage);
    }

    pub fn released(&self) -> &[Stage] {
        &self.released
    }

    /// The instance is gone, nothing is left to release
    pub fn is_complete(&self) -> bool {
        self.released.last() == Some(&Stage::Instance)
    }
}
