// Queue families
//
// Maps a physical device's queue families onto the two roles the renderer
// needs: graphics and presentation.

use ash::vk;
use std::collections::BTreeSet;

use super::error::BootstrapResult;
use super::physical::DeviceProbe;

/// Which queue family serves which role. Absence is distinct from index 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueFamilyMapping {
    pub graphics: Option<u32>,
    pub present: Option<u32>,
}

impl QueueFamilyMapping {
    /// Both roles found (possibly the same family)
    pub fn is_filled(&self) -> bool {
        self.graphics.is_some() && self.present.is_some()
    }

    pub fn resolved(&self) -> Option<QueueFamilies> {
        Some(QueueFamilies {
            graphics: self.graphics?,
            present: self.present?,
        })
    }
}

/// A filled mapping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueFamilies {
    pub graphics: u32,
    pub present: u32,
}

impl QueueFamilies {
    pub fn is_shared(&self) -> bool {
        self.graphics == self.present
    }

    /// Distinct family indices, one queue-creation request each
    pub fn unique(&self) -> Vec<u32> {
        let families: BTreeSet<u32> = [self.graphics, self.present].into_iter().collect();
        families.into_iter().collect()
    }
}

/// Scan every family; the last family matching a role wins that role
pub fn find_queue_families<P: DeviceProbe + ?Sized>(
    probe: &P,
    device: vk::PhysicalDevice,
) -> BootstrapResult<QueueFamilyMapping> {
    let mut mapping = QueueFamilyMapping::default();

    for (index, props) in probe.queue_families(device).iter().enumerate() {
        let index = index as u32;

        if props.queue_flags.contains(vk::QueueFlags::GRAPHICS) {
            mapping.graphics = Some(index);
        }

        if probe.supports_present(device, index)? {
            mapping.present = Some(index);
        }
    }

    Ok(mapping)
}
