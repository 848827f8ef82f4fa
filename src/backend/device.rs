// Vulkan Device - logical device and queues
//
// Responsibilities:
// - One queue-creation request per DISTINCT queue family
// - Enable the required device extensions
// - Re-declare validation layers at device level (older drivers need it)
// - Fetch the graphics and present queues

use ash::vk;
use std::ffi::c_char;

use super::error::{BootstrapError, BootstrapResult};
use super::instance::BackendInstance;
use super::physical::{SelectedDevice, REQUIRED_DEVICE_EXTENSIONS};
use super::queue::QueueFamilies;

/// Every queue we create gets the highest priority
pub const QUEUE_PRIORITY: f32 = 1.0;

/// Queue handles per role; equal when both roles share a family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Queues {
    pub graphics: vk::Queue,
    pub present: vk::Queue,
}

/// Family indices to request queues from, deduplicated
pub fn queue_requests(families: QueueFamilies) -> Vec<u32> {
    families.unique()
}

/// Fetch queue 0 of each role's family
pub fn fetch_queues(
    families: QueueFamilies,
    mut get_queue: impl FnMut(u32, u32) -> vk::Queue,
) -> Queues {
    Queues {
        graphics: get_queue(families.graphics, 0),
        present: get_queue(families.present, 0),
    }
}

/// Logical device with automatic cleanup
pub struct LogicalDevice {
    pub device: ash::Device,
    pub physical_device: vk::PhysicalDevice,
    pub families: QueueFamilies,
    pub graphics_queue: vk::Queue,
    pub present_queue: vk::Queue,
    destroyed: bool,
}

impl LogicalDevice {
    pub fn new(instance: &BackendInstance, selected: &SelectedDevice) -> BootstrapResult<Self> {
        let families = selected.families;

        let queue_priorities = [QUEUE_PRIORITY];
        let queue_create_infos: Vec<vk::DeviceQueueCreateInfo> = queue_requests(families)
            .into_iter()
            .map(|family| {
                vk::DeviceQueueCreateInfo::builder()
                    .queue_family_index(family)
                    .queue_priorities(&queue_priorities)
                    .build()
            })
            .collect();

        let extensions: Vec<*const c_char> = REQUIRED_DEVICE_EXTENSIONS
            .iter()
            .map(|name| name.as_ptr())
            .collect();

        // Ignored by modern drivers, required by older ones
        let layers = instance.validation().layer_name_ptrs();

        let features = vk::PhysicalDeviceFeatures::default();

        #[allow(deprecated)]
        let create_info = vk::DeviceCreateInfo::builder()
            .queue_create_infos(&queue_create_infos)
            .enabled_extension_names(&extensions)
            .enabled_layer_names(&layers)
            .enabled_features(&features);

        let device = unsafe {
            instance
                .instance
                .create_device(selected.handle, &create_info, None)
        }
        .map_err(BootstrapError::creation("logical device"))?;
        log::info!(
            "Created logical device with {} queue(s)",
            queue_create_infos.len()
        );

        let queues = fetch_queues(families, |family, index| unsafe {
            device.get_device_queue(family, index)
        });

        Ok(Self {
            device,
            physical_device: selected.handle,
            families,
            graphics_queue: queues.graphics,
            present_queue: queues.present,
            destroyed: false,
        })
    }

    /// Wait for device to be idle (e.g., before cleanup)
    pub fn wait_idle(&self) -> BootstrapResult<()> {
        unsafe { self.device.device_wait_idle() }
            .map_err(BootstrapError::query("vkDeviceWaitIdle"))
    }

    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;

        if let Err(e) = self.wait_idle() {
            log::warn!("Device did not go idle before destruction: {}", e);
        }
        unsafe { self.device.destroy_device(None) };
        log::info!("Destroyed logical device");
    }
}

impl Drop for LogicalDevice {
    fn drop(&mut self) {
        self.destroy();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ash::vk::Handle;

    // Mimics vkGetDeviceQueue: one handle per (family, index)
    fn fake_queue(family: u32, index: u32) -> vk::Queue {
        vk::Queue::from_raw(((family as u64) << 8) | (index as u64 + 1))
    }

    #[test]
    fn shared_family_issues_one_request_and_aliases_queues() {
        let families = QueueFamilies {
            graphics: 1,
            present: 1,
        };
        assert_eq!(queue_requests(families), vec![1]);

        let queues = fetch_queues(families, fake_queue);
        assert_eq!(queues.graphics, queues.present);
        assert_eq!(queues.graphics, fake_queue(1, 0));
    }

    #[test]
    fn split_families_issue_two_requests() {
        let families = QueueFamilies {
            graphics: 0,
            present: 2,
        };
        assert_eq!(queue_requests(families), vec![0, 2]);

        let mut asked = Vec::new();
        let queues = fetch_queues(families, |family, index| {
            asked.push((family, index));
            fake_queue(family, index)
        });
        assert_ne!(queues.graphics, queues.present);
        assert_eq!(asked, vec![(0, 0), (2, 0)]);
    }
}
