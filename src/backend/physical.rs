// Physical device selection
//
// Responsibilities:
// - Enumerate GPUs exposed by the instance
// - Check each one against the surface (queues, extensions, swapchain support)
// - Pick the FIRST suitable device, in enumeration order (no scoring)

use ash::extensions::khr;
use ash::vk;
use std::collections::BTreeSet;
use std::ffi::{CStr, CString};

use super::error::{BootstrapError, BootstrapResult};
use super::queue::{find_queue_families, QueueFamilies};
use super::surface::Surface;
use super::swapchain::SwapchainSupport;
use super::validation::fixed_name;

/// Device extensions every candidate must support
pub const REQUIRED_DEVICE_EXTENSIONS: &[&CStr] = &[c"VK_KHR_swapchain"];

/// Read-only view of the physical devices the selector works with
pub trait DeviceProbe {
    fn devices(&self) -> BootstrapResult<Vec<vk::PhysicalDevice>>;

    fn queue_families(&self, device: vk::PhysicalDevice) -> Vec<vk::QueueFamilyProperties>;

    /// Can `family` present to the target surface?
    fn supports_present(&self, device: vk::PhysicalDevice, family: u32) -> BootstrapResult<bool>;

    fn extensions(&self, device: vk::PhysicalDevice) -> BootstrapResult<Vec<CString>>;

    /// Fresh snapshot; never cached
    fn swapchain_support(&self, device: vk::PhysicalDevice) -> BootstrapResult<SwapchainSupport>;

    /// Human-readable description for logs
    fn describe(&self, device: vk::PhysicalDevice) -> String;
}

/// Probe backed by a live instance and surface
pub struct VulkanProbe<'a> {
    instance: &'a ash::Instance,
    surface: &'a Surface,
}

impl<'a> VulkanProbe<'a> {
    pub fn new(instance: &'a ash::Instance, surface: &'a Surface) -> Self {
        Self { instance, surface }
    }

    fn surface_loader(&self) -> &khr::Surface {
        &self.surface.loader
    }
}

impl DeviceProbe for VulkanProbe<'_> {
    fn devices(&self) -> BootstrapResult<Vec<vk::PhysicalDevice>> {
        unsafe { self.instance.enumerate_physical_devices() }
            .map_err(BootstrapError::query("vkEnumeratePhysicalDevices"))
    }

    fn queue_families(&self, device: vk::PhysicalDevice) -> Vec<vk::QueueFamilyProperties> {
        unsafe { self.instance.get_physical_device_queue_family_properties(device) }
    }

    fn supports_present(&self, device: vk::PhysicalDevice, family: u32) -> BootstrapResult<bool> {
        unsafe {
            self.surface_loader()
                .get_physical_device_surface_support(device, family, self.surface.handle)
        }
        .map_err(BootstrapError::query("vkGetPhysicalDeviceSurfaceSupportKHR"))
    }

    fn extensions(&self, device: vk::PhysicalDevice) -> BootstrapResult<Vec<CString>> {
        let properties = unsafe { self.instance.enumerate_device_extension_properties(device) }
            .map_err(BootstrapError::query("vkEnumerateDeviceExtensionProperties"))?;
        Ok(properties
            .iter()
            .map(|ext| fixed_name(&ext.extension_name))
            .collect())
    }

    fn swapchain_support(&self, device: vk::PhysicalDevice) -> BootstrapResult<SwapchainSupport> {
        SwapchainSupport::query(self.surface_loader(), device, self.surface.handle)
    }

    fn describe(&self, device: vk::PhysicalDevice) -> String {
        let props = unsafe { self.instance.get_physical_device_properties(device) };
        format!(
            "{} (Vulkan {}.{}.{})",
            fixed_name(&props.device_name).to_string_lossy(),
            vk::api_version_major(props.api_version),
            vk::api_version_minor(props.api_version),
            vk::api_version_patch(props.api_version)
        )
    }
}

/// The chosen GPU and the facts that made it suitable
#[derive(Debug, Clone)]
pub struct SelectedDevice {
    pub handle: vk::PhysicalDevice,
    pub families: QueueFamilies,
    pub support: SwapchainSupport,
    pub name: String,
}

/// True iff every required extension is in `available`
pub fn supports_extensions(available: &[CString], required: &[&CStr]) -> bool {
    let mut missing: BTreeSet<&CStr> = required.iter().copied().collect();
    for ext in available {
        missing.remove(ext.as_c_str());
    }
    missing.is_empty()
}

/// Evaluate one candidate; `None` when it is unusable
pub fn check_device<P: DeviceProbe + ?Sized>(
    probe: &P,
    device: vk::PhysicalDevice,
    required_extensions: &[&CStr],
) -> BootstrapResult<Option<SelectedDevice>> {
    let mapping = find_queue_families(probe, device)?;
    let Some(families) = mapping.resolved() else {
        log::debug!("Rejected {:?}: queue families incomplete ({:?})", device, mapping);
        return Ok(None);
    };

    if !supports_extensions(&probe.extensions(device)?, required_extensions) {
        log::debug!("Rejected {:?}: missing required device extensions", device);
        return Ok(None);
    }

    let support = probe.swapchain_support(device)?;
    if !support.is_adequate() {
        log::debug!("Rejected {:?}: no surface formats or present modes", device);
        return Ok(None);
    }

    Ok(Some(SelectedDevice {
        handle: device,
        families,
        support,
        name: probe.describe(device),
    }))
}

/// Pick the first suitable GPU in enumeration order
pub fn pick_physical_device<P: DeviceProbe + ?Sized>(
    probe: &P,
    required_extensions: &[&CStr],
) -> BootstrapResult<SelectedDevice> {
    let devices = probe.devices()?;
    if devices.is_empty() {
        return Err(BootstrapError::NoDevices);
    }
    log::info!("Physical device count: {}", devices.len());

    for &device in &devices {
        if let Some(selected) = check_device(probe, device, required_extensions)? {
            log::info!("Physical device: {}", selected.name);
            log::info!(
                "Queue families: graphics={} present={}",
                selected.families.graphics,
                selected.families.present
            );
            return Ok(selected);
        }
    }

    Err(BootstrapError::NoSuitableDevice {
        count: devices.len(),
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use ash::vk::Handle;
    use std::cell::RefCell;

    /// Scripted physical device
    #[derive(Clone)]
    pub(crate) struct FakeDevice {
        families: Vec<vk::QueueFamilyProperties>,
        present: Vec<u32>,
        extensions: Vec<CString>,
        support: SwapchainSupport,
    }

    impl FakeDevice {
        /// One graphics+present family, swapchain extension, one format/mode
        pub(crate) fn usable() -> Self {
            Self {
                families: Vec::new(),
                present: vec![0],
                extensions: vec![c"VK_KHR_swapchain".to_owned()],
                support: SwapchainSupport {
                    capabilities: vk::SurfaceCapabilitiesKHR {
                        min_image_count: 2,
                        max_image_count: 8,
                        ..Default::default()
                    },
                    formats: vec![vk::SurfaceFormatKHR {
                        format: vk::Format::B8G8R8A8_SRGB,
                        color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR,
                    }],
                    present_modes: vec![vk::PresentModeKHR::FIFO],
                },
            }
            .families(&[vk::QueueFlags::GRAPHICS])
        }

        pub(crate) fn families(mut self, flags: &[vk::QueueFlags]) -> Self {
            self.families = flags
                .iter()
                .map(|&queue_flags| vk::QueueFamilyProperties {
                    queue_flags,
                    queue_count: 1,
                    ..Default::default()
                })
                .collect();
            self
        }

        pub(crate) fn present_on(mut self, families: &[u32]) -> Self {
            self.present = families.to_vec();
            self
        }

        pub(crate) fn extensions(mut self, names: &[&CStr]) -> Self {
            self.extensions = names.iter().map(|&name| name.to_owned()).collect();
            self
        }

        pub(crate) fn support(mut self, support: SwapchainSupport) -> Self {
            self.support = support;
            self
        }
    }

    /// Probe over scripted devices that records which devices were asked about
    pub(crate) struct FakeProbe {
        devices: Vec<FakeDevice>,
        pub(crate) extension_queries: RefCell<Vec<usize>>,
    }

    impl FakeProbe {
        pub(crate) fn new(devices: Vec<FakeDevice>) -> Self {
            Self {
                devices,
                extension_queries: RefCell::new(Vec::new()),
            }
        }

        pub(crate) fn handle(&self, index: usize) -> vk::PhysicalDevice {
            vk::PhysicalDevice::from_raw(index as u64 + 1)
        }

        fn device(&self, device: vk::PhysicalDevice) -> (usize, &FakeDevice) {
            let index = device.as_raw() as usize - 1;
            (index, &self.devices[index])
        }
    }

    impl DeviceProbe for FakeProbe {
        fn devices(&self) -> BootstrapResult<Vec<vk::PhysicalDevice>> {
            Ok((0..self.devices.len()).map(|i| self.handle(i)).collect())
        }

        fn queue_families(&self, device: vk::PhysicalDevice) -> Vec<vk::QueueFamilyProperties> {
            self.device(device).1.families.clone()
        }

        fn supports_present(&self, device: vk::PhysicalDevice, family: u32) -> BootstrapResult<bool> {
            Ok(self.device(device).1.present.contains(&family))
        }

        fn extensions(&self, device: vk::PhysicalDevice) -> BootstrapResult<Vec<CString>> {
            let (index, fake) = self.device(device);
            self.extension_queries.borrow_mut().push(index);
            Ok(fake.extensions.clone())
        }

        fn swapchain_support(&self, device: vk::PhysicalDevice) -> BootstrapResult<SwapchainSupport> {
            Ok(self.device(device).1.support.clone())
        }

        fn describe(&self, device: vk::PhysicalDevice) -> String {
            format!("fake device #{}", self.device(device).0)
        }
    }

    fn names(list: &[&str]) -> Vec<CString> {
        list.iter().map(|s| CString::new(*s).unwrap()).collect()
    }

    #[test]
    fn extension_support_is_subset_check() {
        let available = names(&["VK_KHR_swapchain", "VK_KHR_maintenance1"]);
        assert!(supports_extensions(&available, REQUIRED_DEVICE_EXTENSIONS));
        // Same answer when asked twice
        assert!(supports_extensions(&available, REQUIRED_DEVICE_EXTENSIONS));

        let without = names(&["VK_KHR_maintenance1"]);
        assert!(!supports_extensions(&without, REQUIRED_DEVICE_EXTENSIONS));
        assert!(!supports_extensions(&without, REQUIRED_DEVICE_EXTENSIONS));

        assert!(supports_extensions(&[], &[]));
    }

    #[test]
    fn no_devices_is_a_selection_failure() {
        let probe = FakeProbe::new(Vec::new());
        let err = pick_physical_device(&probe, REQUIRED_DEVICE_EXTENSIONS).unwrap_err();
        assert!(matches!(err, BootstrapError::NoDevices));
    }

    #[test]
    fn first_suitable_device_wins_without_recheck() {
        let probe = FakeProbe::new(vec![
            FakeDevice::usable().extensions(&[c"VK_KHR_maintenance1"]),
            FakeDevice::usable(),
            FakeDevice::usable(),
        ]);

        let selected = pick_physical_device(&probe, REQUIRED_DEVICE_EXTENSIONS).unwrap();
        assert_eq!(selected.handle, probe.handle(1));
        assert_eq!(selected.name, "fake device #1");
        // Device 0 checked once, device 2 never
        assert_eq!(*probe.extension_queries.borrow(), vec![0, 1]);
    }

    #[test]
    fn half_filled_queue_mapping_is_rejected() {
        let probe = FakeProbe::new(vec![FakeDevice::usable().present_on(&[])]);
        let err = pick_physical_device(&probe, REQUIRED_DEVICE_EXTENSIONS).unwrap_err();
        assert!(matches!(err, BootstrapError::NoSuitableDevice { count: 1 }));
    }

    #[test]
    fn empty_swapchain_support_is_rejected() {
        let mut no_modes = FakeDevice::usable().support.clone();
        no_modes.present_modes.clear();
        let mut no_formats = FakeDevice::usable().support.clone();
        no_formats.formats.clear();

        let probe = FakeProbe::new(vec![
            FakeDevice::usable().support(no_modes),
            FakeDevice::usable().support(no_formats),
        ]);
        let err = pick_physical_device(&probe, REQUIRED_DEVICE_EXTENSIONS).unwrap_err();
        assert!(matches!(err, BootstrapError::NoSuitableDevice { count: 2 }));
    }

    #[test]
    fn split_families_are_reported() {
        let probe = FakeProbe::new(vec![FakeDevice::usable()
            .families(&[vk::QueueFlags::GRAPHICS, vk::QueueFlags::TRANSFER])
            .present_on(&[1])]);

        let selected = pick_physical_device(&probe, REQUIRED_DEVICE_EXTENSIONS).unwrap();
        assert_eq!(
            selected.families,
            QueueFamilies {
                graphics: 0,
                present: 1
            }
        );
    }
}
