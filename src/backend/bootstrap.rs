// Backend bootstrap - the whole setup sequence in one place
//
// validation check -> instance -> debug messenger -> surface
//   -> physical device -> logical device -> swapchain
//
// Each step needs handles from the one before, so everything runs in order
// on the calling thread. If a step fails, the objects created so far are
// released in reverse order as the locals holding them go out of scope.

use ash::vk;

use super::device::LogicalDevice;
use super::error::BootstrapResult;
use super::instance::BackendInstance;
use super::physical::{pick_physical_device, SelectedDevice, VulkanProbe, REQUIRED_DEVICE_EXTENSIONS};
use super::queue::QueueFamilies;
use super::surface::{Surface, SurfaceProvider};
use super::swapchain::{Swapchain, SwapchainPreferences, SwapchainSupport};
use super::teardown::{ReleaseOrder, Stage};
use super::validation::{DebugMessenger, Validation};

/// Everything downstream rendering code needs from the backend
pub struct Backend {
    swapchain: Option<Swapchain>,
    device: LogicalDevice,
    surface: Surface,
    debug_messenger: DebugMessenger,
    instance: BackendInstance,
    selected: SelectedDevice,
    preferences: SwapchainPreferences,
    release_order: ReleaseOrder,
}

impl Backend {
    /// Run the full bootstrap against a window
    pub fn new<P: SurfaceProvider + ?Sized>(
        provider: &P,
        preferences: SwapchainPreferences,
    ) -> BootstrapResult<Self> {
        Self::with_validation(provider, preferences, Validation::from_build())
    }

    pub fn with_validation<P: SurfaceProvider + ?Sized>(
        provider: &P,
        preferences: SwapchainPreferences,
        validation: Validation,
    ) -> BootstrapResult<Self> {
        log::info!("Initializing Vulkan...");

        // ─────────────────────────────────────────────────────────────────────
        // STEP 1: Instance (layer check happens before anything is created)
        // ─────────────────────────────────────────────────────────────────────
        let window_extensions = provider.required_instance_extensions()?;
        let instance = BackendInstance::new(&window_extensions, validation)?;

        // ─────────────────────────────────────────────────────────────────────
        // STEP 2: Debug messenger (optional, never fatal)
        // ─────────────────────────────────────────────────────────────────────
        let debug_messenger = instance.install_debug_messenger();

        // ─────────────────────────────────────────────────────────────────────
        // STEP 3: Surface from the window system
        // ─────────────────────────────────────────────────────────────────────
        let surface = Surface::new(provider, &instance)?;

        // ─────────────────────────────────────────────────────────────────────
        // STEP 4: Physical device
        // ─────────────────────────────────────────────────────────────────────
        let selected = {
            let probe = VulkanProbe::new(&instance.instance, &surface);
            pick_physical_device(&probe, REQUIRED_DEVICE_EXTENSIONS)?
        };

        // ─────────────────────────────────────────────────────────────────────
        // STEP 5: Logical device + queues
        // ─────────────────────────────────────────────────────────────────────
        let device = LogicalDevice::new(&instance, &selected)?;

        // ─────────────────────────────────────────────────────────────────────
        // STEP 6: Swapchain sized to the drawable
        // ─────────────────────────────────────────────────────────────────────
        let preferences = preferences.with_extent(provider.drawable_extent());
        let swapchain = Swapchain::new(&instance.instance, &device, &surface, &preferences)?;

        log::info!("Vulkan initialized successfully!");

        Ok(Self {
            swapchain: Some(swapchain),
            device,
            surface,
            debug_messenger,
            instance,
            selected,
            preferences,
            release_order: ReleaseOrder::new(),
        })
    }

    pub fn device(&self) -> &ash::Device {
        &self.device.device
    }

    pub fn logical_device(&self) -> &LogicalDevice {
        &self.device
    }

    pub fn graphics_queue(&self) -> vk::Queue {
        self.device.graphics_queue
    }

    pub fn present_queue(&self) -> vk::Queue {
        self.device.present_queue
    }

    pub fn surface(&self) -> vk::SurfaceKHR {
        self.surface.handle
    }

    pub fn queue_families(&self) -> QueueFamilies {
        self.selected.families
    }

    pub fn physical_device(&self) -> &SelectedDevice {
        &self.selected
    }

    pub fn debug_messenger(&self) -> &DebugMessenger {
        &self.debug_messenger
    }

    /// Fresh capability snapshot for the selected device and surface
    pub fn swapchain_support(&self) -> BootstrapResult<SwapchainSupport> {
        SwapchainSupport::query(&self.surface.loader, self.selected.handle, self.surface.handle)
    }

    pub fn swapchain(&self) -> Option<&Swapchain> {
        self.swapchain.as_ref()
    }

    /// Destroy the current swapchain and build a new one for `extent`
    pub fn rebuild_swapchain(&mut self, extent: vk::Extent2D) -> BootstrapResult<()> {
        self.device.wait_idle()?;
        if let Some(mut old) = self.swapchain.take() {
            old.destroy();
        }

        self.preferences = self.preferences.with_extent(extent);
        let swapchain = Swapchain::new(
            &self.instance.instance,
            &self.device,
            &self.surface,
            &self.preferences,
        )?;
        self.swapchain = Some(swapchain);
        Ok(())
    }

    /// Release everything in reverse dependency order. Idempotent.
    pub fn teardown(&mut self) -> &ReleaseOrder {
        if self.release_order.is_complete() {
            return &self.release_order;
        }
        log::info!("Cleaning up Vulkan resources...");

        if let Err(e) = self.device.wait_idle() {
            log::warn!("Device did not go idle before teardown: {}", e);
        }

        if let Some(mut swapchain) = self.swapchain.take() {
            swapchain.destroy();
            self.release_order.release(Stage::Swapchain);
        }

        self.device.destroy();
        self.release_order.release(Stage::LogicalDevice);

        self.surface.destroy();
        self.release_order.release(Stage::Surface);

        self.debug_messenger.destroy();
        self.release_order.release(Stage::DebugMessenger);

        self.instance.destroy();
        self.release_order.release(Stage::Instance);

        log::info!("Cleanup complete");
        &self.release_order
    }
}

impl Drop for Backend {
    fn drop(&mut self) {
        self.teardown();
    }
}
