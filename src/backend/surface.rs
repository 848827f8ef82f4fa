// Surface - window connection
//
// The window system is an external collaborator: it reports which instance
// extensions it needs, creates the platform surface, and reports the
// drawable size. The backend only keeps the handle so it can be released
// at the right point of teardown.

use ash::extensions::khr;
use ash::vk;
use raw_window_handle::{HasRawDisplayHandle, HasRawWindowHandle};
use std::ffi::CStr;

use super::error::{BootstrapError, BootstrapResult};
use super::instance::BackendInstance;

/// Anything that can hand the backend a drawable surface
pub trait SurfaceProvider {
    /// Instance extensions the platform surface needs
    fn required_instance_extensions(&self) -> BootstrapResult<Vec<&'static CStr>>;

    /// Create the platform surface against `instance`
    fn create_surface(&self, instance: &BackendInstance) -> BootstrapResult<vk::SurfaceKHR>;

    /// Current drawable size in pixels
    fn drawable_extent(&self) -> vk::Extent2D;
}

/// Surface handle plus the loader needed to query and release it
pub struct Surface {
    pub handle: vk::SurfaceKHR,
    pub loader: khr::Surface,
    destroyed: bool,
}

impl Surface {
    pub fn new<P: SurfaceProvider + ?Sized>(
        provider: &P,
        instance: &BackendInstance,
    ) -> BootstrapResult<Self> {
        let loader = khr::Surface::new(&instance.entry, &instance.instance);
        let handle = provider.create_surface(instance)?;
        log::info!("Created VkSurfaceKHR");

        Ok(Self {
            handle,
            loader,
            destroyed: false,
        })
    }

    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        unsafe { self.loader.destroy_surface(self.handle, None) };
        log::info!("Destroyed VkSurfaceKHR");
    }
}

impl Drop for Surface {
    fn drop(&mut self) {
        self.destroy();
    }
}

impl SurfaceProvider for winit::window::Window {
    fn required_instance_extensions(&self) -> BootstrapResult<Vec<&'static CStr>> {
        let names = ash_window::enumerate_required_extensions(self.raw_display_handle())
            .map_err(BootstrapError::query("surface extensions"))?;

        // Static tables owned by ash-window
        Ok(names
            .iter()
            .map(|&name| unsafe { CStr::from_ptr(name) })
            .collect())
    }

    fn create_surface(&self, instance: &BackendInstance) -> BootstrapResult<vk::SurfaceKHR> {
        unsafe {
            ash_window::create_surface(
                &instance.entry,
                &instance.instance,
                self.raw_display_handle(),
                self.raw_window_handle(),
                None,
            )
        }
        .map_err(BootstrapError::creation("VkSurfaceKHR"))
    }

    fn drawable_extent(&self) -> vk::Extent2D {
        let size = self.inner_size();
        vk::Extent2D {
            width: size.width,
            height: size.height,
        }
    }
}
