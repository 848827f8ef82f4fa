// Backend module - Vulkan bootstrap
//
// Design: Thin wrapper around ash, one file per setup step
// Order: validation -> instance -> surface -> physical -> device -> swapchain

pub mod bootstrap;
pub mod device;
pub mod error;
pub mod instance;
pub mod physical;
pub mod queue;
pub mod shader;
pub mod surface;
pub mod swapchain;
pub mod teardown;
pub mod validation;

pub use bootstrap::Backend;
pub use device::LogicalDevice;
pub use error::{BootstrapError, BootstrapResult};
pub use instance::BackendInstance;
pub use queue::{QueueFamilies, QueueFamilyMapping};
pub use surface::{Surface, SurfaceProvider};
pub use swapchain::{Swapchain, SwapchainPreferences, SwapchainSupport};
