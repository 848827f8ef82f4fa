// Bootstrap errors
//
// Every fatal failure of the bootstrap sequence ends up here. Non-fatal
// conditions (format fallback, missing debug messenger) are only logged.

use ash::vk;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BootstrapError {
    /// Vulkan loader could not be found or opened
    #[error("failed to load Vulkan library: {0}")]
    Loading(#[from] ash::LoadingError),

    /// Requested validation layers are not installed on the host
    #[error("validation layers requested but not available: {missing:?}")]
    MissingLayers { missing: Vec<String> },

    /// The driver rejected an object-creation call
    #[error("failed to create {object}: {result}")]
    Creation {
        object: &'static str,
        result: vk::Result,
    },

    /// The driver rejected a capability query
    #[error("Vulkan query {query} failed: {result}")]
    Query {
        query: &'static str,
        result: vk::Result,
    },

    #[error("failed to find GPUs with Vulkan support")]
    NoDevices,

    #[error("failed to find a suitable GPU among {count} device(s)")]
    NoSuitableDevice { count: usize },

    /// The surface offers nothing to negotiate with
    #[error("surface reports no {0}")]
    SurfaceUnsupported(&'static str),

    /// Swapchain construction stopped in the given state
    #[error("swapchain construction failed while {state:?}: {source}")]
    Swapchain {
        state: super::swapchain::SwapchainState,
        #[source]
        source: Box<BootstrapError>,
    },

    #[error("failed to read SPIR-V from {path}: {source}")]
    Spirv {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl BootstrapError {
    pub(crate) fn creation(object: &'static str) -> impl FnOnce(vk::Result) -> Self {
        move |result| Self::Creation { object, result }
    }

    pub(crate) fn query(query: &'static str) -> impl FnOnce(vk::Result) -> Self {
        move |result| Self::Query { query, result }
    }

    /// True for selection failures (as opposed to driver rejections)
    pub fn is_selection_failure(&self) -> bool {
        matches!(self, Self::NoDevices | Self::NoSuitableDevice { .. })
    }
}

pub type BootstrapResult<T> = std::result::Result<T, BootstrapError>;
