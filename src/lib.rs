// =============================================================================
// UNICRAFT - Vulkan backend bootstrap
// =============================================================================
//
// Brings up a Vulkan session against a window surface: picks a GPU, creates
// the logical device and its queues, and negotiates the swapchain.
//
// BOOTSTRAP FLOW:
// ┌─────────────────────────────────────────────────────────────────┐
// │  Validation check -> Instance (+ debug messenger)               │
// │    └── Surface (from the window system)                         │
// │          └── Physical device (first suitable)                   │
// │                └── Logical device + graphics/present queues     │
// │                      └── Swapchain + image views                │
// └─────────────────────────────────────────────────────────────────┘
//
// =============================================================================

pub mod backend;
pub mod config;

pub use backend::{Backend, BootstrapError, BootstrapResult};
pub use config::Config;
