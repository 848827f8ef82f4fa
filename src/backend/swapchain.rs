// Swapchain - Window presentation
//
// Negotiates presentation parameters against what the surface supports,
// then creates the chain of images we present to the screen plus one view
// per image.
//
// Construction is a one-way state machine:
//   Uninitialized -> Negotiated -> Created -> ViewsBuilt -> Ready
// with Failed reachable from every non-terminal state. There is no
// recreate-in-place: a resize builds a brand new Swapchain.

use ash::extensions::khr;
use ash::vk;

use super::device::LogicalDevice;
use super::error::{BootstrapError, BootstrapResult};
use super::queue::QueueFamilies;
use super::surface::Surface;

/// Surface capability snapshot for one device. Queried fresh, never mutated.
#[derive(Debug, Clone)]
pub struct SwapchainSupport {
    pub capabilities: vk::SurfaceCapabilitiesKHR,
    pub formats: Vec<vk::SurfaceFormatKHR>,
    pub present_modes: Vec<vk::PresentModeKHR>,
}

impl SwapchainSupport {
    pub fn query(
        loader: &khr::Surface,
        device: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
    ) -> BootstrapResult<Self> {
        unsafe {
            Ok(Self {
                capabilities: loader
                    .get_physical_device_surface_capabilities(device, surface)
                    .map_err(BootstrapError::query("vkGetPhysicalDeviceSurfaceCapabilitiesKHR"))?,
                formats: loader
                    .get_physical_device_surface_formats(device, surface)
                    .map_err(BootstrapError::query("vkGetPhysicalDeviceSurfaceFormatsKHR"))?,
                present_modes: loader
                    .get_physical_device_surface_present_modes(device, surface)
                    .map_err(BootstrapError::query("vkGetPhysicalDeviceSurfacePresentModesKHR"))?,
            })
        }
    }

    /// At least one format and one present mode
    pub fn is_adequate(&self) -> bool {
        !self.formats.is_empty() && !self.present_modes.is_empty()
    }
}

/// What the application would like; the surface has the last word
#[derive(Debug, Clone, Copy)]
pub struct SwapchainPreferences {
    pub preferred_format: vk::Format,
    pub preferred_color_space: vk::ColorSpaceKHR,
    pub preferred_present_mode: vk::PresentModeKHR,
    /// Must be a mode every surface supports
    pub fallback_present_mode: vk::PresentModeKHR,
    /// Drawable size reported by the window
    pub requested_extent: vk::Extent2D,
}

impl Default for SwapchainPreferences {
    fn default() -> Self {
        Self {
            preferred_format: vk::Format::B8G8R8A8_SRGB,
            preferred_color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR,
            preferred_present_mode: vk::PresentModeKHR::MAILBOX,
            fallback_present_mode: vk::PresentModeKHR::FIFO,
            requested_extent: vk::Extent2D {
                width: 800,
                height: 600,
            },
        }
    }
}

impl SwapchainPreferences {
    pub fn with_extent(mut self, extent: vk::Extent2D) -> Self {
        self.requested_extent = extent;
        self
    }
}

/// Non-fatal quality loss recorded during negotiation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Degradation {
    /// Preferred surface format missing; first supported entry used instead
    SurfaceFormat {
        format: vk::Format,
        color_space: vk::ColorSpaceKHR,
    },
}

/// Image sharing between the graphics and present families
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sharing {
    Exclusive,
    Concurrent([u32; 2]),
}

impl Sharing {
    /// Concurrent iff the families differ
    pub fn for_families(families: QueueFamilies) -> Self {
        if families.is_shared() {
            Self::Exclusive
        } else {
            Self::Concurrent([families.graphics, families.present])
        }
    }

    pub fn mode(&self) -> vk::SharingMode {
        match self {
            Self::Exclusive => vk::SharingMode::EXCLUSIVE,
            Self::Concurrent(_) => vk::SharingMode::CONCURRENT,
        }
    }

    pub fn family_indices(&self) -> &[u32] {
        match self {
            Self::Exclusive => &[],
            Self::Concurrent(indices) => indices,
        }
    }
}

/// Concrete parameters for one swapchain
#[derive(Debug, Clone)]
pub struct SwapchainPlan {
    pub surface_format: vk::SurfaceFormatKHR,
    pub present_mode: vk::PresentModeKHR,
    pub extent: vk::Extent2D,
    pub image_count: u32,
    pub sharing: Sharing,
    pub pre_transform: vk::SurfaceTransformFlagsKHR,
    pub degradations: Vec<Degradation>,
}

/// Prefer the configured format/color space, else the first one offered
pub fn choose_surface_format(
    formats: &[vk::SurfaceFormatKHR],
    prefs: &SwapchainPreferences,
) -> BootstrapResult<(vk::SurfaceFormatKHR, Option<Degradation>)> {
    if let Some(&preferred) = formats.iter().find(|f| {
        f.format == prefs.preferred_format && f.color_space == prefs.preferred_color_space
    }) {
        return Ok((preferred, None));
    }

    let &first = formats
        .first()
        .ok_or(BootstrapError::SurfaceUnsupported("surface formats"))?;
    log::warn!(
        "Choosing poor swapchain surface format: {:?} / {:?}",
        first.format,
        first.color_space
    );
    Ok((
        first,
        Some(Degradation::SurfaceFormat {
            format: first.format,
            color_space: first.color_space,
        }),
    ))
}

/// Modes the chooser will ever return
pub const SELECTABLE_PRESENT_MODES: &[vk::PresentModeKHR] =
    &[vk::PresentModeKHR::MAILBOX, vk::PresentModeKHR::FIFO];

/// Preferred mode if offered, otherwise the fallback. Never returns a mode
/// the surface does not offer; FIFO is always there.
pub fn choose_present_mode(
    modes: &[vk::PresentModeKHR],
    prefs: &SwapchainPreferences,
) -> vk::PresentModeKHR {
    let preferred = prefs.preferred_present_mode;
    if SELECTABLE_PRESENT_MODES.contains(&preferred) && modes.contains(&preferred) {
        log::info!("Present mode: {:?}", preferred);
        return preferred;
    }

    let fallback = prefs.fallback_present_mode;
    if SELECTABLE_PRESENT_MODES.contains(&fallback) && modes.contains(&fallback) {
        log::info!("Present mode: {:?} (V-Sync)", fallback);
        fallback
    } else {
        log::info!("Present mode: FIFO (V-Sync)");
        vk::PresentModeKHR::FIFO
    }
}

/// The surface dictates the size unless it reports the "undefined" sentinel
pub fn choose_extent(caps: &vk::SurfaceCapabilitiesKHR, requested: vk::Extent2D) -> vk::Extent2D {
    if caps.current_extent.width != u32::MAX {
        return caps.current_extent;
    }

    vk::Extent2D {
        width: requested
            .width
            .min(caps.max_image_extent.width)
            .max(caps.min_image_extent.width),
        height: requested
            .height
            .min(caps.max_image_extent.height)
            .max(caps.min_image_extent.height),
    }
}

/// One more than the minimum, capped by a nonzero maximum
pub fn choose_image_count(caps: &vk::SurfaceCapabilitiesKHR) -> u32 {
    let count = caps.min_image_count.saturating_add(1);
    if caps.max_image_count > 0 && count > caps.max_image_count {
        caps.max_image_count
    } else {
        count
    }
}

/// Derive every presentation parameter from the support snapshot
pub fn negotiate(
    support: &SwapchainSupport,
    families: QueueFamilies,
    prefs: &SwapchainPreferences,
) -> BootstrapResult<SwapchainPlan> {
    let (surface_format, degraded) = choose_surface_format(&support.formats, prefs)?;
    if support.present_modes.is_empty() {
        return Err(BootstrapError::SurfaceUnsupported("present modes"));
    }
    let present_mode = choose_present_mode(&support.present_modes, prefs);
    let extent = choose_extent(&support.capabilities, prefs.requested_extent);
    let image_count = choose_image_count(&support.capabilities);

    Ok(SwapchainPlan {
        surface_format,
        present_mode,
        extent,
        image_count,
        sharing: Sharing::for_families(families),
        pre_transform: support.capabilities.current_transform,
        degradations: degraded.into_iter().collect(),
    })
}

/// Construction progress of one swapchain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapchainState {
    Uninitialized,
    Negotiated,
    Created,
    ViewsBuilt,
    Ready,
    Failed,
}

impl SwapchainState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Ready | Self::Failed)
    }

    pub fn can_advance_to(self, next: Self) -> bool {
        use SwapchainState::*;
        match (self, next) {
            (Uninitialized, Negotiated)
            | (Negotiated, Created)
            | (Created, ViewsBuilt)
            | (ViewsBuilt, Ready) => true,
            (from, Failed) => !from.is_terminal(),
            _ => false,
        }
    }

    fn advance(&mut self, next: Self) {
        assert!(
            self.can_advance_to(next),
            "illegal swapchain transition {:?} -> {:?}",
            self,
            next
        );
        log::trace!("Swapchain {:?} -> {:?}", self, next);
        *self = next;
    }
}

fn failed(state: &mut SwapchainState, source: BootstrapError) -> BootstrapError {
    let at = *state;
    state.advance(SwapchainState::Failed);
    log::error!("Swapchain construction failed while {:?}: {}", at, source);
    BootstrapError::Swapchain {
        state: at,
        source: Box::new(source),
    }
}

pub struct Swapchain {
    pub swapchain: vk::SwapchainKHR,
    pub swapchain_loader: khr::Swapchain,
    pub images: Vec<vk::Image>,
    pub image_views: Vec<vk::ImageView>,
    pub format: vk::Format,
    pub color_space: vk::ColorSpaceKHR,
    pub present_mode: vk::PresentModeKHR,
    pub extent: vk::Extent2D,
    pub degradations: Vec<Degradation>,
    state: SwapchainState,
    device: ash::Device,
}

impl Swapchain {
    /// Negotiate against fresh surface support and build chain + views
    pub fn new(
        instance: &ash::Instance,
        device: &LogicalDevice,
        surface: &Surface,
        prefs: &SwapchainPreferences,
    ) -> BootstrapResult<Self> {
        let mut state = SwapchainState::Uninitialized;

        // ─────────────────────────────────────────────────────────────────────
        // Negotiate
        // ─────────────────────────────────────────────────────────────────────
        let plan = SwapchainSupport::query(&surface.loader, device.physical_device, surface.handle)
            .and_then(|support| negotiate(&support, device.families, prefs))
            .map_err(|e| failed(&mut state, e))?;
        state.advance(SwapchainState::Negotiated);

        log::info!(
            "Creating swapchain: {}x{}, {} images, {:?}",
            plan.extent.width,
            plan.extent.height,
            plan.image_count,
            plan.sharing
        );

        // ─────────────────────────────────────────────────────────────────────
        // Create the chain
        // ─────────────────────────────────────────────────────────────────────
        let swapchain_loader = khr::Swapchain::new(instance, &device.device);

        let create_info = vk::SwapchainCreateInfoKHR::builder()
            .surface(surface.handle)
            .min_image_count(plan.image_count)
            .image_format(plan.surface_format.format)
            .image_color_space(plan.surface_format.color_space)
            .image_extent(plan.extent)
            .image_array_layers(1)
            .image_usage(vk::ImageUsageFlags::COLOR_ATTACHMENT)
            .image_sharing_mode(plan.sharing.mode())
            .queue_family_indices(plan.sharing.family_indices())
            .pre_transform(plan.pre_transform)
            .composite_alpha(vk::CompositeAlphaFlagsKHR::OPAQUE)
            .present_mode(plan.present_mode)
            .clipped(true);

        let handle = unsafe { swapchain_loader.create_swapchain(&create_info, None) }
            .map_err(|e| failed(&mut state, BootstrapError::creation("VkSwapchainKHR")(e)))?;
        state.advance(SwapchainState::Created);
        log::info!("Created swapchain");

        // From here on, Drop releases whatever exists so far
        let mut swapchain = Self {
            swapchain: handle,
            swapchain_loader,
            images: Vec::new(),
            image_views: Vec::new(),
            format: plan.surface_format.format,
            color_space: plan.surface_format.color_space,
            present_mode: plan.present_mode,
            extent: plan.extent,
            degradations: plan.degradations,
            state,
            device: device.device.clone(),
        };

        swapchain.images = unsafe { swapchain.swapchain_loader.get_swapchain_images(handle) }
            .map_err(|e| {
                failed(
                    &mut swapchain.state,
                    BootstrapError::query("vkGetSwapchainImagesKHR")(e),
                )
            })?;

        // ─────────────────────────────────────────────────────────────────────
        // One view per image
        // ─────────────────────────────────────────────────────────────────────
        for i in 0..swapchain.images.len() {
            let view = create_image_view(&swapchain.device, swapchain.images[i], swapchain.format)
                .map_err(|e| failed(&mut swapchain.state, e))?;
            swapchain.image_views.push(view);
        }
        swapchain.state.advance(SwapchainState::ViewsBuilt);

        swapchain.state.advance(SwapchainState::Ready);
        log::info!("Created swapchain with {} images", swapchain.images.len());

        Ok(swapchain)
    }

    pub fn state(&self) -> SwapchainState {
        self.state
    }

    /// Destroy views, then the chain. Idempotent.
    pub fn destroy(&mut self) {
        unsafe {
            for view in self.image_views.drain(..) {
                self.device.destroy_image_view(view, None);
            }
            if self.swapchain != vk::SwapchainKHR::null() {
                self.swapchain_loader.destroy_swapchain(self.swapchain, None);
                self.swapchain = vk::SwapchainKHR::null();
                log::info!("Destroyed swapchain");
            }
        }
        self.images.clear();
    }
}

impl Drop for Swapchain {
    fn drop(&mut self) {
        self.destroy();
    }
}

/// Full single-mip, single-layer, color-only 2D view
fn create_image_view(
    device: &ash::Device,
    image: vk::Image,
    format: vk::Format,
) -> BootstrapResult<vk::ImageView> {
    let create_info = vk::ImageViewCreateInfo::builder()
        .image(image)
        .view_type(vk::ImageViewType::TYPE_2D)
        .format(format)
        .components(vk::ComponentMapping {
            r: vk::ComponentSwizzle::IDENTITY,
            g: vk::ComponentSwizzle::IDENTITY,
            b: vk::ComponentSwizzle::IDENTITY,
            a: vk::ComponentSwizzle::IDENTITY,
        })
        .subresource_range(vk::ImageSubresourceRange {
            aspect_mask: vk::ImageAspectFlags::COLOR,
            base_mip_level: 0,
            level_count: 1,
            base_array_layer: 0,
            layer_count: 1,
        });

    unsafe { device.create_image_view(&create_info, None) }
        .map_err(BootstrapError::creation("VkImageView"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn surface_format(format: vk::Format) -> vk::SurfaceFormatKHR {
        vk::SurfaceFormatKHR {
            format,
            color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR,
        }
    }

    fn caps(min_count: u32, max_count: u32) -> vk::SurfaceCapabilitiesKHR {
        vk::SurfaceCapabilitiesKHR {
            min_image_count: min_count,
            max_image_count: max_count,
            current_extent: vk::Extent2D {
                width: u32::MAX,
                height: u32::MAX,
            },
            min_image_extent: vk::Extent2D {
                width: 1,
                height: 1,
            },
            max_image_extent: vk::Extent2D {
                width: 4096,
                height: 4096,
            },
            ..Default::default()
        }
    }

    fn support(formats: Vec<vk::SurfaceFormatKHR>, modes: Vec<vk::PresentModeKHR>) -> SwapchainSupport {
        SwapchainSupport {
            capabilities: caps(2, 8),
            formats,
            present_modes: modes,
        }
    }

    const SHARED: QueueFamilies = QueueFamilies {
        graphics: 0,
        present: 0,
    };

    #[test]
    fn preferred_format_is_picked_when_offered() {
        let formats = [
            surface_format(vk::Format::R8G8B8A8_SRGB),
            surface_format(vk::Format::B8G8R8A8_SRGB),
        ];
        let (chosen, degraded) = choose_surface_format(&formats, &SwapchainPreferences::default()).unwrap();
        assert_eq!(chosen.format, vk::Format::B8G8R8A8_SRGB);
        assert_eq!(degraded, None);
    }

    #[test]
    fn rgba_only_surface_falls_back_with_warning() {
        let formats = [surface_format(vk::Format::R8G8B8A8_SRGB)];
        let plan = negotiate(
            &support(formats.to_vec(), vec![vk::PresentModeKHR::FIFO]),
            SHARED,
            &SwapchainPreferences::default(),
        )
        .unwrap();

        assert_eq!(plan.surface_format.format, vk::Format::R8G8B8A8_SRGB);
        assert_eq!(plan.surface_format.color_space, vk::ColorSpaceKHR::SRGB_NONLINEAR);
        assert_eq!(
            plan.degradations,
            vec![Degradation::SurfaceFormat {
                format: vk::Format::R8G8B8A8_SRGB,
                color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR,
            }]
        );
    }

    #[test]
    fn matching_format_with_wrong_color_space_is_not_preferred() {
        let formats = [
            vk::SurfaceFormatKHR {
                format: vk::Format::B8G8R8A8_SRGB,
                color_space: vk::ColorSpaceKHR::EXTENDED_SRGB_LINEAR_EXT,
            },
            surface_format(vk::Format::B8G8R8A8_UNORM),
        ];
        let (chosen, degraded) = choose_surface_format(&formats, &SwapchainPreferences::default()).unwrap();
        assert_eq!(chosen.color_space, vk::ColorSpaceKHR::EXTENDED_SRGB_LINEAR_EXT);
        assert!(degraded.is_some());
    }

    #[test]
    fn empty_format_list_is_an_error() {
        let err = choose_surface_format(&[], &SwapchainPreferences::default()).unwrap_err();
        assert!(matches!(err, BootstrapError::SurfaceUnsupported(_)));
    }

    #[test]
    fn mailbox_preferred_over_fifo() {
        let modes = [vk::PresentModeKHR::FIFO, vk::PresentModeKHR::MAILBOX];
        assert_eq!(
            choose_present_mode(&modes, &SwapchainPreferences::default()),
            vk::PresentModeKHR::MAILBOX
        );
    }

    #[test]
    fn fifo_only_is_not_a_degradation() {
        let plan = negotiate(
            &support(
                vec![surface_format(vk::Format::B8G8R8A8_SRGB)],
                vec![vk::PresentModeKHR::FIFO],
            ),
            SHARED,
            &SwapchainPreferences::default(),
        )
        .unwrap();
        assert_eq!(plan.present_mode, vk::PresentModeKHR::FIFO);
        assert!(plan.degradations.is_empty());
    }

    #[test]
    fn immediate_is_never_chosen() {
        let modes = [vk::PresentModeKHR::IMMEDIATE, vk::PresentModeKHR::FIFO_RELAXED];
        assert_eq!(
            choose_present_mode(&modes, &SwapchainPreferences::default()),
            vk::PresentModeKHR::FIFO
        );
    }

    #[test]
    fn defined_current_extent_is_used_verbatim() {
        let mut caps = caps(2, 3);
        caps.current_extent = vk::Extent2D {
            width: 1024,
            height: 768,
        };
        for requested in [(1, 1), (800, 600), (10_000, 10_000)] {
            let extent = choose_extent(
                &caps,
                vk::Extent2D {
                    width: requested.0,
                    height: requested.1,
                },
            );
            assert_eq!((extent.width, extent.height), (1024, 768));
        }
    }

    #[test]
    fn undefined_current_extent_clamps_request() {
        let mut caps = caps(2, 3);
        caps.min_image_extent = vk::Extent2D {
            width: 100,
            height: 200,
        };
        caps.max_image_extent = vk::Extent2D {
            width: 1920,
            height: 1080,
        };

        let clamp = |w, h| {
            let e = choose_extent(&caps, vk::Extent2D { width: w, height: h });
            (e.width, e.height)
        };
        assert_eq!(clamp(800, 600), (800, 600));
        assert_eq!(clamp(50, 50), (100, 200));
        assert_eq!(clamp(4000, 3000), (1920, 1080));
        assert_eq!(clamp(50, 3000), (100, 1080));
    }

    #[test]
    fn unbounded_max_accepts_min_plus_one() {
        assert_eq!(choose_image_count(&caps(2, 0)), 3);
    }

    #[test]
    fn huge_min_image_count_does_not_overflow() {
        assert_eq!(choose_image_count(&caps(u32::MAX, 0)), u32::MAX);
        assert_eq!(choose_image_count(&caps(u32::MAX, u32::MAX)), u32::MAX);
    }

    #[test]
    fn other_modes_are_never_considered() {
        let prefs = SwapchainPreferences {
            preferred_present_mode: vk::PresentModeKHR::IMMEDIATE,
            ..Default::default()
        };
        let modes = [
            vk::PresentModeKHR::FIFO,
            vk::PresentModeKHR::IMMEDIATE,
            vk::PresentModeKHR::MAILBOX,
        ];
        assert_eq!(choose_present_mode(&modes, &prefs), vk::PresentModeKHR::FIFO);

        let relaxed_fallback = SwapchainPreferences {
            fallback_present_mode: vk::PresentModeKHR::FIFO_RELAXED,
            ..prefs
        };
        assert_eq!(
            choose_present_mode(&[vk::PresentModeKHR::FIFO, vk::PresentModeKHR::FIFO_RELAXED], &relaxed_fallback),
            vk::PresentModeKHR::FIFO
        );
    }

    #[test]
    fn unsupported_fallback_becomes_fifo() {
        let prefs = SwapchainPreferences {
            preferred_present_mode: vk::PresentModeKHR::IMMEDIATE,
            fallback_present_mode: vk::PresentModeKHR::MAILBOX,
            ..Default::default()
        };
        let modes = [vk::PresentModeKHR::FIFO];
        let chosen = choose_present_mode(&modes, &prefs);
        assert_eq!(chosen, vk::PresentModeKHR::FIFO);
        assert!(modes.contains(&chosen));
    }

    #[test]
    fn image_count_stays_in_bounds() {
        for min in 1..6 {
            for max in 0..8 {
                if max != 0 && max < min {
                    continue;
                }
                let count = choose_image_count(&caps(min, max));
                assert!(count >= min, "min={min} max={max} count={count}");
                if max > 0 {
                    assert!(count <= max, "min={min} max={max} count={count}");
                }
            }
        }
        assert_eq!(choose_image_count(&caps(3, 3)), 3);
    }

    #[test]
    fn sharing_is_concurrent_iff_families_differ() {
        for graphics in 0..3 {
            for present in 0..3 {
                let sharing = Sharing::for_families(QueueFamilies { graphics, present });
                if graphics == present {
                    assert_eq!(sharing, Sharing::Exclusive);
                    assert_eq!(sharing.mode(), vk::SharingMode::EXCLUSIVE);
                    assert!(sharing.family_indices().is_empty());
                } else {
                    assert_eq!(sharing.mode(), vk::SharingMode::CONCURRENT);
                    assert_eq!(sharing.family_indices(), &[graphics, present]);
                }
            }
        }
    }

    #[test]
    fn plan_passes_through_transform() {
        let mut support = support(
            vec![surface_format(vk::Format::B8G8R8A8_SRGB)],
            vec![vk::PresentModeKHR::FIFO],
        );
        support.capabilities.current_transform = vk::SurfaceTransformFlagsKHR::ROTATE_90;
        let plan = negotiate(&support, SHARED, &SwapchainPreferences::default()).unwrap();
        assert_eq!(plan.pre_transform, vk::SurfaceTransformFlagsKHR::ROTATE_90);
    }

    #[test]
    fn missing_present_modes_is_an_error() {
        let err = negotiate(
            &support(vec![surface_format(vk::Format::B8G8R8A8_SRGB)], vec![]),
            SHARED,
            &SwapchainPreferences::default(),
        )
        .unwrap_err();
        assert!(matches!(err, BootstrapError::SurfaceUnsupported("present modes")));
    }

    #[test]
    fn state_machine_walks_forward_only() {
        use SwapchainState::*;
        let mut state = Uninitialized;
        for next in [Negotiated, Created, ViewsBuilt, Ready] {
            state.advance(next);
        }
        assert!(state.is_terminal());
        assert!(!Ready.can_advance_to(Failed));
        assert!(!Created.can_advance_to(Negotiated));
        assert!(!Uninitialized.can_advance_to(Created));
        assert!(Negotiated.can_advance_to(Failed));
        assert!(!Failed.can_advance_to(Uninitialized));
    }

    #[test]
    #[should_panic(expected = "illegal swapchain transition")]
    fn skipping_a_state_panics() {
        let mut state = SwapchainState::Negotiated;
        state.advance(SwapchainState::ViewsBuilt);
    }

    #[test]
    fn failure_records_last_reached_state() {
        let mut state = SwapchainState::Created;
        let err = failed(&mut state, BootstrapError::creation("VkImageView")(vk::Result::ERROR_OUT_OF_HOST_MEMORY));
        assert_eq!(state, SwapchainState::Failed);
        match err {
            BootstrapError::Swapchain { state, source } => {
                assert_eq!(state, SwapchainState::Created);
                assert!(matches!(*source, BootstrapError::Creation { object: "VkImageView", .. }));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
