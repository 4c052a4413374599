use std::sync::RwLock;
use lazy_static::lazy_static;

// Process-wide render settings, read once when the GPU state is created
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RenderConfig {
    /// MSAA sample count; 1 disables multisampling.
    pub msaa_samples: u32,
    /// Brightness of the light that follows the camera.
    pub headlight_intensity: f32,
    pub vsync: bool,
}

impl RenderConfig {
    pub fn new() -> Self {
        Self {
            msaa_samples: 4,
            headlight_intensity: 1.0,
            vsync: true,
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self::new()
    }
}

lazy_static! {
    pub static ref RENDER_CONFIG: RwLock<RenderConfig> = RwLock::new(RenderConfig::new());
}

/// Snapshot of the current render settings.
pub fn render_config() -> RenderConfig {
    match RENDER_CONFIG.read() {
        Ok(config) => *config,
        Err(poisoned) => *poisoned.into_inner(),
    }
}

fn update(apply: impl FnOnce(&mut RenderConfig)) {
    match RENDER_CONFIG.write() {
        Ok(mut config) => apply(&mut config),
        Err(poisoned) => apply(&mut poisoned.into_inner()),
    }
}

/// Record the MSAA sample count in use (1 or 4, the counts every backend supports).
pub(crate) fn set_msaa_samples(samples: u32) {
    let samples = if samples >= 4 { 4 } else { 1 };
    update(|config| config.msaa_samples = samples);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn msaa_snaps_to_supported_counts() {
        let saved = render_config();
        set_msaa_samples(8);
        assert_eq!(render_config().msaa_samples, 4);
        set_msaa_samples(2);
        assert_eq!(render_config().msaa_samples, 1);
        assert_eq!(render_config().headlight_intensity, saved.headlight_intensity);

        *RENDER_CONFIG.write().unwrap() = saved;
    }
}
