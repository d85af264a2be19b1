//! Surface registry
//!
//! Keeps every live drawing surface under a stable id so hosts can look up
//! "the" context of a surface without holding a borrow on it.

use std::rc::Rc;

use slotmap::{new_key_type, SlotMap};

use crate::backend::HostSurface;
use crate::config::CanvasConfig;
use crate::context::CanvasContext;
use crate::error::{CanvasError, Result};
use crate::surface::DrawingSurface;

new_key_type! {
    /// Unique identifier for a registered drawing surface
    pub struct SurfaceId;
}

/// Owns the drawing surfaces of one UI thread
pub struct SurfaceRegistry {
    surfaces: SlotMap<SurfaceId, DrawingSurface>,
    config: CanvasConfig,
}

impl SurfaceRegistry {
    pub fn new() -> Self {
        Self::with_config(CanvasConfig::default())
    }

    /// Registry whose surfaces all share `config`
    pub fn with_config(config: CanvasConfig) -> Self {
        Self {
            surfaces: SlotMap::with_key(),
            config,
        }
    }

    /// Create and register a surface for `host`
    pub fn create_surface(&mut self, host: Rc<dyn HostSurface>) -> Result<SurfaceId> {
        let surface = DrawingSurface::with_config(host, self.config.clone())?;
        Ok(self.surfaces.insert(surface))
    }

    pub fn surface(&self, id: SurfaceId) -> Result<&DrawingSurface> {
        self.surfaces.get(id).ok_or(CanvasError::UnknownSurface)
    }

    pub fn surface_mut(&mut self, id: SurfaceId) -> Result<&mut DrawingSurface> {
        self.surfaces.get_mut(id).ok_or(CanvasError::UnknownSurface)
    }

    /// The surface's single 2D context, created on first use
    pub fn context(&mut self, id: SurfaceId) -> Result<CanvasContext<'_>> {
        Ok(self.surface_mut(id)?.context())
    }

    pub fn remove_surface(&mut self, id: SurfaceId) -> Result<DrawingSurface> {
        let surface = self.surfaces.remove(id).ok_or(CanvasError::UnknownSurface)?;
        tracing::debug!(?id, "removed drawing surface");
        Ok(surface)
    }

    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }
}

impl Default for SurfaceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::HeadlessHost;
    use easel_paint::Size;

    #[test]
    fn test_context_is_shared_per_surface() {
        let mut registry = SurfaceRegistry::new();
        let a = registry
            .create_surface(Rc::new(HeadlessHost::new(Size::new(10.0, 10.0))))
            .unwrap();
        let b = registry
            .create_surface(Rc::new(HeadlessHost::new(Size::new(10.0, 10.0))))
            .unwrap();

        registry.context(a).unwrap().set_line_width(5.0);
        assert_eq!(registry.context(a).unwrap().line_width(), 5.0);
        assert_eq!(registry.context(b).unwrap().line_width(), 1.0);
    }

    #[test]
    fn test_removed_surface_is_unknown() {
        let mut registry = SurfaceRegistry::new();
        let id = registry
            .create_surface(Rc::new(HeadlessHost::new(Size::new(10.0, 10.0))))
            .unwrap();
        assert_eq!(registry.len(), 1);

        registry.remove_surface(id).unwrap();
        assert!(registry.is_empty());
        assert!(matches!(registry.surface(id), Err(CanvasError::UnknownSurface)));
        assert!(registry.context(id).is_err());
    }

    #[test]
    fn test_config_reaches_new_surfaces() {
        let config = CanvasConfig {
            default_font: "bold 14px serif".to_string(),
            ..CanvasConfig::default()
        };
        let mut registry = SurfaceRegistry::with_config(config);
        let id = registry
            .create_surface(Rc::new(HeadlessHost::new(Size::new(10.0, 10.0))))
            .unwrap();
        assert_eq!(registry.context(id).unwrap().font(), "bold 14px serif");
    }
}
