//! Command list and drawing surface
//!
//! A `DrawingSurface` owns the retained command list of one host region and
//! lazily creates the single context that records into it.

use std::rc::Rc;

use easel_paint::{Affine2D, Rect};

use crate::backend::{DrawBackend, HostSurface};
use crate::command::Command;
use crate::config::CanvasConfig;
use crate::context::{CanvasContext, ContextState};
use crate::error::{CanvasError, Result};

/// Ordered, append-only list of recorded commands
///
/// Every mutation requests a redraw from the host.
pub struct CommandList {
    commands: Vec<Command>,
    host: Rc<dyn HostSurface>,
}

impl CommandList {
    pub fn new(host: Rc<dyn HostSurface>) -> Self {
        Self {
            commands: Vec::new(),
            host,
        }
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Command> {
        self.commands.iter()
    }

    /// Surface-space bounds of the host region
    pub fn surface_bounds(&self) -> Rect {
        self.host.size().to_rect()
    }

    pub fn add(&mut self, command: Command) {
        self.commands.push(command);
        self.host.invalidate();
    }

    /// Drop every command; no redraw when already empty
    pub fn clear_all(&mut self) {
        if self.commands.is_empty() {
            return;
        }
        tracing::debug!(removed = self.commands.len(), "clearing all commands");
        self.commands.clear();
        self.host.invalidate();
    }

    /// Remove commands whose bounds lie entirely inside `rect`.
    ///
    /// Commands that only overlap `rect` are kept. A rect covering the whole
    /// surface behaves like [`clear_all`](Self::clear_all). Returns the number
    /// of removed commands.
    pub fn clear_rect(&mut self, rect: Rect) -> usize {
        let surface = self.surface_bounds();
        if surface.has_area() && rect.contains_rect(&surface) {
            let removed = self.commands.len();
            self.clear_all();
            return removed;
        }
        self.remove_where(|bounds| rect.contains_rect(bounds))
    }

    /// Remove commands whose bounds lie inside `rect` as mapped by `transform`.
    ///
    /// `rect` is in user space. Axis-aligned transforms map it to a surface
    /// rect exactly; otherwise each command's corners are mapped back into
    /// user space and tested against `rect`. A singular transform clears
    /// nothing.
    pub fn clear_transformed(&mut self, rect: Rect, transform: &Affine2D) -> usize {
        if transform.is_axis_aligned() {
            return self.clear_rect(transform.transform_rect(&rect));
        }
        let Some(inverse) = transform.invert() else {
            tracing::trace!(?rect, "clear under singular transform ignored");
            return 0;
        };
        let inside = |area: &Rect| {
            area.corners()
                .iter()
                .all(|corner| rect.contains(inverse.transform_point(*corner)))
        };

        let surface = self.surface_bounds();
        if surface.has_area() && inside(&surface) {
            let removed = self.commands.len();
            self.clear_all();
            return removed;
        }
        self.remove_where(inside)
    }

    fn remove_where(&mut self, covered: impl Fn(&Rect) -> bool) -> usize {
        let before = self.commands.len();
        self.commands.retain(|command| !covered(&command.bounds()));
        let removed = before - self.commands.len();
        if removed > 0 {
            tracing::debug!(removed, "cleared commands inside rect");
            self.host.invalidate();
        }
        removed
    }

    /// Replay every command in insertion order.
    ///
    /// A command the backend fails to draw is logged and skipped. Returns the
    /// number of commands drawn successfully.
    pub fn render(&self, backend: &mut dyn DrawBackend) -> usize {
        let mut drawn = 0;
        for (index, command) in self.commands.iter().enumerate() {
            match command.render(backend) {
                Ok(()) => drawn += 1,
                Err(err) => tracing::warn!(index, error = %err, "skipping command that failed to draw"),
            }
        }
        drawn
    }
}

impl<'a> IntoIterator for &'a CommandList {
    type Item = &'a Command;
    type IntoIter = std::slice::Iter<'a, Command>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Retained drawing surface bound to one host region
pub struct DrawingSurface {
    host: Rc<dyn HostSurface>,
    config: CanvasConfig,
    commands: CommandList,
    context: Option<ContextState>,
}

impl DrawingSurface {
    /// Surface with the default configuration
    pub fn new(host: Rc<dyn HostSurface>) -> Result<Self> {
        Self::with_config(host, CanvasConfig::default())
    }

    /// Fails when the host reports a negative or non-finite size
    pub fn with_config(host: Rc<dyn HostSurface>, config: CanvasConfig) -> Result<Self> {
        let size = host.size();
        let valid = |v: f32| v.is_finite() && v >= 0.0;
        if !(valid(size.width) && valid(size.height)) {
            return Err(CanvasError::InvalidSurfaceSize {
                width: size.width,
                height: size.height,
            });
        }

        tracing::debug!(width = size.width, height = size.height, "created drawing surface");
        Ok(Self {
            commands: CommandList::new(Rc::clone(&host)),
            host,
            config,
            context: None,
        })
    }

    pub fn config(&self) -> &CanvasConfig {
        &self.config
    }

    pub fn bounds(&self) -> Rect {
        self.commands.surface_bounds()
    }

    pub fn commands(&self) -> &CommandList {
        &self.commands
    }

    pub fn add_command(&mut self, command: Command) {
        self.commands.add(command);
    }

    pub fn clear_all(&mut self) {
        self.commands.clear_all();
    }

    /// Partial clear in surface coordinates; see [`CommandList::clear_rect`]
    pub fn clear_rect(&mut self, rect: Rect) -> usize {
        self.commands.clear_rect(rect)
    }

    pub fn render(&self, backend: &mut dyn DrawBackend) -> usize {
        self.commands.render(backend)
    }

    /// Whether `context()` has been called yet
    pub fn has_context(&self) -> bool {
        self.context.is_some()
    }

    /// The surface's 2D context, created on first use.
    ///
    /// Every call hands out a view of the same underlying context state.
    pub fn context(&mut self) -> CanvasContext<'_> {
        let config = &self.config;
        let state = self.context.get_or_insert_with(|| {
            tracing::debug!("creating 2d context");
            ContextState::new(config)
        });
        CanvasContext::new(state, &mut self.commands, self.host.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::{HeadlessHost, RecordingBackend};
    use crate::state::DrawingState;
    use easel_paint::Size;

    fn fill(rect: Rect) -> Command {
        Command::FillRect {
            rect,
            snapshot: DrawingState::default().snapshot(),
        }
    }

    #[test]
    fn test_rejects_invalid_host_size() {
        let host = Rc::new(HeadlessHost::new(Size::new(-1.0, 10.0)));
        assert!(matches!(
            DrawingSurface::new(host),
            Err(CanvasError::InvalidSurfaceSize { .. })
        ));
        let host = Rc::new(HeadlessHost::new(Size::new(f32::NAN, 10.0)));
        assert!(DrawingSurface::new(host).is_err());
    }

    #[test]
    fn test_add_requests_redraw() {
        let host = Rc::new(HeadlessHost::new(Size::new(100.0, 100.0)));
        let mut surface = DrawingSurface::new(host.clone()).unwrap();
        surface.add_command(fill(Rect::new(0.0, 0.0, 5.0, 5.0)));
        assert_eq!(host.invalidations(), 1);
        assert_eq!(surface.commands().len(), 1);
    }

    #[test]
    fn test_clear_all_on_empty_is_silent() {
        let host = Rc::new(HeadlessHost::new(Size::new(100.0, 100.0)));
        let mut surface = DrawingSurface::new(host.clone()).unwrap();
        surface.clear_all();
        assert_eq!(host.invalidations(), 0);
    }

    #[test]
    fn test_clear_rect_keeps_partial_overlaps() {
        let host = Rc::new(HeadlessHost::new(Size::new(100.0, 100.0)));
        let mut surface = DrawingSurface::new(host.clone()).unwrap();
        surface.add_command(fill(Rect::new(10.0, 10.0, 10.0, 10.0)));
        surface.add_command(fill(Rect::new(15.0, 15.0, 30.0, 30.0)));
        surface.add_command(fill(Rect::new(60.0, 60.0, 5.0, 5.0)));

        let removed = surface.clear_rect(Rect::new(0.0, 0.0, 25.0, 25.0));
        assert_eq!(removed, 1);
        assert_eq!(surface.commands().len(), 2);
        assert_eq!(surface.commands().commands()[0].bounds(), Rect::new(15.0, 15.0, 30.0, 30.0));
    }

    #[test]
    fn test_clear_rect_full_bounds_clears_everything() {
        let host = Rc::new(HeadlessHost::new(Size::new(100.0, 100.0)));
        let mut surface = DrawingSurface::new(host).unwrap();
        // extends past the surface, so only a full clear removes it
        surface.add_command(fill(Rect::new(-50.0, -50.0, 500.0, 500.0)));
        surface.add_command(fill(Rect::new(1.0, 1.0, 2.0, 2.0)));

        assert_eq!(surface.clear_rect(Rect::new(0.0, 0.0, 100.0, 100.0)), 2);
        assert!(surface.commands().is_empty());
    }

    #[test]
    fn test_zero_size_host_never_clears_everything() {
        let host = Rc::new(HeadlessHost::new(Size::new(0.0, 0.0)));
        let mut surface = DrawingSurface::new(host.clone()).unwrap();
        surface.add_command(fill(Rect::new(500.0, 500.0, 10.0, 10.0)));

        assert_eq!(surface.clear_rect(Rect::new(-1.0, -1.0, 2.0, 2.0)), 0);
        assert_eq!(surface.commands().len(), 1);
        assert_eq!(host.invalidations(), 1);
    }

    #[test]
    fn test_clear_transformed_tests_rotated_area() {
        let host = Rc::new(HeadlessHost::new(Size::new(100.0, 100.0)));
        let mut commands = CommandList::new(host);
        // inside the rotated square's bounding box, outside the square itself
        commands.add(fill(Rect::new(4.0, 0.5, 2.0, 1.0)));
        // inside the rotated square
        commands.add(fill(Rect::new(-1.0, 5.0, 1.0, 1.0)));

        let rotate = Affine2D::rotation(std::f32::consts::FRAC_PI_4);
        let removed = commands.clear_transformed(Rect::new(0.0, 0.0, 10.0, 10.0), &rotate);
        assert_eq!(removed, 1);
        assert_eq!(commands.commands()[0].bounds(), Rect::new(4.0, 0.5, 2.0, 1.0));
    }

    #[test]
    fn test_clear_transformed_singular_removes_nothing() {
        let host = Rc::new(HeadlessHost::new(Size::new(100.0, 100.0)));
        let mut commands = CommandList::new(host.clone());
        commands.add(fill(Rect::new(0.0, 0.0, 1.0, 1.0)));
        let flatten = Affine2D::new(1.0, 2.0, 2.0, 4.0, 0.0, 0.0);

        assert_eq!(commands.clear_transformed(Rect::new(-10.0, -10.0, 200.0, 200.0), &flatten), 0);
        assert_eq!(commands.len(), 1);
        assert_eq!(host.invalidations(), 1);
    }

    #[test]
    fn test_render_skips_failures() {
        let host = Rc::new(HeadlessHost::new(Size::new(100.0, 100.0)));
        let mut surface = DrawingSurface::new(host).unwrap();
        surface.add_command(fill(Rect::new(0.0, 0.0, 1.0, 1.0)));
        surface.add_command(fill(Rect::new(0.0, 0.0, 2.0, 2.0)));

        let mut backend = RecordingBackend::new().failing();
        assert_eq!(surface.render(&mut backend), 0);

        let mut backend = RecordingBackend::new();
        assert_eq!(surface.render(&mut backend), 2);
    }

    #[test]
    fn test_context_is_created_once() {
        let host = Rc::new(HeadlessHost::new(Size::new(100.0, 100.0)));
        let mut surface = DrawingSurface::new(host).unwrap();
        assert!(!surface.has_context());

        surface.context().set_line_width(7.0);
        assert!(surface.has_context());
        assert_eq!(surface.context().line_width(), 7.0);
    }
}
