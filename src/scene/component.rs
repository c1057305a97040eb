use crate::cache::key::{ComponentKey, KeyPart};
use crate::compose::blend::{BlendMode, apply_alpha_matte, composite_in_place};
use crate::compose::place::place_patch;
use crate::compose::transform::{Origin, Transform};
use crate::foundation::error::{StratumError, StratumResult};
use crate::layer::Layer;
use crate::render::frame::FrameRGBA;

/// A named, positioned, time-windowed placement of a [`Layer`] inside a composition.
///
/// A component is active at global time `t` when it is visible and
/// `start_time <= t - offset < end_time`. The window is half-open: a component never shows on
/// the frame that lands exactly on its `end_time`.
///
/// A component may own a second component as its alpha matte. The matte is never painted on its
/// own; its alpha restricts where this component's pixels land.
pub struct Component {
    name: String,
    layer: Box<dyn Layer>,
    transform: Transform,
    offset: f64,
    start_time: f64,
    end_time: f64,
    visible: bool,
    blending_mode: BlendMode,
    origin_point: Origin,
    alpha_matte: Option<Box<Component>>,
}

impl Component {
    /// Wrap `layer` with an identity transform over the window `[0, layer.duration())`.
    pub fn new(name: impl Into<String>, layer: impl Layer + 'static) -> Self {
        Self::from_boxed(name.into(), Box::new(layer))
    }

    pub(crate) fn from_boxed(name: String, layer: Box<dyn Layer>) -> Self {
        let end_time = layer.duration();
        Self {
            name,
            layer,
            transform: Transform::default(),
            offset: 0.0,
            start_time: 0.0,
            end_time,
            visible: true,
            blending_mode: BlendMode::Normal,
            origin_point: Origin::Center,
            alpha_matte: None,
        }
    }

    /// Unique name inside the owning composition.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The wrapped layer.
    pub fn layer(&self) -> &dyn Layer {
        self.layer.as_ref()
    }

    /// Placement parameters.
    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    /// Mutable placement parameters.
    pub fn transform_mut(&mut self) -> &mut Transform {
        &mut self.transform
    }

    /// Replace the placement parameters.
    pub fn set_transform(&mut self, transform: Transform) -> &mut Self {
        self.transform = transform;
        self
    }

    /// Shift between global time and layer time.
    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Set the shift between global time and layer time.
    pub fn set_offset(&mut self, offset: f64) -> StratumResult<&mut Self> {
        if !offset.is_finite() {
            return Err(StratumError::validation(format!(
                "component '{}': offset must be finite, got {offset}",
                self.name
            )));
        }
        self.offset = offset;
        Ok(self)
    }

    /// Inclusive start of the active window, in layer time.
    pub fn start_time(&self) -> f64 {
        self.start_time
    }

    /// Exclusive end of the active window, in layer time.
    pub fn end_time(&self) -> f64 {
        self.end_time
    }

    /// Set the active window `[start, end)` in layer time.
    ///
    /// `end` may be `f64::INFINITY`. An empty window (`start == end`) is allowed and never
    /// active.
    pub fn set_time_window(&mut self, start: f64, end: f64) -> StratumResult<&mut Self> {
        if start.is_nan() || end.is_nan() || start > end {
            return Err(StratumError::validation(format!(
                "component '{}': time window [{start}, {end}) is invalid",
                self.name
            )));
        }
        self.start_time = start;
        self.end_time = end;
        Ok(self)
    }

    /// Whether the component may contribute at all.
    pub fn visible(&self) -> bool {
        self.visible
    }

    /// Show or hide the component.
    pub fn set_visible(&mut self, visible: bool) -> &mut Self {
        self.visible = visible;
        self
    }

    /// How the component's pixels combine with what is beneath.
    pub fn blending_mode(&self) -> BlendMode {
        self.blending_mode
    }

    /// Set the blend mode.
    pub fn set_blending_mode(&mut self, mode: BlendMode) -> &mut Self {
        self.blending_mode = mode;
        self
    }

    /// Point of the layer patch that the transform anchors on.
    pub fn origin_point(&self) -> Origin {
        self.origin_point
    }

    /// Set the anchor origin.
    pub fn set_origin_point(&mut self, origin: Origin) -> &mut Self {
        self.origin_point = origin;
        self
    }

    /// The linked matte target, if any.
    pub fn alpha_matte(&self) -> Option<&Component> {
        self.alpha_matte.as_deref()
    }

    /// Mutable access to the linked matte target.
    pub fn alpha_matte_mut(&mut self) -> Option<&mut Component> {
        self.alpha_matte.as_deref_mut()
    }

    /// Layer-local time for global time `t`.
    pub fn layer_time(&self, global_time: f64) -> f64 {
        global_time - self.offset
    }

    /// Half-open window test, ignoring visibility.
    pub fn in_window(&self, global_time: f64) -> bool {
        let t = self.layer_time(global_time);
        self.start_time <= t && t < self.end_time
    }

    /// Whether the component contributes at global time `t`.
    pub fn is_active(&self, global_time: f64) -> bool {
        self.visible && self.in_window(global_time)
    }

    /// Sub-key of this component at `layer_time`.
    ///
    /// Captures the layer content at that time plus every placement parameter, and the matte's
    /// own part when a matte is linked.
    pub fn get_key(&self, layer_time: f64) -> ComponentKey {
        self.component_key(layer_time, layer_time + self.offset)
    }

    /// Key part at global time `t`: [`KeyPart::Absent`] exactly when inactive.
    pub(crate) fn key_part(&self, global_time: f64) -> KeyPart {
        if self.is_active(global_time) {
            KeyPart::Component(self.component_key(self.layer_time(global_time), global_time))
        } else {
            KeyPart::Absent
        }
    }

    fn component_key(&self, layer_time: f64, global_time: f64) -> ComponentKey {
        ComponentKey {
            content: self.layer.content_key(layer_time),
            transform: self.transform.key(),
            blend: self.blending_mode,
            origin: self.origin_point,
            matte: self
                .alpha_matte
                .as_ref()
                .map(|m| Box::new(m.key_part(global_time))),
        }
    }

    /// Blend this component's pixels at global time `t` into `acc`.
    ///
    /// Leaves `acc` untouched when the component is inactive or its layer has nothing to draw.
    pub fn render_contribution(
        &self,
        acc: &mut FrameRGBA,
        global_time: f64,
        preview_level: u32,
    ) -> StratumResult<()> {
        if !self.is_active(global_time) {
            return Ok(());
        }
        let Some(canvas) = self.rasterize(acc.width, acc.height, global_time, preview_level)?
        else {
            return Ok(());
        };
        composite_in_place(&mut acc.data, &canvas.data, self.blending_mode)
    }

    // Layer placed on a transparent canvas of the accumulator size, with the matte applied.
    fn rasterize(
        &self,
        width: u32,
        height: u32,
        global_time: f64,
        preview_level: u32,
    ) -> StratumResult<Option<FrameRGBA>> {
        let Some(patch) = self.layer.render(self.layer_time(global_time))? else {
            return Ok(None);
        };
        let mut canvas = FrameRGBA::transparent(width, height);
        let affine = self.transform.layer_to_canvas(
            patch.width,
            patch.height,
            self.origin_point,
            preview_level,
        );
        place_patch(
            &mut canvas,
            &patch,
            affine,
            self.transform.effective_opacity(),
        )?;

        if let Some(matte) = &self.alpha_matte {
            let matte_canvas = if matte.is_active(global_time) {
                matte.rasterize(width, height, global_time, preview_level)?
            } else {
                None
            };
            match matte_canvas {
                Some(m) => apply_alpha_matte(&mut canvas.data, &m.data)?,
                // An empty matte hides everything.
                None => return Ok(None),
            }
        }
        Ok(Some(canvas))
    }

    /// Link `target` as this component's alpha matte.
    ///
    /// Fails with [`StratumError::MatteAlreadyLinked`] if a matte is already attached; the
    /// rejected target travels back inside the error.
    pub fn enable_alpha_matte(&mut self, target: Component) -> StratumResult<()> {
        if self.alpha_matte.is_some() {
            return Err(StratumError::MatteAlreadyLinked {
                source_name: self.name.clone(),
                target: Some(Box::new(target)),
            });
        }
        tracing::debug!(source = %self.name, target = %target.name, "alpha matte linked");
        self.alpha_matte = Some(Box::new(target));
        Ok(())
    }

    /// Detach and return the matte target, if any.
    pub fn disable_alpha_matte(&mut self) -> Option<Component> {
        let target = self.alpha_matte.take().map(|b| *b);
        if let Some(t) = &target {
            tracing::debug!(source = %self.name, target = %t.name, "alpha matte unlinked");
        }
        target
    }
}

impl std::fmt::Debug for Component {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Component")
            .field("name", &self.name)
            .field("transform", &self.transform)
            .field("offset", &self.offset)
            .field("start_time", &self.start_time)
            .field("end_time", &self.end_time)
            .field("visible", &self.visible)
            .field("blending_mode", &self.blending_mode)
            .field("origin_point", &self.origin_point)
            .field("alpha_matte", &self.alpha_matte)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/component.rs"]
mod tests;
