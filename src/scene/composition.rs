use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::cache::frame_cache::{FrameCache, FrameCacheOpts, FrameCacheStats};
use crate::cache::key::{CompositeKey, ContentKey, KeyHasher};
use crate::compose::blend::BlendMode;
use crate::compose::transform::{Origin, Transform};
use crate::foundation::core::Size;
use crate::foundation::error::{StratumError, StratumResult};
use crate::layer::Layer;
use crate::render::frame::FrameRGBA;
use crate::scene::component::Component;

/// Construction-time knobs for a [`Composition`].
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CompositionOpts {
    /// Frame cache budget.
    pub cache: FrameCacheOpts,
}

/// Placement options for [`Composition::add_layer`].
///
/// Unset fields take defaults derived from the composition and the layer: the name becomes
/// `layer_<index>`, the transform centres the layer in the frame, and the window ends at the
/// layer's duration.
#[derive(Clone, Debug, PartialEq)]
pub struct LayerOpts {
    /// Component name; `layer_<index>` when `None`.
    pub name: Option<String>,
    /// Placement; centred in the frame when `None`.
    pub transform: Option<Transform>,
    /// Global-to-layer time shift.
    pub offset: f64,
    /// Inclusive window start in layer time.
    pub start_time: f64,
    /// Exclusive window end in layer time; the layer's duration when `None`.
    pub end_time: Option<f64>,
    /// Initial visibility.
    pub visible: bool,
    /// Blend mode.
    pub blending_mode: BlendMode,
    /// Anchor origin.
    pub origin_point: Origin,
}

impl Default for LayerOpts {
    fn default() -> Self {
        Self {
            name: None,
            transform: None,
            offset: 0.0,
            start_time: 0.0,
            end_time: None,
            visible: true,
            blending_mode: BlendMode::Normal,
            origin_point: Origin::Center,
        }
    }
}

impl LayerOpts {
    /// Default options with an explicit name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }
}

/// An ordered, named stack of components rendered into frames, with a frame cache.
///
/// Components paint in insertion order: the first added is the bottom of the stack. Rendered
/// frames are cached under a structural key of every component's contribution, so asking for
/// the same time twice (or two times that look identical) composites once.
pub struct Composition {
    size: Size,
    duration: f64,
    preview_level: u32,
    layers: Vec<Component>,
    index_by_name: HashMap<String, usize>,
    cache: Mutex<FrameCache>,
}

impl Composition {
    /// Create an empty composition of `(width, height)` lasting `duration` seconds.
    pub fn new(size: (u32, u32), duration: f64) -> StratumResult<Self> {
        Self::with_opts(size, duration, CompositionOpts::default())
    }

    /// Create an empty composition with explicit options.
    pub fn with_opts(
        size: (u32, u32),
        duration: f64,
        opts: CompositionOpts,
    ) -> StratumResult<Self> {
        let size = Size::new(size.0, size.1)?;
        validate_duration(duration)?;
        Ok(Self {
            size,
            duration,
            preview_level: 1,
            layers: Vec::new(),
            index_by_name: HashMap::new(),
            cache: Mutex::new(FrameCache::new(opts.cache)),
        })
    }

    /// Full-resolution frame size.
    pub fn size(&self) -> Size {
        self.size
    }

    /// Resize the composition. Both sides must be non-zero.
    pub fn set_size(&mut self, size: (u32, u32)) -> StratumResult<()> {
        self.size = Size::new(size.0, size.1)?;
        Ok(())
    }

    /// Nominal length in seconds.
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Change the nominal length. Must be finite and positive.
    pub fn set_duration(&mut self, duration: f64) -> StratumResult<()> {
        validate_duration(duration)?;
        self.duration = duration;
        Ok(())
    }

    /// Current resolution divisor; 1 is full quality.
    pub fn preview_level(&self) -> u32 {
        self.preview_level
    }

    /// Set the resolution divisor. Zero is rejected.
    pub fn set_preview_level(&mut self, level: u32) -> StratumResult<()> {
        if level == 0 {
            return Err(StratumError::validation("preview level must be >= 1"));
        }
        self.preview_level = level;
        Ok(())
    }

    /// Working resolution at the current preview level.
    pub fn working_size(&self) -> (u32, u32) {
        self.size.scaled(self.preview_level)
    }

    /// Wrap `layer` in a component and append it to the top of the stack.
    pub fn add_layer(
        &mut self,
        layer: impl Layer + 'static,
        opts: LayerOpts,
    ) -> StratumResult<&mut Component> {
        let name = opts
            .name
            .unwrap_or_else(|| format!("layer_{}", self.layers.len()));
        if self.index_by_name.contains_key(&name) {
            return Err(StratumError::duplicate(format!("layer '{name}' already exists")));
        }

        let mut component = Component::from_boxed(name, Box::new(layer));
        let end_time = opts.end_time.unwrap_or(component.end_time());
        component.set_time_window(opts.start_time, end_time)?;
        component.set_offset(opts.offset)?;
        component
            .set_transform(opts.transform.unwrap_or_else(|| Transform::at(self.size.center())))
            .set_visible(opts.visible)
            .set_blending_mode(opts.blending_mode)
            .set_origin_point(opts.origin_point);

        Ok(self.push_component(component))
    }

    /// Append a ready-made component to the top of the stack.
    pub fn insert_component(&mut self, component: Component) -> StratumResult<&mut Component> {
        if self.index_by_name.contains_key(component.name()) {
            return Err(StratumError::duplicate(format!(
                "layer '{}' already exists",
                component.name()
            )));
        }
        Ok(self.push_component(component))
    }

    fn push_component(&mut self, component: Component) -> &mut Component {
        let idx = self.layers.len();
        self.index_by_name.insert(component.name().to_owned(), idx);
        self.layers.push(component);
        &mut self.layers[idx]
    }

    /// Remove a direct component by name and hand it back.
    pub fn pop_layer(&mut self, name: &str) -> StratumResult<Component> {
        let idx = self.index_of(name)?;
        self.index_by_name.remove(name);
        let component = self.layers.remove(idx);
        for (i, c) in self.layers.iter().enumerate().skip(idx) {
            self.index_by_name.insert(c.name().to_owned(), i);
        }
        Ok(component)
    }

    fn index_of(&self, name: &str) -> StratumResult<usize> {
        self.index_by_name
            .get(name)
            .copied()
            .ok_or_else(|| StratumError::not_found(format!("layer '{name}' not found")))
    }

    /// Look up a direct component.
    pub fn get(&self, name: &str) -> StratumResult<&Component> {
        let idx = self.index_of(name)?;
        Ok(&self.layers[idx])
    }

    /// Look up a direct component for mutation.
    pub fn get_mut(&mut self, name: &str) -> StratumResult<&mut Component> {
        let idx = self.index_of(name)?;
        Ok(&mut self.layers[idx])
    }

    /// Whether `name` is a direct component.
    pub fn contains(&self, name: &str) -> bool {
        self.index_by_name.contains_key(name)
    }

    /// Component names in paint order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.layers.iter().map(Component::name)
    }

    /// Components in paint order.
    pub fn layers(&self) -> &[Component] {
        &self.layers
    }

    /// `(name, component)` pairs in paint order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Component)> {
        self.layers.iter().map(|c| (c.name(), c))
    }

    /// Number of direct components.
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Whether the composition has no components.
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Move `target` out of the stack and link it as the alpha matte of `source`.
    ///
    /// Both must be distinct direct components. If `source` already carries a matte this fails
    /// with [`StratumError::MatteAlreadyLinked`] and `target` stays where it is. On failure
    /// nothing changes.
    pub fn enable_alpha_matte(
        &mut self,
        source: &str,
        target: &str,
    ) -> StratumResult<&mut Component> {
        if source == target {
            return Err(StratumError::validation(format!(
                "layer '{source}' cannot be its own alpha matte"
            )));
        }
        let source_idx = self.index_of(source)?;
        self.index_of(target)?;
        if self.layers[source_idx].alpha_matte().is_some() {
            return Err(StratumError::MatteAlreadyLinked {
                source_name: source.to_owned(),
                target: None,
            });
        }

        let matte = self.pop_layer(target)?;
        let source_idx = self.index_of(source)?;
        let component = &mut self.layers[source_idx];
        component.enable_alpha_matte(matte)?;
        Ok(component)
    }

    /// Detach the matte of `name` and hand it back. The target is not reinserted.
    pub fn disable_alpha_matte(&mut self, name: &str) -> StratumResult<Option<Component>> {
        Ok(self.get_mut(name)?.disable_alpha_matte())
    }

    /// Cache key of the frame at `time`: the preview level plus one part per direct component,
    /// in paint order.
    pub fn get_key(&self, time: f64) -> CompositeKey {
        CompositeKey::composition(
            self.preview_level,
            self.layers.iter().map(|c| c.key_part(time)).collect(),
        )
    }

    /// Composite the frame at `time` at the current preview level.
    pub fn render(&self, time: f64) -> StratumResult<Arc<FrameRGBA>> {
        let (width, height) = self.working_size();
        let key = self.get_key(time);

        {
            let mut cache = self.lock_cache()?;
            if let Some(frame) = cache.get(&key) {
                if frame.shape() == (height, width) {
                    return Ok(frame);
                }
                tracing::debug!(
                    time,
                    cached = ?frame.shape(),
                    wanted = ?(height, width),
                    "cached frame resolution mismatch, recomputing"
                );
                cache.invalidate(&key);
            }
        }

        let mut frame = FrameRGBA::transparent(width, height);
        for component in &self.layers {
            component.render_contribution(&mut frame, time, self.preview_level)?;
        }
        let frame = Arc::new(frame);
        self.lock_cache()?.put(key, Arc::clone(&frame));
        Ok(frame)
    }

    /// Drop every cached frame.
    pub fn clear_cache(&self) {
        match self.cache.lock() {
            Ok(mut cache) => cache.clear(),
            Err(poisoned) => poisoned.into_inner().clear(),
        }
    }

    /// Cache counters since construction.
    pub fn cache_stats(&self) -> StratumResult<FrameCacheStats> {
        Ok(self.lock_cache()?.stats())
    }

    /// Number of cached frames.
    pub fn cache_len(&self) -> StratumResult<usize> {
        Ok(self.lock_cache()?.len())
    }

    fn lock_cache(&self) -> StratumResult<MutexGuard<'_, FrameCache>> {
        self.cache
            .lock()
            .map_err(|_| StratumError::evaluation("frame cache lock poisoned"))
    }
}

fn validate_duration(duration: f64) -> StratumResult<()> {
    if !(duration.is_finite() && duration > 0.0) {
        return Err(StratumError::validation(format!(
            "duration must be positive, got {duration}"
        )));
    }
    Ok(())
}

impl Layer for Composition {
    fn render(&self, time: f64) -> StratumResult<Option<FrameRGBA>> {
        let frame = Composition::render(self, time)?;
        Ok(Some(Arc::unwrap_or_clone(frame)))
    }

    fn duration(&self) -> f64 {
        self.duration
    }

    fn content_key(&self, time: f64) -> ContentKey {
        let (width, height) = self.working_size();
        KeyHasher::new("nested")
            .write_u32(width)
            .write_u32(height)
            .write_key(self.get_key(time).fingerprint())
            .finish()
    }
}

impl std::fmt::Display for Composition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Composition(size=({}, {}), duration={}, layers=[",
            self.size.width, self.size.height, self.duration
        )?;
        for (i, name) in self.names().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{name:?}")?;
        }
        f.write_str("])")
    }
}

impl std::fmt::Debug for Composition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Composition")
            .field("size", &self.size)
            .field("duration", &self.duration)
            .field("preview_level", &self.preview_level)
            .field("layers", &self.layers)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/composition.rs"]
mod tests;
