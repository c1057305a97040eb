use std::ops::{Deref, DerefMut};

use crate::foundation::error::StratumResult;
use crate::scene::composition::Composition;

/// Scoped override of a composition's preview level.
///
/// The guard derefs to the composition. When it drops, on normal exit, early `?` return or
/// unwind, the level that was active before the guard was taken is restored, even if the
/// level was changed again inside the scope.
#[must_use = "the preview level is restored as soon as the guard is dropped"]
pub struct PreviewGuard<'a> {
    comp: &'a mut Composition,
    prior: u32,
}

impl<'a> PreviewGuard<'a> {
    fn enter(comp: &'a mut Composition, level: u32) -> StratumResult<Self> {
        let prior = comp.preview_level();
        comp.set_preview_level(level)?;
        tracing::debug!(prior, level, "preview level entered");
        Ok(Self { comp, prior })
    }

    /// Level that will be restored on drop.
    pub fn prior_level(&self) -> u32 {
        self.prior
    }
}

impl Deref for PreviewGuard<'_> {
    type Target = Composition;

    fn deref(&self) -> &Composition {
        self.comp
    }
}

impl DerefMut for PreviewGuard<'_> {
    fn deref_mut(&mut self) -> &mut Composition {
        self.comp
    }
}

impl Drop for PreviewGuard<'_> {
    fn drop(&mut self) {
        // `prior` was accepted by `set_preview_level` before, so this cannot fail.
        let _ = self.comp.set_preview_level(self.prior);
    }
}

impl Composition {
    /// Render at `1/level` resolution until the returned guard drops.
    pub fn preview(&mut self, level: u32) -> StratumResult<PreviewGuard<'_>> {
        PreviewGuard::enter(self, level)
    }

    /// Render at full resolution until the returned guard drops.
    pub fn final_quality(&mut self) -> PreviewGuard<'_> {
        let prior = self.preview_level();
        // Level 1 is always valid.
        let _ = self.set_preview_level(1);
        PreviewGuard { comp: self, prior }
    }

    /// Run `f` at preview `level`, restoring the prior level afterwards.
    pub fn with_preview<R>(
        &mut self,
        level: u32,
        f: impl FnOnce(&mut Composition) -> StratumResult<R>,
    ) -> StratumResult<R> {
        let mut guard = self.preview(level)?;
        f(&mut guard)
    }

    /// Run `f` at full quality, restoring the prior level afterwards.
    pub fn with_final<R>(
        &mut self,
        f: impl FnOnce(&mut Composition) -> StratumResult<R>,
    ) -> StratumResult<R> {
        let mut guard = self.final_quality();
        f(&mut guard)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/preview.rs"]
mod tests;
