use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{StratumError, StratumResult};
use crate::scene::composition::Composition;

/// Time range and rate of an export.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ExportOpts {
    /// First timestamp, in seconds.
    pub start_time: f64,
    /// Exclusive end in seconds; the composition duration when `None`.
    pub end_time: Option<f64>,
    /// Sampling rate.
    pub fps: Fps,
}

impl Default for ExportOpts {
    fn default() -> Self {
        Self {
            start_time: 0.0,
            end_time: None,
            fps: Fps { num: 30, den: 1 },
        }
    }
}

/// Summary of a finished export.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExportStats {
    /// Frames pushed to the sink.
    pub frames: u64,
    /// Frames served from the cache instead of being composited.
    pub cache_hits: u64,
}

impl Composition {
    /// Render `[start_time, end_time)` at `fps` and push every frame to `sink`.
    ///
    /// Frames are always rendered at full resolution, whatever preview level is active. The
    /// frame cache is cleared afterwards, whether the export succeeded or not.
    #[tracing::instrument(skip(self, sink))]
    pub fn write_video(
        &mut self,
        sink: &mut dyn FrameSink,
        opts: ExportOpts,
    ) -> StratumResult<ExportStats> {
        let end_time = opts.end_time.unwrap_or(self.duration());
        if !opts.start_time.is_finite() || !end_time.is_finite() || end_time < opts.start_time {
            return Err(StratumError::validation(format!(
                "export range [{}, {end_time}) is invalid",
                opts.start_time
            )));
        }
        if opts.fps.num == 0 || opts.fps.den == 0 {
            return Err(StratumError::validation("export fps must be non-zero"));
        }

        let result = {
            let guard = self.final_quality();
            push_frames(&guard, sink, opts.start_time, end_time, opts.fps)
        };
        self.clear_cache();

        match &result {
            Ok(stats) => tracing::info!(
                frames = stats.frames,
                cache_hits = stats.cache_hits,
                "export finished"
            ),
            Err(err) => tracing::warn!(error = %err, "export failed"),
        }
        result
    }
}

fn push_frames(
    comp: &Composition,
    sink: &mut dyn FrameSink,
    start_time: f64,
    end_time: f64,
    fps: Fps,
) -> StratumResult<ExportStats> {
    let size = comp.size();
    tracing::info!(start_time, end_time, fps = fps.as_f64(), "export started");
    sink.begin(SinkConfig {
        width: size.width,
        height: size.height,
        fps,
    })?;

    let hits_before = comp.cache_stats()?.hits;
    let mut frames = 0u64;
    loop {
        let t = start_time + fps.frames_to_secs(frames);
        if t >= end_time {
            break;
        }
        let frame = comp.render(t)?;
        sink.push_frame(FrameIndex(frames), &frame)?;
        frames += 1;
    }
    sink.end()?;

    Ok(ExportStats {
        frames,
        cache_hits: comp.cache_stats()?.hits - hits_before,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/scene/export.rs"]
mod tests;
