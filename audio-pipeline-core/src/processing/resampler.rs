use std::sync::Arc;

use crate::models::descriptor::ProxyDescriptor;
use crate::models::error::PipelineError;
use crate::processing::sample_window::SampleWindow;
use crate::traits::audio_source::AudioSource;
use crate::traits::stream_descriptor::StreamDescriptor;

/// Streaming sample-rate converter.
///
/// Each output frame is the arithmetic mean of a span of a look-ahead
/// [`SampleWindow`] over the source. Low quality, but allocation free after
/// construction and strictly single pass.
///
/// The half window is `max(1, round(factor) - 1)` with
/// `factor = target_rate / source_rate`. The cursor arithmetic runs in `f32`;
/// channel averages are `f64`.
#[derive(Debug)]
pub struct Resampler<S> {
    target_rate: u32,
    descriptor: Arc<dyn StreamDescriptor>,
    increment: f32,
    // Fractional read position in [0, 1); `None` until the first advance.
    cursor: Option<f32>,
    half_window: usize,
    window: SampleWindow<S>,
    buffer: Vec<f64>,
    // Frames still to emit when the source count is known.
    remaining: Option<u64>,
    end_of_stream: bool,
}

impl<S: AudioSource> Resampler<S> {
    /// Resample `source` to `target_rate` Hz. Takes ownership of `source`.
    ///
    /// Fails with `InvalidArgument` for variable-rate sources and zero rates.
    pub fn new(source: S, target_rate: u32) -> Result<Self, PipelineError> {
        let base = source.descriptor();
        if base.has_variable_sample_rate() {
            return Err(PipelineError::InvalidArgument(
                "cannot resample an audio source with variable sample rate".into(),
            ));
        }

        let source_rate = base.max_sample_rate(0);
        if source_rate == 0 || target_rate == 0 {
            return Err(PipelineError::InvalidArgument(format!(
                "sample rates must be positive (source {source_rate} Hz, target {target_rate} Hz)"
            )));
        }

        let factor = target_rate as f32 / source_rate as f32;
        let increment = source_rate as f32 / target_rate as f32;
        let half_window = (factor.round() as i64 - 1).max(1) as usize;

        let sample_count = base
            .sample_count()
            .map(|count| (count as f64 * target_rate as f64 / source_rate as f64).round() as u64);

        let descriptor = ProxyDescriptor::new(Arc::clone(&base))
            .with_sample_rate(target_rate)
            .with_sample_count(sample_count)
            .into_shared();

        log::debug!(
            "resampler: {} Hz -> {} Hz, half window {}, {} channel(s)",
            source_rate,
            target_rate,
            half_window,
            base.channel_count()
        );

        let channels = base.channel_count() as usize;
        let window = SampleWindow::new(source, half_window, 0)?;

        Ok(Self {
            target_rate,
            descriptor,
            increment,
            cursor: None,
            half_window,
            window,
            buffer: vec![0.0; channels],
            remaining: sample_count,
            end_of_stream: false,
        })
    }

    pub fn target_rate(&self) -> u32 {
        self.target_rate
    }

    pub fn half_window(&self) -> usize {
        self.half_window
    }

    /// Step the cursor and slide the window when it crosses a source frame.
    ///
    /// Returns whether new frames were loaded into the window.
    fn step(&mut self) -> Result<bool, PipelineError> {
        let (cursor, loaded) = match self.cursor {
            None => {
                let loaded = self.window.advance(0)?;
                (0.0, loaded)
            }
            Some(previous) => {
                let mut cursor = previous + self.increment;
                if cursor < 1.0 {
                    self.cursor = Some(cursor);
                    return Ok(false);
                }
                let whole = cursor.floor();
                let loaded = self.window.advance(whole as usize - 1)?;
                cursor -= whole;
                (cursor, loaded)
            }
        };

        self.cursor = Some(cursor);
        if !loaded {
            log::debug!("resampler: source exhausted");
            self.end_of_stream = true;
        }
        Ok(loaded)
    }
}

impl<S: AudioSource> AudioSource for Resampler<S> {
    fn advance(&mut self) -> Result<bool, PipelineError> {
        if self.end_of_stream || self.remaining == Some(0) {
            return Ok(false);
        }

        let loaded = self.step()?;
        let cursor = self.cursor.unwrap_or(0.0);

        let span = (self.half_window * 2) as f32;
        let start = (cursor * span + 0.5).floor() as usize;

        for (channel, output) in self.buffer.iter_mut().enumerate() {
            let mut sum = 0.0;
            let mut count = 0u32;
            for offset in start..=self.half_window {
                if let Some(value) = self.window.sample(channel, offset as isize)? {
                    sum += value;
                    count += 1;
                }
            }
            // No sample in range: keep the previous value.
            if count > 0 {
                *output = sum / count as f64;
            }
        }

        let emitted = loaded || !self.end_of_stream;
        if emitted {
            if let Some(remaining) = self.remaining.as_mut() {
                *remaining -= 1;
            }
        }
        Ok(emitted)
    }

    fn sample(&self, channel: usize) -> f64 {
        self.buffer[channel]
    }

    fn descriptor(&self) -> Arc<dyn StreamDescriptor> {
        Arc::clone(&self.descriptor)
    }

    fn current_sample_rate(&self, _channel: usize) -> u32 {
        self.target_rate
    }

    fn current_bit_rate(&self, _channel: usize) -> Result<u16, PipelineError> {
        Err(PipelineError::UnsupportedOperation(
            "resampler does not report a current bit rate".into(),
        ))
    }

    fn close(&mut self) -> Result<(), PipelineError> {
        self.window.close()
    }
}
