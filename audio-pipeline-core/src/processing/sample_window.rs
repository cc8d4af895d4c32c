use crate::models::error::PipelineError;
use crate::traits::audio_source::AudioSource;

/// Sliding window over an [`AudioSource`] with bounded look-behind and
/// look-ahead.
///
/// Gives streaming transforms access to `look_behind` past and `look_ahead`
/// future frames around a moving center without buffering the whole stream.
/// Memory is fixed at `channels * (look_behind + look_ahead + 1)` slots.
///
/// Slots outside the stream (before its start or after its end) are `None`.
/// Once [`advance`](Self::advance) has returned `true`, the center slot
/// always holds a sample.
#[derive(Debug)]
pub struct SampleWindow<S> {
    source: S,
    look_ahead: usize,
    look_behind: usize,
    size: usize,
    // Slot that receives the next frame pulled from `source`.
    fill_index: usize,
    buffer: Vec<Vec<Option<f64>>>,
}

impl<S: AudioSource> SampleWindow<S> {
    /// Wrap `source` in a window. The window owns the source from now on.
    ///
    /// Fails with `InvalidArgument` if both sizes are zero.
    pub fn new(source: S, look_ahead: usize, look_behind: usize) -> Result<Self, PipelineError> {
        if look_ahead + look_behind == 0 {
            return Err(PipelineError::InvalidArgument(
                "look_ahead + look_behind must be > 0".into(),
            ));
        }

        let channels = source.descriptor().channel_count() as usize;
        let size = look_behind + look_ahead + 1;

        Ok(Self {
            source,
            look_ahead,
            look_behind,
            size,
            // The center starts one position before the stream, so the first
            // unit advance lands it on frame 0.
            fill_index: look_behind + 1,
            buffer: vec![vec![None; size]; channels],
        })
    }

    /// Slide the window forward by `skip + 1` frames.
    ///
    /// `advance(0)` moves the center to the next frame; `advance(n)` jumps
    /// over `n` frames. Frames that leave the window on the left are
    /// dropped, frames that would land before the new window start are
    /// pulled from the source and discarded, and the window is then refilled
    /// until it is full or the source is exhausted.
    ///
    /// Returns `true` iff the center holds a sample afterwards.
    pub fn advance(&mut self, skip: usize) -> Result<bool, PipelineError> {
        let shift = skip + 1;

        for samples in &mut self.buffer {
            if shift >= self.size {
                samples.fill(None);
            } else {
                samples.copy_within(shift.., 0);
                samples[self.size - shift..].fill(None);
            }
        }

        let discard = shift.saturating_sub(self.fill_index);
        self.fill_index = self.fill_index.saturating_sub(shift);

        for _ in 0..discard {
            if !self.source.advance()? {
                break;
            }
        }

        while self.fill_index < self.size {
            if !self.source.advance()? {
                break;
            }
            for (channel, samples) in self.buffer.iter_mut().enumerate() {
                samples[self.fill_index] = Some(self.source.sample(channel));
            }
            self.fill_index += 1;
        }

        Ok(self.fill_index > self.look_behind)
    }

    /// Sample of `channel` at `offset` from the center.
    ///
    /// Offset 0 is the center, negative offsets look behind, positive ones
    /// look ahead. Returns `Ok(None)` for positions beyond the stream
    /// boundaries and `IndexOutOfRange` for offsets beyond the configured
    /// window or an unknown channel.
    pub fn sample(&self, channel: usize, offset: isize) -> Result<Option<f64>, PipelineError> {
        let in_range = if offset < 0 {
            offset.unsigned_abs() <= self.look_behind
        } else {
            offset.unsigned_abs() <= self.look_ahead
        };
        if !in_range {
            return Err(PipelineError::IndexOutOfRange(format!(
                "offset {offset} outside window (-{}..={})",
                self.look_behind, self.look_ahead
            )));
        }

        let samples = self.buffer.get(channel).ok_or_else(|| {
            PipelineError::IndexOutOfRange(format!("channel {channel} of {}", self.buffer.len()))
        })?;
        let slot = (self.look_behind as isize + offset) as usize;
        Ok(samples[slot])
    }

    /// Total number of frames held at a time (`look_behind + look_ahead + 1`).
    pub fn window_size(&self) -> usize {
        self.size
    }

    pub fn look_ahead(&self) -> usize {
        self.look_ahead
    }

    pub fn look_behind(&self) -> usize {
        self.look_behind
    }

    pub fn channel_count(&self) -> usize {
        self.buffer.len()
    }

    /// The wrapped source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Give up the window and return the wrapped source.
    pub fn into_inner(self) -> S {
        self.source
    }

    /// Close the wrapped source.
    pub fn close(&mut self) -> Result<(), PipelineError> {
        self.source.close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::descriptor::PcmStreamDescriptor;
    use crate::processing::array_source::ArraySource;

    fn ramp(n: usize) -> ArraySource {
        let data: Vec<f64> = (1..=n).map(|i| i as f64).collect();
        let descriptor = PcmStreamDescriptor::new(1, 16, 22050, Some(n as u64));
        ArraySource::new(descriptor.into_shared(), data).unwrap()
    }

    #[test]
    fn rejects_empty_lookaround() {
        let err = SampleWindow::new(ramp(4), 0, 0).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidArgument(_)));
    }

    #[test]
    fn window_size_is_both_sides_plus_center() {
        let window = SampleWindow::new(ramp(4), 3, 2).unwrap();
        assert_eq!(window.window_size(), 6);
        assert_eq!(window.look_ahead(), 3);
        assert_eq!(window.look_behind(), 2);
    }

    #[test]
    fn slides_over_ramp_with_sentinels_only_at_edges() {
        const N: usize = 64;
        let look_ahead = 2;
        let look_behind = 2;
        let mut window = SampleWindow::new(ramp(N), look_ahead, look_behind).unwrap();

        let mut read_index = 0;
        while read_index < N {
            assert!(window.advance(0).unwrap(), "could not advance at read index {read_index}");

            let center = window.sample(0, 0).unwrap().expect("center is always present");
            assert_eq!(center, (read_index + 1) as f64);

            let mut previous = center;
            for offset in 1..=look_behind as isize {
                match window.sample(0, -offset).unwrap() {
                    Some(value) => {
                        assert!(value < previous, "behind {offset} at {read_index}");
                        previous = value;
                    }
                    None => assert!(read_index < look_behind, "unexpected gap behind at {read_index}"),
                }
            }

            let mut previous = center;
            for offset in 1..=look_ahead as isize {
                match window.sample(0, offset).unwrap() {
                    Some(value) => {
                        assert!(value > previous, "ahead {offset} at {read_index}");
                        previous = value;
                    }
                    None => assert!(read_index >= N - look_ahead, "unexpected gap ahead at {read_index}"),
                }
            }

            read_index += 1;
        }

        assert_eq!(read_index, N);
        assert!(!window.advance(0).unwrap());
    }

    #[test]
    fn look_ahead_only_window() {
        let mut window = SampleWindow::new(ramp(3), 1, 0).unwrap();

        assert!(window.advance(0).unwrap());
        assert_eq!(window.sample(0, 0).unwrap(), Some(1.0));
        assert_eq!(window.sample(0, 1).unwrap(), Some(2.0));

        assert!(window.advance(0).unwrap());
        assert!(window.advance(0).unwrap());
        assert_eq!(window.sample(0, 0).unwrap(), Some(3.0));
        assert_eq!(window.sample(0, 1).unwrap(), None);

        assert!(!window.advance(0).unwrap());
    }

    #[test]
    fn skip_moves_center_by_skip_plus_one() {
        let mut window = SampleWindow::new(ramp(20), 2, 1).unwrap();

        assert!(window.advance(0).unwrap());
        assert_eq!(window.sample(0, 0).unwrap(), Some(1.0));

        // Buffered frames are reused.
        assert!(window.advance(1).unwrap());
        assert_eq!(window.sample(0, -1).unwrap(), Some(2.0));
        assert_eq!(window.sample(0, 0).unwrap(), Some(3.0));
        assert_eq!(window.sample(0, 2).unwrap(), Some(5.0));

        // Jump beyond everything buffered.
        assert!(window.advance(6).unwrap());
        assert_eq!(window.sample(0, -1).unwrap(), Some(9.0));
        assert_eq!(window.sample(0, 0).unwrap(), Some(10.0));
        assert_eq!(window.sample(0, 1).unwrap(), Some(11.0));
    }

    #[test]
    fn skip_past_end_reports_exhaustion() {
        let mut window = SampleWindow::new(ramp(5), 1, 0).unwrap();
        assert!(window.advance(0).unwrap());
        assert!(!window.advance(10).unwrap());
        assert_eq!(window.sample(0, 0).unwrap(), None);
    }

    #[test]
    fn empty_source_never_fills_center() {
        let mut window = SampleWindow::new(ramp(0), 2, 2).unwrap();
        assert!(!window.advance(0).unwrap());
        assert_eq!(window.sample(0, 0).unwrap(), None);
    }

    #[test]
    fn offsets_beyond_window_are_errors() {
        let mut window = SampleWindow::new(ramp(8), 2, 1).unwrap();
        window.advance(0).unwrap();

        assert!(matches!(
            window.sample(0, 3).unwrap_err(),
            PipelineError::IndexOutOfRange(_)
        ));
        assert!(matches!(
            window.sample(0, -2).unwrap_err(),
            PipelineError::IndexOutOfRange(_)
        ));
        assert!(matches!(
            window.sample(1, 0).unwrap_err(),
            PipelineError::IndexOutOfRange(_)
        ));
    }

    #[test]
    fn keeps_channels_separate() {
        let descriptor = PcmStreamDescriptor::new(2, 16, 8000, Some(3));
        let source = ArraySource::new(descriptor.into_shared(), vec![0.1, -0.1, 0.2, -0.2, 0.3, -0.3]).unwrap();
        let mut window = SampleWindow::new(source, 1, 1).unwrap();

        assert!(window.advance(0).unwrap());
        assert!(window.advance(0).unwrap());
        assert_eq!(window.sample(0, -1).unwrap(), Some(0.1));
        assert_eq!(window.sample(1, -1).unwrap(), Some(-0.1));
        assert_eq!(window.sample(0, 1).unwrap(), Some(0.3));
        assert_eq!(window.sample(1, 1).unwrap(), Some(-0.3));
    }
}
