use std::io::{self, ErrorKind, Read};
use std::sync::Arc;

use crate::models::byte_order::ByteOrder;
use crate::models::error::PipelineError;
use crate::processing::sample_codec::{SampleCodec, SampleWidth};
use crate::traits::audio_source::AudioSource;
use crate::traits::stream_descriptor::{validate_integrity, StreamDescriptor};

/// Decodes an interleaved linear PCM byte stream into normalized samples.
///
/// One frame (`channels * bytes_per_sample` bytes) is read per advance and
/// decoded lazily on [`sample`](AudioSource::sample). A short trailing frame
/// ends the stream without an error.
#[derive(Debug)]
pub struct PcmSource<R> {
    input: Option<R>,
    codec: SampleCodec,
    descriptor: Arc<dyn StreamDescriptor>,
    frame: Vec<u8>,
    frames_read: u64,
}

impl<R: Read> PcmSource<R> {
    /// Fails with `InvalidArgument` for variable bit depth or sample rate,
    /// inconsistent descriptors, and widths other than 8, 16, 32 or 64 bits.
    pub fn new(input: R, byte_order: ByteOrder, descriptor: Arc<dyn StreamDescriptor>) -> Result<Self, PipelineError> {
        if descriptor.has_variable_bits_per_sample() || descriptor.has_variable_sample_rate() {
            return Err(PipelineError::InvalidArgument(
                "linear PCM stream cannot have variable bit depth or variable sample rate".into(),
            ));
        }
        validate_integrity(descriptor.as_ref())?;

        let bits = descriptor.max_bits_per_sample(0);
        let width = SampleWidth::from_bits(bits).map_err(|e| PipelineError::InvalidArgument(e.to_string()))?;
        let codec = SampleCodec::new(width.bits(), byte_order)?;
        let frame_bytes = codec.sample_bytes() * descriptor.channel_count() as usize;

        log::debug!(
            "pcm source: {} channel(s), {} bits, {} Hz, {:?} endian",
            descriptor.channel_count(),
            bits,
            descriptor.max_sample_rate(0),
            byte_order
        );

        Ok(Self {
            input: Some(input),
            codec,
            descriptor,
            frame: vec![0; frame_bytes],
            frames_read: 0,
        })
    }

    /// Number of complete frames read so far.
    pub fn frames_read(&self) -> u64 {
        self.frames_read
    }

    pub fn codec(&self) -> &SampleCodec {
        &self.codec
    }

    /// Release the source without closing the byte stream.
    ///
    /// Returns `None` if the source was already closed.
    pub fn into_inner(self) -> Option<R> {
        self.input
    }
}

/// Fill `buf` from `input`. Returns how many bytes were read, less than
/// `buf.len()` only at end of stream.
fn read_frame(input: &mut impl Read, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match input.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

impl<R: Read> AudioSource for PcmSource<R> {
    fn advance(&mut self) -> Result<bool, PipelineError> {
        let input = self
            .input
            .as_mut()
            .ok_or_else(|| io::Error::new(ErrorKind::BrokenPipe, "pcm source is closed"))?;

        let read = read_frame(input, &mut self.frame)?;
        if read < self.frame.len() {
            // The partial bytes must not be decoded as a frame.
            self.frame.fill(0);
            if read > 0 {
                log::debug!(
                    "pcm source: dropping {} trailing byte(s) of an incomplete frame after {} frames",
                    read,
                    self.frames_read
                );
            }
            return Ok(false);
        }

        self.frames_read += 1;
        Ok(true)
    }

    fn sample(&self, channel: usize) -> f64 {
        self.codec.decode_channel(&self.frame, channel)
    }

    fn descriptor(&self) -> Arc<dyn StreamDescriptor> {
        Arc::clone(&self.descriptor)
    }

    fn current_sample_rate(&self, _channel: usize) -> u32 {
        self.descriptor.max_sample_rate(0)
    }

    fn current_bit_rate(&self, _channel: usize) -> Result<u16, PipelineError> {
        Ok(self.codec.width().bits())
    }

    /// Drops the byte stream. Closing twice is a no-op; advancing afterwards
    /// fails with an I/O error.
    fn close(&mut self) -> Result<(), PipelineError> {
        if self.input.take().is_some() {
            log::debug!("pcm source: closed after {} frames", self.frames_read);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::models::descriptor::PcmStreamDescriptor;
    use crate::traits::stream_descriptor::DescriptorFlags;

    fn descriptor(channels: u16, bits: u16) -> Arc<dyn StreamDescriptor> {
        PcmStreamDescriptor::new(channels, bits, 44100, None).into_shared()
    }

    #[test]
    fn decodes_interleaved_16_bit_little_endian() {
        let mut bytes = Vec::new();
        for value in [0i16, i16::MAX, i16::MIN, -16384] {
            bytes.extend_from_slice(&value.to_le_bytes());
        }

        let mut source = PcmSource::new(Cursor::new(bytes), ByteOrder::Little, descriptor(2, 16)).unwrap();

        assert!(source.advance().unwrap());
        assert_eq!(source.sample(0), 0.0);
        assert_eq!(source.sample(1), 1.0);
        assert!(source.advance().unwrap());
        assert_eq!(source.sample(0), -1.0);
        assert_eq!(source.sample(1), -0.5);
        assert!(!source.advance().unwrap());
        assert_eq!(source.frames_read(), 2);
    }

    #[test]
    fn decodes_big_endian_32_bit() {
        let bytes = i32::MIN.to_be_bytes().to_vec();
        let mut source = PcmSource::new(Cursor::new(bytes), ByteOrder::Big, descriptor(1, 32)).unwrap();
        assert!(source.advance().unwrap());
        assert_eq!(source.sample(0), -1.0);
    }

    #[test]
    fn trailing_partial_frame_is_dropped() {
        // One full stereo 16-bit frame plus three stray bytes.
        let bytes = vec![0, 0, 0, 0, 1, 2, 3];
        let mut source = PcmSource::new(Cursor::new(bytes), ByteOrder::Little, descriptor(2, 16)).unwrap();

        assert!(source.advance().unwrap());
        assert!(!source.advance().unwrap());
        assert_eq!(source.frames_read(), 1);
    }

    #[test]
    fn partial_frame_reads_as_silence() {
        let mut bytes = [i16::MAX.to_le_bytes(), i16::MIN.to_le_bytes()].concat();
        bytes.push(0x7F);
        let mut source = PcmSource::new(Cursor::new(bytes), ByteOrder::Little, descriptor(2, 16)).unwrap();

        assert!(source.advance().unwrap());
        assert_eq!(source.sample(0), 1.0);
        assert!(!source.advance().unwrap());
        assert_eq!(source.sample(0), 0.0);
        assert_eq!(source.sample(1), 0.0);
    }

    #[test]
    fn every_decoded_sample_is_normalized() {
        let bytes: Vec<u8> = (0..=255u8).collect();
        for bits in [8u16, 16, 32, 64] {
            let mut source = PcmSource::new(Cursor::new(bytes.clone()), ByteOrder::Little, descriptor(1, bits)).unwrap();
            while source.advance().unwrap() {
                let value = source.sample(0);
                assert!((-1.0..=1.0).contains(&value), "{bits} bits produced {value}");
            }
        }
    }

    #[test]
    fn rejects_variable_formats() {
        for flags in [DescriptorFlags::VARIABLE_BITS_PER_SAMPLE, DescriptorFlags::VARIABLE_SAMPLE_RATE] {
            let descriptor = PcmStreamDescriptor::new(1, 16, 44100, None).with_flags(flags).into_shared();
            let err = PcmSource::new(Cursor::new(Vec::new()), ByteOrder::Little, descriptor).unwrap_err();
            assert!(matches!(err, PipelineError::InvalidArgument(_)));
        }
    }

    #[test]
    fn rejects_unsupported_width() {
        let err = PcmSource::new(Cursor::new(Vec::new()), ByteOrder::Little, descriptor(2, 24)).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidArgument(_)));
    }

    #[test]
    fn advancing_after_close_is_an_io_error() {
        let mut source = PcmSource::new(Cursor::new(vec![0u8; 8]), ByteOrder::Little, descriptor(1, 16)).unwrap();
        assert!(source.advance().unwrap());

        source.close().unwrap();
        source.close().unwrap();

        assert!(source.advance().unwrap_err().is_io());
    }

    struct FailingReader;

    impl Read for FailingReader {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(ErrorKind::ConnectionReset, "stream went away"))
        }
    }

    #[test]
    fn read_errors_propagate() {
        let mut source = PcmSource::new(FailingReader, ByteOrder::Little, descriptor(1, 16)).unwrap();
        match source.advance().unwrap_err() {
            PipelineError::Io(e) => assert_eq!(e.kind(), ErrorKind::ConnectionReset),
            other => panic!("unexpected error: {other}"),
        }
    }

    /// Reader that hands out one byte per call.
    struct Trickle(Cursor<Vec<u8>>);

    impl Read for Trickle {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let len = buf.len().min(1);
            self.0.read(&mut buf[..len])
        }
    }

    #[test]
    fn short_reads_assemble_full_frames() {
        let bytes = [i16::MAX.to_le_bytes(), i16::MIN.to_le_bytes()].concat();
        let mut source = PcmSource::new(Trickle(Cursor::new(bytes)), ByteOrder::Little, descriptor(2, 16)).unwrap();
        assert!(source.advance().unwrap());
        assert_eq!(source.sample(0), 1.0);
        assert_eq!(source.sample(1), -1.0);
    }
}
