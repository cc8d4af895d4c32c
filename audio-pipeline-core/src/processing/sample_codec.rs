//! Conversion between fixed-width signed PCM integers and normalized `f64`.
//!
//! Positive values scale by the type's `MAX`, negative values by the
//! magnitude of its `MIN`. That makes `MIN` decode to exactly `-1.0` and
//! `MAX` to exactly `1.0`, and lets `encode` invert `decode` for every
//! integer that fits an `f64` mantissa.

use crate::models::byte_order::ByteOrder;
use crate::models::error::PipelineError;

/// Supported PCM sample widths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SampleWidth {
    Bits8,
    Bits16,
    Bits32,
    Bits64,
}

impl SampleWidth {
    pub fn from_bits(bits: u16) -> Result<Self, PipelineError> {
        match bits {
            8 => Ok(Self::Bits8),
            16 => Ok(Self::Bits16),
            32 => Ok(Self::Bits32),
            64 => Ok(Self::Bits64),
            other => Err(PipelineError::UnsupportedFormat(format!(
                "unsupported sample width: {other} bits"
            ))),
        }
    }

    pub fn bits(self) -> u16 {
        match self {
            Self::Bits8 => 8,
            Self::Bits16 => 16,
            Self::Bits32 => 32,
            Self::Bits64 => 64,
        }
    }

    pub fn bytes(self) -> usize {
        self.bits() as usize / 8
    }
}

/// Fixed-width integer types that can carry a PCM sample.
trait PcmInteger: Copy {
    const BYTES: usize;

    fn from_bytes(bytes: &[u8], order: ByteOrder) -> Self;
    fn write_bytes(self, order: ByteOrder, out: &mut [u8]);
    fn normalize(self) -> f64;
    fn denormalize(value: f64) -> Self;
}

macro_rules! impl_pcm_integer {
    ($ty:ty) => {
        impl PcmInteger for $ty {
            const BYTES: usize = std::mem::size_of::<$ty>();

            fn from_bytes(bytes: &[u8], order: ByteOrder) -> Self {
                let mut raw = [0u8; std::mem::size_of::<$ty>()];
                raw.copy_from_slice(&bytes[..Self::BYTES]);
                match order {
                    ByteOrder::Little => <$ty>::from_le_bytes(raw),
                    ByteOrder::Big => <$ty>::from_be_bytes(raw),
                }
            }

            fn write_bytes(self, order: ByteOrder, out: &mut [u8]) {
                let raw = match order {
                    ByteOrder::Little => self.to_le_bytes(),
                    ByteOrder::Big => self.to_be_bytes(),
                };
                out[..Self::BYTES].copy_from_slice(&raw);
            }

            fn normalize(self) -> f64 {
                if self < 0 {
                    -(self as f64) / <$ty>::MIN as f64
                } else {
                    self as f64 / <$ty>::MAX as f64
                }
            }

            fn denormalize(value: f64) -> Self {
                let value = value.clamp(-1.0, 1.0);
                // Float-to-int `as` saturates, which keeps the 64-bit extremes in range.
                if value < 0.0 {
                    (-value * <$ty>::MIN as f64).round() as $ty
                } else {
                    (value * <$ty>::MAX as f64).round() as $ty
                }
            }
        }
    };
}

impl_pcm_integer!(i8);
impl_pcm_integer!(i16);
impl_pcm_integer!(i32);
impl_pcm_integer!(i64);

/// PCM sample codec for one width and byte order.
///
/// The width is validated once at construction; per-sample calls cannot fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleCodec {
    width: SampleWidth,
    byte_order: ByteOrder,
}

impl SampleCodec {
    pub fn new(bits_per_sample: u16, byte_order: ByteOrder) -> Result<Self, PipelineError> {
        Ok(Self {
            width: SampleWidth::from_bits(bits_per_sample)?,
            byte_order,
        })
    }

    pub fn width(&self) -> SampleWidth {
        self.width
    }

    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    /// Bytes occupied by one sample.
    pub fn sample_bytes(&self) -> usize {
        self.width.bytes()
    }

    /// Decode the sample at the start of `bytes`.
    ///
    /// # Panics
    ///
    /// If `bytes` is shorter than one sample.
    pub fn decode(&self, bytes: &[u8]) -> f64 {
        let order = self.byte_order;
        match self.width {
            SampleWidth::Bits8 => i8::from_bytes(bytes, order).normalize(),
            SampleWidth::Bits16 => i16::from_bytes(bytes, order).normalize(),
            SampleWidth::Bits32 => i32::from_bytes(bytes, order).normalize(),
            SampleWidth::Bits64 => i64::from_bytes(bytes, order).normalize(),
        }
    }

    /// Decode the sample of `channel` within an interleaved frame.
    pub fn decode_channel(&self, frame: &[u8], channel: usize) -> f64 {
        let offset = channel * self.sample_bytes();
        self.decode(&frame[offset..])
    }

    /// Encode `value` into the first bytes of `out`.
    ///
    /// Values outside `[-1.0, 1.0]` are clamped.
    pub fn encode(&self, value: f64, out: &mut [u8]) {
        let order = self.byte_order;
        match self.width {
            SampleWidth::Bits8 => i8::denormalize(value).write_bytes(order, out),
            SampleWidth::Bits16 => i16::denormalize(value).write_bytes(order, out),
            SampleWidth::Bits32 => i32::denormalize(value).write_bytes(order, out),
            SampleWidth::Bits64 => i64::denormalize(value).write_bytes(order, out),
        }
    }
}
