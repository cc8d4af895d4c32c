//! # audio-pipeline-core
//!
//! Pull-based audio sample pipeline.
//!
//! Sources yield one frame of normalized `f64` samples per advance.
//! Transforms (resampling, downmixing, bit depth changes) wrap a source and
//! are themselves sources, so chains are built by nesting. Every stage
//! carries a [`StreamDescriptor`]; transforms report a proxy descriptor that
//! overrides only the fields they change.
//!
//! ## Architecture
//!
//! ```text
//! audio-pipeline-core (this crate)
//! ├── traits/       ← AudioSource, StreamDescriptor, AudioStreamWriter, container reader/writer
//! ├── models/       ← PipelineError, descriptors, ByteOrder, PipelineConfiguration, TranscodeResult
//! ├── processing/   ← SampleCodec, SampleWindow, Resampler, MonoDownmix, BitDepthConverter, WAV header
//! ├── stream/       ← PcmSource (decode), PcmStreamWriter (encode)
//! ├── session/      ← Transcoder (chain builder and driver)
//! └── storage/      ← WavReader, WavWriter, report sidecar
//! ```

pub mod models;
pub mod processing;
pub mod session;
pub mod storage;
pub mod stream;
pub mod traits;

// Re-export key types at crate root for convenience.
pub use models::byte_order::ByteOrder;
pub use models::config::PipelineConfiguration;
pub use models::descriptor::{PcmStreamDescriptor, ProxyDescriptor};
pub use models::error::PipelineError;
pub use models::transcode_result::TranscodeResult;
pub use processing::array_source::ArraySource;
pub use processing::bit_depth::BitDepthConverter;
pub use processing::mono_downmix::MonoDownmix;
pub use processing::resampler::Resampler;
pub use processing::sample_codec::{SampleCodec, SampleWidth};
pub use processing::sample_window::SampleWindow;
pub use processing::wav_format::WavHeader;
pub use session::transcoder::Transcoder;
pub use storage::wav_reader::WavReader;
pub use storage::wav_writer::WavWriter;
pub use stream::pcm_source::PcmSource;
pub use stream::pcm_writer::PcmStreamWriter;
pub use traits::audio_source::{AudioSource, SeekableAudioSource};
pub use traits::container::{ContainerFormatReader, ContainerFormatWriter};
pub use traits::stream_descriptor::{DescriptorFlags, StreamDescriptor};
pub use traits::stream_writer::AudioStreamWriter;
