pub mod array_source;
pub mod bit_depth;
pub mod mono_downmix;
pub mod resampler;
pub mod sample_codec;
pub mod sample_window;
pub mod wav_format;
