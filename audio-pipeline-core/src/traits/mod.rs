pub mod audio_source;
pub mod container;
pub mod stream_descriptor;
pub mod stream_writer;
