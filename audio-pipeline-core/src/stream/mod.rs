pub mod pcm_source;
pub mod pcm_writer;
