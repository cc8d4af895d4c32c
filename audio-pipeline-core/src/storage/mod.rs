pub mod report;
pub mod wav_reader;
pub mod wav_writer;
