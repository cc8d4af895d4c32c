pub mod byte_order;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod transcode_result;
