pub mod client;
pub mod logging;
pub mod stream;

pub use client::{StatusClient, RETRY_DELAY};
pub use stream::FrameParser;
