#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod crc8;
pub mod decoder;
pub mod encode;
pub mod frame;
pub mod rs;
pub mod sim;
pub mod stream;
pub mod sync;
pub mod time;
pub mod wav;

#[cfg(any(feature = "std", test))]
pub mod tracing_init;

pub use decoder::{Decoder, ProcessingError};
pub use encode::FrameEncoder;
pub use frame::TimeFrame;
pub use time::{TimeData, TimeZoneOffset, TransmitterState};
