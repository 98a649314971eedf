//! Decoded Time Messages
//!
//! Field extraction from a validated, error-corrected and descrambled time
//! frame, and the enums the two-bit wire codes map onto. The broadcast
//! counts time in 3-second epochs from 2000-01-01T00:00:00Z; the counter's
//! five lowest bits are not transmitted, so decoded timestamps quantize to
//! 96 seconds.

use bitvec::prelude::*;

use crate::frame::TimeFrame;

/// Seconds between the Unix epoch and 2000-01-01T00:00:00Z.
pub const EPOCH_2000_UNIX_OFFSET: u64 = 946_684_800;

/// Broadcast time resolution in seconds.
pub const TIME_RESOLUTION_SECONDS: u64 = 3;

/// Time zone offset of the transmitting site relative to UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeZoneOffset {
    OffsetPlus0h,
    OffsetPlus1h,
    OffsetPlus2h,
    OffsetPlus3h,
}

impl TimeZoneOffset {
    /// Decode the two-bit TZ wire code.
    pub fn from_wire(code: u8) -> Self {
        match code & 0x03 {
            0 => Self::OffsetPlus0h,
            1 => Self::OffsetPlus2h,
            2 => Self::OffsetPlus1h,
            _ => Self::OffsetPlus3h,
        }
    }

    pub fn to_wire(self) -> u8 {
        match self {
            Self::OffsetPlus0h => 0,
            Self::OffsetPlus2h => 1,
            Self::OffsetPlus1h => 2,
            Self::OffsetPlus3h => 3,
        }
    }

    /// Offset to UTC in hours.
    pub fn hours(self) -> u8 {
        match self {
            Self::OffsetPlus0h => 0,
            Self::OffsetPlus1h => 1,
            Self::OffsetPlus2h => 2,
            Self::OffsetPlus3h => 3,
        }
    }
}

/// State of the transmitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransmitterState {
    NormalOperation,
    PlannedMaintenance1Day,
    PlannedMaintenance1Week,
    PlannedMaintenanceOver1Week,
}

impl TransmitterState {
    /// Decode the (SK0, SK1) wire code.
    pub fn from_wire(code: u8) -> Self {
        match code & 0x03 {
            0 => Self::NormalOperation,
            1 => Self::PlannedMaintenance1Week,
            2 => Self::PlannedMaintenance1Day,
            _ => Self::PlannedMaintenanceOver1Week,
        }
    }

    pub fn to_wire(self) -> u8 {
        match self {
            Self::NormalOperation => 0,
            Self::PlannedMaintenance1Week => 1,
            Self::PlannedMaintenance1Day => 2,
            Self::PlannedMaintenanceOver1Week => 3,
        }
    }
}

/// One decoded time message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeData {
    /// UTC seconds since 2000-01-01T00:00:00Z.
    pub utc_seconds_since_2000: u64,
    /// UTC seconds since the Unix epoch.
    pub unix_seconds: u64,
    /// Time zone offset of the transmitting site.
    pub offset: TimeZoneOffset,
    /// Change of the time zone offset is upcoming.
    pub time_zone_change_announced: bool,
    /// A leap second has been announced.
    pub leap_second_announced: bool,
    /// Sign of the announced leap second.
    pub leap_second_positive: bool,
    /// Transmitter state.
    pub transmitter_state: TransmitterState,
}

impl TimeData {
    /// Unpack the fields of a descrambled time frame.
    ///
    /// The 35-bit epoch counter T is assembled MSB first from the low five
    /// bits of byte 3, bytes 4..=6 and the MSB of byte 7; its untransmitted
    /// low five bits read as zero.
    pub fn from_frame(frame: &TimeFrame) -> Self {
        let bits = frame[3..8].view_bits::<Msb0>();
        let epochs = bits[3..33].load_be::<u64>() << 5;

        let byte7 = frame[7];
        let utc_seconds_since_2000 = epochs * TIME_RESOLUTION_SECONDS;

        Self {
            utc_seconds_since_2000,
            unix_seconds: utc_seconds_since_2000 + EPOCH_2000_UNIX_OFFSET,
            offset: TimeZoneOffset::from_wire((byte7 >> 5) & 0x03),
            time_zone_change_announced: byte7 & 0x04 != 0,
            leap_second_announced: byte7 & 0x10 != 0,
            leap_second_positive: byte7 & 0x08 != 0,
            transmitter_state: TransmitterState::from_wire(byte7 & 0x03),
        }
    }
}
