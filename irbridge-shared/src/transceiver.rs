//! The IR hardware the translator drives.
//!
//! Decoding and NEC modulation live behind these traits. The status output
//! and the delay come from `embedded-hal`, so board support crates plug in
//! directly.

use core::fmt;

use crate::code::SignalCode;

/// Result of the last decode
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq)]
pub struct DecodedSignal {
    pub code: SignalCode,
    /// False when the decoder did not recognize the protocol. `code` then
    /// holds whatever the decoder managed to extract.
    pub protocol_recognized: bool,
}

impl DecodedSignal {
    pub const fn recognized(address: u16, command: u16) -> Self {
        DecodedSignal {
            code: SignalCode::new(address, command),
            protocol_recognized: true,
        }
    }

    pub const fn unrecognized(address: u16, command: u16) -> Self {
        DecodedSignal {
            code: SignalCode::new(address, command),
            protocol_recognized: false,
        }
    }
}

pub trait IrReceiver {
    /// Poll the decoder. Must not block. Returns true while a complete
    /// signal is buffered.
    fn try_decode(&mut self) -> bool;

    /// The buffered signal. Only meaningful after `try_decode` returned true.
    fn decoded(&self) -> DecodedSignal;

    /// One line, human readable summary of the buffered signal
    fn fmt_summary(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result;

    /// Raw pulse timings of the buffered signal
    fn fmt_raw(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result;

    /// Drop the buffered signal and start listening again
    fn resume(&mut self);
}

/// NEC transmitter. Fire and forget, there is no acknowledgment.
pub trait IrSender {
    type Error: fmt::Debug;

    fn send_nec(&mut self, code: SignalCode, repeat: bool) -> Result<(), Self::Error>;
}

/// Formats the receiver summary through `Display`, for the log macros
pub(crate) struct Summary<'a, R>(pub &'a R);

impl<R: IrReceiver> fmt::Display for Summary<'_, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt_summary(f)
    }
}

pub(crate) struct RawDump<'a, R>(pub &'a R);

impl<R: IrReceiver> fmt::Display for RawDump<'_, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt_raw(f)
    }
}
