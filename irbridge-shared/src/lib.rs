//! Translate one IR remote's codes into timed sequences of another's.
//!
//! The engine in [`translator`] only needs the traits in [`transceiver`]
//! and `embedded-hal`, and builds without `std`. The `utils` feature adds
//! the serial link used by the host tool.

#![cfg_attr(not(any(test, feature = "utils")), no_std)]

pub mod code;
pub mod protocol;
pub mod transceiver;
pub mod translator;

#[cfg(feature = "utils")]
mod link;

pub use code::{
    EmissionSequence, RuleError, SignalCode, TimedEmission, TranslationRule, MAX_NAME_LEN,
    MAX_SEQUENCE_LEN,
};
pub use transceiver::{DecodedSignal, IrReceiver, IrSender};
pub use translator::{Translator, TranslatorConfig};

#[cfg(feature = "utils")]
pub use link::SerialLink;
