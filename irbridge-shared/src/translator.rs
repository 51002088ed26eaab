//! The translation engine
//!
//! One decode cycle is `begin`, `try_match` for each rule, then `end`. The
//! receiver is not resumed before `end`, so nothing new is decoded while
//! rules are evaluated or a response is played back.

use core::fmt::Debug;

use embedded_hal::blocking::delay::DelayMs;
use embedded_hal::digital::v2::OutputPin;

use crate::code::{EmissionSequence, TranslationRule};
use crate::transceiver::{DecodedSignal, IrReceiver, IrSender, RawDump, Summary};

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct TranslatorConfig {
    /// Let decodes of an unrecognized protocol match on the address and
    /// command the decoder extracted anyway
    pub match_unrecognized: bool,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        TranslatorConfig {
            match_unrecognized: true,
        }
    }
}

pub struct Translator<RX, TX, PIN, D> {
    receiver: RX,
    sender: TX,
    status: PIN,
    delay: D,
    config: TranslatorConfig,
    /// Decode waiting for `end`
    pending: Option<DecodedSignal>,
}

impl<RX, TX, PIN, D> Translator<RX, TX, PIN, D>
where
    RX: IrReceiver,
    TX: IrSender,
    PIN: OutputPin,
    PIN::Error: Debug,
    D: DelayMs<u32>,
{
    pub fn new(receiver: RX, sender: TX, status: PIN, delay: D) -> Self {
        Self::with_config(receiver, sender, status, delay, TranslatorConfig::default())
    }

    pub fn with_config(
        receiver: RX,
        sender: TX,
        status: PIN,
        delay: D,
        config: TranslatorConfig,
    ) -> Self {
        Translator {
            receiver,
            sender,
            status,
            delay,
            config,
            pending: None,
        }
    }

    /// Poll the receiver and, if a signal was decoded, hold it for matching
    pub fn begin(&mut self) {
        if self.pending.is_some() {
            return;
        }

        if !self.receiver.try_decode() {
            return;
        }

        let decoded = self.receiver.decoded();

        log::info!("{}", Summary(&self.receiver));
        if !decoded.protocol_recognized {
            // Unknown protocol, dump the timings
            log::info!("{}", RawDump(&self.receiver));
        }

        self.pending = Some(decoded);
    }

    /// Play back the rule's response if the pending decode is its trigger.
    /// Returns true if the rule fired.
    pub fn try_match(&mut self, rule: &TranslationRule) -> bool {
        let decoded = match self.pending {
            Some(decoded) => decoded,
            None => return false,
        };

        if !decoded.protocol_recognized && !self.config.match_unrecognized {
            return false;
        }

        if !rule.is_triggered_by(decoded.code) {
            return false;
        }

        log::info!("Received data matches {}", rule);
        log::info!("Start sending...");

        self.set_status(true);
        self.playback(rule.response());
        self.set_status(false);

        log::info!("End sending!");
        true
    }

    /// Resume the receiver if a decode was pending
    pub fn end(&mut self) {
        if self.pending.take().is_some() {
            self.receiver.resume();
        }
    }

    /// A full decode cycle against `rules`. Every rule is tried, the index
    /// of the first one that fired is returned.
    pub fn cycle(&mut self, rules: &[TranslationRule]) -> Option<usize> {
        self.begin();

        let mut fired = None;
        for (idx, rule) in rules.iter().enumerate() {
            if self.try_match(rule) && fired.is_none() {
                fired = Some(idx);
            }
        }

        self.end();
        fired
    }

    /// Blocks for the sum of the delays. No way to cut it short.
    fn playback(&mut self, sequence: &EmissionSequence) {
        for emission in sequence {
            log::info!("Send now: {}", emission.code);

            if let Err(err) = self.sender.send_nec(emission.code, false) {
                log::warn!("Sending {} failed: {:?}", emission.code, err);
            }

            self.delay.delay_ms(emission.delay);
        }
    }

    fn set_status(&mut self, active: bool) {
        let res = if active {
            self.status.set_high()
        } else {
            self.status.set_low()
        };

        if let Err(err) = res {
            log::warn!("Failed to set status output: {:?}", err);
        }
    }
}

impl<RX, TX, PIN, D> Translator<RX, TX, PIN, D> {
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn receiver(&self) -> &RX {
        &self.receiver
    }

    pub fn release(self) -> (RX, TX, PIN, D) {
        (self.receiver, self.sender, self.status, self.delay)
    }
}
