//! Signal codes, and the rules that map one code onto a timed burst of others

use core::fmt;

use heapless::{String, Vec};
use serde::{Deserialize, Serialize};

/// Max number of emissions in a response
pub const MAX_SEQUENCE_LEN: usize = 10;

/// Max length of a rule name, in bytes
pub const MAX_NAME_LEN: usize = 32;

/// One IR command, address and command as decoded by the receiver
#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, Eq, PartialEq, Hash)]
pub struct SignalCode {
    pub address: u16,
    pub command: u16,
}

impl SignalCode {
    pub const fn new(address: u16, command: u16) -> Self {
        SignalCode { address, command }
    }
}

impl fmt::Display for SignalCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "address=0x{:X} command=0x{:X}", self.address, self.command)
    }
}

/// A code to send and the time to wait after it has been sent
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Eq, PartialEq)]
pub struct TimedEmission {
    pub code: SignalCode,
    /// Milliseconds
    pub delay: u32,
}

impl TimedEmission {
    pub const fn new(address: u16, command: u16, delay: u32) -> Self {
        TimedEmission {
            code: SignalCode::new(address, command),
            delay,
        }
    }
}

/// Ordered list of emissions sent in reply to a trigger.
///
/// The capacity is fixed at [`MAX_SEQUENCE_LEN`], so a sequence that exists
/// always satisfies the bound. Playback relies on that.
#[derive(Debug, Default, Clone, Eq, PartialEq)]
pub struct EmissionSequence(Vec<TimedEmission, MAX_SEQUENCE_LEN>);

impl EmissionSequence {
    pub fn new() -> Self {
        EmissionSequence(Vec::new())
    }

    pub fn from_slice(emissions: &[TimedEmission]) -> Result<Self, RuleError> {
        Vec::from_slice(emissions)
            .map(EmissionSequence)
            .map_err(|_| RuleError::SequenceTooLong {
                len: emissions.len(),
            })
    }

    pub fn iter(&self) -> core::slice::Iter<'_, TimedEmission> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sum of all delays, the time a playback of this sequence blocks for
    pub fn total_delay(&self) -> u64 {
        self.0.iter().map(|e| u64::from(e.delay)).sum()
    }
}

impl<'a> IntoIterator for &'a EmissionSequence {
    type Item = &'a TimedEmission;
    type IntoIter = core::slice::Iter<'a, TimedEmission>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Rejected rule configuration
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum RuleError {
    SequenceTooLong { len: usize },
    NameTooLong { len: usize },
}

impl fmt::Display for RuleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleError::SequenceTooLong { len } => write!(
                f,
                "response has {} emissions, at most {} allowed",
                len, MAX_SEQUENCE_LEN
            ),
            RuleError::NameTooLong { len } => write!(
                f,
                "name is {} bytes long, at most {} allowed",
                len, MAX_NAME_LEN
            ),
        }
    }
}

#[cfg(feature = "utils")]
impl std::error::Error for RuleError {}

/// A trigger code bound to the sequence sent when it is received
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct TranslationRule {
    name: Option<String<MAX_NAME_LEN>>,
    trigger: SignalCode,
    response: EmissionSequence,
}

impl TranslationRule {
    pub fn new(trigger: SignalCode, response: EmissionSequence) -> Self {
        TranslationRule {
            name: None,
            trigger,
            response,
        }
    }

    pub fn named(
        name: &str,
        trigger: SignalCode,
        response: EmissionSequence,
    ) -> Result<Self, RuleError> {
        let mut s = String::new();
        s.push_str(name)
            .map_err(|_| RuleError::NameTooLong { len: name.len() })?;

        Ok(TranslationRule {
            name: Some(s),
            trigger,
            response,
        })
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn trigger(&self) -> SignalCode {
        self.trigger
    }

    pub fn response(&self) -> &EmissionSequence {
        &self.response
    }

    /// Exact match on both address and command
    pub fn is_triggered_by(&self, code: SignalCode) -> bool {
        self.trigger == code
    }
}

impl fmt::Display for TranslationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "<{}>", self.trigger),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_bound_is_enforced() {
        let emissions = [TimedEmission::new(1, 2, 0); MAX_SEQUENCE_LEN + 1];

        assert_eq!(
            EmissionSequence::from_slice(&emissions),
            Err(RuleError::SequenceTooLong {
                len: MAX_SEQUENCE_LEN + 1
            })
        );

        let full = EmissionSequence::from_slice(&emissions[..MAX_SEQUENCE_LEN]).unwrap();
        assert_eq!(full.len(), MAX_SEQUENCE_LEN);
    }

    #[test]
    fn sequence_keeps_order_and_sums_delays() {
        let seq = EmissionSequence::from_slice(&[
            TimedEmission::new(0x01, 0x0A, 40),
            TimedEmission::new(0x01, 0x0B, 100),
        ])
        .unwrap();

        let commands: std::vec::Vec<u16> = seq.iter().map(|e| e.code.command).collect();
        assert_eq!(commands, [0x0A, 0x0B]);
        assert_eq!(seq.total_delay(), 140);
    }

    #[test]
    fn trigger_match_is_exact() {
        let rule = TranslationRule::new(SignalCode::new(0x10, 0x05), EmissionSequence::new());

        assert!(rule.is_triggered_by(SignalCode::new(0x10, 0x05)));
        assert!(!rule.is_triggered_by(SignalCode::new(0x10, 0x06)));
        assert!(!rule.is_triggered_by(SignalCode::new(0x11, 0x05)));
        assert!(!rule.is_triggered_by(SignalCode::new(0x05, 0x10)));
    }

    #[test]
    fn long_names_are_rejected() {
        let name = "a remote button name that is far too long";
        let err = TranslationRule::named(name, SignalCode::default(), EmissionSequence::new());

        assert_eq!(err, Err(RuleError::NameTooLong { len: name.len() }));
    }

    #[test]
    fn unnamed_rule_displays_trigger() {
        let rule = TranslationRule::new(SignalCode::new(0x10, 0x05), EmissionSequence::new());
        assert_eq!(rule.to_string(), "<address=0x10 command=0x5>");

        let rule = TranslationRule::named("power", SignalCode::new(0x10, 0x05), EmissionSequence::new())
            .unwrap();
        assert_eq!(rule.to_string(), "power");
    }
}
