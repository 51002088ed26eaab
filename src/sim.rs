//! Run the translator without a dongle. Decodes come from a script and
//! everything sent ends up in the log.

use std::collections::VecDeque;
use std::convert::Infallible;
use std::fmt;

use embedded_hal::blocking::delay::DelayMs;
use embedded_hal::digital::v2::OutputPin;

use irbridge_shared::{DecodedSignal, IrReceiver, IrSender, SignalCode, Translator};

use crate::config::Config;

#[derive(Debug, Default)]
pub struct ScriptedReceiver {
    script: VecDeque<DecodedSignal>,
    current: Option<DecodedSignal>,
    resumes: usize,
}

impl ScriptedReceiver {
    pub fn new<I: IntoIterator<Item = DecodedSignal>>(script: I) -> Self {
        ScriptedReceiver {
            script: script.into_iter().collect(),
            ..Default::default()
        }
    }

    pub fn resumes(&self) -> usize {
        self.resumes
    }
}

impl IrReceiver for ScriptedReceiver {
    fn try_decode(&mut self) -> bool {
        if self.current.is_none() {
            self.current = self.script.pop_front();
        }
        self.current.is_some()
    }

    fn decoded(&self) -> DecodedSignal {
        self.current.unwrap_or_default()
    }

    fn fmt_summary(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let decoded = self.decoded();
        let protocol = if decoded.protocol_recognized {
            "NEC"
        } else {
            "UNKNOWN"
        };

        write!(
            f,
            "Protocol={} Address=0x{:X} Command=0x{:X}",
            protocol, decoded.code.address, decoded.code.command
        )
    }

    fn fmt_raw(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("rawData[0]: (simulated)")
    }

    fn resume(&mut self) {
        self.current = None;
        self.resumes += 1;
    }
}

#[derive(Debug, Default)]
pub struct LogSender {
    sent: Vec<SignalCode>,
}

impl LogSender {
    pub fn sent(&self) -> &[SignalCode] {
        &self.sent
    }
}

impl IrSender for LogSender {
    type Error = Infallible;

    fn send_nec(&mut self, code: SignalCode, repeat: bool) -> Result<(), Self::Error> {
        log::debug!("NEC out: {} repeat={}", code, repeat);
        self.sent.push(code);
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct LogLed {
    active: bool,
    toggles: usize,
}

impl LogLed {
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn toggles(&self) -> usize {
        self.toggles
    }

    fn set(&mut self, active: bool) {
        if self.active != active {
            self.toggles += 1;
        }
        self.active = active;
        log::debug!("Status {}", if active { "on" } else { "off" });
    }
}

impl OutputPin for LogLed {
    type Error = Infallible;

    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.set(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.set(true);
        Ok(())
    }
}

#[derive(Debug)]
pub struct Simulation {
    /// Index of the rule that fired
    pub fired: Option<usize>,
    pub sent: Vec<SignalCode>,
    pub led_toggles: usize,
}

/// One decode cycle for `signal` against the configured rules
pub fn simulate<D: DelayMs<u32>>(config: &Config, signal: DecodedSignal, delay: D) -> Simulation {
    let mut translator = Translator::with_config(
        ScriptedReceiver::new(Some(signal)),
        LogSender::default(),
        LogLed::default(),
        delay,
        config.translator,
    );

    let fired = translator.cycle(&config.rules);
    let (receiver, sender, led, _) = translator.release();
    debug_assert_eq!(receiver.resumes(), 1);
    debug_assert!(!led.is_active());

    Simulation {
        fired,
        sent: sender.sent,
        led_toggles: led.toggles(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::delay::StdDelay;
    use irbridge_shared::TranslatorConfig;
    use std::time::{Duration, Instant};

    struct NoDelay;

    impl DelayMs<u32> for NoDelay {
        fn delay_ms(&mut self, _ms: u32) {}
    }

    #[test]
    fn power_button_sends_tv_codes() {
        let config = Config::builtin().unwrap();

        let start = Instant::now();
        let sim = simulate(&config, DecodedSignal::recognized(0x10, 0x05), StdDelay);

        assert!(start.elapsed() >= Duration::from_millis(140));
        assert_eq!(sim.fired, Some(0));
        assert_eq!(
            sim.sent,
            [SignalCode::new(0x01, 0x0A), SignalCode::new(0x01, 0x0B)]
        );
        assert_eq!(sim.led_toggles, 2);
    }

    #[test]
    fn unknown_button_sends_nothing() {
        let sim = simulate(
            &Config::builtin().unwrap(),
            DecodedSignal::recognized(0x10, 0x06),
            NoDelay,
        );

        assert_eq!(sim.fired, None);
        assert!(sim.sent.is_empty());
        assert_eq!(sim.led_toggles, 0);
    }

    #[test]
    fn unrecognized_protocol_respects_config() {
        let mut config = Config::builtin().unwrap();
        let signal = DecodedSignal::unrecognized(0x10, 0x0C);

        assert_eq!(simulate(&config, signal, NoDelay).fired, Some(1));

        config.translator = TranslatorConfig {
            match_unrecognized: false,
        };
        assert_eq!(simulate(&config, signal, NoDelay).fired, None);
    }

    #[test]
    fn scripted_receiver_holds_until_resume() {
        let mut receiver = ScriptedReceiver::new(vec![
            DecodedSignal::recognized(1, 1),
            DecodedSignal::recognized(2, 2),
        ]);

        assert!(receiver.try_decode());
        assert!(receiver.try_decode());
        assert_eq!(receiver.decoded().code, SignalCode::new(1, 1));

        receiver.resume();
        assert!(receiver.try_decode());
        assert_eq!(receiver.decoded().code, SignalCode::new(2, 2));

        receiver.resume();
        assert!(!receiver.try_decode());
        assert_eq!(receiver.resumes(), 2);
    }
}
