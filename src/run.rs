use std::fmt::Debug;
use std::fs::File;
use std::io;

use embedded_hal::blocking::delay::DelayMs;
use embedded_hal::digital::v2::OutputPin;

use irbridge_shared::{IrReceiver, IrSender, SerialLink, TranslationRule, Translator};

use crate::config::Config;
use crate::delay::StdDelay;
use crate::dongle::{DongleLed, DongleReceiver, DongleSender};
use crate::vcdutils::VcdWriter;

/// A receiver whose link can fail for good
pub trait LinkStatus {
    fn link_error(&self) -> Option<&io::Error>;
}

impl<W: io::Write> LinkStatus for DongleReceiver<W> {
    fn link_error(&self) -> Option<&io::Error> {
        DongleReceiver::link_error(self)
    }
}

/// Translate until the dongle goes away
pub fn command_run(
    link: SerialLink,
    config: Config,
    capture_file: Option<File>,
) -> anyhow::Result<()> {
    let capture = capture_file.map(VcdWriter::new).transpose()?;

    let receiver = DongleReceiver::new(link.try_clone()?, capture)?;
    let sender = DongleSender::new(link.try_clone()?);
    let led = DongleLed::new(link);

    let mut translator =
        Translator::with_config(receiver, sender, led, StdDelay, config.translator);

    log::info!(
        "Translating {} rules, unrecognized protocols {}",
        config.rules.len(),
        if config.translator.match_unrecognized {
            "match"
        } else {
            "ignored"
        }
    );

    translate(&mut translator, &config.rules)
}

fn translate<RX, TX, PIN, D>(
    translator: &mut Translator<RX, TX, PIN, D>,
    rules: &[TranslationRule],
) -> anyhow::Result<()>
where
    RX: IrReceiver + LinkStatus,
    TX: IrSender,
    PIN: OutputPin,
    PIN::Error: Debug,
    D: DelayMs<u32>,
{
    loop {
        if let Some(idx) = translator.cycle(rules) {
            log::debug!("Rule {} fired", rules[idx]);
        }

        if let Some(err) = translator.receiver().link_error() {
            anyhow::bail!("Lost the dongle: {}", err);
        }
    }
}
