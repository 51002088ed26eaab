//! The translator's hardware, reached through an IR dongle on a serial port

use std::fmt;
use std::io::{self, Write};

use embedded_hal::digital::v2::OutputPin;

use irbridge_shared::protocol::{Command, DecodedFrame, Reply};
use irbridge_shared::{DecodedSignal, IrReceiver, IrSender, SerialLink, SignalCode};

use crate::vcdutils::VcdWriter;

pub struct DongleReceiver<W: Write> {
    link: SerialLink,
    frame: Option<DecodedFrame>,
    capture: Option<VcdWriter<W>>,
    /// The link is gone, nothing more will be decoded
    failed: Option<io::Error>,
}

impl<W: Write> DongleReceiver<W> {
    /// Arms the dongle's receiver
    pub fn new(mut link: SerialLink, capture: Option<VcdWriter<W>>) -> io::Result<Self> {
        link.send_command(&Command::Listen)?;

        Ok(DongleReceiver {
            link,
            frame: None,
            capture,
            failed: None,
        })
    }

    pub fn link_error(&self) -> Option<&io::Error> {
        self.failed.as_ref()
    }

    fn capture(&mut self, frame: &DecodedFrame) {
        if let Some(vcd) = self.capture.as_mut() {
            if let Err(err) = vcd.write_pulses(frame.raw.micros()) {
                log::warn!("Failed to write capture: {}", err);
            }
        }
    }
}

impl<W: Write> IrReceiver for DongleReceiver<W> {
    fn try_decode(&mut self) -> bool {
        if self.frame.is_some() {
            return true;
        }

        if self.failed.is_some() {
            return false;
        }

        match self.link.poll_reply() {
            Ok(Some(Reply::Decoded { frame })) => {
                if frame.protocol().is_none() {
                    self.capture(&frame);
                }
                self.frame = Some(frame);
                true
            }
            Ok(Some(reply)) => {
                log::debug!("Ignoring {:?}", reply);
                false
            }
            Ok(None) => false,
            Err(err) if !is_fatal(&err) => {
                log::warn!("Link: {}", err);
                false
            }
            Err(err) => {
                log::error!("Link failed: {}", err);
                self.failed = Some(err);
                false
            }
        }
    }

    fn decoded(&self) -> DecodedSignal {
        self.frame
            .as_ref()
            .map(|frame| DecodedSignal {
                code: frame.code,
                protocol_recognized: frame.protocol().is_some(),
            })
            .unwrap_or_default()
    }

    fn fmt_summary(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.frame {
            Some(frame) => write!(f, "{}", frame),
            None => Ok(()),
        }
    }

    fn fmt_raw(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.frame {
            Some(frame) => write!(f, "{}", frame.raw),
            None => Ok(()),
        }
    }

    fn resume(&mut self) {
        self.frame = None;

        if let Err(err) = self.link.send_command(&Command::Resume) {
            log::warn!("Failed to resume receiver: {}", err);
        }
    }
}

/// Undecodable frames are skipped, anything else means the port is gone
fn is_fatal(err: &io::Error) -> bool {
    err.kind() != io::ErrorKind::InvalidData
}

pub struct DongleSender {
    link: SerialLink,
}

impl DongleSender {
    pub fn new(link: SerialLink) -> Self {
        DongleSender { link }
    }
}

impl IrSender for DongleSender {
    type Error = io::Error;

    fn send_nec(&mut self, code: SignalCode, repeat: bool) -> Result<(), Self::Error> {
        self.link.send_command(&Command::NecSend { code, repeat })
    }
}

/// The dongle's led
pub struct DongleLed {
    link: SerialLink,
}

impl DongleLed {
    pub fn new(link: SerialLink) -> Self {
        DongleLed { link }
    }
}

impl OutputPin for DongleLed {
    type Error = io::Error;

    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.link.send_command(&Command::Status(false))
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.link.send_command(&Command::Status(true))
    }
}
