use core::fmt;

use infrared::ProtocolId;
use serde::{Deserialize, Serialize};

use crate::code::SignalCode;

/// Size of the frame buffers on both ends of the link
pub const MAX_FRAME_LEN: usize = 512;

/// Host to dongle
#[derive(Serialize, Deserialize, Debug, Eq, PartialEq)]
pub enum Command {
    /// Arm the receiver
    Listen,
    /// Drop the last decode and listen again
    Resume,
    NecSend { code: SignalCode, repeat: bool },
    /// Drive the status led
    Status(bool),
}

/// Dongle to host. After `Decoded` the dongle stops listening until it gets
/// a `Resume`.
#[derive(Serialize, Deserialize, Debug, Eq, PartialEq)]
pub enum Reply {
    Ok,
    Decoded { frame: DecodedFrame },
}

#[derive(Serialize, Deserialize, Debug, Clone, Eq, PartialEq)]
pub struct DecodedFrame {
    /// `ProtocolId` of the decoder that recognized the signal
    pub pid: Option<u8>,
    pub code: SignalCode,
    pub repeat: bool,
    pub raw: CaptureData,
}

impl DecodedFrame {
    pub fn protocol(&self) -> Option<Pid> {
        self.pid.and_then(Pid::from_u8)
    }
}

impl fmt::Display for DecodedFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.protocol() {
            Some(pid) => write!(f, "Protocol={}", pid)?,
            None => f.write_str("Protocol=UNKNOWN")?,
        }

        write!(
            f,
            " Address=0x{:X} Command=0x{:X}",
            self.code.address, self.code.command
        )?;

        if self.repeat {
            f.write_str(" Repeat")?;
        }

        if self.protocol().is_none() {
            write!(f, " Raw-Data len={}", self.raw.len)?;
        }

        Ok(())
    }
}

/// Edge distances, in samples, of a captured pulse train
#[derive(Serialize, Deserialize, Debug, Clone, Eq, PartialEq)]
pub struct CaptureData {
    pub samplerate: u32,
    pub len: u32,
    pub bufs: [[u16; 32]; 4],
}

impl CaptureData {
    pub fn edges(&self) -> impl Iterator<Item = u16> + '_ {
        self.bufs.iter().flatten().copied().take(self.len as usize)
    }

    /// Edge distances in microseconds
    pub fn micros(&self) -> impl Iterator<Item = u64> + '_ {
        let samplerate = u64::from(self.samplerate);
        self.edges().map(move |samples| {
            if samplerate == 0 {
                u64::from(samples)
            } else {
                u64::from(samples) * 1_000_000 / samplerate
            }
        })
    }
}

impl Default for CaptureData {
    fn default() -> Self {
        CaptureData {
            samplerate: 0,
            len: 0,
            bufs: [[0; 32]; 4],
        }
    }
}

impl fmt::Display for CaptureData {
    /// Alternating marks and spaces, marks first
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rawData[{}]:", self.len)?;

        for (i, us) in self.micros().enumerate() {
            let sign = if i % 2 == 0 { '+' } else { '-' };
            write!(f, " {}{}", sign, us)?;
        }

        Ok(())
    }
}

/// Protocol Id
#[derive(Debug, Clone, Copy)]
pub struct Pid(infrared::ProtocolId);

const KNOWN_PROTOCOLS: [ProtocolId; 7] = [
    ProtocolId::Nec,
    ProtocolId::Nec16,
    ProtocolId::NecSamsung,
    ProtocolId::NecApple,
    ProtocolId::Rc5,
    ProtocolId::Rc6,
    ProtocolId::Sbp,
];

impl Pid {
    pub fn from_u8(id: u8) -> Option<Pid> {
        KNOWN_PROTOCOLS
            .iter()
            .copied()
            .find(|pid| *pid as u8 == id)
            .map(Pid)
    }
}

impl fmt::Display for Pid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self.0 {
            ProtocolId::Nec => "NEC",
            ProtocolId::Nec16 => "NEC16",
            ProtocolId::NecSamsung => "SAMSUNG",
            ProtocolId::NecApple => "APPLE",
            ProtocolId::Rc5 => "RC5",
            ProtocolId::Rc6 => "RC6",
            ProtocolId::Sbp => "SBP",
            _ => return write!(f, "{:?}", self.0),
        };
        f.write_str(name)
    }
}

/// COBS framed postcard encoding, terminated by a zero byte
pub fn encode<'a, T: Serialize>(msg: &T, buf: &'a mut [u8]) -> postcard::Result<&'a mut [u8]> {
    postcard::to_slice_cobs(msg, buf)
}

/// Decode one frame, as produced by [`encode`]
pub fn decode<'a, T: Deserialize<'a>>(frame: &'a mut [u8]) -> postcard::Result<T> {
    postcard::from_bytes_cobs(frame)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nec_frame() -> DecodedFrame {
        let mut raw = CaptureData {
            samplerate: 40_000,
            len: 4,
            ..CaptureData::default()
        };
        raw.bufs[0][..4].copy_from_slice(&[360, 180, 22, 68]);

        DecodedFrame {
            pid: Some(ProtocolId::Nec as u8),
            code: SignalCode::new(0x10, 0x05),
            repeat: false,
            raw,
        }
    }

    #[test]
    fn decoded_reply_survives_framing() {
        let reply = Reply::Decoded { frame: nec_frame() };

        let mut buf = [0u8; MAX_FRAME_LEN];
        let frame = encode(&reply, &mut buf).unwrap();

        assert_eq!(frame.last(), Some(&0));
        assert!(!frame[..frame.len() - 1].contains(&0));

        let decoded: Reply = decode(frame).unwrap();
        assert_eq!(decoded, reply);
    }

    #[test]
    fn protocol_ids() {
        let pid = Pid::from_u8(ProtocolId::Rc5 as u8).unwrap();
        assert_eq!(pid.to_string(), "RC5");
        assert_eq!(Pid::from_u8(ProtocolId::Nec as u8).unwrap().to_string(), "NEC");

        assert!(Pid::from_u8(0xEE).is_none());
    }

    #[test]
    fn summary_line() {
        let frame = nec_frame();
        assert_eq!(frame.to_string(), "Protocol=NEC Address=0x10 Command=0x5");

        let unknown = DecodedFrame { pid: None, ..nec_frame() };
        assert_eq!(
            unknown.to_string(),
            "Protocol=UNKNOWN Address=0x10 Command=0x5 Raw-Data len=4"
        );
    }

    #[test]
    fn raw_dump_in_micros() {
        assert_eq!(
            nec_frame().raw.to_string(),
            "rawData[4]: +9000 -4500 +550 -1700"
        );
    }
}
