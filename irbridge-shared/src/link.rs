use std::io::{self, Read, Write};
use std::{path::Path, time::Duration};

use serialport::{SerialPort, SerialPortInfo};

use crate::protocol::{decode, encode, Command, Reply, MAX_FRAME_LEN};

/// How long a read waits for the dongle before giving up
const READ_TIMEOUT: Duration = Duration::from_millis(10);

pub struct SerialLink {
    port: Box<dyn SerialPort>,
    rxbuf: Vec<u8>,
}

impl SerialLink {
    pub fn list_ports() -> Result<Vec<SerialPortInfo>, serialport::Error> {
        serialport::available_ports()
    }

    pub fn connect<P: AsRef<Path>>(path: P) -> Result<Self, serialport::Error> {
        let path = path.as_ref().to_string_lossy();
        let port = serialport::new(path, 115_200)
            .timeout(READ_TIMEOUT)
            .open()?;

        Ok(SerialLink {
            port,
            rxbuf: Vec::new(),
        })
    }

    /// Another handle to the same port. Received bytes are not shared.
    pub fn try_clone(&self) -> Result<Self, serialport::Error> {
        Ok(SerialLink {
            port: self.port.try_clone()?,
            rxbuf: Vec::new(),
        })
    }

    pub fn send_command(&mut self, cmd: &Command) -> io::Result<()> {
        let mut buf = [0u8; MAX_FRAME_LEN];
        let frame = encode(cmd, &mut buf)
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidInput, format!("{:?}", err)))?;

        log::debug!("-> {:?}", cmd);
        self.port.write_all(frame)
    }

    /// Read what the port has and return a reply if a whole frame arrived.
    /// Waits at most the read timeout.
    pub fn poll_reply(&mut self) -> io::Result<Option<Reply>> {
        let mut chunk = [0u8; 256];

        match self.port.read(&mut chunk) {
            Ok(readlen) => self.rxbuf.extend_from_slice(&chunk[..readlen]),
            Err(ref e) if is_idle(e) => (),
            Err(e) => return Err(e),
        }

        if discard_overflow(&mut self.rxbuf) {
            log::warn!("No frame end in {} bytes, dropped them", MAX_FRAME_LEN);
        }

        match next_frame(&mut self.rxbuf) {
            Some(mut frame) => {
                let reply = decode::<Reply>(&mut frame)
                    .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, format!("{:?}", err)))?;
                log::debug!("<- {:?}", reply);
                Ok(Some(reply))
            }
            None => Ok(None),
        }
    }
}

/// Nothing arrived in time, the port is still fine
fn is_idle(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted
    )
}

/// Clear a buffer holding more than a frame's worth of bytes without a
/// terminator. Returns true if bytes were dropped.
fn discard_overflow(rxbuf: &mut Vec<u8>) -> bool {
    if rxbuf.len() > MAX_FRAME_LEN && !rxbuf.contains(&0) {
        rxbuf.clear();
        true
    } else {
        false
    }
}

/// Split off the first zero terminated frame
fn next_frame(rxbuf: &mut Vec<u8>) -> Option<Vec<u8>> {
    let end = rxbuf.iter().position(|b| *b == 0)?;
    Some(rxbuf.drain(..=end).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frames_are_split_on_zero() {
        let mut rxbuf = vec![3, 1, 2, 0, 2, 7];

        assert_eq!(next_frame(&mut rxbuf), Some(vec![3, 1, 2, 0]));
        assert_eq!(rxbuf, [2, 7]);
        assert_eq!(next_frame(&mut rxbuf), None);

        rxbuf.push(0);
        assert_eq!(next_frame(&mut rxbuf), Some(vec![2, 7, 0]));
        assert!(rxbuf.is_empty());
    }

    #[test]
    fn unterminated_garbage_is_dropped() {
        let mut rxbuf = vec![0xAA; MAX_FRAME_LEN];
        assert!(!discard_overflow(&mut rxbuf));
        assert_eq!(rxbuf.len(), MAX_FRAME_LEN);

        rxbuf.push(0xAA);
        assert!(discard_overflow(&mut rxbuf));
        assert!(rxbuf.is_empty());

        // A pending frame end is kept for next_frame
        let mut rxbuf = vec![0xAA; MAX_FRAME_LEN + 1];
        rxbuf.push(0);
        assert!(!discard_overflow(&mut rxbuf));
        assert_eq!(next_frame(&mut rxbuf).map(|f| f.len()), Some(MAX_FRAME_LEN + 2));
    }

    #[test]
    fn timeouts_are_idle() {
        assert!(is_idle(&io::ErrorKind::TimedOut.into()));
        assert!(is_idle(&io::ErrorKind::WouldBlock.into()));
        assert!(!is_idle(&io::ErrorKind::BrokenPipe.into()));
        assert!(!is_idle(&io::ErrorKind::NotConnected.into()));
    }

    #[test]
    fn partial_frames_are_reassembled() {
        let reply = Reply::Ok;
        let mut buf = [0u8; MAX_FRAME_LEN];
        let frame = encode(&reply, &mut buf).unwrap().to_vec();

        let (head, tail) = frame.split_at(1);
        let mut rxbuf = head.to_vec();
        assert_eq!(next_frame(&mut rxbuf), None);

        rxbuf.extend_from_slice(tail);
        let mut whole = next_frame(&mut rxbuf).unwrap();
        assert_eq!(decode::<Reply>(&mut whole).unwrap(), Reply::Ok);
    }
}
