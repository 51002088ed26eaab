use irbridge_shared::protocol::Command;
use irbridge_shared::{SerialLink, SignalCode};

pub fn transmit(link: &mut SerialLink, code: SignalCode, repeat: bool) -> anyhow::Result<()> {
    let cmd = Command::NecSend { code, repeat };

    log::info!("Sending command: {:?}", cmd);
    link.send_command(&cmd)?;

    Ok(())
}
