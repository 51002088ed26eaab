use std::fs::File;
use std::path::PathBuf;

use structopt::StructOpt;

mod config;
mod delay;
mod dongle;
mod irsend;
mod run;
mod sim;
mod vcdutils;

use irbridge_shared::{DecodedSignal, SerialLink, SignalCode};

use crate::config::Config;
use crate::delay::StdDelay;

#[derive(Debug, StructOpt)]
#[structopt(name = "irbridge", about = "Translate the codes of one IR remote into another's")]
struct Opt {
    /// Serial Device. Defaults to the first port found, or /dev/ttyACM0
    #[structopt(long = "device", parse(from_os_str))]
    serial: Option<PathBuf>,
    #[structopt(short, long)]
    debug: bool,
    #[structopt(subcommand)]
    cmd: CliCommand,
}

#[derive(StructOpt, Debug)]
enum CliCommand {
    /// Translate received codes using the dongle
    Run {
        /// Rules file. Uses the built in rules if not given
        #[structopt(short, long, parse(from_os_str))]
        config: Option<PathBuf>,
        /// Write the pulses of unrecognized signals to this vcd file
        #[structopt(long, parse(from_os_str))]
        capture: Option<PathBuf>,
    },
    /// Run one decode cycle for a code, without the dongle
    Simulate {
        #[structopt(short, long, parse(from_os_str))]
        config: Option<PathBuf>,
        #[structopt(parse(try_from_str = parse_u16))]
        addr: u16,
        #[structopt(parse(try_from_str = parse_u16))]
        cmd: u16,
        /// Pretend the decoder did not recognize the protocol
        #[structopt(long)]
        unrecognized: bool,
    },
    /// Validate and list rules
    Check {
        #[structopt(short, long, parse(from_os_str))]
        config: Option<PathBuf>,
    },
    /// Transmit a NEC code
    Send {
        #[structopt(parse(try_from_str = parse_u16))]
        addr: u16,
        #[structopt(parse(try_from_str = parse_u16))]
        cmd: u16,
        #[structopt(long)]
        repeat: bool,
    },
    /// List serial ports
    Ports,
}

fn main() -> anyhow::Result<()> {
    let opt = Opt::from_args();

    let loglevel = if opt.debug {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(loglevel)
        .init();

    match opt.cmd {
        CliCommand::Run { config, capture } => {
            let config = Config::load(config.as_deref())?;
            let capture_file = capture.map(File::create).transpose()?;
            let link = SerialLink::connect(device_path(opt.serial))?;
            run::command_run(link, config, capture_file)
        }
        CliCommand::Simulate {
            config,
            addr,
            cmd,
            unrecognized,
        } => {
            let config = Config::load(config.as_deref())?;
            let signal = DecodedSignal {
                code: SignalCode::new(addr, cmd),
                protocol_recognized: !unrecognized,
            };

            let sim = sim::simulate(&config, signal, StdDelay);
            match sim.fired {
                Some(idx) => println!("{} -> {} codes sent", config.rules[idx], sim.sent.len()),
                None => println!("No rule matched"),
            }
            Ok(())
        }
        CliCommand::Check { config } => {
            let config = Config::load(config.as_deref())?;
            for rule in &config.rules {
                println!(
                    "{}\t{}\t{} codes, {} ms",
                    rule,
                    rule.trigger(),
                    rule.response().len(),
                    rule.response().total_delay()
                );
            }
            Ok(())
        }
        CliCommand::Send { addr, cmd, repeat } => {
            let mut link = SerialLink::connect(device_path(opt.serial))?;
            irsend::transmit(&mut link, SignalCode::new(addr, cmd), repeat)
        }
        CliCommand::Ports => {
            for port in SerialLink::list_ports()? {
                println!("{}", port.port_name);
            }
            Ok(())
        }
    }
}

fn device_path(serial: Option<PathBuf>) -> PathBuf {
    if let Some(path) = serial {
        return path;
    }

    SerialLink::list_ports()
        .ok()
        .and_then(|ports| ports.first().map(|port| PathBuf::from(&port.port_name)))
        .unwrap_or_else(|| PathBuf::from("/dev/ttyACM0"))
}

/// Decimal, or hex with a 0x prefix
fn parse_u16(s: &str) -> Result<u16, std::num::ParseIntError> {
    match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u16::from_str_radix(hex, 16),
        None => s.parse(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_numbers() {
        assert_eq!(parse_u16("16"), Ok(16));
        assert_eq!(parse_u16("0x10"), Ok(16));
        assert_eq!(parse_u16("0XfF"), Ok(255));
        assert!(parse_u16("0x10000").is_err());
        assert!(parse_u16("ten").is_err());
    }

    #[test]
    fn cli_parses_simulate() {
        let opt = Opt::from_iter(&["irbridge", "simulate", "0x10", "5", "--unrecognized"]);

        match opt.cmd {
            CliCommand::Simulate {
                addr,
                cmd,
                unrecognized,
                config,
            } => {
                assert_eq!((addr, cmd), (0x10, 5));
                assert!(unrecognized);
                assert!(config.is_none());
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
