use std::io::{self, Write};

use vcd::{self, SimulationCommand, TimescaleUnit, Value};

/// Idle time written between two captured pulse trains, in microseconds
const GAP_US: u64 = 50_000;

/// Writes pulse trains to a single wire VCD, one microsecond per tick
pub struct VcdWriter<W: Write> {
    vcd: vcd::Writer<W>,
    timestamp: u64,
    wire_id: vcd::IdCode,
}

impl<W: Write> VcdWriter<W> {
    /// Create a new vcd writer and write the header
    pub fn new(writer: W) -> io::Result<Self> {
        let mut vcd = vcd::Writer::new(writer);

        vcd.timescale(1, TimescaleUnit::US)?;
        vcd.add_module("top")?;
        let wire_id = vcd.add_wire(1, "ir")?;
        vcd.upscope()?;
        vcd.enddefinitions()?;

        // Write the initial values
        vcd.begin(SimulationCommand::Dumpvars)?;
        vcd.change_scalar(wire_id, Value::V0)?;
        vcd.end()?;

        Ok(Self {
            vcd,
            timestamp: 0,
            wire_id,
        })
    }

    /// Write edge distances in microseconds, starting with a rising edge
    pub fn write_pulses<I: IntoIterator<Item = u64>>(&mut self, micros: I) -> io::Result<()> {
        let mut ts = 0;
        let mut level = true;

        for delta in micros {
            self.write_value(ts, level)?;
            ts += delta;
            level = !level;
        }

        // Always end low
        if !level {
            self.write_value(ts, false)?;
        }

        self.timestamp += ts + GAP_US;
        Ok(())
    }

    fn write_value(&mut self, ts: u64, high: bool) -> io::Result<()> {
        self.vcd.timestamp(self.timestamp + ts)?;
        let value = if high { Value::V1 } else { Value::V0 };
        self.vcd.change_scalar(self.wire_id, value)
    }
}
