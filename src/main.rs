//! `irrinode-sim`: the firmware core running against simulated
//! peripherals.
//!
//! Drives one full node lifetime: boot, a scripted conversation with a
//! configuration tool, an alarm period, and the descent into deep
//! sleep.  Useful for eyeballing the frame traffic and the log output
//! without hardware on the bench.

use anyhow::Result;
use log::{info, LevelFilter};

use irrinode::app::node::{LoopOutcome, Node};
use irrinode::app::ports::{ClockPort, RadioPort};
use irrinode::config::NodeConfig;
use irrinode::datetime::DateTime;
use irrinode::proto::command::{CommandByte, CommandId, Destination, Origin};
use irrinode::proto::{SYNC1, SYNC2};
use irrinode::sim::{SimAnalogHw, SimClock, SimEeprom, SimRadio};

// ───────────────────────────────────────────────────────────────
// Logging
// ───────────────────────────────────────────────────────────────

struct StderrLogger;

static LOGGER: StderrLogger = StderrLogger;

impl log::Log for StderrLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::Level::Debug
    }

    fn log(&self, record: &log::Record) {
        if self.enabled(record.metadata()) {
            eprintln!("[{:5}] {}: {}", record.level(), record.target(), record.args());
        }
    }

    fn flush(&self) {}
}

// ───────────────────────────────────────────────────────────────
// Script helpers
// ───────────────────────────────────────────────────────────────

/// Frame bytes as the configuration tool would put them on the air.
fn software_frame(id: CommandId, payload: &[u8]) -> Vec<u8> {
    let cmd = CommandByte {
        destination: Destination::Endpoint,
        origin: Origin::Software,
        id,
    };
    let mut bytes = vec![SYNC1, SYNC2, payload.len() as u8 + 1, cmd.encode()];
    bytes.extend_from_slice(payload);
    bytes
}

fn hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join(" ")
}

// ───────────────────────────────────────────────────────────────
// Entry point
// ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    log::set_logger(&LOGGER)?;
    log::set_max_level(LevelFilter::Debug);

    let config = NodeConfig::default();
    let mut hw = SimAnalogHw::new();
    let mut clock = SimClock::new();
    let mut eeprom = SimEeprom::new();
    let mut radio = SimRadio::new();
    radio.init()?;

    // Channel 0 reads dry, channel 1 reads wet.
    hw.set_reading(0, 180);
    hw.set_reading(1, 910);
    for ch in 2..6 {
        hw.set_reading(ch, 700);
    }

    let mut node = Node::new(&config, clock.tick_count());
    node.startup(&config, &mut clock, &eeprom, &hw);

    // The configuration tool's side of the conversation, queued as
    // one burst of air traffic.
    let now = DateTime {
        year: 0x26,
        month: 0x08,
        day: 0x30,
        weekday: 0x06,
        hours: 0x09,
        minutes: 0x15,
        seconds: 0x04,
    };
    let mut script = Vec::new();
    script.extend(software_frame(CommandId::Message, b"ping"));
    script.extend(software_frame(CommandId::SetDateTime, &now.to_wire()));
    script.extend(software_frame(
        CommandId::SetControlConfig,
        &[2, 1, 0x58, 0x02, 0x84, 0x03], // channel 2, sensor mode, 600/900
    ));
    script.extend(software_frame(CommandId::GetControlConfig, &[2]));
    script.extend(software_frame(CommandId::SaveConfig, &[]));
    script.extend(software_frame(CommandId::SendSamples, &[]));
    radio.push_inbound(&script);

    let mut iterations = 0u32;
    loop {
        iterations += 1;
        let outcome = node.run_iteration(&mut hw, &mut clock, &mut eeprom, &mut radio);
        clock.advance(100);
        match iterations {
            // Channel 0's dry reading has opened its valve by now; an
            // open valve inhibits sleep even against PowerDown.
            3 => radio.push_inbound(&software_frame(CommandId::PowerDown, &[])),
            // The plot waters itself: next alarm-driven re-check reads
            // wet, closes the valve, and the forced sleep goes through.
            5 => {
                hw.set_reading(0, 905);
                clock.fire_alarm();
            }
            _ => {}
        }
        match outcome {
            LoopOutcome::Continue => {
                if iterations > 10_000 {
                    anyhow::bail!("node never slept");
                }
            }
            LoopOutcome::DeepSleep => break,
        }
    }

    info!("slept after {iterations} iterations");
    println!("transmitted frames:");
    for (cmd, payload) in radio.sent_frames() {
        println!("  cmd {cmd:02X}  payload [{}]", hex(&payload));
    }
    println!(
        "valves: {:?}",
        (0..6).map(|i| hw.valve_level(i)).collect::<Vec<_>>()
    );
    Ok(())
}
