//! The node: one explicit application context owned by the main loop.
//!
//! The channel list, the timeout counters, the pending-task flags and
//! the frame decoder all live in [`Node`], passed by reference into
//! each component call.  The main loop runs a fixed iteration order:
//!
//! ```text
//! task setup → sensor/valve pass → radio reception/dispatch → power decision
//! ```
//!
//! Deep sleep ends the process: the caller of
//! [`run_iteration`](Node::run_iteration) stops executing on
//! [`LoopOutcome::DeepSleep`], and the next wake re-runs all
//! initialization from scratch.

use log::{info, warn};

use super::ports::{AnalogPort, ClockPort, RadioPort, StoragePort, ValvePort};
use crate::config::NodeConfig;
use crate::control::channels::ChannelBank;
use crate::control::sampler::sampling_pass;
use crate::datetime::DateTime;
use crate::power::{PowerManager, SleepDecision};
use crate::proto::codec::{send_frame, FrameDecoder};
use crate::proto::command::{CommandByte, CommandId, Destination, Origin};
use crate::proto::dispatch::dispatch;
use crate::store;

// ───────────────────────────────────────────────────────────────
// Task flags
// ───────────────────────────────────────────────────────────────

/// Pending work, set by the alarm, the dispatcher, or task setup, and
/// consumed once per main-loop iteration.
#[derive(Debug, Clone, Copy, Default)]
pub struct TaskFlags {
    /// Re-run the task-setup pass (alarm fired, or calendar moved).
    pub setup_tasks: bool,
    /// The RTCC has no valid calendar; ask the router for one.
    pub request_calendar: bool,
    /// Poll the router for queued messages.
    pub request_messages: bool,
    /// A peer asked for samples: run a pass and broadcast it.
    pub send_samples: bool,
    /// Internal re-check: run a pass without broadcasting.
    pub read_sensors: bool,
}

/// What the main loop should do after one iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopOutcome {
    Continue,
    /// Radio is powered down; stop executing.  Wake is a fresh boot.
    DeepSleep,
}

// ───────────────────────────────────────────────────────────────
// Node
// ───────────────────────────────────────────────────────────────

/// The application context.
pub struct Node {
    pub bank: ChannelBank,
    pub power: PowerManager,
    pub flags: TaskFlags,
    decoder: FrameDecoder,
}

impl Node {
    pub fn new(config: &NodeConfig, now: u32) -> Self {
        Self {
            bank: ChannelBank::default(),
            power: PowerManager::new(config.inactivity_timeout_ticks, now),
            flags: TaskFlags {
                setup_tasks: true,
                ..TaskFlags::default()
            },
            decoder: FrameDecoder::new(),
        }
    }

    /// Boot-time bring-up: restore persisted configuration and program
    /// the RTCC alarm.  A load failure keeps the compiled-in defaults;
    /// the node must run unattended either way.
    pub fn startup(
        &mut self,
        config: &NodeConfig,
        clock: &mut impl ClockPort,
        storage: &impl StoragePort,
        valves: &impl ValvePort,
    ) {
        if let Err(e) = store::load(&mut self.bank, storage, valves) {
            warn!("configuration load failed ({e}), using compiled-in defaults");
        }

        // Alarm matches at minute/second zero; cadence from config.
        let alarm = DateTime::default();
        clock.write_alarm_time(&alarm);
        clock.set_alarm_frequency(config.alarm_frequency);

        self.power.reset(clock.tick_count());
        info!("node started, {} channels", crate::control::channels::CHANNEL_COUNT);
    }

    /// One main-loop iteration in the fixed order.
    pub fn run_iteration(
        &mut self,
        hw: &mut (impl AnalogPort + ValvePort),
        clock: &mut impl ClockPort,
        storage: &mut impl StoragePort,
        radio: &mut impl RadioPort,
    ) -> LoopOutcome {
        // The alarm ISR does nothing but latch this flag.
        if clock.take_alarm() {
            self.flags.setup_tasks = true;
        }

        let prev_valves_on = self.bank.any_valve_on();

        self.task_setup(clock);
        self.task_sensors(hw, clock, radio);
        self.task_radio(clock, storage, radio);
        self.power_decision(clock, radio, prev_valves_on)
    }

    // ── Task setup ────────────────────────────────────────────

    /// Decide what this wake period owes: a calendar resync, a message
    /// poll, a sensor re-check, and, just past the alarm boundary, a
    /// sample broadcast.
    fn task_setup(&mut self, clock: &impl ClockPort) {
        if !self.flags.setup_tasks {
            return;
        }
        let now = clock.read_datetime();

        self.flags.request_calendar = !clock.is_calendar_set();
        self.flags.read_sensors = self.bank.any_valve_on();
        if !self.flags.request_calendar {
            self.flags.request_messages = true;
            if now.seconds_bin() < 10 {
                self.flags.send_samples = true;
            }
        }
        self.flags.setup_tasks = false;
    }

    // ── Sensor/valve pass ─────────────────────────────────────

    fn task_sensors(
        &mut self,
        hw: &mut (impl AnalogPort + ValvePort),
        clock: &impl ClockPort,
        radio: &mut impl RadioPort,
    ) {
        if !(self.flags.send_samples || self.flags.read_sensors) {
            return;
        }
        let broadcast = self.flags.send_samples;
        sampling_pass(&mut self.bank, broadcast, hw, clock, radio);
        self.flags.send_samples = false;
        self.flags.read_sensors = false;
    }

    // ── Radio ─────────────────────────────────────────────────

    fn task_radio(
        &mut self,
        clock: &mut impl ClockPort,
        storage: &mut impl StoragePort,
        radio: &mut impl RadioPort,
    ) {
        // Module-originated requests go out before reception so the
        // router's answers land in this same wake period.
        if self.flags.request_calendar {
            self.send_request(radio, clock, CommandId::GetDateTime, &[]);
            self.flags.request_calendar = false;
        }
        if self.flags.request_messages {
            let now = clock.read_datetime();
            self.send_request(radio, clock, CommandId::RequestAction, &now.to_wire());
            self.flags.request_messages = false;
        }

        while radio.bytes_available() > 0 {
            let byte = radio.read_byte();
            if let Some(frame) = self.decoder.push(byte) {
                dispatch(
                    &frame,
                    &mut self.bank,
                    &mut self.power,
                    &mut self.flags,
                    clock,
                    storage,
                    radio,
                );
            }
        }
    }

    /// Transmit a module-originated request to the router.  An outbound
    /// request is activity: it restarts the inactivity countdown so the
    /// router has the full window to answer.
    fn send_request(
        &mut self,
        radio: &mut impl RadioPort,
        clock: &impl ClockPort,
        id: CommandId,
        payload: &[u8],
    ) {
        let cmd = CommandByte {
            destination: Destination::Router,
            origin: Origin::Module,
            id,
        };
        match send_frame(radio, cmd.encode(), payload) {
            Ok(()) => self.power.reset(clock.tick_count()),
            Err(e) => warn!("request {id:?} failed: {e}"),
        }
    }

    // ── Power decision ────────────────────────────────────────

    fn power_decision(
        &mut self,
        clock: &impl ClockPort,
        radio: &mut impl RadioPort,
        prev_valves_on: bool,
    ) -> LoopOutcome {
        let any_on = self.bank.any_valve_on();
        match self
            .power
            .evaluate(clock.tick_count(), any_on, prev_valves_on)
        {
            SleepDecision::Stay => LoopOutcome::Continue,
            SleepDecision::Sleep => {
                info!("entering deep sleep");
                radio.power_down();
                LoopOutcome::DeepSleep
            }
        }
    }
}
