//! Burst loop state machine.
//!
//! One cycle walks through [`Phase::TriggerHigh`], [`Phase::Burst`],
//! [`Phase::Wait`], [`Phase::TriggerLow`] and [`Phase::Idle`], then starts
//! over. All waits block the calling context.

use core::convert::Infallible;
use core::fmt;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::config::{BurstConfig, ConfigError, IdlePolicy};
use crate::output::PulseOutput;

/// Log a heartbeat every this many cycles
const HEARTBEAT_CYCLES: u64 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    TriggerHigh,
    Burst,
    Wait,
    TriggerLow,
    Idle,
}

impl Phase {
    pub const fn next(self) -> Phase {
        match self {
            Phase::TriggerHigh => Phase::Burst,
            Phase::Burst => Phase::Wait,
            Phase::Wait => Phase::TriggerLow,
            Phase::TriggerLow => Phase::Idle,
            Phase::Idle => Phase::TriggerHigh,
        }
    }
}

/// Failure of one of the peripherals driven by the emitter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmitterError<O, T> {
    Output(O),
    Trigger(T),
}

impl<O: fmt::Debug, T: fmt::Debug> fmt::Display for EmitterError<O, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmitterError::Output(e) => write!(f, "Pulse output failed: {:?}", e),
            EmitterError::Trigger(e) => write!(f, "Trigger pin failed: {:?}", e),
        }
    }
}

impl<O: fmt::Debug, T: fmt::Debug> core::error::Error for EmitterError<O, T> {}

type EmitResult<T, O, P> = Result<
    T,
    EmitterError<<O as PulseOutput>::Error, <P as embedded_hal::digital::ErrorType>::Error>,
>;

/// Owns the pulse output, the trigger pin and the delay provider for the
/// lifetime of the loop.
pub struct BurstEmitter<O, T, D> {
    output: O,
    trigger: T,
    delay: D,
    config: BurstConfig,
    burst_delay_us: u32,
    phase: Phase,
    cycles: u64,
}

impl<O, T, D> BurstEmitter<O, T, D>
where
    O: PulseOutput,
    T: OutputPin,
    D: DelayNs,
{
    /// Takes peripherals that are already configured. The trigger line is
    /// expected to be low.
    ///
    /// The configuration is validated first; nothing is driven on error.
    pub fn new(output: O, trigger: T, delay: D, config: BurstConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let burst_delay_us = config.burst_delay_us().ok_or(ConfigError::BurstTooLong)?;
        log::info!(
            "Burst emitter: {} Hz, {} pulses, duty {}/{}, burst delay {} us, idle {:?}",
            config.frequency_hz,
            config.count,
            config.duty,
            config.max_duty(),
            burst_delay_us,
            config.idle,
        );

        Ok(Self {
            output,
            trigger,
            delay,
            config,
            burst_delay_us,
            phase: Phase::TriggerHigh,
            cycles: 0,
        })
    }

    pub fn config(&self) -> &BurstConfig {
        &self.config
    }

    /// Phase the next call to [`step`](Self::step) will execute
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Number of completed cycles
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Execute the current phase and advance. Returns the executed phase.
    pub fn step(&mut self) -> EmitResult<Phase, O, T> {
        let phase = self.phase;
        log::trace!("{:?}", phase);

        match phase {
            Phase::TriggerHigh => self.trigger.set_high().map_err(EmitterError::Trigger)?,
            Phase::Burst => self.emit_burst()?,
            Phase::Wait => self.delay.delay_us(self.burst_delay_us),
            Phase::TriggerLow => self.trigger.set_low().map_err(EmitterError::Trigger)?,
            Phase::Idle => {
                self.idle();
                self.cycles += 1;
                if self.cycles % HEARTBEAT_CYCLES == 0 {
                    log::debug!("{} bursts emitted", self.cycles);
                }
            }
        }

        self.phase = phase.next();
        Ok(phase)
    }

    /// Run phases until the current cycle is complete.
    pub fn cycle(&mut self) -> EmitResult<(), O, T> {
        while self.step()? != Phase::Idle {}
        Ok(())
    }

    /// Run forever. Only returns on a peripheral failure.
    pub fn run(mut self) -> EmitResult<Infallible, O, T> {
        log::info!("Entering burst loop");
        loop {
            self.cycle()?;
        }
    }

    /// Enable the carrier for one burst delay, then stop it.
    pub fn emit_burst(&mut self) -> EmitResult<(), O, T> {
        self.output
            .start(self.config.duty)
            .map_err(EmitterError::Output)?;
        self.delay.delay_us(self.burst_delay_us);
        self.output.stop().map_err(EmitterError::Output)
    }

    fn idle(&mut self) {
        match self.config.idle {
            IdlePolicy::Spin { iterations } => spin(iterations),
            IdlePolicy::Delay { micros } => self.delay.delay_us(micros),
        }
    }
}

/// Busy-wait that the optimiser cannot remove
pub fn spin(iterations: u32) {
    for _ in 0..iterations {
        core::hint::spin_loop();
    }
}
