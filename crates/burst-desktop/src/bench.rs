//! Simulated bench: the burst peripherals on a virtual clock.
//!
//! Every simulated peripheral shares one `Bench`. Delays advance the clock
//! instead of sleeping, and pin writes land in an edge trace that can be
//! inspected like a logic analyser capture.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use burst_core::trace::{Edge, EdgeTrace, Level, Line};
use burst_core::{BurstConfig, BurstEmitter, ConfigError, PulseOutput};
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorKind, ErrorType, OutputPin};

/// Pause between bursts on the bench. The firmware spins instead, which has
/// no meaning on a virtual clock.
pub const SIM_IDLE_US: u32 = 20_000;

/// Failure to inject into the bench
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    TimerConfig,
    ChannelConfig,
    TriggerConfig,
    OutputStart,
    TriggerWrite,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimError {
    Config(ConfigError),
    Injected(Fault),
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimError::Config(e) => write!(f, "Invalid configuration: {}", e),
            SimError::Injected(fault) => write!(f, "Injected fault: {:?}", fault),
        }
    }
}

impl std::error::Error for SimError {}

impl embedded_hal::digital::Error for SimError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

impl From<ConfigError> for SimError {
    fn from(e: ConfigError) -> Self {
        SimError::Config(e)
    }
}

struct BenchState {
    now_ns: u64,
    trace: EdgeTrace,
    fault: Option<Fault>,
}

impl BenchState {
    fn now_us(&self) -> u64 {
        self.now_ns / 1000
    }

    fn check(&self, fault: Fault) -> Result<(), SimError> {
        if self.fault == Some(fault) {
            Err(SimError::Injected(fault))
        } else {
            Ok(())
        }
    }

    fn record(&mut self, line: Line, level: Level) {
        let at_us = self.now_us();
        self.trace.record(at_us, line, level);
    }
}

pub type SimEmitter = BurstEmitter<SimPwm, SimPin, SimDelay>;

#[derive(Clone)]
pub struct Bench {
    state: Rc<RefCell<BenchState>>,
}

impl Default for Bench {
    fn default() -> Self {
        Self::new()
    }
}

impl Bench {
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(BenchState {
                now_ns: 0,
                trace: EdgeTrace::new(),
                fault: None,
            })),
        }
    }

    pub fn with_fault(fault: Fault) -> Self {
        let bench = Self::new();
        bench.state.borrow_mut().fault = Some(fault);
        bench
    }

    /// Configure the simulated output channel and trigger pin and hand them
    /// to a new emitter. Fails without touching either line.
    pub fn init(&self, config: BurstConfig) -> Result<SimEmitter, SimError> {
        config.validate()?;

        let state = self.state.borrow();
        state.check(Fault::TimerConfig)?;
        log::info!(
            "Sim timer configured ({} Hz, {}-bit)",
            config.frequency_hz,
            config.resolution_bits
        );
        state.check(Fault::ChannelConfig)?;
        log::info!("Sim channel configured (max duty: {})", config.max_duty());
        state.check(Fault::TriggerConfig)?;
        log::info!("Sim trigger configured");
        drop(state);

        let output = SimPwm {
            bench: self.clone(),
        };
        let trigger = SimPin {
            bench: self.clone(),
            line: Line::Trigger,
        };
        let delay = SimDelay {
            bench: self.clone(),
        };
        Ok(BurstEmitter::new(output, trigger, delay, config)?)
    }

    pub fn now_us(&self) -> u64 {
        self.state.borrow().now_us()
    }

    pub fn level(&self, line: Line) -> Level {
        let state = self.state.borrow();
        state.trace.level_at(line, state.now_us())
    }

    /// Copy of the recorded edges, oldest first
    pub fn edges(&self) -> Vec<Edge> {
        self.state.borrow().trace.iter().copied().collect()
    }
}

/// Simulated LEDC channel
pub struct SimPwm {
    bench: Bench,
}

impl PulseOutput for SimPwm {
    type Error = SimError;

    fn start(&mut self, duty: u32) -> Result<(), SimError> {
        let mut state = self.bench.state.borrow_mut();
        state.check(Fault::OutputStart)?;
        state.record(Line::Signal, Level::from(duty > 0));
        Ok(())
    }

    fn stop(&mut self) -> Result<(), SimError> {
        self.bench.state.borrow_mut().record(Line::Signal, Level::Low);
        Ok(())
    }
}

/// Simulated push-pull GPIO
pub struct SimPin {
    bench: Bench,
    line: Line,
}

impl ErrorType for SimPin {
    type Error = SimError;
}

impl OutputPin for SimPin {
    fn set_low(&mut self) -> Result<(), SimError> {
        let mut state = self.bench.state.borrow_mut();
        state.check(Fault::TriggerWrite)?;
        state.record(self.line, Level::Low);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), SimError> {
        let mut state = self.bench.state.borrow_mut();
        state.check(Fault::TriggerWrite)?;
        state.record(self.line, Level::High);
        Ok(())
    }
}

/// Advances the bench clock
pub struct SimDelay {
    bench: Bench,
}

impl DelayNs for SimDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.bench.state.borrow_mut().now_ns += u64::from(ns);
    }

    fn delay_us(&mut self, us: u32) {
        self.bench.state.borrow_mut().now_ns += u64::from(us) * 1000;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burst_core::{consts, IdlePolicy};

    #[test]
    fn test_delay_advances_clock() {
        let bench = Bench::new();
        let mut delay = SimDelay {
            bench: bench.clone(),
        };
        delay.delay_us(178);
        delay.delay_ns(500);
        delay.delay_ns(500);
        assert_eq!(bench.now_us(), 179);
    }

    #[test]
    fn test_init_leaves_lines_low() {
        let bench = Bench::new();
        let config = consts::BURST_CONFIG.with_idle(IdlePolicy::Delay { micros: SIM_IDLE_US });
        let emitter = bench.init(config).unwrap();

        assert_eq!(emitter.cycles(), 0);
        assert!(bench.edges().is_empty());
        assert_eq!(bench.level(Line::Trigger), Level::Low);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let bench = Bench::new();
        let result = bench.init(BurstConfig::new(0, 8));
        assert!(matches!(
            result,
            Err(SimError::Config(ConfigError::ZeroFrequency))
        ));

        let result = bench.init(BurstConfig::new(1, 5_000));
        assert!(matches!(
            result,
            Err(SimError::Config(ConfigError::BurstTooLong))
        ));
        assert!(bench.edges().is_empty());
    }
}
