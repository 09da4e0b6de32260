//! Board wiring and burst timing.
//!
//! Everything here is fixed at build time; there is no runtime
//! configuration surface on the device.

use crate::config::{BurstConfig, IdlePolicy};

/// GPIO carrying the pulse train (transducer driver input)
pub const SIGNAL_GPIO: u8 = 6;
/// GPIO raised for the duration of every burst (scope trigger)
pub const TRIGGER_GPIO: u8 = 4;

pub const FREQUENCY_HZ: u32 = 41_700;
pub const DUTY_RESOLUTION_BITS: u8 = 8;
/// 50 % at 8-bit resolution
pub const DUTY: u32 = 128;
pub const BURST_COUNT: u32 = 8;

/// Busy-wait between bursts. Not a time: the period depends on CPU clock
/// and optimisation level.
pub const IDLE_SPIN_ITERATIONS: u32 = 10_000_000;

pub const MICROS_PER_SECOND: u32 = 1_000_000;

pub const BURST_CONFIG: BurstConfig = BurstConfig::new(FREQUENCY_HZ, BURST_COUNT)
    .with_duty(DUTY, DUTY_RESOLUTION_BITS)
    .with_idle(IdlePolicy::Spin {
        iterations: IDLE_SPIN_ITERATIONS,
    });

/// Transducer spacing used for the echo time estimate, in metres
pub const TRANSDUCER_DX_M: f32 = 0.03;
pub const TRANSDUCER_DY_M: f32 = 0.03;
/// Speed of sound in air at ~20 °C
pub const SPEED_OF_SOUND_M_S: f32 = 343.0;
