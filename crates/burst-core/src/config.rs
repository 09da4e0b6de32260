//! Burst configuration and the timing derived from it.

use core::fmt;

use crate::consts::MICROS_PER_SECOND;

/// How the emitter passes the time between two bursts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdlePolicy {
    /// Spin the CPU for a fixed number of iterations.
    Spin { iterations: u32 },
    /// Block on the delay provider for a fixed time.
    Delay { micros: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    ZeroFrequency,
    ZeroBurstCount,
    /// Duty does not fit the configured resolution
    DutyOutOfRange { duty: u32, max: u32 },
    /// Resolution outside what the timer peripherals support (1..=14 bits)
    UnsupportedResolution(u8),
    /// Burst delay does not fit the microsecond counter of the delay provider
    BurstTooLong,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ZeroFrequency => write!(f, "Burst frequency must be non-zero"),
            ConfigError::ZeroBurstCount => write!(f, "Burst count must be non-zero"),
            ConfigError::DutyOutOfRange { duty, max } => {
                write!(f, "Duty {} exceeds maximum {} for resolution", duty, max)
            }
            ConfigError::UnsupportedResolution(bits) => {
                write!(f, "Unsupported duty resolution: {} bits", bits)
            }
            ConfigError::BurstTooLong => {
                write!(f, "Burst delay exceeds {} us", u32::MAX)
            }
        }
    }
}

impl core::error::Error for ConfigError {}

/// Immutable description of one burst and the pause that follows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BurstConfig {
    pub frequency_hz: u32,
    pub count: u32,
    pub duty: u32,
    pub resolution_bits: u8,
    pub idle: IdlePolicy,
}

impl BurstConfig {
    /// 50 % duty at 8-bit resolution, no idle pause.
    pub const fn new(frequency_hz: u32, count: u32) -> Self {
        Self {
            frequency_hz,
            count,
            duty: 128,
            resolution_bits: 8,
            idle: IdlePolicy::Spin { iterations: 0 },
        }
    }

    pub const fn with_duty(mut self, duty: u32, resolution_bits: u8) -> Self {
        self.duty = duty;
        self.resolution_bits = resolution_bits;
        self
    }

    pub const fn with_idle(mut self, idle: IdlePolicy) -> Self {
        self.idle = idle;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.frequency_hz == 0 {
            return Err(ConfigError::ZeroFrequency);
        }
        if self.count == 0 {
            return Err(ConfigError::ZeroBurstCount);
        }
        if self.burst_delay_us().is_none() {
            return Err(ConfigError::BurstTooLong);
        }
        if !(1..=14).contains(&self.resolution_bits) {
            return Err(ConfigError::UnsupportedResolution(self.resolution_bits));
        }
        let max = self.max_duty();
        if self.duty > max {
            return Err(ConfigError::DutyOutOfRange {
                duty: self.duty,
                max,
            });
        }
        Ok(())
    }

    /// Largest duty value the resolution can express
    pub const fn max_duty(&self) -> u32 {
        match 1u32.checked_shl(self.resolution_bits as u32) {
            Some(steps) => steps - 1,
            None => u32::MAX,
        }
    }

    /// See [`burst_delay_us`].
    pub const fn burst_delay_us(&self) -> Option<u32> {
        burst_delay_us(self.frequency_hz, self.count)
    }

    /// Half a pulse period expressed in ticks of a `clock_hz` counter.
    ///
    /// Used by counter-based transmitters that describe each pulse as one
    /// high and one low level of equal length.
    pub const fn half_period_ticks(&self, clock_hz: u32) -> u32 {
        match self.frequency_hz as u64 * 2 {
            0 => 0,
            divisor => (clock_hz as u64 / divisor) as u32,
        }
    }
}

/// Time the output stays enabled for one burst, in whole microseconds.
///
/// `(count - 1)` full periods plus half a period, so the last pulse's high
/// level is included. The half period is taken from the already truncated
/// period and then truncated again; the order matters for matching the
/// timings measured on the bench.
///
/// `None` for a zero frequency, or when the delay does not fit in a `u32`.
pub const fn burst_delay_us(frequency_hz: u32, count: u32) -> Option<u32> {
    if frequency_hz == 0 {
        return None;
    }
    let full_periods =
        (count.saturating_sub(1) as u64 * MICROS_PER_SECOND as u64) / frequency_hz as u64;
    let half_period = (MICROS_PER_SECOND / frequency_hz) / 2;
    let total = full_periods + half_period as u64;
    if total > u32::MAX as u64 {
        None
    } else {
        Some(total as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts;

    #[test]
    fn test_default_burst_delay() {
        // 7_000_000 / 41_700 = 167, (1_000_000 / 41_700) / 2 = 23 / 2 = 11
        assert_eq!(burst_delay_us(41_700, 8), Some(178));
        assert_eq!(consts::BURST_CONFIG.burst_delay_us(), Some(178));
    }

    #[test]
    fn test_truncation_order() {
        for &(f, n) in &[(40_000, 8), (41_700, 1), (33_333, 5), (1, 3), (999_999, 10)] {
            let expected = ((n - 1) as u64 * 1_000_000 / f as u64) as u32 + (1_000_000 / f) / 2;
            assert_eq!(burst_delay_us(f, n), Some(expected), "f={} n={}", f, n);
        }
        assert_eq!(burst_delay_us(3, 1), Some(166_666));
    }

    #[test]
    fn test_single_pulse_is_half_period() {
        assert_eq!(burst_delay_us(41_700, 1), Some(11));
    }

    #[test]
    fn test_delay_must_fit_u32() {
        assert_eq!(burst_delay_us(0, 8), None);
        // 4_999 s
        assert_eq!(burst_delay_us(1, 5_000), None);
        assert_eq!(
            BurstConfig::new(1, 5_000).validate(),
            Err(ConfigError::BurstTooLong)
        );
        // 4_294 full periods of 1 s plus half a period still fit
        assert_eq!(burst_delay_us(1, 4_295), Some(4_294_500_000));
        assert_eq!(BurstConfig::new(1, 4_295).validate(), Ok(()));
    }

    #[test]
    fn test_max_duty_wide_resolution() {
        assert_eq!(BurstConfig::new(41_700, 8).max_duty(), 255);
        assert_eq!(BurstConfig::new(41_700, 8).with_duty(0, 32).max_duty(), u32::MAX);
        assert_eq!(BurstConfig::new(41_700, 8).with_duty(0, 200).max_duty(), u32::MAX);
        assert_eq!(BurstConfig::new(0, 8).half_period_ticks(80_000_000), 0);
    }

    #[test]
    fn test_validate() {
        assert_eq!(consts::BURST_CONFIG.validate(), Ok(()));
        assert_eq!(
            BurstConfig::new(0, 8).validate(),
            Err(ConfigError::ZeroFrequency)
        );
        assert_eq!(
            BurstConfig::new(41_700, 0).validate(),
            Err(ConfigError::ZeroBurstCount)
        );
        assert_eq!(
            BurstConfig::new(41_700, 8).with_duty(256, 8).validate(),
            Err(ConfigError::DutyOutOfRange { duty: 256, max: 255 })
        );
        assert_eq!(
            BurstConfig::new(41_700, 8).with_duty(0, 20).validate(),
            Err(ConfigError::UnsupportedResolution(20))
        );
    }

    #[test]
    fn test_half_period_ticks() {
        // 80 MHz APB clock
        assert_eq!(consts::BURST_CONFIG.half_period_ticks(80_000_000), 959);
        // tick at twice the carrier frequency: one tick per level
        assert_eq!(consts::BURST_CONFIG.half_period_ticks(2 * 41_700), 1);
    }
}
