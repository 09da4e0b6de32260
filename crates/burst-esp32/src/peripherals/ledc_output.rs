//! LEDC burst output
//!
//! Drives the pulse train from an LEDC timer/channel pair. The channel is
//! configured once with duty 0. A burst sets the active duty (which applies
//! it to hardware) and ends with `ledc_stop`, which cuts the output at once
//! and idles the line low. A duty-0 update would only take effect at the end
//! of the running period.

use esp_idf_hal::gpio::AnyOutputPin;
use esp_idf_hal::ledc::{
    config::TimerConfig, LedcChannel, LedcDriver, LedcTimer, LedcTimerDriver, LowSpeed,
    Resolution,
};
use esp_idf_hal::peripheral::Peripheral;
use esp_idf_hal::prelude::*;
use esp_idf_svc::sys::{
    esp, ledc_channel_t, ledc_mode_t_LEDC_LOW_SPEED_MODE, ledc_stop, EspError,
    ESP_ERR_INVALID_ARG,
};

use burst_core::{BurstConfig, PulseOutput};

/// Raw LEDC timer, channel and output pin
pub struct PwmPeripherals<T, C> {
    pub timer: T,
    pub channel: C,
    pub pin: AnyOutputPin, // GPIO6
}

pub struct LedcBurstOutput<'d> {
    driver: LedcDriver<'d>,
    channel: ledc_channel_t,
}

impl<'d> LedcBurstOutput<'d> {
    /// Configure the timer for the burst frequency and resolution, then bind
    /// the channel to the signal pin with the output stopped.
    pub fn new<T, C>(peripherals: PwmPeripherals<T, C>, config: &BurstConfig) -> Result<Self, EspError>
    where
        T: LedcTimer<SpeedMode = LowSpeed> + 'd,
        T: Peripheral<P = T>,
        C: LedcChannel<SpeedMode = LowSpeed> + 'd,
        C: Peripheral<P = C>,
    {
        let timer_driver = LedcTimerDriver::new(
            peripherals.timer,
            &TimerConfig::new()
                .frequency(config.frequency_hz.Hz().into())
                .resolution(resolution(config.resolution_bits)?),
        )?;
        log::info!(
            "LEDC timer configured ({} Hz, {}-bit)",
            config.frequency_hz,
            config.resolution_bits
        );

        let driver = LedcDriver::new(peripherals.channel, timer_driver, peripherals.pin)?;
        log::info!("LEDC channel configured (max duty: {})", driver.get_max_duty());

        Ok(Self {
            driver,
            channel: C::channel(),
        })
    }
}

impl PulseOutput for LedcBurstOutput<'_> {
    type Error = EspError;

    fn start(&mut self, duty: u32) -> Result<(), EspError> {
        // set_duty updates the channel as well
        self.driver.set_duty(duty)
    }

    fn stop(&mut self) -> Result<(), EspError> {
        // idle level 0
        esp!(unsafe { ledc_stop(ledc_mode_t_LEDC_LOW_SPEED_MODE, self.channel, 0) })
    }
}

fn resolution(bits: u8) -> Result<Resolution, EspError> {
    Ok(match bits {
        1 => Resolution::Bits1,
        2 => Resolution::Bits2,
        3 => Resolution::Bits3,
        4 => Resolution::Bits4,
        5 => Resolution::Bits5,
        6 => Resolution::Bits6,
        7 => Resolution::Bits7,
        8 => Resolution::Bits8,
        9 => Resolution::Bits9,
        10 => Resolution::Bits10,
        11 => Resolution::Bits11,
        12 => Resolution::Bits12,
        13 => Resolution::Bits13,
        14 => Resolution::Bits14,
        _ => return Err(EspError::from_infallible::<ESP_ERR_INVALID_ARG>()),
    })
}
