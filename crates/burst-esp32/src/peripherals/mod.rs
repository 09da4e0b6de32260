#[cfg(not(feature = "rmt"))]
pub mod ledc_output;
#[cfg(feature = "rmt")]
pub mod rmt_output;
pub mod trigger;

#[cfg(not(feature = "rmt"))]
pub use ledc_output::{LedcBurstOutput, PwmPeripherals};
#[cfg(feature = "rmt")]
pub use rmt_output::{RmtBurstOutput, RmtPeripherals};

use esp_idf_hal::gpio::AnyOutputPin;
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_svc::sys::EspError;

/// Everything the burst loop needs, taken once at boot.
///
/// Pin numbers follow `burst_core::consts`: signal on GPIO6, trigger on
/// GPIO4.
pub struct SystemPeripherals {
    #[cfg(not(feature = "rmt"))]
    pub pwm: PwmPeripherals<esp_idf_hal::ledc::TIMER0, esp_idf_hal::ledc::CHANNEL0>,
    #[cfg(feature = "rmt")]
    pub rmt: RmtPeripherals<esp_idf_hal::rmt::CHANNEL0>,
    pub trigger: AnyOutputPin, // GPIO4
}

impl SystemPeripherals {
    pub fn take() -> Result<Self, EspError> {
        let peripherals = Peripherals::take()?;

        Ok(SystemPeripherals {
            #[cfg(not(feature = "rmt"))]
            pwm: PwmPeripherals {
                timer: peripherals.ledc.timer0,
                channel: peripherals.ledc.channel0,
                pin: peripherals.pins.gpio6.into(),
            },
            #[cfg(feature = "rmt")]
            rmt: RmtPeripherals {
                channel: peripherals.rmt.channel0,
                pin: peripherals.pins.gpio6.into(),
            },
            trigger: peripherals.pins.gpio4.into(),
        })
    }
}
