//! Trigger output - marks each burst for the scope.

use esp_idf_hal::gpio::{AnyOutputPin, Output, PinDriver};
use esp_idf_svc::sys::{esp, gpio_intr_disable, gpio_pulldown_dis, gpio_pullup_dis, EspError};

pub type TriggerPin<'d> = PinDriver<'d, AnyOutputPin, Output>;

/// Configure the trigger as a push-pull output, no pulls, no interrupt,
/// starting low.
pub fn configure<'d>(pin: AnyOutputPin) -> Result<TriggerPin<'d>, EspError> {
    let mut trigger = PinDriver::output(pin)?;
    let gpio = trigger.pin();

    esp!(unsafe { gpio_pullup_dis(gpio) })?;
    esp!(unsafe { gpio_pulldown_dis(gpio) })?;
    esp!(unsafe { gpio_intr_disable(gpio) })?;
    trigger.set_low()?;

    log::info!("Trigger configured on GPIO{}", gpio);
    Ok(trigger)
}
