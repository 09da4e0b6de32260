use core::fmt::Display;

use esp_idf_hal::delay::Ets;

use burst_core::{consts, BurstEmitter};

mod peripherals;

use peripherals::SystemPeripherals;

/// Any failure while driving the peripherals is unrecoverable: log it and
/// abort. On ESP-IDF `abort` enters the IDF panic handler, which resets the
/// chip under the default `CONFIG_ESP_SYSTEM_PANIC` setting.
fn fatal(context: &str, error: impl Display) -> ! {
    log::error!("{}: {}", context, error);
    std::process::abort()
}

fn main() {
    // It is necessary to call this function once. Otherwise, some patches to the runtime
    // implemented by esp-idf-sys might not link properly. See https://github.com/esp-rs/esp-idf-template/issues/71
    esp_idf_svc::sys::link_patches();

    // Bind the log crate to the ESP Logging facilities
    esp_idf_svc::log::EspLogger::initialize_default();

    log::info!("Burst emitter starting...");

    // The loop never yields to FreeRTOS, so the idle task would starve
    unsafe {
        esp_idf_svc::sys::esp_task_wdt_deinit();
    }
    log::info!("Task watchdog timer disabled");

    let config = consts::BURST_CONFIG;
    if let Err(e) = config.validate() {
        fatal("Invalid burst configuration", e);
    }

    let peripherals =
        SystemPeripherals::take().unwrap_or_else(|e| fatal("Failed to take peripherals", e));

    #[cfg(not(feature = "rmt"))]
    let output = peripherals::LedcBurstOutput::new(peripherals.pwm, &config)
        .unwrap_or_else(|e| fatal("Failed to configure LEDC output", e));
    #[cfg(feature = "rmt")]
    let output = peripherals::RmtBurstOutput::new(peripherals.rmt, &config)
        .unwrap_or_else(|e| fatal("Failed to configure RMT output", e));

    let trigger = peripherals::trigger::configure(peripherals.trigger)
        .unwrap_or_else(|e| fatal("Failed to configure trigger pin", e));

    log::info!(
        "Signal on GPIO{}, trigger on GPIO{}",
        consts::SIGNAL_GPIO,
        consts::TRIGGER_GPIO
    );

    // Ets busy-waits in ROM (esp_rom_delay_us)
    let emitter = BurstEmitter::new(output, trigger, Ets, config)
        .unwrap_or_else(|e| fatal("Invalid burst configuration", e));

    match emitter.run() {
        Ok(never) => match never {},
        Err(e) => fatal("Burst loop failed", e),
    }
}
