//! RMT burst output
//!
//! The RMT transmitter repeats a single high/low item `count` times, so the
//! number of pulses is exact in hardware instead of being bounded by the
//! burst delay. The duty passed to `start` is ignored: each pulse is a
//! symmetric square wave.

use esp_idf_hal::gpio::AnyOutputPin;
use esp_idf_hal::peripheral::Peripheral;
use esp_idf_hal::rmt::{
    config::{Loop, TransmitConfig},
    FixedLengthSignal, PinState, Pulse, PulseTicks, RmtChannel, TxRmtDriver,
};
use esp_idf_svc::sys::{esp, rmt_wait_tx_done, EspError, TickType_t};

use burst_core::{BurstConfig, PulseOutput};

/// Longest wait for a burst to leave the transmitter
const TX_DONE_TIMEOUT_TICKS: TickType_t = 10;

/// Raw RMT channel and output pin
pub struct RmtPeripherals<C> {
    pub channel: C,
    pub pin: AnyOutputPin, // GPIO6
}

pub struct RmtBurstOutput<'d> {
    driver: TxRmtDriver<'d>,
    high: Pulse,
    low: Pulse,
}

impl<'d> RmtBurstOutput<'d> {
    pub fn new<C>(peripherals: RmtPeripherals<C>, config: &BurstConfig) -> Result<Self, EspError>
    where
        C: RmtChannel,
        C: Peripheral<P = C> + 'd,
    {
        let transmit = TransmitConfig::new()
            .clock_divider(1)
            .looping(Loop::Count(config.count));
        let driver = TxRmtDriver::new(peripherals.channel, peripherals.pin, &transmit)?;

        let clock_hz = driver.counter_clock()?.0;
        let half_period = config.half_period_ticks(clock_hz);
        let ticks = PulseTicks::new(u16::try_from(half_period).unwrap_or(u16::MAX))?;
        log::info!(
            "RMT transmitter configured ({} Hz counter, {} ticks per level, {} loops)",
            clock_hz,
            half_period,
            config.count
        );

        Ok(Self {
            driver,
            high: Pulse::new(PinState::High, ticks),
            low: Pulse::new(PinState::Low, ticks),
        })
    }
}

impl PulseOutput for RmtBurstOutput<'_> {
    type Error = EspError;

    fn start(&mut self, _duty: u32) -> Result<(), EspError> {
        let mut signal = FixedLengthSignal::<1>::new();
        signal.set(0, &(self.high, self.low))?;
        self.driver.start(signal)
    }

    fn stop(&mut self) -> Result<(), EspError> {
        esp!(unsafe { rmt_wait_tx_done(self.driver.channel(), TX_DONE_TIMEOUT_TICKS) })?;
        self.driver.stop()
    }
}
