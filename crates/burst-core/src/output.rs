use core::fmt;

/// Platform-agnostic pulse train source.
///
/// `start` must begin emitting pulses at the configured frequency
/// immediately; `stop` must leave the line low.
pub trait PulseOutput {
    type Error: fmt::Debug;

    fn start(&mut self, duty: u32) -> Result<(), Self::Error>;
    fn stop(&mut self) -> Result<(), Self::Error>;
}

impl<P: PulseOutput + ?Sized> PulseOutput for &mut P {
    type Error = P::Error;

    fn start(&mut self, duty: u32) -> Result<(), Self::Error> {
        P::start(self, duty)
    }

    fn stop(&mut self) -> Result<(), Self::Error> {
        P::stop(self)
    }
}
