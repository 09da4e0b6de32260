#![cfg_attr(not(test), no_std)]

pub mod acoustics;
pub mod config;
pub mod consts;
pub mod emitter;
pub mod output;
pub mod trace;

pub use config::{BurstConfig, ConfigError, IdlePolicy};
pub use emitter::{BurstEmitter, EmitterError, Phase};
pub use output::PulseOutput;
