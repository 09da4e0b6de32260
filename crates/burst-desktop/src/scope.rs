//! Two-channel digital scope model: captures, measurements, traces.

use burst_core::trace::{Edge, Level, Line};
use burst_core::{BurstConfig, acoustics, consts};

use crate::bench::{Bench, SimEmitter};

/// Margin drawn around the burst in the zoomed view
const ZOOM_MARGIN_US: u64 = 20;

/// Snapshot of the bench after a cycle
#[derive(Clone, Debug)]
pub struct Capture {
    pub edges: Vec<Edge>,
    pub now_us: u64,
    pub cycles: u64,
    pub config: BurstConfig,
}

/// What the scope would measure on the last complete cycle
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Measurements {
    pub trigger_high_us: u64,
    pub signal_on_us: u64,
    /// Trigger rise to first signal edge
    pub signal_lag_us: u64,
    /// Rise to rise, when two cycles are in the capture
    pub period_us: Option<u64>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum View {
    /// Whole cycle, trigger rise to now
    Cycle,
    /// Trigger high interval with the carrier drawn
    Burst,
}

impl View {
    pub fn toggle(self) -> View {
        match self {
            View::Cycle => View::Burst,
            View::Burst => View::Cycle,
        }
    }
}

impl Capture {
    pub fn take(bench: &Bench, emitter: &SimEmitter) -> Self {
        Self {
            edges: bench.edges(),
            now_us: bench.now_us(),
            cycles: emitter.cycles(),
            config: *emitter.config(),
        }
    }

    fn edges_of(&self, line: Line) -> impl DoubleEndedIterator<Item = &Edge> {
        self.edges.iter().filter(move |edge| edge.line == line)
    }

    fn last_rise(&self, line: Line) -> Option<u64> {
        self.edges_of(line)
            .rev()
            .find(|edge| edge.level == Level::High)
            .map(|edge| edge.at_us)
    }

    fn first_edge_after(&self, line: Line, level: Level, at_us: u64) -> Option<u64> {
        self.edges_of(line)
            .find(|edge| edge.level == level && edge.at_us >= at_us)
            .map(|edge| edge.at_us)
    }

    /// Envelope level: high while the line is enabled
    pub fn level_at(&self, line: Line, at_us: u64) -> Level {
        self.edges_of(line)
            .rev()
            .find(|edge| edge.at_us <= at_us)
            .map(|edge| edge.level)
            .unwrap_or(Level::Low)
    }

    /// Signal line with the carrier resolved into individual pulses
    pub fn carrier_at(&self, at_us: f64) -> Level {
        let Some(enabled_at) = self
            .edges_of(Line::Signal)
            .rev()
            .find(|edge| (edge.at_us as f64) <= at_us)
            .filter(|edge| edge.level == Level::High)
            .map(|edge| edge.at_us)
        else {
            return Level::Low;
        };

        let half_periods =
            ((at_us - enabled_at as f64) * 2.0 * self.config.frequency_hz as f64 / 1e6) as u64;
        Level::from(half_periods % 2 == 0)
    }

    pub fn window(&self, view: View) -> Option<(u64, u64)> {
        let rise = self.last_rise(Line::Trigger)?;
        match view {
            View::Cycle => Some((rise, self.now_us.max(rise + 1))),
            View::Burst => {
                let fall = self
                    .first_edge_after(Line::Trigger, Level::Low, rise)
                    .unwrap_or(self.now_us);
                Some((
                    rise.saturating_sub(ZOOM_MARGIN_US),
                    fall + ZOOM_MARGIN_US,
                ))
            }
        }
    }

    pub fn measure(&self) -> Option<Measurements> {
        let rise = self.last_rise(Line::Trigger)?;
        let fall = self.first_edge_after(Line::Trigger, Level::Low, rise)?;
        let signal_on = self.first_edge_after(Line::Signal, Level::High, rise)?;
        let signal_off = self.first_edge_after(Line::Signal, Level::Low, signal_on)?;

        let previous_rise = self
            .edges_of(Line::Trigger)
            .rev()
            .filter(|edge| edge.level == Level::High && edge.at_us < rise)
            .map(|edge| edge.at_us)
            .next();

        Some(Measurements {
            trigger_high_us: fall - rise,
            signal_on_us: signal_off - signal_on,
            signal_lag_us: signal_on - rise,
            period_us: previous_rise.map(|previous| rise - previous),
        })
    }

    /// One text row per line, `columns` wide
    pub fn render(&self, line: Line, view: View, columns: usize) -> String {
        let Some((start, end)) = self.window(view) else {
            return LOW.to_string().repeat(columns);
        };
        let span = (end - start) as f64;

        (0..columns)
            .map(|column| {
                let at_us = start as f64 + span * column as f64 / columns.max(1) as f64;
                let level = match (line, view) {
                    (Line::Signal, View::Burst) => self.carrier_at(at_us),
                    _ => self.level_at(line, at_us as u64),
                };
                if level.is_high() { HIGH } else { LOW }
            })
            .collect()
    }

    pub fn echo_time_ns(&self) -> u32 {
        acoustics::time_of_flight_ns(
            consts::TRANSDUCER_DX_M,
            consts::TRANSDUCER_DY_M,
            consts::SPEED_OF_SOUND_M_S,
        )
    }
}

const HIGH: char = '▀';
const LOW: char = '▁';
