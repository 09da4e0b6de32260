//! Edge Trace - Ring buffer of pin transitions
//!
//! Records level changes of the signal and trigger lines with a microsecond
//! timestamp, so a simulated run can be checked or drawn like a logic
//! analyser capture.

use heapless::Deque;

/// Number of edges kept before the oldest are dropped
pub const TRACE_CAPACITY: usize = 256;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Line {
    /// Pulse train output. High means the carrier is running.
    Signal,
    Trigger,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    Low,
    High,
}

impl Level {
    pub fn is_high(self) -> bool {
        self == Level::High
    }
}

impl From<bool> for Level {
    fn from(high: bool) -> Self {
        if high { Level::High } else { Level::Low }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Edge {
    pub at_us: u64,
    pub line: Line,
    pub level: Level,
}

/// Time-ordered edge history
pub struct EdgeTrace<const N: usize = TRACE_CAPACITY> {
    edges: Deque<Edge, N>,
}

impl<const N: usize> EdgeTrace<N> {
    pub const fn new() -> Self {
        Self {
            edges: Deque::new(),
        }
    }

    /// Record an edge, removing the oldest if full.
    ///
    /// Writing the level a line already has is not an edge and is ignored.
    pub fn record(&mut self, at_us: u64, line: Line, level: Level) {
        let current = self.last_edge(line).map(|edge| edge.level).unwrap_or(Level::Low);
        if current == level {
            return;
        }

        if self.edges.is_full() {
            self.edges.pop_front();
        }
        let _ = self.edges.push_back(Edge { at_us, line, level });
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Oldest first
    pub fn iter(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter()
    }

    pub fn last_edge(&self, line: Line) -> Option<&Edge> {
        self.edges.iter().rev().find(|edge| edge.line == line)
    }

    /// Level of `line` at `at_us`. Lines start low.
    pub fn level_at(&self, line: Line, at_us: u64) -> Level {
        self.edges
            .iter()
            .rev()
            .find(|edge| edge.line == line && edge.at_us <= at_us)
            .map(|edge| edge.level)
            .unwrap_or(Level::Low)
    }
}

impl<const N: usize> Default for EdgeTrace<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_level_at() {
        let mut trace: EdgeTrace = EdgeTrace::new();
        trace.record(10, Line::Trigger, Level::High);
        trace.record(12, Line::Signal, Level::High);
        trace.record(190, Line::Signal, Level::Low);
        trace.record(368, Line::Trigger, Level::Low);

        assert_eq!(trace.len(), 4);
        assert_eq!(trace.level_at(Line::Trigger, 5), Level::Low);
        assert_eq!(trace.level_at(Line::Trigger, 10), Level::High);
        assert_eq!(trace.level_at(Line::Signal, 100), Level::High);
        assert_eq!(trace.level_at(Line::Signal, 200), Level::Low);
        assert_eq!(trace.level_at(Line::Trigger, 367), Level::High);
        assert_eq!(trace.level_at(Line::Trigger, 368), Level::Low);
    }

    #[test]
    fn test_repeated_level_is_not_an_edge() {
        let mut trace: EdgeTrace = EdgeTrace::new();
        trace.record(0, Line::Trigger, Level::Low);
        trace.record(1, Line::Trigger, Level::High);
        trace.record(2, Line::Trigger, Level::High);

        assert_eq!(trace.len(), 1);
        assert_eq!(trace.last_edge(Line::Trigger).unwrap().at_us, 1);
    }

    #[test]
    fn test_ring_buffer_overflow() {
        let mut trace: EdgeTrace<8> = EdgeTrace::new();
        for i in 0..12u64 {
            trace.record(i, Line::Signal, Level::from(i % 2 == 0));
        }

        assert_eq!(trace.len(), 8);
        assert_eq!(trace.iter().next().unwrap().at_us, 4);
    }
}
