use burst_core::trace::{Level, Line};
use burst_core::{BurstConfig, EmitterError, IdlePolicy, Phase, consts};
use burst_desktop::bench::{Bench, Fault, SIM_IDLE_US, SimError};
use burst_desktop::scope::Capture;

fn sim_config() -> BurstConfig {
    consts::BURST_CONFIG.with_idle(IdlePolicy::Delay {
        micros: SIM_IDLE_US,
    })
}

#[test]
fn trigger_brackets_every_burst() {
    let bench = Bench::new();
    let mut emitter = bench.init(sim_config()).unwrap();

    for _ in 0..10 {
        let cycle_start = bench.now_us();
        emitter.cycle().unwrap();

        let edges: Vec<_> = bench
            .edges()
            .into_iter()
            .filter(|edge| edge.at_us >= cycle_start)
            .collect();
        let at = |line: Line, level: Level| {
            edges
                .iter()
                .find(|edge| edge.line == line && edge.level == level)
                .map(|edge| edge.at_us)
                .unwrap()
        };

        let trigger_rise = at(Line::Trigger, Level::High);
        let trigger_fall = at(Line::Trigger, Level::Low);
        let signal_on = at(Line::Signal, Level::High);
        let signal_off = at(Line::Signal, Level::Low);

        assert!(trigger_rise <= signal_on);
        assert!(signal_off <= trigger_fall);
        assert_eq!(signal_off - signal_on, 178);
        // burst then the same delay again before the trigger drops
        assert_eq!(trigger_fall - trigger_rise, 2 * 178);
    }
}

#[test]
fn trigger_low_while_idle() {
    let bench = Bench::new();
    let mut emitter = bench.init(sim_config()).unwrap();

    while emitter.step().unwrap() != Phase::TriggerLow {}
    let idle_start = bench.now_us();
    assert_eq!(emitter.step().unwrap(), Phase::Idle);

    assert_eq!(bench.now_us() - idle_start, u64::from(SIM_IDLE_US));
    assert_eq!(bench.level(Line::Trigger), Level::Low);
    assert_eq!(bench.level(Line::Signal), Level::Low);
}

#[test]
fn trigger_high_during_burst_phase() {
    let bench = Bench::new();
    let mut emitter = bench.init(sim_config()).unwrap();

    assert_eq!(emitter.step().unwrap(), Phase::TriggerHigh);
    assert_eq!(bench.level(Line::Trigger), Level::High);
    assert_eq!(emitter.step().unwrap(), Phase::Burst);
    assert_eq!(bench.level(Line::Trigger), Level::High);
    assert_eq!(emitter.step().unwrap(), Phase::Wait);
    assert_eq!(bench.level(Line::Trigger), Level::High);
    assert_eq!(emitter.step().unwrap(), Phase::TriggerLow);
    assert_eq!(bench.level(Line::Trigger), Level::Low);
}

#[test]
fn init_failure_never_enters_loop() {
    for fault in [Fault::TimerConfig, Fault::ChannelConfig, Fault::TriggerConfig] {
        let bench = Bench::with_fault(fault);
        let result = bench.init(sim_config());

        assert!(matches!(result, Err(SimError::Injected(f)) if f == fault));
        assert!(bench.edges().is_empty());
        assert_eq!(bench.now_us(), 0);
    }
}

#[test]
fn output_failure_is_reported() {
    let bench = Bench::with_fault(Fault::OutputStart);
    let mut emitter = bench.init(sim_config()).unwrap();

    let err = emitter.cycle().unwrap_err();
    assert_eq!(err, EmitterError::Output(SimError::Injected(Fault::OutputStart)));
    assert_eq!(emitter.cycles(), 0);
}

#[test]
fn trigger_failure_ends_run() {
    let bench = Bench::with_fault(Fault::TriggerWrite);
    let emitter = bench.init(sim_config()).unwrap();

    let err = emitter.run().unwrap_err();
    assert_eq!(err, EmitterError::Trigger(SimError::Injected(Fault::TriggerWrite)));
    assert!(bench.edges().is_empty());
}

#[test]
fn loop_keeps_running_over_observation_window() {
    let bench = Bench::new();
    let mut emitter = bench.init(sim_config()).unwrap();

    // one simulated second
    let cycle_us = u64::from(2 * 178 + SIM_IDLE_US);
    let cycles = 1_000_000 / cycle_us;
    for _ in 0..cycles {
        emitter.cycle().unwrap();
    }

    assert_eq!(emitter.cycles(), cycles);
    assert_eq!(emitter.phase(), Phase::TriggerHigh);
    assert_eq!(bench.now_us(), cycles * cycle_us);
}

#[test]
fn capture_measures_period() {
    let bench = Bench::new();
    let mut emitter = bench.init(sim_config()).unwrap();
    emitter.cycle().unwrap();
    emitter.cycle().unwrap();

    let m = Capture::take(&bench, &emitter).measure().unwrap();
    assert_eq!(m.trigger_high_us, 356);
    assert_eq!(m.signal_on_us, 178);
    assert_eq!(m.signal_lag_us, 0);
    assert_eq!(m.period_us, Some(u64::from(2 * 178 + SIM_IDLE_US)));
}

#[test]
fn stop_cuts_the_last_pulse() {
    let bench = Bench::new();
    let mut emitter = bench.init(sim_config()).unwrap();
    emitter.cycle().unwrap();

    let capture = Capture::take(&bench, &emitter);
    let m = capture.measure().unwrap();
    assert_eq!(m.signal_on_us, 178);

    // 8th pulse is high from ~167.9 us to ~179.9 us: the output drops inside it
    let signal_off = m.signal_lag_us + m.signal_on_us;
    assert_eq!(capture.carrier_at(signal_off as f64 - 0.5), Level::High);
    assert_eq!(capture.carrier_at(signal_off as f64 + 0.5), Level::Low);
}
