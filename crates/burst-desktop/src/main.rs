use std::thread;
use std::time::Duration;

use burst_core::{IdlePolicy, consts};
use burst_desktop::bench::{Bench, SIM_IDLE_US};
use burst_desktop::scope::Capture;
use burst_desktop::scope_tui::ScopeTui;

/// Wall-clock pause between simulated cycles so the scope stays readable
const FRAME_TIME: Duration = Duration::from_millis(100);

fn main() -> anyhow::Result<()> {
    let mut tui = ScopeTui::new()?;
    log::info!("Burst simulator starting...");

    let config = consts::BURST_CONFIG.with_idle(IdlePolicy::Delay {
        micros: SIM_IDLE_US,
    });

    let bench = Bench::new();
    let mut emitter = bench.init(config)?;

    while tui.is_running() {
        emitter.cycle()?;
        tui.publish(Capture::take(&bench, &emitter));
        thread::sleep(FRAME_TIME);
    }

    log::info!("Simulator stopped after {} bursts", emitter.cycles());
    tui.shutdown();
    Ok(())
}
