use std::io;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use clap::Parser;
use window_gravity::Session;
use window_gravity::constants::TARGET_HZ;
use window_gravity::drivers::memory::MemoryDesktop;
use window_gravity::geometry::Rect;
use window_gravity::session::kinetic_energy;

const TITLES: [&str; 3] = ["Untitled - Notepad", "Paint", "Calculator"];
const DESKTOP: Rect = Rect {
    left: 0,
    top: 0,
    right: 2560,
    bottom: 1440,
};

#[derive(Parser, Debug)]
#[command(
    name = "gravity-bench",
    version = env!("CARGO_PKG_VERSION"),
    about = "Step-rate benchmark for the window physics session"
)]
struct BenchCli {
    /// Number of simulated windows scattered over the desktop.
    #[arg(short = 'w', long = "windows", value_name = "COUNT", default_value_t = 24)]
    windows: usize,

    /// Number of ticks to simulate. Ticks are timestamped at the target rate,
    /// independent of how fast they actually run.
    #[arg(short = 't', long = "ticks", value_name = "COUNT", default_value_t = 3_600)]
    ticks: u64,
}

struct BenchConfig {
    windows: usize,
    ticks: u64,
}

impl TryFrom<&BenchCli> for BenchConfig {
    type Error = String;

    fn try_from(cli: &BenchCli) -> Result<Self, Self::Error> {
        if !(1..=500).contains(&cli.windows) {
            return Err("windows must be between 1 and 500".to_string());
        }
        if !(1..=1_000_000).contains(&cli.ticks) {
            return Err("ticks must be between 1 and 1000000".to_string());
        }
        Ok(Self {
            windows: cli.windows,
            ticks: cli.ticks,
        })
    }
}

fn main() -> io::Result<()> {
    let args = BenchCli::parse();
    let config = BenchConfig::try_from(&args)
        .map_err(|msg| io::Error::new(io::ErrorKind::InvalidInput, msg))?;

    let desktop = MemoryDesktop::new(DESKTOP);
    let mut noise = NoiseField::seeded_from_clock();
    for i in 0..config.windows {
        let width = 160 + (noise.next() % 480) as i32;
        let height = 120 + (noise.next() % 360) as i32;
        let x = (noise.next() % (DESKTOP.width() - width) as u32) as i32;
        let y = (noise.next() % (DESKTOP.height() / 2) as u32) as i32;
        desktop.add_window(
            TITLES[i % TITLES.len()],
            Rect::from_origin_size(x, y, width, height),
        );
    }

    let stats = run_benchmark(desktop, &config)?;
    println!("{}", stats.final_report(&config));
    Ok(())
}

fn run_benchmark(desktop: MemoryDesktop, config: &BenchConfig) -> io::Result<BenchStats> {
    let period = Duration::from_secs_f64(1.0 / f64::from(TARGET_HZ));
    let mut now = Instant::now();
    let mut session =
        Session::new(desktop, now).map_err(|err| io::Error::other(err.to_string()))?;
    let mut stats = BenchStats::new();
    for _ in 0..config.ticks {
        now += period;
        let started = Instant::now();
        session
            .step(now)
            .map_err(|err| io::Error::other(err.to_string()))?;
        stats.record_tick(started.elapsed());
    }
    stats.mark_completed();
    stats.final_energy = kinetic_energy(session.bodies());
    stats.at_rest = session
        .bodies()
        .iter()
        .filter(|b| b.vx == 0.0 && b.vy == 0.0)
        .count();
    Ok(stats)
}

struct BenchStats {
    start: Instant,
    completed_at: Option<Instant>,
    tick_count: u64,
    total_step_time: Duration,
    fastest_tick: Duration,
    slowest_tick: Duration,
    final_energy: f64,
    at_rest: usize,
}

impl BenchStats {
    fn new() -> Self {
        Self {
            start: Instant::now(),
            completed_at: None,
            tick_count: 0,
            total_step_time: Duration::ZERO,
            fastest_tick: Duration::MAX,
            slowest_tick: Duration::ZERO,
            final_energy: 0.0,
            at_rest: 0,
        }
    }

    fn elapsed(&self) -> Duration {
        match self.completed_at {
            Some(done) => done.duration_since(self.start),
            None => self.start.elapsed(),
        }
    }

    fn mark_completed(&mut self) {
        self.completed_at = Some(Instant::now());
    }

    fn record_tick(&mut self, step_time: Duration) {
        self.tick_count = self.tick_count.saturating_add(1);
        self.total_step_time += step_time;
        self.fastest_tick = self.fastest_tick.min(step_time);
        self.slowest_tick = self.slowest_tick.max(step_time);
    }

    fn average_tick_us(&self) -> f64 {
        if self.tick_count == 0 {
            return 0.0;
        }
        (self.total_step_time.as_secs_f64() / self.tick_count as f64) * 1_000_000.0
    }

    fn final_report(&self, config: &BenchConfig) -> String {
        let elapsed = self.elapsed().as_secs_f64();
        let ticks_per_second = if elapsed > 0.0 {
            self.tick_count as f64 / elapsed
        } else {
            0.0
        };
        let simulated = self.tick_count as f64 / f64::from(TARGET_HZ);

        indoc::formatdoc!(
            r#"
            Gravity bench completed.
            Windows: {windows} | Ticks: {ticks} ({simulated:.1}s simulated in {elapsed:.3}s)
            Ticks/sec: {tps:.0} (realtime needs {target})
            Avg tick: {avg:.1} us | Best: {best:.1} us | Worst: {worst:.1} us
            At rest: {at_rest}/{windows} | Kinetic energy: {energy:.1}
            "#,
            windows = config.windows,
            ticks = self.tick_count,
            simulated = simulated,
            elapsed = elapsed,
            tps = ticks_per_second,
            target = TARGET_HZ,
            avg = self.average_tick_us(),
            best = self.fastest_tick.as_secs_f64() * 1_000_000.0,
            worst = self.slowest_tick.as_secs_f64() * 1_000_000.0,
            at_rest = self.at_rest,
            energy = self.final_energy,
        )
    }
}

struct NoiseField {
    state: u64,
}

impl NoiseField {
    fn seeded_from_clock() -> Self {
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0)
            ^ 0xA5A5_A5A5_1234_5678;
        Self { state: seed }
    }

    fn next(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.state >> 32) as u32
    }
}
