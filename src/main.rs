use clap::Parser;
use colour::{dark_grey_ln, e_red_ln, green_ln, yellow_ln};
use logik::circuit::{ComponentId, ComponentKind};
use logik::sim::{SimConfig, Workbench};
use logik::storage;
use std::error::Error;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Runs a circuit saved in the LOGIK format and prints its probes and displays.
#[derive(Parser, Debug)]
#[command(name = "logik")]
#[command(version, about)]
struct Args {
    /// Circuit file to load.
    file: PathBuf,
    /// Number of ticks to simulate.
    #[arg(short, long, default_value_t = 1000)]
    ticks: u64,
    /// Enables propagation delay, each gate takes this many ticks.
    #[arg(short, long)]
    delay: Option<u64>,
    /// Ticks simulated between two reports.
    #[arg(short, long, default_value_t = 100, value_parser = clap::value_parser!(u64).range(1..))]
    frame: u64,
    /// Turns on the switch named NAME before running, can be repeated.
    #[arg(short, long = "set", value_name = "NAME")]
    set: Vec<String>,
    /// Writes the main circuit in dot format to this path.
    #[arg(long)]
    dot: Option<PathBuf>,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();
    if let Err(e) = run(args) {
        e_red_ln!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let loaded = storage::load(&args.file)?;
    if let Some(path) = &args.dot {
        loaded.circuit.dump_dot(path)?;
    }

    let mut config = SimConfig::default();
    if let Some(delay) = args.delay {
        config = config.with_propagation_delay(true).with_gate_delay(delay);
    }
    let mut bench = loaded.into_workbench(config)?;

    for name in &args.set {
        let toggled = match bench.main_circuit().find(name) {
            Some(id) => bench.toggle(id, true),
            None => false,
        };
        if !toggled {
            e_red_ln!("no switch named {:?}", name);
        }
    }

    let stop = Arc::new(AtomicBool::new(false));
    {
        let stop = stop.clone();
        ctrlc::set_handler(move || stop.store(true, Ordering::SeqCst))?;
    }

    let sinks: Vec<ComponentId> = bench
        .main_circuit()
        .components()
        .filter(|(_, c)| c.kind().is_sink())
        .map(|(id, _)| id)
        .collect();

    let mut remaining = args.ticks;
    while remaining > 0 {
        if stop.load(Ordering::SeqCst) {
            yellow_ln!("interrupted at tick {}", bench.tick());
            break;
        }
        let step = remaining.min(args.frame);
        bench.run(step);
        remaining -= step;
        report(&bench, &sinks);
    }
    Ok(())
}

fn report(bench: &Workbench, sinks: &[ComponentId]) {
    dark_grey_ln!(
        "tick {}{}",
        bench.tick(),
        if bench.is_stable() { ", stable" } else { "" }
    );
    for id in sinks {
        let component = match bench.main_circuit().component(*id) {
            Some(component) => component,
            None => continue,
        };
        let name = component.name();
        match (component.kind(), component.display_value()) {
            (ComponentKind::HexDisplay, Some(value)) => green_ln!("  {}: {:X}", name, value),
            (_, Some(segments)) => green_ln!("  {}: {:08b}", name, segments),
            _ if component.state() => green_ln!("  {}: 1", name),
            _ => dark_grey_ln!("  {}: 0", name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> Result<Args, clap::Error> {
        Args::try_parse_from(std::iter::once("logik").chain(line.split_whitespace()))
    }

    #[test]
    fn test_parse_options() {
        let args = parse("adder.logik --ticks 20 -d 2 --set a -s b --dot out.dot").unwrap();
        assert_eq!(args.file, PathBuf::from("adder.logik"));
        assert_eq!(args.ticks, 20);
        assert_eq!(args.delay, Some(2));
        assert_eq!(args.frame, 100);
        assert_eq!(args.set, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(args.dot, Some(PathBuf::from("out.dot")));
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse("").is_err());
        assert!(parse("a.logik --ticks").is_err());
        assert!(parse("a.logik --ticks ten").is_err());
        assert!(parse("a.logik b.logik").is_err());
        assert!(parse("a.logik --fast").is_err());
        assert!(parse("a.logik --frame 0").is_err());
    }

    #[test]
    fn test_command_is_well_formed() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }
}
