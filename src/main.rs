//! umbrella-grid entry point: CLI wiring and config-driven scenario runs.

use std::path::Path;
use std::process;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use umbrella_grid::config::ScenarioConfig;
use umbrella_grid::devices::UmbrellaType;
use umbrella_grid::economics::EconomicsReport;
use umbrella_grid::io::export::{export_csv, export_json};
use umbrella_grid::scenario::Scenario;

/// Parsed CLI arguments.
struct CliArgs {
    scenario_path: Option<String>,
    preset: Option<String>,
    seed_override: Option<u64>,
    peak_sun_hours: Option<f64>,
    csv_out: Option<String>,
    json_out: Option<String>,
    #[cfg(feature = "api")]
    serve: bool,
    #[cfg(feature = "api")]
    port: u16,
}

fn print_help() {
    eprintln!("umbrella-grid: daily energy balance for solar umbrella nodes");
    eprintln!();
    eprintln!("Usage: umbrella-grid [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --scenario <path>        Load scenario from TOML config file");
    eprintln!(
        "  --preset <name>          Use a built-in preset ({})",
        ScenarioConfig::PRESETS.join(", ")
    );
    eprintln!("  --seed <u64>             Override EV sampling seed");
    eprintln!("  --peak-sun-hours <f64>   Override peak sun hours");
    eprintln!("  --csv-out <path>         Export the node table to CSV");
    eprintln!("  --json-out <path>        Export the full run report to JSON");
    #[cfg(feature = "api")]
    {
        eprintln!("  --serve                  Start REST API server after the run");
        eprintln!("  --port <u16>             API server port (default: 3000)");
    }
    eprintln!("  --help                   Show this help message");
    eprintln!();
    eprintln!("Umbrella types (`umbrella` key in scenario files):");
    for umbrella in UmbrellaType::ALL {
        eprintln!(
            "  {:<18} {} ({:.1} kW)",
            umbrella.key(),
            umbrella,
            umbrella.capacity_kw()
        );
    }
    eprintln!();
    eprintln!("If no --scenario or --preset is given, the baseline preset is used.");
    eprintln!("Set RUST_LOG (e.g. RUST_LOG=umbrella_grid=debug) for more detail.");
}

fn fail(message: impl std::fmt::Display) -> ! {
    error!("{message}");
    process::exit(1);
}

fn next_value<'a>(args: &'a [String], i: &mut usize, flag: &str, kind: &str) -> &'a str {
    *i += 1;
    match args.get(*i) {
        Some(v) => v,
        None => fail(format!("{flag} requires a {kind} argument")),
    }
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().collect();
    let mut cli = CliArgs {
        scenario_path: None,
        preset: None,
        seed_override: None,
        peak_sun_hours: None,
        csv_out: None,
        json_out: None,
        #[cfg(feature = "api")]
        serve: false,
        #[cfg(feature = "api")]
        port: 3000,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                process::exit(0);
            }
            "--scenario" => {
                cli.scenario_path = Some(next_value(&args, &mut i, "--scenario", "path").into());
            }
            "--preset" => {
                cli.preset = Some(next_value(&args, &mut i, "--preset", "name").into());
            }
            "--seed" => {
                let v = next_value(&args, &mut i, "--seed", "u64");
                match v.parse::<u64>() {
                    Ok(s) => cli.seed_override = Some(s),
                    Err(_) => fail(format!("--seed value \"{v}\" is not a valid u64")),
                }
            }
            "--peak-sun-hours" => {
                let v = next_value(&args, &mut i, "--peak-sun-hours", "number");
                match v.parse::<f64>() {
                    Ok(h) => cli.peak_sun_hours = Some(h),
                    Err(_) => fail(format!("--peak-sun-hours value \"{v}\" is not a number")),
                }
            }
            "--csv-out" => {
                cli.csv_out = Some(next_value(&args, &mut i, "--csv-out", "path").into());
            }
            "--json-out" => {
                cli.json_out = Some(next_value(&args, &mut i, "--json-out", "path").into());
            }
            #[cfg(feature = "api")]
            "--serve" => {
                cli.serve = true;
            }
            #[cfg(feature = "api")]
            "--port" => {
                let v = next_value(&args, &mut i, "--port", "u16");
                match v.parse::<u16>() {
                    Ok(p) => cli.port = p,
                    Err(_) => fail(format!("--port value \"{v}\" is not a valid u16")),
                }
            }
            other => {
                print_help();
                fail(format!("unknown argument \"{other}\""));
            }
        }
        i += 1;
    }

    cli
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("umbrella_grid=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    init_logging();
    let cli = parse_args();

    // --scenario takes priority, then --preset, then baseline default
    let mut config = if let Some(ref path) = cli.scenario_path {
        ScenarioConfig::from_toml_file(Path::new(path)).unwrap_or_else(|e| fail(e))
    } else if let Some(ref name) = cli.preset {
        ScenarioConfig::from_preset(name).unwrap_or_else(|e| fail(e))
    } else {
        ScenarioConfig::baseline()
    };

    if let Some(seed) = cli.seed_override {
        config.simulation.seed = seed;
    }
    if let Some(hours) = cli.peak_sun_hours {
        config.simulation.peak_sun_hours = hours;
    }

    let errors = config.validate();
    if !errors.is_empty() {
        for e in &errors {
            error!("{e}");
        }
        process::exit(1);
    }

    let scenario = Scenario::build(&config).unwrap_or_else(|e| fail(e));
    let report = scenario.engine().run().unwrap_or_else(|e| fail(e));

    for r in &report.nodes {
        println!("{r}");
    }
    if !report.transfers.is_empty() {
        println!("\n--- Transfers ---");
        for t in &report.transfers {
            println!("{t}");
        }
    }

    println!("\n{}", report.summary);

    let backup = scenario.battery_backup();
    println!(
        "Battery backup:        {:.2} days ({:.1} kWh usable, target {:.1} days: {})",
        backup.backup_days,
        backup.usable_kwh,
        scenario.economics.days_autonomy,
        if backup.meets_autonomy { "met" } else { "not met" }
    );

    let economics = EconomicsReport::from_daily_generation(
        report.summary.total_generation_kwh,
        &scenario.economics,
    );
    println!("\n{economics}");

    if let Some(ref path) = cli.csv_out {
        if let Err(e) = export_csv(&report.nodes, Path::new(path)) {
            fail(format!("failed to write CSV: {e}"));
        }
        info!(path = %path, "node table written");
    }
    if let Some(ref path) = cli.json_out {
        if let Err(e) = export_json(&report, Path::new(path)) {
            fail(format!("failed to write JSON: {e}"));
        }
        info!(path = %path, "run report written");
    }

    #[cfg(feature = "api")]
    if cli.serve {
        use std::net::SocketAddr;
        use std::sync::Arc;

        let state = Arc::new(umbrella_grid::api::AppState { report });
        let addr = SocketAddr::from(([0, 0, 0, 0], cli.port));
        let rt = tokio::runtime::Runtime::new()
            .unwrap_or_else(|e| fail(format!("failed to create tokio runtime: {e}")));
        if let Err(e) = rt.block_on(umbrella_grid::api::serve(state, addr)) {
            fail(format!("server error: {e}"));
        }
    }
}
