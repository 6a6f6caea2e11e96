mod cli;

use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use colored::Colorize;
use crossbeam_channel::{select, unbounded};

use padhub_engine::{
    Arg, Outcomes, PollStatus, RumbleParams, SdlBackend, SdlEngine, TriggerRumbleParams,
};
use padhubd::{load_config, print_error, print_info, print_warning, Config, LogSink};

use crate::cli::{Cli, Command};

fn main() -> ExitCode {
    let cli = Cli::parse();
    padhubd::logging::setup(cli.verbose, cli.no_color);

    let mut config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            print_error!("failed to load config: {e}");
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Command::Run {
            interval,
            fps,
            rog_chakram,
        } => {
            config.apply_overrides(interval, fps, rog_chakram);
            if let Err(e) = config.validate() {
                print_error!("invalid options: {e}");
                return ExitCode::FAILURE;
            }
            run(&config)
        }
        Command::Rumble { args } => {
            let args = parse_args(&args);
            let hold = RumbleParams::from_args(&args).params.duration_ms;
            one_shot(&config, &args, hold, |engine, args, sink| {
                engine.rumble_args(args, sink)
            })
        }
        Command::RumbleTriggers { args } => {
            let args = parse_args(&args);
            let hold = TriggerRumbleParams::from_args(&args).params.duration_ms;
            one_shot(&config, &args, hold, |engine, args, sink| {
                engine.rumble_triggers_args(args, sink)
            })
        }
        Command::Leds { args } => one_shot(&config, &parse_args(&args), 0, |engine, args, sink| {
            engine.set_leds_args(args, sink)
        }),
        Command::Gyroscope { args } => {
            one_shot(&config, &parse_args(&args), 0, |engine, args, sink| {
                engine.enable_gyroscope_args(args, sink)
            })
        }
        Command::Accelerometer { args } => {
            one_shot(&config, &parse_args(&args), 0, |engine, args, sink| {
                engine.enable_accelerometer_args(args, sink)
            })
        }
    }
}

fn parse_args(raw: &[String]) -> Vec<Arg> {
    raw.iter().map(|s| Arg::parse(s)).collect()
}

/// Polls until Ctrl+C.
fn run(config: &Config) -> ExitCode {
    let (stop_tx, stop_rx) = unbounded::<()>();
    ctrlc::set_handler(move || {
        let _ = stop_tx.send(());
    })
    .expect("failed to set Ctrl+C handler");

    let mut engine = SdlEngine::new(SdlBackend::new(), config.engine_config());
    let mut sink = LogSink::new(&config.topics);
    let interval = config.poll_interval();
    let ticker = crossbeam_channel::tick(interval);

    print_info!("padhubd started. Polling every {}ms.", interval.as_millis());
    let mut last_status = PollStatus::Ok;
    loop {
        select! {
            recv(stop_rx) -> _ => {
                break;
            }
            recv(ticker) -> _ => {
                let status = engine.poll_events(&mut sink);
                if status != last_status {
                    match status {
                        PollStatus::Uninitialized => {
                            print_warning!("hardware subsystem unavailable, retrying");
                        }
                        PollStatus::Ok => {
                            print_info!("hardware subsystem ready");
                        }
                    }
                    last_status = status;
                }
            }
        }
    }

    print_info!(
        "padhubd stopped with {} controller(s) attached.",
        engine.registry().len()
    );
    ExitCode::SUCCESS
}

/// Initializes, runs one command, keeps controllers open for `hold_ms`
/// so timed effects can play, then exits.
fn one_shot<F>(config: &Config, args: &[Arg], hold_ms: u32, command: F) -> ExitCode
where
    F: FnOnce(&mut SdlEngine, &[Arg], &mut LogSink) -> Outcomes,
{
    let mut engine = SdlEngine::new(SdlBackend::new(), config.engine_config());
    let mut sink = LogSink::new(&config.topics);

    if engine.poll_events(&mut sink) == PollStatus::Uninitialized {
        return ExitCode::FAILURE;
    }
    let outcomes = command(&mut engine, args, &mut sink);
    if hold_ms > 0 {
        std::thread::sleep(Duration::from_millis(u64::from(hold_ms)));
    }
    engine.poll_events(&mut sink);

    if outcomes.is_empty() {
        print_warning!("no controller matched");
        return ExitCode::FAILURE;
    }
    let failed = outcomes.iter().filter(|o| !o.is_success()).count();
    if failed > 0 {
        print_error!("{failed} of {} controller(s) failed", outcomes.len());
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
