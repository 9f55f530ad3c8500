// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of molsync and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! molsync CLI entrypoint.
//!
//! Runs one headless widget: channel frames are read from stdin as JSON lines
//! (`{"method": "custom", "content": ...}` or `{"method": "update", "state": ...}`) and outbound
//! frames are written to stdout the same way. The layout ticks on a timer until it settles.
//!
//! Logging goes to stderr and is filtered with `MOLSYNC_LOG` (default `info`).

use std::error::Error;
use std::path::PathBuf;

use molsync::comm::JsonLinesComm;
use molsync::config::ViewConfig;
use molsync::host::{HostError, WidgetHost};
use molsync::layout::ForceSimulation;
use molsync::model::WidgetModel;
use molsync::rpc::{message_schemas, InboundFrame};
use tokio::io::AsyncBufReadExt;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "MOLSYNC_LOG";

fn print_usage(program: &str) {
    eprintln!(
        "Usage:\n  {program} [--state <file>] [--config <file>] [--tick-ms <ms>]\n  {program} --print-schema\n\n--state loads the initial widget state (a JSON object of model attributes).\n--config loads view settings (JSON); --tick-ms overrides its tick interval.\n--print-schema prints the JSON schemas of inbound and outbound frames and exits.\n\nFrames are exchanged as JSON lines on stdin/stdout. Set {LOG_ENV} to tune logging."
    );
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct CliOptions {
    state: Option<PathBuf>,
    config: Option<PathBuf>,
    tick_ms: Option<u64>,
    print_schema: bool,
}

fn parse_options(mut args: impl Iterator<Item = String>) -> Result<CliOptions, ()> {
    let mut options = CliOptions::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--state" => {
                if options.state.is_some() {
                    return Err(());
                }
                options.state = Some(PathBuf::from(args.next().ok_or(())?));
            }
            "--config" => {
                if options.config.is_some() {
                    return Err(());
                }
                options.config = Some(PathBuf::from(args.next().ok_or(())?));
            }
            "--tick-ms" => {
                if options.tick_ms.is_some() {
                    return Err(());
                }
                let raw = args.next().ok_or(())?;
                let tick_ms: u64 = raw.parse().map_err(|_| ())?;
                if tick_ms == 0 {
                    return Err(());
                }
                options.tick_ms = Some(tick_ms);
            }
            "--print-schema" => {
                if options.print_schema {
                    return Err(());
                }
                options.print_schema = true;
            }
            _ => return Err(()),
        }
    }

    if options.print_schema
        && (options.state.is_some() || options.config.is_some() || options.tick_ms.is_some())
    {
        return Err(());
    }

    Ok(options)
}

fn load_model(path: Option<&PathBuf>) -> Result<WidgetModel, Box<dyn Error>> {
    let Some(path) = path else {
        return Ok(WidgetModel::new("molsync"));
    };
    let raw = std::fs::read_to_string(path)
        .map_err(|err| format!("failed to read state {}: {err}", path.display()))?;
    let state: serde_json::Map<String, serde_json::Value> = serde_json::from_str(&raw)
        .map_err(|err| format!("invalid state {}: {err}", path.display()))?;
    Ok(WidgetModel::from_state(&state)?)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .try_init();
}

fn main() {
    let result = (|| -> Result<(), Box<dyn Error>> {
        let mut args = std::env::args();
        let program = args.next().unwrap_or_else(|| "molsync".to_owned());

        let options = match parse_options(args) {
            Ok(options) => options,
            Err(()) => {
                print_usage(&program);
                std::process::exit(2);
            }
        };

        if options.print_schema {
            println!("{}", serde_json::to_string_pretty(&message_schemas()?)?);
            return Ok(());
        }

        init_tracing();

        let mut config = match &options.config {
            Some(path) => ViewConfig::load(path)?,
            None => ViewConfig::default(),
        };
        if let Some(tick_ms) = options.tick_ms {
            config.tick_interval_ms = tick_ms;
        }
        let tick_interval = config.tick_interval();
        let simulation = ForceSimulation::new(config.simulation());

        let model = load_model(options.state.as_ref())?;
        let comm = JsonLinesComm::new(std::io::stdout());
        let mut host = WidgetHost::new(model, config, simulation, comm)?;
        info!(view = host.model().id(), "widget ready");

        let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;

        runtime.block_on(async move {
            let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
            let mut ticker = tokio::time::interval(tick_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            let mut settled = false;

            loop {
                tokio::select! {
                    line = lines.next_line() => {
                        let Some(line) = line? else {
                            break;
                        };
                        let line = line.trim();
                        if line.is_empty() {
                            continue;
                        }
                        let frame = match serde_json::from_str::<InboundFrame>(line) {
                            Ok(frame) => frame,
                            Err(err) => {
                                warn!(error = %err, "malformed frame");
                                continue;
                            }
                        };
                        match host.handle_frame(frame) {
                            Ok(outcome) => debug!(outcome = ?outcome, "frame handled"),
                            Err(HostError::Comm(err)) => return Err(err.into()),
                            Err(err) => warn!(error = %err, "frame rejected"),
                        }
                        settled = false;
                    }
                    _ = ticker.tick(), if !settled => {
                        settled = !host.tick();
                        if settled {
                            debug!("layout settled");
                        }
                    }
                }
            }

            let (model, _) = host.shutdown();
            info!(view = model.id(), "channel closed");
            Ok::<(), Box<dyn Error>>(())
        })?;

        Ok(())
    })();

    if let Err(err) = result {
        eprintln!("molsync: {err}");
        std::process::exit(1);
    }
}
