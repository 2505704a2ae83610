//! `storefront-console` entry point: argument parsing, config precedence
//! and dispatch to a single pass, watch mode, or form validation.

use std::io::{IsTerminal, Read, Write};
use std::sync::Arc;
use std::time::Duration;

use storefront_core::model::RegionData;
use storefront_core::seed::load_region_data;
use storefront_core::workload_form::{
    fields_for_workloads, reset_workload_form, validate_workload_form,
};

use crate::config::{load_config, parse_log_format, parse_log_level, Config};
use crate::error::ConsoleError;
use crate::fetcher::HttpStatFetcher;
use crate::logging::Logger;
use crate::render::{render_snapshot_text, TerminalSink};
use crate::session::{ConsoleSession, LatestViewSink};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Command {
    #[default]
    Console,
    ValidateWorkloads,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Args {
    pub command: Command,
    pub seed: String,
    pub config_file: String,
    pub watch: bool,
    pub interval: Option<Duration>,
    pub timeout: Option<Duration>,
    pub width: Option<usize>,
    pub log_level: String,
    pub log_format: String,
    /// `--set NAME=COUNT` pairs, in order given.
    pub sets: Vec<(String, String)>,
    pub reset: bool,
    pub help: bool,
}

pub fn run_from_env() -> i32 {
    let args: Vec<String> = std::env::args().skip(1).collect();
    run_with_args(&args)
}

pub fn run_with_args(argv: &[String]) -> i32 {
    let parsed = match parse_args(argv) {
        Ok(args) => args,
        Err(err) => {
            eprint!("{err}");
            return 2;
        }
    };
    if parsed.help {
        print!("{}", usage(None));
        return 0;
    }

    let (mut cfg, _used_path) = match load_config(if parsed.config_file.is_empty() {
        None
    } else {
        Some(parsed.config_file.as_str())
    }) {
        Ok(value) => value,
        Err(err) => {
            eprintln!("Error loading config: {err}");
            return 1;
        }
    };

    if let Err(message) = apply_overrides(&mut cfg, &parsed) {
        eprint!("{}", usage(Some(&message)));
        return 2;
    }

    let seed_source = if parsed.seed.trim().is_empty() {
        cfg.seed_path.as_ref().map(|p| p.display().to_string())
    } else {
        Some(parsed.seed.trim().to_string())
    };
    let Some(seed_source) = seed_source else {
        eprint!("{}", usage(Some("--seed is required (or set seed.path)")));
        return 2;
    };

    let logger = Logger::new(&cfg.logging).component("console");
    let data = match read_seed(&seed_source) {
        Ok(data) => data,
        Err(err) => {
            logger.error(&err.to_string());
            eprintln!("Error: {err}");
            return 1;
        }
    };

    match parsed.command {
        Command::ValidateWorkloads => run_validate_workloads(&data, &parsed),
        Command::Console => match run_console(&cfg, data, parsed.watch, logger.clone()) {
            Ok(()) => 0,
            Err(err) => {
                logger.error(&err.to_string());
                eprintln!("Error: {err}");
                1
            }
        },
    }
}

fn apply_overrides(cfg: &mut Config, args: &Args) -> Result<(), String> {
    if let Some(interval) = args.interval {
        cfg.watch.interval = interval;
    }
    if let Some(timeout) = args.timeout {
        cfg.fetch.request_timeout = timeout;
    }
    if let Some(width) = args.width {
        cfg.display_width = width;
    }
    if !args.log_level.trim().is_empty() {
        cfg.logging.level = parse_log_level(&args.log_level).map_err(|e| e.to_string())?;
    }
    if !args.log_format.trim().is_empty() {
        cfg.logging.format = parse_log_format(&args.log_format).map_err(|e| e.to_string())?;
    }
    cfg.validate().map_err(|e| e.to_string())
}

/// Reads the seed from a path, or from stdin when the path is `-`.
fn read_seed(source: &str) -> Result<RegionData, ConsoleError> {
    let raw = if source == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .map_err(|source| ConsoleError::ReadSeed {
                path: "-".to_string(),
                source,
            })?;
        buf
    } else {
        std::fs::read_to_string(source).map_err(|err| ConsoleError::ReadSeed {
            path: source.to_string(),
            source: err,
        })?
    };
    Ok(load_region_data(&raw)?)
}

fn run_console(
    cfg: &Config,
    data: RegionData,
    watch: bool,
    logger: Logger,
) -> Result<(), ConsoleError> {
    let fetcher =
        HttpStatFetcher::new(&cfg.fetch).map_err(|e| ConsoleError::HttpClient(e.to_string()))?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(ConsoleError::Runtime)?;

    let styled = std::io::stdout().is_terminal();
    let width = cfg.display_width;
    let mut session = ConsoleSession::new(
        data,
        Arc::new(fetcher),
        cfg.fetch.stats_path.clone(),
        logger.clone(),
    );

    if watch {
        let interval = cfg.watch.interval;
        return runtime.block_on(async move {
            let footer = format!("refresh every {}  exit: Ctrl+C", format_interval(interval));
            let mut sink =
                TerminalSink::new(std::io::stdout(), width, styled, logger).with_footer(footer);
            sink.clear_screen().map_err(ConsoleError::Render)?;
            session
                .run_watch(interval, &mut sink, async {
                    let _ = tokio::signal::ctrl_c().await;
                })
                .await;
            Ok(())
        });
    }

    let mut sink = LatestViewSink::default();
    runtime.block_on(session.run_once(&mut sink));
    let text = render_snapshot_text(&session.view(), width, styled);
    let mut out = std::io::stdout();
    out.write_all(text.as_bytes())
        .and_then(|()| out.flush())
        .map_err(ConsoleError::Render)
}

fn run_validate_workloads(data: &RegionData, args: &Args) -> i32 {
    let mut fields = fields_for_workloads(&data.workloads);
    if args.reset {
        reset_workload_form(&mut fields);
    }
    for (name, value) in &args.sets {
        let Some(field) = fields.iter_mut().find(|f| &f.name == name) else {
            eprint!("{}", usage(Some(&format!("unknown workload {name:?}"))));
            return 2;
        };
        field.value = value.clone();
    }

    match validate_workload_form(&fields) {
        Ok(quantities) => {
            let workloads: Vec<serde_json::Value> = quantities
                .iter()
                .map(|q| serde_json::json!({ "name": q.name, "users": q.users }))
                .collect();
            let body = serde_json::json!({ "workloads": workloads });
            match serde_json::to_string_pretty(&body) {
                Ok(text) => {
                    println!("{text}");
                    0
                }
                Err(err) => {
                    eprintln!("Error: {err}");
                    1
                }
            }
        }
        Err(violation) => {
            eprintln!("{violation}");
            1
        }
    }
}

/// `10s`, `1500ms`: the shortest form `parse_duration` reads back.
fn format_interval(interval: Duration) -> String {
    let millis = interval.as_millis();
    if millis % 1_000 == 0 {
        format!("{}s", millis / 1_000)
    } else {
        format!("{millis}ms")
    }
}

pub fn parse_args(argv: &[String]) -> Result<Args, String> {
    let mut out = Args::default();
    let mut idx = 0usize;

    while idx < argv.len() {
        let token = &argv[idx];

        if !token.starts_with('-') || token == "-" {
            if idx == 0 && token == "validate-workloads" {
                out.command = Command::ValidateWorkloads;
                idx += 1;
                continue;
            }
            return Err(usage(Some(&format!("unexpected argument {token:?}"))));
        }

        let (key, inline) = if let Some((k, v)) = token.split_once('=') {
            (k.to_string(), Some(v.to_string()))
        } else {
            (token.to_string(), None)
        };

        match key.as_str() {
            "-h" | "--help" => out.help = true,
            "--seed" => out.seed = take_value(argv, &mut idx, inline, "--seed")?,
            "--config" => out.config_file = take_value(argv, &mut idx, inline, "--config")?,
            "--watch" => out.watch = true,
            "--interval" => {
                let raw = take_value(argv, &mut idx, inline, "--interval")?;
                out.interval = Some(parse_duration(&raw).map_err(|e| usage(Some(&e)))?);
            }
            "--timeout" => {
                let raw = take_value(argv, &mut idx, inline, "--timeout")?;
                out.timeout = Some(parse_duration(&raw).map_err(|e| usage(Some(&e)))?);
            }
            "--width" => {
                let raw = take_value(argv, &mut idx, inline, "--width")?;
                let width = raw
                    .trim()
                    .parse::<usize>()
                    .map_err(|_| usage(Some(&format!("invalid --width {raw:?}"))))?;
                out.width = Some(width);
            }
            "--log-level" => {
                out.log_level = take_value(argv, &mut idx, inline, "--log-level")?;
            }
            "--log-format" => {
                out.log_format = take_value(argv, &mut idx, inline, "--log-format")?;
            }
            "--set" => {
                let raw = take_value(argv, &mut idx, inline, "--set")?;
                let Some((name, count)) = raw.split_once('=') else {
                    return Err(usage(Some(&format!("--set expects NAME=COUNT, got {raw:?}"))));
                };
                out.sets.push((name.trim().to_string(), count.to_string()));
            }
            "--reset" => out.reset = true,
            _ => return Err(usage(Some(&format!("unknown flag {key}")))),
        }
        idx += 1;
    }

    if out.command == Command::Console && (!out.sets.is_empty() || out.reset) {
        return Err(usage(Some("--set and --reset belong to validate-workloads")));
    }
    if out.command == Command::ValidateWorkloads && out.watch {
        return Err(usage(Some("--watch cannot be used with validate-workloads")));
    }
    Ok(out)
}

fn take_value(
    argv: &[String],
    idx: &mut usize,
    inline: Option<String>,
    flag: &str,
) -> Result<String, String> {
    if let Some(value) = inline {
        return Ok(value);
    }
    *idx += 1;
    argv.get(*idx)
        .cloned()
        .ok_or_else(|| usage(Some(&format!("missing value for {flag}"))))
}

/// Accepts `250ms`, `10s`, `2m` and `1h`; a bare number is seconds.
pub fn parse_duration(raw: &str) -> Result<Duration, String> {
    let raw = raw.trim();
    let split = raw
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(raw.len());
    let (digits, unit) = raw.split_at(split);
    let value: u64 = digits
        .parse()
        .map_err(|_| format!("invalid duration {raw:?}"))?;
    let duration = match unit {
        "ms" => Duration::from_millis(value),
        "" | "s" => Duration::from_secs(value),
        "m" => Duration::from_secs(value.saturating_mul(60)),
        "h" => Duration::from_secs(value.saturating_mul(3_600)),
        _ => return Err(format!("invalid duration unit in {raw:?}")),
    };
    if duration.is_zero() {
        return Err("duration must be positive".to_string());
    }
    Ok(duration)
}

pub fn usage(message: Option<&str>) -> String {
    let mut out = String::new();
    if let Some(msg) = message {
        if !msg.trim().is_empty() {
            out.push_str(&format!("Error: {msg}\n\n"));
        }
    }
    out.push_str("Usage: storefront-console [options]\n");
    out.push_str(
        "       storefront-console validate-workloads [options] [--reset] --set NAME=COUNT...\n\n",
    );
    out.push_str("Options:\n");
    out.push_str("  --seed path             seed document, or - for stdin\n");
    out.push_str("  --config string         config file (default is $HOME/.config/storefront-console/config.yaml)\n");
    out.push_str("  --watch                 keep polling and repaint in place until Ctrl+C\n");
    out.push_str("  --interval duration     refresh interval in watch mode (default 10s)\n");
    out.push_str("  --timeout duration      per-request timeout (default 10s)\n");
    out.push_str("  --width int             display width (default 100)\n");
    out.push_str("  --log-level string      override logging level (trace, debug, info, warn, error)\n");
    out.push_str("  --log-format string     override logging format (json, console)\n");
    out.push_str("  --set NAME=COUNT        workload quantity to validate\n");
    out.push_str("  --reset                 start every workload quantity at 0\n");
    out.push_str("  -h, --help              show this help\n");
    out
}
