// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use scriptdiag::config::{DiagnosticsConfig, LogFormat, LogLevel, LoggingConfig};
use scriptdiag::{duktape, v8, DuktapeError};
use scriptdiag_core::{CallSite, CallSiteData, SourcePosition};
use scriptdiag_symbolicate::{
	map_eval_origin, BundledSourceMaps, ParsedSourceMap, ScriptNames, SourcePositionResolver,
};
use tracing::{debug, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Resolve script positions and stack traces through source maps
#[derive(Parser, Debug)]
#[command(name = "scriptdiag", version, about, long_about = None)]
struct Args {
	/// Path to configuration file
	#[arg(short, long, env = "SCRIPTDIAG_CONFIG")]
	config: Option<PathBuf>,

	/// Log level (overrides config)
	#[arg(short, long)]
	log_level: Option<String>,

	/// Output logs as JSON (overrides config)
	#[arg(long)]
	json_logs: bool,

	/// Source map for a script (repeatable: --map script.js=script.js.map)
	#[arg(long = "map", short = 'm', value_name = "SCRIPT=PATH", global = true)]
	maps: Vec<String>,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Map one generated position to its original position
	Resolve {
		/// Generated position as SOURCE:LINE:COLUMN (1-based)
		position: String,
	},
	/// Rewrite a V8 eval origin such as "eval at f (script.js:3:7)"
	EvalOrigin {
		/// Eval origin text
		origin: String,
	},
	/// Remap a Duktape stack trace read from FILE or stdin
	RemapDuktape {
		/// File holding the stack text
		file: Option<PathBuf>,
	},
	/// Render a V8 stack from a JSON array of call sites read from FILE or stdin
	RemapV8 {
		/// String form of the error, e.g. "TypeError: x is not a function"
		#[arg(long, short = 'e', default_value = "Error")]
		error: String,
		/// File holding the call sites
		file: Option<PathBuf>,
	},
}

fn log_level_to_tracing(level: LogLevel) -> tracing::Level {
	match level {
		LogLevel::Trace => tracing::Level::TRACE,
		LogLevel::Debug => tracing::Level::DEBUG,
		LogLevel::Info => tracing::Level::INFO,
		LogLevel::Warn => tracing::Level::WARN,
		LogLevel::Error => tracing::Level::ERROR,
	}
}

fn init_tracing(logging: &LoggingConfig) {
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
		EnvFilter::new(format!("scriptdiag={}", log_level_to_tracing(logging.level)))
	});

	// stdout carries command output.
	match logging.format {
		LogFormat::Json => {
			tracing_subscriber::registry()
				.with(filter)
				.with(fmt::layer().json().with_writer(std::io::stderr))
				.init();
		}
		LogFormat::Compact => {
			tracing_subscriber::registry()
				.with(filter)
				.with(fmt::layer().compact().with_writer(std::io::stderr))
				.init();
		}
		LogFormat::Pretty => {
			tracing_subscriber::registry()
				.with(filter)
				.with(fmt::layer().with_writer(std::io::stderr))
				.init();
		}
	}
}

fn load_config(args: &Args) -> Result<DiagnosticsConfig> {
	let mut config = DiagnosticsConfig::load(args.config.as_deref()).context("loading configuration")?;
	if let Some(level) = &args.log_level {
		config.logging.level = level.parse()?;
	}
	if args.json_logs {
		config.logging.format = LogFormat::Json;
	}
	Ok(config)
}

/// Split a `SCRIPT=PATH` argument.
fn parse_map_arg(arg: &str) -> Result<(&str, &Path)> {
	match arg.split_once('=') {
		Some((script, path)) if !script.is_empty() && !path.is_empty() => Ok((script, Path::new(path))),
		_ => bail!("invalid --map '{arg}', expected SCRIPT=PATH"),
	}
}

/// Parse `SOURCE:LINE:COLUMN` with a 1-based column into a position with a
/// 0-based column. The source may itself contain colons.
fn parse_position(text: &str) -> Result<SourcePosition> {
	let mut parts = text.rsplitn(3, ':');
	let (Some(column), Some(line), Some(source)) = (parts.next(), parts.next(), parts.next()) else {
		bail!("invalid position '{text}', expected SOURCE:LINE:COLUMN");
	};
	let line: u32 = line
		.parse()
		.with_context(|| format!("invalid line in '{text}'"))?;
	let column: u32 = column
		.parse()
		.with_context(|| format!("invalid column in '{text}'"))?;
	if source.is_empty() || line == 0 || column == 0 {
		bail!("invalid position '{text}', line and column are 1-based");
	}
	Ok(SourcePosition::new(source, line, column - 1))
}

fn build_resolver(names: &ScriptNames, maps: &[String]) -> Result<SourcePositionResolver> {
	let mut registry = BundledSourceMaps::new(names.clone());
	for arg in maps {
		let (script, path) = parse_map_arg(arg)?;
		let data = std::fs::read(path)
			.with_context(|| format!("reading source map {}", path.display()))?;
		let map = ParsedSourceMap::from_bytes(&data)
			.with_context(|| format!("parsing source map {}", path.display()))?;
		debug!(
			script,
			path = %path.display(),
			mappings = map.mapping_count(),
			"loaded source map"
		);
		registry.insert(script, Arc::new(map))?;
	}
	Ok(SourcePositionResolver::new(registry))
}

fn read_input(file: Option<&Path>) -> Result<String> {
	match file {
		Some(path) => {
			std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
		}
		None => {
			let mut input = String::new();
			std::io::stdin()
				.read_to_string(&mut input)
				.context("reading stdin")?;
			Ok(input)
		}
	}
}

fn remap_duktape(resolver: &SourcePositionResolver, config: &DiagnosticsConfig, stack: String) -> String {
	let error = duktape::rewrite_error(
		resolver,
		config.duktape,
		DuktapeError {
			stack: Some(stack.trim_end().to_string()),
			..DuktapeError::default()
		},
	);
	error.stack.unwrap_or_default()
}

fn remap_v8(resolver: &SourcePositionResolver, error: &str, frames_json: &str) -> Result<String> {
	let frames: Vec<CallSiteData> =
		serde_json::from_str(frames_json).context("parsing call sites")?;
	let sites: Vec<&dyn CallSite> = frames.iter().map(|f| f as &dyn CallSite).collect();
	Ok(v8::prepare_stack_trace(resolver, error, &sites).to_string())
}

fn run(args: Args, config: DiagnosticsConfig) -> Result<()> {
	let resolver = build_resolver(&config.scripts, &args.maps)?;
	info!(maps = args.maps.len(), "resolver ready");

	match args.command {
		Command::Resolve { position } => {
			let resolved = resolver.resolve(parse_position(&position)?);
			println!("{}:{}:{}", resolved.source, resolved.line, resolved.column + 1);
		}
		Command::EvalOrigin { origin } => {
			println!("{}", map_eval_origin(&resolver, &origin));
		}
		Command::RemapDuktape { file } => {
			let stack = read_input(file.as_deref())?;
			println!("{}", remap_duktape(&resolver, &config, stack));
		}
		Command::RemapV8 { error, file } => {
			let frames = read_input(file.as_deref())?;
			println!("{}", remap_v8(&resolver, &error, &frames)?);
		}
	}

	Ok(())
}

fn main() -> Result<()> {
	let args = Args::parse();
	let config = load_config(&args)?;
	init_tracing(&config.logging);
	run(args, config)
}
