use anyhow::Context;
use clap::{Args, ColorChoice, CommandFactory, FromArgMatches, Parser, Subcommand};
use rosesense::client::{AnalysisClient, ClientError, Endpoint};
use rosesense::config::CliConfig;
use rosesense::render::{self, Locale};
use rosesense::{Normalization, NormalizationEngine, NormalizedResult, Verdict};
use serde_json::Value;
use std::io::{IsTerminal, Read, stdout};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(
    name = "rosesense",
    about = "Botrytis detection client for rose images",
    arg_required_else_help = true
)]
struct Cli {
    /// Disable color
    #[arg(long = "no-color", global = true)]
    no_color: bool,

    /// Language for human-readable output
    #[arg(long, value_enum, global = true)]
    lang: Option<Locale>,

    /// Read configuration from this file instead of the default location
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize a saved service response (JSON)
    Normalize(NormalizeArgs),
    /// Upload an image to the detection service and show the diagnosis
    Analyze(AnalyzeArgs),
    /// Print the JSON schema of the normalized result
    Schema,
    /// Inspect or create the configuration file
    Config(ConfigCmd),
}

#[derive(Args, Clone)]
struct OutputArgs {
    /// Output the normalized result as JSON
    #[arg(long, conflicts_with_all = ["report", "explain"])]
    json: bool,

    /// Output the normalized result with contract details as JSON
    #[arg(long, conflicts_with = "explain")]
    report: bool,

    /// Show how the result was derived
    #[arg(short, long)]
    explain: bool,

    /// Exit with status 1 when the verdict is infected
    #[arg(long)]
    fail_on_infected: bool,
}

#[derive(Args, Clone)]
struct NormalizeArgs {
    /// Response file to read; `-` or omitted reads stdin
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Args, Clone)]
struct AnalyzeArgs {
    /// Image to upload
    #[arg(value_name = "IMAGE")]
    image: PathBuf,

    /// Base URL of the detection service
    #[arg(long, value_name = "URL")]
    api_url: Option<String>,

    /// Service endpoint to call
    #[arg(long, value_enum)]
    endpoint: Option<Endpoint>,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Args, Clone)]
struct ConfigCmd {
    #[command(subcommand)]
    action: ConfigAction,
}

#[derive(Subcommand, Clone)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Write the default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

struct Settings {
    config: CliConfig,
    locale: Locale,
    color: bool,
}

fn detect_color_choice() -> ColorChoice {
    // Scan args before clap so help/errors honor `--no-color`.
    // Mirror clap's parsing by stopping at `--` which terminates flags.
    let mut args = std::env::args_os();
    // Skip binary name
    args.next();
    let mut flag = false;
    for arg in args {
        if arg == "--" {
            break;
        }
        if arg == "--no-color" {
            flag = true;
            break;
        }
    }
    if flag || std::env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty()) {
        ColorChoice::Never
    } else {
        ColorChoice::Auto
    }
}

/// `strict` makes an explicit `--config` file mandatory; `config init` passes
/// false since it is about to create that file.
fn load_settings(cli: &Cli, color: ColorChoice, strict: bool) -> Result<Settings, i32> {
    let config = match cli.config.as_deref() {
        Some(_) if !strict => CliConfig::default(),
        Some(path) => match CliConfig::load_from(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error: {}", e);
                return Err(2);
            }
        },
        None => CliConfig::load(),
    }
    .with_env_overrides();

    let locale = cli.lang.unwrap_or(config.output.locale);
    let color = config.output.color
        && stdout().is_terminal()
        && !matches!(color, ColorChoice::Never);

    Ok(Settings {
        config,
        locale,
        color,
    })
}

fn read_response(file: Option<&Path>) -> anyhow::Result<Value> {
    let text = match file {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        _ => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            buf
        }
    };
    serde_json::from_str(&text).context("invalid JSON response")
}

fn engine_for(settings: &Settings) -> Result<NormalizationEngine, i32> {
    NormalizationEngine::from_config(&settings.config.classifier).map_err(|e| {
        eprintln!("Error: {}", e);
        2
    })
}

fn emit(report: &Normalization, args: &OutputArgs, settings: &Settings) -> Result<(), i32> {
    if args.json || args.report {
        let rendered = if args.report {
            serde_json::to_string_pretty(report)
        } else {
            serde_json::to_string_pretty(&report.result)
        };
        match rendered {
            Ok(s) => println!("{}", s),
            Err(e) => {
                eprintln!("Error: {}", e);
                return Err(3);
            }
        }
    } else if args.explain {
        println!(
            "{}",
            render::render_explained(report, settings.locale, settings.color)
        );
    } else {
        println!(
            "{}",
            render::render_human(&report.result, settings.locale, settings.color)
        );
    }

    if args.fail_on_infected && report.result.verdict() == Verdict::Infected {
        return Err(1);
    }
    Ok(())
}

fn run_normalize(args: NormalizeArgs, settings: &Settings) -> Result<(), i32> {
    let engine = engine_for(settings)?;
    let response = match read_response(args.file.as_deref()) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return Err(2);
        }
    };
    let report = engine.normalize_with_report(&response);
    emit(&report, &args.output, settings)
}

fn run_analyze(args: AnalyzeArgs, settings: &Settings) -> Result<(), i32> {
    let engine = engine_for(settings)?;
    let base_url = args
        .api_url
        .clone()
        .unwrap_or_else(|| settings.config.service.base_url.clone());
    let endpoint = args.endpoint.unwrap_or(settings.config.service.endpoint);

    let client = match AnalysisClient::new(base_url) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Err(3);
        }
    };

    // Undecodable or failed responses never reach the engine.
    let response = match client.analyze(&args.image, endpoint) {
        Ok(v) => v,
        Err(e @ ClientError::Io { .. }) => {
            eprintln!("Error: {}", e);
            return Err(2);
        }
        Err(e) => {
            log::debug!("analysis request failed: {:?}", e);
            eprintln!("Error: {}", e);
            return Err(3);
        }
    };

    let report = engine.normalize_with_report(&response);
    emit(&report, &args.output, settings)
}

fn run_schema() -> Result<(), i32> {
    let schema = schemars::schema_for!(NormalizedResult);
    match serde_json::to_string_pretty(&schema) {
        Ok(s) => println!("{}", s),
        Err(e) => {
            eprintln!("Error: {}", e);
            return Err(3);
        }
    }
    Ok(())
}

fn run_config(cmd: ConfigCmd, settings: &Settings, explicit: Option<&Path>) -> Result<(), i32> {
    match cmd.action {
        ConfigAction::Show => match toml::to_string_pretty(&settings.config) {
            Ok(s) => print!("{}", s),
            Err(e) => {
                eprintln!("Error: {}", e);
                return Err(3);
            }
        },
        ConfigAction::Init { force } => {
            let path = match CliConfig::target_path(explicit) {
                Ok(path) => path,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    return Err(2);
                }
            };
            if path.exists() && !force {
                eprintln!(
                    "Error: config file already exists at {} (use --force to overwrite)",
                    path.display()
                );
                return Err(2);
            }
            if let Err(e) = CliConfig::default().save_to(&path) {
                eprintln!("Error: {}", e);
                return Err(2);
            }
            println!("Wrote {}", path.display());
        }
    }
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let color = detect_color_choice();
    let matches = Cli::command().color(color).get_matches();
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    let creates_config = matches!(
        cli.command,
        Some(Commands::Config(ConfigCmd {
            action: ConfigAction::Init { .. }
        }))
    );
    let settings = match load_settings(&cli, color, !creates_config) {
        Ok(s) => s,
        Err(code) => std::process::exit(code),
    };

    let outcome = match cli.command {
        Some(Commands::Normalize(args)) => run_normalize(args, &settings),
        Some(Commands::Analyze(args)) => run_analyze(args, &settings),
        Some(Commands::Schema) => run_schema(),
        Some(Commands::Config(cmd)) => run_config(cmd, &settings, cli.config.as_deref()),
        None => Ok(()),
    };

    if let Err(code) = outcome {
        std::process::exit(code);
    }
}
