use egoline::timeline::{RawInteraction, bucket_interactions};
use egoline::{BucketConfig, Interaction, Layout, LayoutConfig, LayoutInput, Minimize, Scope};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Read;

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Io(std::io::Error),
    Layout(egoline::Error),
    Json(serde_json::Error),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Layout(err) => write!(f, "{err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<egoline::Error> for CliError {
    fn from(value: egoline::Error) -> Self {
        Self::Layout(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

#[derive(Debug, Clone, Copy, Default)]
enum Command {
    #[default]
    Layout,
    Stats,
    Extract,
}

#[derive(Debug, Default)]
struct Args {
    command: Command,
    input: Option<String>,
    pretty: bool,
    ego: Option<String>,
    minimize: Option<Minimize>,
    scope: Option<Scope>,
    squeeze: bool,
    iterations: Option<usize>,
    min_spacing: Option<f64>,
    bucket_delta: Option<i64>,
    bucket_format: Option<String>,
}

impl Args {
    fn buckets(&self) -> bool {
        self.bucket_delta.is_some() || self.bucket_format.is_some()
    }
}

/// Same shape as [`LayoutInput`], with epoch-second timestamps instead of labels.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawLayoutInput {
    ego: String,
    interactions: Vec<RawInteraction>,
    categories: BTreeMap<String, String>,
    context: BTreeMap<String, BTreeMap<String, f64>>,
    config: LayoutConfig,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StatsOut<'a> {
    ego: &'a str,
    timestamps: usize,
    actors: usize,
    sessions: usize,
    idle_sessions: usize,
    crossings: usize,
    bends: usize,
    span: f64,
}

fn usage() -> &'static str {
    "egoline-cli\n\
\n\
USAGE:\n\
  egoline-cli [layout] [OPTIONS] [<path>|-]\n\
  egoline-cli stats [OPTIONS] [<path>|-]\n\
  egoline-cli extract [--pretty] [--ego <name>] [--scope two-hop|timestamps] [<path>|-]\n\
\n\
OPTIONS:\n\
  --pretty                       pretty-print JSON output\n\
  --ego <name>                   override the ego named in the input\n\
  --minimize space|line|wiggles  compaction mode\n\
  --scope two-hop|timestamps     which interactions survive extraction\n\
  --squeeze                      squeeze neighbours of the same category\n\
  --iterations <n>               ordering sweeps\n\
  --min-spacing <h>              minimum vertical distance between storylines\n\
  --bucket-delta <seconds>       input timestamps are epoch seconds; bucket them\n\
  --bucket-format <strftime>     label format for buckets (implies bucketing)\n\
\n\
NOTES:\n\
  - If <path> is omitted or '-', input is read from stdin.\n\
  - Input is a JSON object: {ego, interactions, categories?, context?, config?}.\n\
  - Command-line options override the input's config.\n\
"
}

fn parse_scope(s: &str) -> Option<Scope> {
    match s.trim().to_ascii_lowercase().as_str() {
        "two-hop" | "twohop" => Some(Scope::TwoHop),
        "timestamps" => Some(Scope::Timestamps),
        _ => None,
    }
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args::default();

    let mut it = argv.iter().skip(1);
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "layout" => args.command = Command::Layout,
            "stats" => args.command = Command::Stats,
            "extract" => args.command = Command::Extract,
            "--pretty" => args.pretty = true,
            "--squeeze" => args.squeeze = true,
            "--ego" => {
                let Some(ego) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.ego = Some(ego.clone());
            }
            "--minimize" => {
                let Some(mode) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.minimize = Some(
                    mode.parse::<Minimize>()
                        .map_err(|_| CliError::Usage(usage()))?,
                );
            }
            "--scope" => {
                let Some(scope) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.scope = Some(parse_scope(scope).ok_or(CliError::Usage(usage()))?);
            }
            "--iterations" => {
                let Some(n) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.iterations = Some(n.parse::<usize>().map_err(|_| CliError::Usage(usage()))?);
            }
            "--min-spacing" => {
                let Some(h) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                let h = h.parse::<f64>().map_err(|_| CliError::Usage(usage()))?;
                if !(h.is_finite() && h > 0.0) {
                    return Err(CliError::Usage(usage()));
                }
                args.min_spacing = Some(h);
            }
            "--bucket-delta" => {
                let Some(d) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.bucket_delta = Some(d.parse::<i64>().map_err(|_| CliError::Usage(usage()))?);
            }
            "--bucket-format" => {
                let Some(fmt) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.bucket_format = Some(fmt.clone());
            }
            "--" => {
                if let Some(rest) = it.next() {
                    if args.input.is_some() {
                        return Err(CliError::Usage(usage()));
                    }
                    args.input = Some(rest.clone());
                }
                if it.next().is_some() {
                    return Err(CliError::Usage(usage()));
                }
            }
            other if other.starts_with('-') && other != "-" => {
                return Err(CliError::Usage(usage()));
            }
            path => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some(path.to_string());
            }
        }
    }

    Ok(args)
}

fn read_input(input: Option<&str>) -> Result<String, CliError> {
    match input {
        None | Some("-") => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
        Some(path) => Ok(std::fs::read_to_string(path)?),
    }
}

fn write_json(value: &impl Serialize, pretty: bool) -> Result<(), CliError> {
    if pretty {
        serde_json::to_writer_pretty(std::io::stdout().lock(), value)?;
    } else {
        serde_json::to_writer(std::io::stdout().lock(), value)?;
    }
    println!();
    Ok(())
}

fn load_input(args: &Args, text: &str) -> Result<LayoutInput, CliError> {
    let mut input = if args.buckets() {
        let raw: RawLayoutInput = serde_json::from_str(text)?;
        let defaults = BucketConfig::default();
        let bucket = BucketConfig {
            delta: args.bucket_delta.unwrap_or(defaults.delta),
            format: args.bucket_format.clone().unwrap_or(defaults.format),
        };
        LayoutInput {
            ego: raw.ego,
            interactions: bucket_interactions(&raw.interactions, &bucket)?,
            categories: raw.categories,
            context: raw.context,
            config: raw.config,
        }
    } else {
        serde_json::from_str(text)?
    };

    if let Some(ego) = &args.ego {
        input.ego = ego.clone();
    }
    let config = &mut input.config;
    if let Some(minimize) = args.minimize {
        config.minimize = minimize;
    }
    if let Some(scope) = args.scope {
        config.scope = scope;
    }
    if args.squeeze {
        config.squeeze_same_category = true;
    }
    if let Some(iterations) = args.iterations {
        config.iterations = iterations;
    }
    if let Some(min_spacing) = args.min_spacing {
        config.min_spacing = min_spacing;
    }
    Ok(input)
}

fn stats(layout: &Layout) -> StatsOut<'_> {
    StatsOut {
        ego: &layout.ego,
        timestamps: layout.timestamps.len(),
        actors: layout.actors.len(),
        sessions: layout.sessions.len(),
        idle_sessions: layout
            .sessions
            .iter()
            .filter(|s| s.kind == egoline::SessionKind::Idle)
            .count(),
        crossings: layout.metrics.crossings,
        bends: layout.metrics.bends,
        span: layout.metrics.span,
    }
}

fn run(args: Args) -> Result<(), CliError> {
    let text = read_input(args.input.as_deref())?;
    let input = load_input(&args, &text)?;

    match args.command {
        Command::Extract => {
            let kept: Vec<Interaction> =
                egoline::pipeline::extract(&input.ego, &input.interactions, input.config.scope)?;
            write_json(&kept, args.pretty)
        }
        Command::Layout => {
            let layout = egoline::layout(&input)?;
            write_json(&layout, args.pretty)
        }
        Command::Stats => {
            let layout = egoline::layout(&input)?;
            write_json(&stats(&layout), args.pretty)
        }
    }
}

fn main() {
    let args = match parse_args(&std::env::args().collect::<Vec<_>>()) {
        Ok(v) => v,
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    if let Err(err) = run(args) {
        eprintln!("{err}");
        std::process::exit(1);
    }
}
