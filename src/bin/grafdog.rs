use std::io::{Read as _, Write as _};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use grafdog::grafana::{GrafanaDashboard, Panel};
use grafdog::translate::NamingScheme;
use grafdog::{ConvertOpts, Diagnostic, DiagnosticKind};

#[derive(Parser, Debug)]
#[command(name = "grafdog", version)]
struct Cli {
    /// More log output (repeatable).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert a Grafana dashboard to Datadog dashboard JSON.
    Convert(ConvertArgs),
    /// Parse every PromQL target and report the ones that fail.
    Check(CheckArgs),
}

#[derive(Parser, Debug)]
struct ConvertArgs {
    /// Input Grafana dashboard JSON (stdin when absent).
    #[arg(long = "in")]
    in_path: Option<PathBuf>,

    /// Output Datadog dashboard JSON (stdout when absent).
    #[arg(long)]
    out: Option<PathBuf>,

    /// Conversion options JSON; flags below override it.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Single-line output.
    #[arg(long, default_value_t = false)]
    compact: bool,

    /// Sub-query naming scheme.
    #[arg(long, value_enum)]
    naming: Option<NamingChoice>,

    /// Drop targets using functions without a Datadog mapping.
    #[arg(long, default_value_t = false)]
    strict_functions: bool,

    /// Group panels that follow an expanded row into that row.
    #[arg(long, default_value_t = false)]
    adopt_row_siblings: bool,

    /// Convert panels in parallel.
    #[arg(long, default_value_t = false)]
    parallel: bool,

    /// Override rayon worker threads (parallel mode only).
    #[arg(long)]
    threads: Option<usize>,

    /// Write `{}` instead of failing on malformed input.
    #[arg(long, default_value_t = false)]
    lossy: bool,
}

#[derive(Parser, Debug)]
struct CheckArgs {
    /// Input Grafana dashboard JSON (stdin when absent).
    #[arg(long = "in")]
    in_path: Option<PathBuf>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum NamingChoice {
    Sequential,
    Positional,
}

impl From<NamingChoice> for NamingScheme {
    fn from(c: NamingChoice) -> Self {
        match c {
            NamingChoice::Sequential => NamingScheme::Sequential,
            NamingChoice::Positional => NamingScheme::Positional,
        }
    }
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);
    match cli.cmd {
        Command::Convert(args) => cmd_convert(args),
        Command::Check(args) => cmd_check(args),
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    let level = if quiet {
        tracing::Level::ERROR
    } else {
        match verbose {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        }
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .with_target(false)
        .init();
}

fn cmd_convert(args: ConvertArgs) -> anyhow::Result<ExitCode> {
    let opts = convert_opts(&args)?;
    let input = read_input(args.in_path.as_deref())?;

    let text = if args.lossy {
        let value = grafdog::convert_json_lossy(&input, &opts);
        if args.compact {
            serde_json::to_string(&value)
        } else {
            serde_json::to_string_pretty(&value)
        }
        .context("serialize Datadog dashboard")?
    } else {
        let conversion = grafdog::convert_str(&input, &opts).with_context(|| {
            format!("convert '{}'", display_path(args.in_path.as_deref()))
        })?;
        for d in &conversion.diagnostics {
            eprintln!("{d}");
        }
        if conversion.dropped_targets() > 0 {
            eprintln!("{} target(s) dropped", conversion.dropped_targets());
        }
        conversion.dashboard_json(!args.compact)?
    };

    write_output(args.out.as_deref(), &text)?;
    Ok(ExitCode::SUCCESS)
}

fn convert_opts(args: &ConvertArgs) -> anyhow::Result<ConvertOpts> {
    let mut opts = match &args.config {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("read config '{}'", path.display()))?;
            serde_json::from_str::<ConvertOpts>(&raw)
                .with_context(|| format!("parse config '{}'", path.display()))?
        }
        None => ConvertOpts::default(),
    };
    if let Some(naming) = args.naming {
        opts.naming = naming.into();
    }
    opts.strict_functions |= args.strict_functions;
    opts.adopt_row_siblings |= args.adopt_row_siblings;
    opts.parallel |= args.parallel;
    if args.threads.is_some() {
        opts.threads = args.threads;
    }
    Ok(opts)
}

fn cmd_check(args: CheckArgs) -> anyhow::Result<ExitCode> {
    let dashboard = match args.in_path.as_deref() {
        Some(p) => {
            let f = std::fs::File::open(p).with_context(|| format!("open '{}'", p.display()))?;
            GrafanaDashboard::from_reader(std::io::BufReader::new(f))
        }
        None => GrafanaDashboard::from_reader(std::io::stdin().lock()),
    }
    .with_context(|| format!("check '{}'", display_path(args.in_path.as_deref())))?;

    let mut failures = Vec::new();
    let mut checked = 0usize;
    check_panels(&dashboard.panels, &mut checked, &mut failures);

    let mut stdout = std::io::stdout().lock();
    for d in &failures {
        writeln!(stdout, "{d}").context("write report")?;
    }
    writeln!(
        stdout,
        "{checked} target(s) checked, {} failed to parse",
        failures.len()
    )
    .context("write report")?;

    Ok(if failures.is_empty() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn check_panels(panels: &[Panel], checked: &mut usize, failures: &mut Vec<Diagnostic>) {
    for panel in panels {
        check_panels(&panel.panels, checked, failures);
        for (index, target) in panel.targets.iter().enumerate() {
            let Some(src) = target.expr.as_deref() else {
                continue;
            };
            *checked += 1;
            if let Err(err) = grafdog::promql::parse(src) {
                failures.push(Diagnostic {
                    panel: panel.title.clone(),
                    target: index,
                    query: src.to_owned(),
                    kind: DiagnosticKind::ParseFailed {
                        offset: err.offset,
                        message: err.message,
                    },
                });
            }
        }
    }
}

fn read_input(path: Option<&Path>) -> anyhow::Result<String> {
    match path {
        Some(p) => std::fs::read_to_string(p).with_context(|| format!("read '{}'", p.display())),
        None => {
            let mut s = String::new();
            std::io::stdin()
                .read_to_string(&mut s)
                .context("read stdin")?;
            Ok(s)
        }
    }
}

fn write_output(path: Option<&Path>, text: &str) -> anyhow::Result<()> {
    match path {
        Some(p) => {
            if let Some(parent) = p.parent()
                && !parent.as_os_str().is_empty()
            {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("create output dir '{}'", parent.display()))?;
            }
            std::fs::write(p, format!("{text}\n"))
                .with_context(|| format!("write '{}'", p.display()))?;
            eprintln!("wrote {}", p.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{text}").context("write stdout")?;
        }
    }
    Ok(())
}

fn display_path(path: Option<&Path>) -> String {
    path.map_or_else(|| "<stdin>".to_owned(), |p| p.display().to_string())
}
