use std::{
    fs::File,
    io::{BufReader, Write as _},
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "ffgraph", version)]
struct Cli {
    /// Log at debug level.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the argv a job renders to.
    Render(RenderArgs),
    /// Run a job and print progress snapshots as JSON lines.
    Run(RunArgs),
    /// Check that the ffmpeg binary can be executed.
    Check(CheckArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Job JSON: `{"command": {...}, "runner": {...}}`.
    #[arg(long)]
    job: PathBuf,

    /// Print a JSON array instead of one token per line.
    #[arg(long)]
    json: bool,
}

#[derive(Parser, Debug)]
struct RunArgs {
    /// Job JSON: `{"command": {...}, "runner": {...}}`.
    #[arg(long)]
    job: PathBuf,

    /// Override the binary from the job file.
    #[arg(long)]
    binary: Option<PathBuf>,

    /// Kill the process after this many seconds.
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Pipe carrying the `-progress` stream.
    #[arg(long, value_enum)]
    progress_stream: Option<StreamChoice>,
}

#[derive(Parser, Debug)]
struct CheckArgs {
    #[arg(long, default_value = "ffmpeg")]
    binary: PathBuf,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum StreamChoice {
    Stderr,
    Stdout,
}

#[derive(serde::Deserialize)]
struct Job {
    command: ffgraph::CommandModel,
    #[serde(default)]
    runner: Option<ffgraph::RunnerConfig>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Run(args) => cmd_run(args),
        Command::Check(args) => cmd_check(args),
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn read_job(path: &Path) -> anyhow::Result<Job> {
    let f = File::open(path).with_context(|| format!("open job '{}'", path.display()))?;
    let r = BufReader::new(f);
    let job: Job = serde_json::from_reader(r).with_context(|| "parse job JSON")?;
    Ok(job)
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let job = read_job(&args.job)?;
    let tokens = job.command.render()?;

    let mut stdout = std::io::stdout().lock();
    if args.json {
        serde_json::to_writer(&mut stdout, &tokens).with_context(|| "write argv JSON")?;
        writeln!(stdout)?;
    } else {
        for token in &tokens {
            writeln!(stdout, "{token}")?;
        }
    }
    Ok(())
}

fn cmd_run(args: RunArgs) -> anyhow::Result<()> {
    let job = read_job(&args.job)?;

    let mut config = job.runner.unwrap_or_default();
    if let Some(binary) = args.binary {
        config = config.with_binary(binary);
    }
    if let Some(secs) = args.timeout_secs {
        config = config.with_timeout(Duration::from_secs(secs));
    }
    if let Some(stream) = args.progress_stream {
        config = config.with_progress_stream(match stream {
            StreamChoice::Stderr => ffgraph::ProgressStream::Stderr,
            StreamChoice::Stdout => ffgraph::ProgressStream::Stdout,
        });
    }

    let runner = ffgraph::Runner::new(config);
    runner.run_with_progress(&job.command, |progress| {
        let mut stdout = std::io::stdout().lock();
        if let Err(e) = serde_json::to_writer(&mut stdout, &progress)
            .map_err(anyhow::Error::from)
            .and_then(|()| writeln!(stdout).map_err(anyhow::Error::from))
        {
            tracing::warn!(error = %e, "failed to print progress");
        }
    })?;

    tracing::info!("done");
    Ok(())
}

fn cmd_check(args: CheckArgs) -> anyhow::Result<()> {
    if ffgraph::is_binary_available(&args.binary) {
        eprintln!("{} is available", args.binary.display());
        Ok(())
    } else {
        anyhow::bail!("'{}' could not be executed", args.binary.display())
    }
}
