use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "layergen", version)]
struct Cli {
    /// Log level for stderr diagnostics (error, warn, info, debug, trace).
    #[arg(long, global = true, default_value = "warn")]
    log_level: tracing::Level,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render one request document and print the output URI.
    Render(RenderArgs),
    /// Render several request documents in parallel, one URI (or error) per line.
    Batch(BatchArgs),
}

#[derive(Args, Debug)]
struct AssetArgs {
    /// Root directory for bundled picture names. Defaults to the request file's directory.
    #[arg(long)]
    assets_dir: Option<PathBuf>,

    /// Font directory. Defaults to `<assets-dir>/fonts`.
    #[arg(long)]
    fonts_dir: Option<PathBuf>,

    /// Family used when a text layer's family cannot be resolved.
    #[arg(long)]
    fallback_font: Option<String>,
}

#[derive(Args, Debug)]
struct RenderArgs {
    /// Input request JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Override the output PNG path.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Print a base64 data URI instead of writing a file.
    #[arg(long, default_value_t = false)]
    base64: bool,

    #[command(flatten)]
    assets: AssetArgs,
}

#[derive(Args, Debug)]
struct BatchArgs {
    /// Input request JSON files.
    #[arg(long = "in", required = true, num_args = 1..)]
    in_paths: Vec<PathBuf>,

    #[command(flatten)]
    assets: AssetArgs,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(cli.log_level)
        .init();

    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Batch(args) => cmd_batch(args),
    }
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let mut request = layergen::GenerateRequest::from_path(&args.in_path)
        .with_context(|| format!("load request '{}'", args.in_path.display()))?;
    apply_output_overrides(&mut request, args.out.as_deref(), args.base64)?;

    let opts = opts_for(&args.assets, &args.in_path);
    let out = layergen::generate(&request, &opts)
        .with_context(|| format!("generate '{}'", args.in_path.display()))?;
    for w in &out.warnings {
        eprintln!("warning: {w}");
    }
    println!("{}", out.uri);
    Ok(())
}

fn cmd_batch(args: BatchArgs) -> anyhow::Result<()> {
    let requests = args
        .in_paths
        .iter()
        .map(|p| {
            layergen::GenerateRequest::from_path(p)
                .with_context(|| format!("load request '{}'", p.display()))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    let first = args.in_paths.first().map(PathBuf::as_path).unwrap_or(Path::new("."));
    let opts = opts_for(&args.assets, first);
    let results = layergen::generate_batch(&requests, &opts);

    let mut failed = 0usize;
    for (path, result) in args.in_paths.iter().zip(results) {
        match result {
            Ok(out) => println!("{}", out.uri),
            Err(err) => {
                failed += 1;
                eprintln!("{}: {} ({})", path.display(), err, err.stage());
            }
        }
    }
    if failed > 0 {
        anyhow::bail!("{failed} of {} requests failed", args.in_paths.len());
    }
    Ok(())
}

fn opts_for(args: &AssetArgs, in_path: &Path) -> layergen::GenerateOpts {
    let mut opts = layergen::GenerateOpts::from_env();
    if let Some(dir) = &args.assets_dir {
        opts.assets_root = dir.clone();
    } else if std::env::var_os("LAYERGEN_ASSETS_DIR").is_none() {
        opts.assets_root = in_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."))
            .to_path_buf();
    }
    if let Some(dir) = &args.fonts_dir {
        opts.fonts_dir = Some(dir.clone());
    }
    if let Some(family) = &args.fallback_font {
        opts.fallback_font_family = family.clone();
    }
    opts
}

fn apply_output_overrides(
    request: &mut layergen::GenerateRequest,
    out: Option<&Path>,
    base64: bool,
) -> anyhow::Result<()> {
    if out.is_none() && !base64 {
        return Ok(());
    }
    let config = request
        .config
        .as_object_mut()
        .context("request `config` must be an object")?;
    if let Some(out) = out {
        config.insert(
            "filePath".to_owned(),
            serde_json::Value::String(out.display().to_string()),
        );
        config.insert("base64".to_owned(), serde_json::Value::Bool(false));
    }
    if base64 {
        config.insert("base64".to_owned(), serde_json::Value::Bool(true));
    }
    Ok(())
}
