use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use certiforge::batch::sink::DirectorySink;
use certiforge::template::{self, GenerateOpts};
use certiforge::{
    AssetStore, BatchOpts, CpuRenderer, FontBook, FontBookOpts, RenderBackend, RenderOpts,
    VerificationSeed, binding, codec,
};

#[derive(Parser, Debug)]
#[command(name = "certiforge", version, about = "Compose and render certificate templates")]
struct Cli {
    /// Log debug events (overridden by RUST_LOG).
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Extra font directory (repeatable).
    #[arg(long = "font-dir", global = true)]
    font_dirs: Vec<PathBuf>,

    /// Do not scan system fonts.
    #[arg(long, global = true)]
    no_system_fonts: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the unbound template as a PNG.
    Preview(PreviewArgs),
    /// Generate one certificate per CSV/JSON record.
    Generate(GenerateArgs),
    /// List the placeholder names a template expects.
    Fields(TemplateArgs),
    /// Check a stored template and report every problem.
    Validate(ValidateArgs),
    /// Convert a legacy canvas-editor JSON into a scene document.
    Import(ImportArgs),
}

#[derive(Args, Debug)]
struct TemplateArgs {
    /// Stored template JSON.
    #[arg(long)]
    template: PathBuf,

    /// Background image reference, replacing the stored one.
    #[arg(long)]
    background: Option<String>,

    /// Asset root directory (defaults to the template's directory).
    #[arg(long)]
    assets: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct PreviewArgs {
    #[command(flatten)]
    template: TemplateArgs,

    /// Output size multiplier.
    #[arg(long, default_value_t = 1.0)]
    scale: f64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Args, Debug)]
struct GenerateArgs {
    #[command(flatten)]
    template: TemplateArgs,

    /// CSV records (header row names the placeholders).
    #[arg(long, conflicts_with = "json", required_unless_present = "json")]
    csv: Option<PathBuf>,

    /// JSON records (array of flat objects).
    #[arg(long)]
    json: Option<PathBuf>,

    /// Output directory.
    #[arg(long)]
    out_dir: PathBuf,

    /// Output file name prefix.
    #[arg(long, default_value = "certificate")]
    stem: String,

    /// Template id recorded in metadata and verification codes.
    #[arg(long, default_value = certiforge::batch::pipeline::DEFAULT_TEMPLATE_ID)]
    template_id: String,

    /// Issue verification codes with a freshly generated seed.
    #[arg(long)]
    verify: bool,

    /// Issue verification codes with this seed (64 hex characters).
    #[arg(long, conflicts_with = "verify")]
    seed: Option<String>,

    /// Output size multiplier.
    #[arg(long, default_value_t = 1.0)]
    scale: f64,

    /// Worker threads (defaults to CERTIFORGE_THREADS, then the CPU count).
    #[arg(long)]
    threads: Option<usize>,

    /// Render rows one at a time on the calling thread.
    #[arg(long)]
    sequential: bool,

    /// Rows per scheduling chunk.
    #[arg(long, default_value_t = 64)]
    chunk_size: usize,
}

#[derive(Args, Debug)]
struct ValidateArgs {
    /// Stored template JSON.
    #[arg(long)]
    template: PathBuf,
}

#[derive(Args, Debug)]
struct ImportArgs {
    /// Legacy canvas-editor JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output scene document path.
    #[arg(long)]
    out: PathBuf,
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut font_opts = FontBookOpts::from_env();
    font_opts.font_dirs.extend(cli.font_dirs.iter().cloned());
    if cli.no_system_fonts {
        font_opts.system_fonts = false;
    }

    match cli.cmd {
        Command::Preview(args) => cmd_preview(args, &font_opts),
        Command::Generate(args) => cmd_generate(args, &font_opts),
        Command::Fields(args) => cmd_fields(args),
        Command::Validate(args) => cmd_validate(args),
        Command::Import(args) => cmd_import(args),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "certiforge=debug"
    } else {
        "certiforge=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn read_text(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("read '{}'", path.display()))
}

fn load_template(args: &TemplateArgs) -> anyhow::Result<certiforge::SceneDocument> {
    let json = read_text(&args.template)?;
    let doc = template::load(Some(&json), args.background.as_deref())
        .with_context(|| format!("load template '{}'", args.template.display()))?;
    Ok(doc)
}

fn asset_store(args: &TemplateArgs, fonts: Arc<FontBook>) -> AssetStore {
    let root = args.assets.clone().unwrap_or_else(|| {
        args.template
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    });
    AssetStore::from_dir(root, fonts)
}

fn cmd_preview(args: PreviewArgs, font_opts: &FontBookOpts) -> anyhow::Result<ExitCode> {
    let doc = load_template(&args.template)?;
    let fonts = Arc::new(FontBook::new(font_opts));
    let store = asset_store(&args.template, Arc::clone(&fonts));
    let assets = store.prepare_scene(&doc)?;
    let mut renderer = CpuRenderer::new(fonts);
    let image = renderer.render(&doc, &assets, RenderOpts::with_scale(args.scale))?;
    let png = image.to_png()?;

    if let Some(parent) = args.out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(&args.out, png).with_context(|| format!("write png '{}'", args.out.display()))?;
    eprintln!("wrote {} ({}x{})", args.out.display(), image.width, image.height);
    Ok(ExitCode::SUCCESS)
}

fn cmd_generate(args: GenerateArgs, font_opts: &FontBookOpts) -> anyhow::Result<ExitCode> {
    let doc = load_template(&args.template)?;
    let records = match (&args.csv, &args.json) {
        (Some(path), _) => {
            let file = std::fs::File::open(path)
                .with_context(|| format!("open '{}'", path.display()))?;
            binding::records_from_csv(file)?
        }
        (None, Some(path)) => binding::records_from_json(&read_text(path)?)?,
        (None, None) => anyhow::bail!("one of --csv or --json is required"),
    };

    let expected = binding::placeholders(&doc);
    if let Some(first) = records.first() {
        for field in expected.iter().filter(|f| first.get(f).is_none()) {
            tracing::warn!(field = %field, "records have no column for placeholder");
        }
    }

    let verification = match (&args.seed, args.verify) {
        (Some(hex), _) => Some(VerificationSeed::from_hex(hex)?),
        (None, true) => Some(VerificationSeed::generate()),
        (None, false) => None,
    };

    let mut batch = BatchOpts::from_env();
    batch.parallel = !args.sequential;
    batch.chunk_size = args.chunk_size;
    if args.threads.is_some() {
        batch.threads = args.threads;
    }
    batch.render = RenderOpts::with_scale(args.scale);

    let opts = GenerateOpts {
        template_id: args.template_id.clone(),
        verification,
        batch,
    };
    let fonts = Arc::new(FontBook::new(font_opts));
    let store = Arc::new(asset_store(&args.template, fonts));
    let mut sink = DirectorySink::new(&args.out_dir, args.stem.clone());
    let cancel = AtomicBool::new(false);

    let report = template::generate_batch(&doc, &records, store, &opts, &mut sink, &cancel)?;
    let summary = &report.summary;
    eprintln!(
        "{} of {} certificates written to {} ({} failed)",
        summary.succeeded,
        summary.total,
        args.out_dir.display(),
        summary.failed
    );
    for sample in &summary.error_samples {
        eprintln!("  row {}: {}", sample.index, sample.message);
    }
    Ok(if summary.failed == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(2)
    })
}

fn cmd_fields(args: TemplateArgs) -> anyhow::Result<ExitCode> {
    let doc = load_template(&args)?;
    for name in binding::placeholders(&doc) {
        println!("{name}");
    }
    Ok(ExitCode::SUCCESS)
}

fn cmd_validate(args: ValidateArgs) -> anyhow::Result<ExitCode> {
    let json = read_text(&args.template)?;
    match codec::check(&json) {
        Ok(()) => {
            println!("ok");
            Ok(ExitCode::SUCCESS)
        }
        Err(errors) => {
            for e in &errors.errors {
                println!("{e}");
            }
            Ok(ExitCode::FAILURE)
        }
    }
}

fn cmd_import(args: ImportArgs) -> anyhow::Result<ExitCode> {
    let json = read_text(&args.in_path)?;
    let imported = codec::import_fabric(&json)?;
    for skipped in &imported.skipped {
        eprintln!("skipped: {skipped}");
    }
    let out = codec::encode(&imported.document)?;
    std::fs::write(&args.out, out).with_context(|| format!("write '{}'", args.out.display()))?;
    eprintln!(
        "wrote {} ({} elements)",
        args.out.display(),
        imported.document.len()
    );
    Ok(ExitCode::SUCCESS)
}
