//! glyphlens CLI (made by FontLab https://www.fontlab.com/)

use std::env;
use std::io::{self, BufRead, IsTerminal, Write};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum, ValueHint};
use regex::Regex;
use serde::Serialize;

use glyphlens_core::codepoints::parse_codepoint_args;
use glyphlens_core::feature::FeatureId;
use glyphlens_core::glyphs::provider::MemoryGlyphProvider;
use glyphlens_core::glyphs::service::GlyphMetadataService;
use glyphlens_core::glyphs::{GlyphDataProvider, GlyphDescriptor, GlyphStoreConfig, DEFAULT_SEARCH_LIMIT};
use glyphlens_core::output::{write_json_pretty, write_ndjson};
use glyphlens_core::script::{ScriptSegment, ScriptSegmentation};
use glyphlens_core::tags::tag4;
use glyphlens_core::typography::{analyze_variants, character_string, AnalysisOptions, VariantFeatures};
use glyphlens_core::variant::{load_all, load_variants, FontSource, FontVariant};

#[cfg(feature = "hpindex")]
use glyphlens_core::glyphs::index::IndexedGlyphProvider;

/// CLI entrypoint for glyphlens.
#[derive(Debug, Parser)]
#[command(
    name = "glyphlens",
    about = "Glyph descriptions and per-script OpenType features (made by FontLab https://www.fontlab.com/)"
)]
pub struct Cli {
    /// Directory with UnicodeData.txt, mdl2.tsv or fontawesome.tsv overrides
    /// (defaults to $GLYPHLENS_DATA_DIR)
    #[arg(long = "data-dir", global = true, value_hint = ValueHint::DirPath)]
    data_dir: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long = "verbose", global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List the typography features each face offers
    Features(FeaturesArgs),
    /// Show how each face's repertoire splits into script runs
    Scripts(ScriptsArgs),
    /// Describe code points as seen by one face
    Describe(DescribeArgs),
    /// Search one face's characters by hex value or description
    Search(SearchArgs),
    /// Manage the persistent glyph description index
    #[cfg(feature = "hpindex")]
    #[command(subcommand)]
    Index(IndexCommand),
}

#[derive(Debug, Args)]
struct FontArgs {
    /// Fonts or directories to read
    #[arg(
        value_hint = ValueHint::AnyPath,
        required_unless_present_any = ["system_fonts", "stdin_paths"]
    )]
    paths: Vec<PathBuf>,

    /// Read newline-delimited paths from STDIN
    #[arg(long = "stdin-paths", action = ArgAction::SetTrue)]
    stdin_paths: bool,

    /// Include common system font directories automatically
    #[arg(long = "system-fonts", action = ArgAction::SetTrue)]
    system_fonts: bool,

    /// Follow symlinks while walking directories
    #[arg(long = "follow-symlinks", action = ArgAction::SetTrue)]
    follow_symlinks: bool,

    /// Regex that the family name must match
    #[arg(short = 'n', long = "family", value_hint = ValueHint::Other)]
    family: Option<String>,
}

#[derive(Debug, Args)]
struct OutputArgs {
    /// Emit a single JSON array
    #[arg(long = "json", action = ArgAction::SetTrue, conflicts_with = "ndjson")]
    json: bool,

    /// Emit newline-delimited JSON
    #[arg(long = "ndjson", action = ArgAction::SetTrue)]
    ndjson: bool,

    /// Control colorized output (auto|always|never)
    #[arg(long = "color", default_value_t = ColorChoice::Auto, value_enum)]
    color: ColorChoice,
}

#[derive(Debug, Args)]
struct FeaturesArgs {
    #[command(flatten)]
    fonts: FontArgs,

    /// Also list features per script run
    #[arg(long = "by-script", action = ArgAction::SetTrue)]
    by_script: bool,

    /// Only keep faces offering all of these feature tags
    #[arg(short = 'f', long = "require", value_delimiter = ',', value_hint = ValueHint::Other)]
    require: Vec<String>,

    /// Worker threads for analysis (defaults to all cores)
    #[arg(short = 'j', long = "jobs")]
    jobs: Option<usize>,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Debug, Args)]
struct ScriptsArgs {
    #[command(flatten)]
    fonts: FontArgs,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Debug, Args)]
struct FaceArgs {
    /// Font file (TTF, OTF, TTC, OTC)
    #[arg(value_hint = ValueHint::FilePath)]
    font: PathBuf,

    /// Face index inside a collection
    #[arg(long = "face", default_value_t = 0)]
    face: usize,

    /// Read descriptions from the persistent index
    #[cfg(feature = "hpindex")]
    #[arg(long = "use-index", action = ArgAction::SetTrue)]
    use_index: bool,

    /// Emit a single JSON array
    #[arg(long = "json", action = ArgAction::SetTrue)]
    json: bool,
}

#[derive(Debug, Args)]
struct DescribeArgs {
    #[command(flatten)]
    face: FaceArgs,

    /// Code points or ranges (e.g. U+0041-U+0044,B)
    #[arg(required = true, value_delimiter = ',', value_hint = ValueHint::Other)]
    codepoints: Vec<String>,
}

#[derive(Debug, Args)]
struct SearchArgs {
    #[command(flatten)]
    face: FaceArgs,

    /// Hex value (41, U+0041) or part of a description
    query: String,

    /// Maximum number of results
    #[arg(short = 'l', long = "limit", default_value_t = DEFAULT_SEARCH_LIMIT)]
    limit: usize,
}

#[cfg(feature = "hpindex")]
#[derive(Debug, Subcommand)]
enum IndexCommand {
    /// Build or refresh the index from the description tables
    Build(IndexBuildArgs),
}

#[cfg(feature = "hpindex")]
#[derive(Debug, Args)]
struct IndexBuildArgs {
    /// Index directory (defaults to $GLYPHLENS_INDEX_PATH or ~/.cache/glyphlens/index)
    #[arg(long = "index-path", value_hint = ValueHint::DirPath)]
    index_path: Option<PathBuf>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum ColorChoice {
    Auto,
    Always,
    Never,
}

/// One face's script runs.
#[derive(Debug, Serialize)]
struct ScriptReport {
    source: Option<FontSource>,
    family_name: String,
    style_name: String,
    segments: Vec<ScriptSegment>,
}

/// One `describe` row; `description` is absent when no table knows the code point.
#[derive(Debug, Serialize)]
struct Description {
    code_point: u32,
    hex: String,
    description: Option<String>,
}

/// Parse CLI args and execute the selected command.
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let data_dir = cli.data_dir.or_else(|| env::var_os("GLYPHLENS_DATA_DIR").map(PathBuf::from));

    match cli.command {
        Command::Features(args) => run_features(args),
        Command::Scripts(args) => run_scripts(args),
        Command::Describe(args) => run_describe(args, store_config(data_dir, DEFAULT_SEARCH_LIMIT)),
        Command::Search(args) => {
            let store = store_config(data_dir, args.limit);
            run_search(args, store)
        }
        #[cfg(feature = "hpindex")]
        Command::Index(cmd) => run_index(cmd, store_config(data_dir, DEFAULT_SEARCH_LIMIT)),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .try_init();
}

fn store_config(data_dir: Option<PathBuf>, search_limit: usize) -> GlyphStoreConfig {
    GlyphStoreConfig { data_dir, search_limit }
}

fn run_features(args: FeaturesArgs) -> Result<()> {
    if args.jobs == Some(0) {
        return Err(anyhow!("--jobs must be at least 1"));
    }
    let required = parse_required_features(&args.require)?;
    let variants = load_selected(&args.fonts)?;
    let opts = AnalysisOptions {
        jobs: args.jobs,
        by_script: args.by_script,
    };

    let mut reports = analyze_variants(&variants, &opts)?;
    if !required.is_empty() {
        reports.retain(|report| offers_all(report, &required));
    }
    log::info!("analysed {} of {} faces", reports.len(), variants.len());

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    if args.output.ndjson {
        write_ndjson(&reports, &mut handle)
    } else if args.output.json {
        write_json_pretty(&reports, &mut handle)
    } else {
        let color = use_color(args.output.color);
        write_features_plain(&reports, &mut handle, color)
    }
}

fn parse_required_features(raw: &[String]) -> Result<Vec<FeatureId>> {
    raw.iter()
        .map(|tag| tag4(tag.trim()).map(FeatureId::from_tag))
        .collect::<Result<Vec<_>>>()
        .context("parsing --require")
}

fn offers_all(report: &VariantFeatures, required: &[FeatureId]) -> bool {
    required
        .iter()
        .all(|id| report.features.iter().any(|feature| feature.id() == *id))
}

fn run_scripts(args: ScriptsArgs) -> Result<()> {
    let variants = load_selected(&args.fonts)?;
    let reports: Vec<ScriptReport> = variants
        .iter()
        .map(|variant| ScriptReport {
            source: variant.source().cloned(),
            family_name: variant.family_name().to_string(),
            style_name: variant.style_name().to_string(),
            segments: ScriptSegmentation::analyze(&character_string(variant)).segments().to_vec(),
        })
        .collect();

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    if args.output.ndjson {
        write_ndjson(&reports, &mut handle)
    } else if args.output.json {
        write_json_pretty(&reports, &mut handle)
    } else {
        let color = use_color(args.output.color);
        write_scripts_plain(&reports, &mut handle, color)
    }
}

fn run_describe(args: DescribeArgs, store: GlyphStoreConfig) -> Result<()> {
    #[cfg(feature = "hpindex")]
    {
        if args.face.use_index {
            return describe_with(IndexedGlyphProvider::new(store, index_path(None)?), &args);
        }
    }
    describe_with(MemoryGlyphProvider::new(store), &args)
}

fn describe_with<P: GlyphDataProvider>(provider: P, args: &DescribeArgs) -> Result<()> {
    let code_points = parse_codepoint_args(&args.codepoints)?;
    let variant = load_face(&args.face)?;
    let service = GlyphMetadataService::new(provider)?;
    runtime()?.block_on(service.initialize())?;

    let rows: Vec<Description> = code_points
        .into_iter()
        .map(|code_point| Description {
            code_point,
            hex: format!("{code_point:04X}"),
            description: service.description(code_point, Some(&variant)),
        })
        .collect();

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    if args.face.json {
        return write_json_pretty(&rows, &mut handle);
    }
    for row in &rows {
        let text = row.description.as_deref().unwrap_or("(no description)");
        writeln!(handle, "U+{}\t{text}", row.hex)?;
    }
    Ok(())
}

fn run_search(args: SearchArgs, store: GlyphStoreConfig) -> Result<()> {
    #[cfg(feature = "hpindex")]
    {
        if args.face.use_index {
            return search_with(IndexedGlyphProvider::new(store, index_path(None)?), &args);
        }
    }
    search_with(MemoryGlyphProvider::new(store), &args)
}

fn search_with<P: GlyphDataProvider>(provider: P, args: &SearchArgs) -> Result<()> {
    let variant = load_face(&args.face)?;
    let service = GlyphMetadataService::new(provider)?;

    let rt = runtime()?;
    rt.block_on(service.initialize())?;
    let hits: Vec<GlyphDescriptor> = rt.block_on(service.search(&args.query, Some(&variant)))?;
    log::info!("{} matches for {:?} in {}", hits.len(), args.query, variant.display_name());

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    if args.face.json {
        return write_json_pretty(&hits, &mut handle);
    }
    for hit in &hits {
        writeln!(handle, "U+{}\t{}", hit.hex, hit.description)?;
    }
    Ok(())
}

#[cfg(feature = "hpindex")]
fn run_index(cmd: IndexCommand, store: GlyphStoreConfig) -> Result<()> {
    match cmd {
        IndexCommand::Build(args) => {
            let dir = index_path(args.index_path)?;
            let service = GlyphMetadataService::new(IndexedGlyphProvider::new(store, &dir))?;
            let report = runtime()?.block_on(service.initialize())?;
            let state = if report.regenerated { "rebuilt" } else { "already current" };
            println!("{}: {} rows, {state}", dir.display(), report.rows_indexed);
            Ok(())
        }
    }
}

#[cfg(feature = "hpindex")]
fn index_path(explicit: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path);
    }
    if let Some(raw) = env::var_os("GLYPHLENS_INDEX_PATH") {
        return Ok(PathBuf::from(raw));
    }
    let home = env::var_os("HOME")
        .or_else(|| env::var_os("USERPROFILE"))
        .ok_or_else(|| anyhow!("no home directory; set GLYPHLENS_INDEX_PATH or pass --index-path"))?;
    Ok(PathBuf::from(home).join(".cache").join("glyphlens").join("index"))
}

fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("starting async runtime")
}

fn load_selected(args: &FontArgs) -> Result<Vec<FontVariant>> {
    let stdin = io::stdin();
    let paths = gather_paths(&args.paths, args.stdin_paths, args.system_fonts, stdin.lock())?;
    let family = compile_family(args.family.as_deref())?;

    let mut variants = load_all(&paths, args.follow_symlinks)?;
    if let Some(pattern) = family {
        variants.retain(|variant| pattern.is_match(variant.family_name()));
    }
    Ok(variants)
}

fn compile_family(pattern: Option<&str>) -> Result<Option<Regex>> {
    pattern
        .map(|raw| Regex::new(raw).with_context(|| format!("invalid regex: {raw}")))
        .transpose()
}

fn load_face(args: &FaceArgs) -> Result<FontVariant> {
    let mut variants = load_variants(&args.font)?;
    let available = variants.len();
    if args.face >= available {
        return Err(anyhow!(
            "{} has {available} face(s); --face {} is out of range",
            args.font.display(),
            args.face
        ));
    }
    Ok(variants.swap_remove(args.face))
}

fn gather_paths(
    raw_paths: &[PathBuf],
    read_stdin: bool,
    include_system: bool,
    mut stdin: impl BufRead,
) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();

    if read_stdin {
        paths.extend(read_paths_from(&mut stdin)?);
    }

    for path in raw_paths {
        if path == Path::new("-") {
            paths.extend(read_paths_from(&mut stdin)?);
        } else {
            paths.push(path.clone());
        }
    }

    if include_system {
        paths.extend(system_font_roots()?);
    }

    if paths.is_empty() {
        return Err(anyhow!("no font paths provided"));
    }

    Ok(paths)
}

fn read_paths_from(reader: &mut impl BufRead) -> Result<Vec<PathBuf>> {
    let mut buf = String::new();
    let mut paths = Vec::new();

    loop {
        buf.clear();
        let read = reader.read_line(&mut buf)?;
        if read == 0 {
            break;
        }

        let trimmed = buf.trim();
        if !trimmed.is_empty() {
            paths.push(PathBuf::from(trimmed));
        }
    }

    Ok(paths)
}

fn system_font_roots() -> Result<Vec<PathBuf>> {
    if let Ok(raw) = env::var("GLYPHLENS_SYSTEM_FONT_DIRS") {
        let mut overrides: Vec<PathBuf> = raw
            .split([':', ';'])
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
            .filter(|p| p.exists())
            .collect();

        overrides.sort();
        overrides.dedup();

        return if overrides.is_empty() {
            Err(anyhow!("GLYPHLENS_SYSTEM_FONT_DIRS is set but no paths exist"))
        } else {
            Ok(overrides)
        };
    }

    let mut candidates: Vec<PathBuf> = Vec::new();

    #[cfg(target_os = "macos")]
    {
        candidates.push(PathBuf::from("/System/Library/Fonts"));
        candidates.push(PathBuf::from("/Library/Fonts"));
        if let Some(home) = env::var_os("HOME") {
            candidates.push(PathBuf::from(home).join("Library/Fonts"));
        }
    }

    #[cfg(target_os = "linux")]
    {
        candidates.push(PathBuf::from("/usr/share/fonts"));
        candidates.push(PathBuf::from("/usr/local/share/fonts"));
        if let Some(home) = env::var_os("HOME") {
            candidates.push(PathBuf::from(home).join(".local/share/fonts"));
        }
    }

    #[cfg(target_os = "windows")]
    {
        if let Some(system_root) = env::var_os("SYSTEMROOT") {
            candidates.push(PathBuf::from(system_root).join("Fonts"));
        }
        if let Some(local_appdata) = env::var_os("LOCALAPPDATA") {
            candidates.push(PathBuf::from(local_appdata).join("Microsoft/Windows/Fonts"));
        }
    }

    candidates.retain(|p| p.exists());
    candidates.sort();
    candidates.dedup();

    if candidates.is_empty() {
        return Err(anyhow!("no system font directories found for this platform"));
    }

    Ok(candidates)
}

fn use_color(choice: ColorChoice) -> bool {
    match choice {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => io::stdout().is_terminal(),
    }
}

fn write_features_plain(reports: &[VariantFeatures], mut w: impl Write, color: bool) -> Result<()> {
    for report in reports {
        write_heading(&mut w, report.source.as_ref(), &report.family_name, &report.style_name, color)?;
        for feature in &report.features {
            writeln!(w, "  {feature}")?;
        }
        for run in &report.scripts {
            let label = format!("{} [{}..{})", run.script.iso15924(), run.range.start, run.range.end());
            writeln!(w, "  {}", apply_color(&label, color, AnsiColor::Green))?;
            for feature in &run.features {
                writeln!(w, "    {feature}")?;
            }
        }
    }
    Ok(())
}

fn write_scripts_plain(reports: &[ScriptReport], mut w: impl Write, color: bool) -> Result<()> {
    for report in reports {
        write_heading(&mut w, report.source.as_ref(), &report.family_name, &report.style_name, color)?;
        for segment in &report.segments {
            let tag = apply_color(segment.script.iso15924(), color, AnsiColor::Green);
            writeln!(
                w,
                "  {tag}  {:<12} [{}..{})  {} chars",
                segment.script.to_string(),
                segment.range.start,
                segment.range.end(),
                segment.range.count
            )?;
        }
    }
    Ok(())
}

fn write_heading(
    mut w: impl Write,
    source: Option<&FontSource>,
    family: &str,
    style: &str,
    color: bool,
) -> Result<()> {
    let path = source
        .map(FontSource::path_with_index)
        .unwrap_or_else(|| "(memory)".to_string());
    let name = format!("{family} {style}");
    writeln!(
        w,
        "{}  {}",
        apply_color(&path, color, AnsiColor::Cyan),
        apply_color(&name, color, AnsiColor::Yellow)
    )?;
    Ok(())
}

#[derive(Copy, Clone)]
enum AnsiColor {
    Cyan,
    Yellow,
    Green,
}

fn apply_color(text: &str, color: bool, code: AnsiColor) -> String {
    if !color {
        return text.to_string();
    }

    let code_str = match code {
        AnsiColor::Cyan => "36",
        AnsiColor::Yellow => "33",
        AnsiColor::Green => "32",
    };

    format!("\u{1b}[{}m{}\u{1b}[0m", code_str, text)
}
