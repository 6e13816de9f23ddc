use glimpse::geom::ScreenRect;
use glimpse::svg::{FALLBACK_SIZE, intrinsic_size, optimize_svg, svg_data_uri};
use glimpse::utils::format_file_size;
use glimpse::viewport::{
    Bitmap, ExportFormat, ExportOptions, RasterPlacement, Surface, ViewportEngine,
    ViewportOptions,
};
use glimpse::{Background, ContentKind, DetectedKind, ExtractOptions, Transform};
use serde::Serialize;
use std::io::{Read, Write};
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Io(std::io::Error),
    Core(glimpse::Error),
    Render(glimpse::viewport::RenderError),
    Json(serde_json::Error),
    NotVector(DetectedKind),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Core(err) => write!(f, "{err}"),
            CliError::Render(err) => write!(f, "{err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
            CliError::NotVector(kind) => write!(f, "No SVG content found (detected {kind})"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<glimpse::Error> for CliError {
    fn from(value: glimpse::Error) -> Self {
        Self::Core(value)
    }
}

impl From<glimpse::viewport::RenderError> for CliError {
    fn from(value: glimpse::viewport::RenderError) -> Self {
        Self::Render(value)
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
    Extract,
    Detect,
    Dimensions,
    Optimize,
    Export,
}

#[derive(Debug, Default)]
struct Args {
    command: Command,
    input: Option<String>,
    prefer_markup: bool,
    json: bool,
    data_uri: bool,
    no_extract: bool,
    verbose: bool,
    format: ExportFormat,
    scale: Option<f32>,
    background: Option<Background>,
    config: Option<String>,
    out: Option<String>,
}

#[derive(Serialize)]
struct ExtractOut<'a> {
    kind: DetectedKind,
    text: &'a str,
}

#[derive(Serialize)]
struct DimensionsOut {
    width: f64,
    height: f64,
}

fn usage() -> &'static str {
    "glimpse-cli\n\
\n\
USAGE:\n\
  glimpse-cli [extract] [--markup] [--json] [<path>|-]\n\
  glimpse-cli detect [<path>|-]\n\
  glimpse-cli dimensions [--json] [--no-extract] [<path>|-]\n\
  glimpse-cli optimize [--data-uri] [--no-extract] [<path>|-]\n\
  glimpse-cli export [--format png|jpg] [--scale <n>] [--background transparent|white|black] [--config <path.json>] [--out <path>] [--no-extract] [<path>|-]\n\
\n\
OPTIONS:\n\
  --verbose        log debug output to stderr (GLIMPSE_LOG=<level> overrides)\n\
\n\
NOTES:\n\
  - If <path> is omitted or '-', input is read from stdin.\n\
  - extract prints the SVG or HTML fragment recovered from the input (prefers SVG unless --markup).\n\
  - export only accepts SVG content; --out - writes the image to stdout.\n\
  - PNG/JPG output defaults to writing next to the input file (or ./out.png, ./out.jpg for stdin).\n\
"
}

fn next_value<'a>(it: &mut impl Iterator<Item = &'a String>) -> Result<&'a String, CliError> {
    it.next().ok_or(CliError::Usage(usage()))
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args::default();

    let mut it = argv.iter().skip(1);
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "extract" => args.command = Command::Extract,
            "detect" => args.command = Command::Detect,
            "dimensions" => args.command = Command::Dimensions,
            "optimize" => args.command = Command::Optimize,
            "export" => args.command = Command::Export,
            "--markup" => args.prefer_markup = true,
            "--json" => args.json = true,
            "--data-uri" => args.data_uri = true,
            "--no-extract" => args.no_extract = true,
            "--verbose" | "-v" => args.verbose = true,
            "--format" => {
                args.format = next_value(&mut it)?
                    .parse::<ExportFormat>()
                    .map_err(|_| CliError::Usage(usage()))?;
            }
            "--scale" => {
                let scale = next_value(&mut it)?
                    .parse::<f32>()
                    .map_err(|_| CliError::Usage(usage()))?;
                if !(scale.is_finite() && scale > 0.0) {
                    return Err(CliError::Usage(usage()));
                }
                args.scale = Some(scale);
            }
            "--background" => {
                args.background = Some(Background::from_str(next_value(&mut it)?)?);
            }
            "--config" => args.config = Some(next_value(&mut it)?.clone()),
            "--out" => args.out = Some(next_value(&mut it)?.clone()),
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

fn init_logging(verbose: bool) {
    let default = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    let level = std::env::var("GLIMPSE_LOG")
        .ok()
        .and_then(|v| tracing::Level::from_str(v.trim()).ok())
        .unwrap_or(default);
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .with_target(false)
        .init();
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

fn read_config(path: Option<&str>) -> Result<ViewportOptions, CliError> {
    match path {
        None => Ok(ViewportOptions::default()),
        Some(path) => {
            let text = std::fs::read_to_string(path)?;
            Ok(serde_json::from_str(&text)?)
        }
    }
}

fn write_json(value: &impl Serialize) -> Result<(), CliError> {
    let mut out = std::io::stdout().lock();
    serde_json::to_writer(&mut out, value)?;
    writeln!(out)?;
    Ok(())
}

fn default_raster_out_path(input: Option<&str>, ext: &str) -> PathBuf {
    match input {
        Some(path) if path != "-" => PathBuf::from(path).with_extension(ext),
        _ => PathBuf::from(format!("out.{ext}")),
    }
}

/// The SVG the size/optimize/export commands work on.
fn vector_content(text: &str, args: &Args) -> Result<String, CliError> {
    let content = if args.no_extract {
        text.trim().to_string()
    } else {
        glimpse::extract(text, true)
    };
    match glimpse::detect_kind(&content) {
        DetectedKind::Vector => Ok(content),
        other => Err(CliError::NotVector(other)),
    }
}

/// Off-screen stand-in for a preview pane.
struct HeadlessSurface;

impl Surface for HeadlessSurface {
    fn bounds(&self) -> ScreenRect {
        glimpse::geom::screen_rect(0.0, 0.0, 800.0, 600.0)
    }

    fn present_vector(&mut self, _content: &str, _kind: ContentKind, _transform: &Transform) {}

    fn present_raster(&mut self, _bitmap: &Bitmap, _placement: RasterPlacement) {}
}

fn run(args: Args) -> Result<(), CliError> {
    let text = read_input(args.input.as_deref())?;

    match args.command {
        Command::Extract => {
            let options = if args.prefer_markup {
                ExtractOptions::prefer_markup()
            } else {
                ExtractOptions::prefer_vector()
            };
            let extraction = glimpse::extract_with_kind(&text, &options);
            tracing::debug!(kind = %extraction.kind, len = extraction.text.len(), "extracted");
            if args.json {
                write_json(&ExtractOut {
                    kind: extraction.kind,
                    text: &extraction.text,
                })?;
            } else {
                println!("{}", extraction.text);
            }
            Ok(())
        }
        Command::Detect => {
            println!("{}", glimpse::detect_kind(&text));
            Ok(())
        }
        Command::Dimensions => {
            let svg = vector_content(&text, &args)?;
            let size = intrinsic_size(&svg, FALLBACK_SIZE);
            if args.json {
                write_json(&DimensionsOut {
                    width: size.width,
                    height: size.height,
                })?;
            } else {
                println!("{}x{}", size.width, size.height);
            }
            Ok(())
        }
        Command::Optimize => {
            let svg = optimize_svg(&vector_content(&text, &args)?);
            if args.data_uri {
                println!("{}", svg_data_uri(&svg));
            } else {
                println!("{svg}");
            }
            Ok(())
        }
        Command::Export => {
            let svg = vector_content(&text, &args)?;
            let config = read_config(args.config.as_deref())?;
            let background = args.background.unwrap_or(match args.format {
                ExportFormat::Png => Background::Transparent,
                ExportFormat::Jpeg => Background::White,
            });
            let options = ExportOptions {
                scale: args.scale.unwrap_or(1.0),
                background,
                format: args.format,
                ..Default::default()
            };

            let mut engine = ViewportEngine::new(HeadlessSurface, config);
            engine.set_content(svg, ContentKind::Vector);
            let bytes = engine.export(&options)?;
            engine.dispose();

            let out = args.out.clone().unwrap_or_else(|| {
                default_raster_out_path(args.input.as_deref(), args.format.extension())
                    .to_string_lossy()
                    .to_string()
            });
            if out == "-" {
                std::io::stdout().lock().write_all(&bytes)?;
            } else {
                std::fs::write(&out, &bytes)?;
                tracing::info!(
                    path = %out,
                    size = %format_file_size(bytes.len() as u64),
                    "exported"
                );
            }
            Ok(())
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
            std::process::exit(2);
        }
    };

    init_logging(args.verbose);

    if let Err(err) = run(args) {
        eprintln!("{err}");
        std::process::exit(1);
    }
}
