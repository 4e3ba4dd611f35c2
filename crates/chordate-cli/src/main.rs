use chordate::render::raster::{self, RasterError, RasterOptions};
use chordate::render::sanitize_svg_id;
use chordate::{ChartConfig, ChartModel, Engine, ParseOptions};
use chordate_render::{ConnectionSource, LayoutOptions, SvgRenderOptions};
use futures::executor::block_on;
use serde::Serialize;
use serde_json::Value;
use std::io::Read;
use std::str::FromStr;

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Io(std::io::Error),
    Chart(chordate::Error),
    Render(chordate_render::Error),
    Raster(RasterError),
    Json(serde_json::Error),
    NoChart,
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Chart(err) => write!(f, "{err}"),
            CliError::Render(err) => write!(f, "{err}"),
            CliError::Raster(err) => write!(f, "{err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
            CliError::NoChart => write!(f, "No chart document detected"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<chordate::Error> for CliError {
    fn from(value: chordate::Error) -> Self {
        Self::Chart(value)
    }
}

impl From<chordate_render::Error> for CliError {
    fn from(value: chordate_render::Error) -> Self {
        Self::Render(value)
    }
}

impl From<RasterError> for CliError {
    fn from(value: RasterError) -> Self {
        Self::Raster(value)
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
    Parse,
    Detect,
    Layout,
    Render,
}

#[derive(Debug, Clone, Copy, Default)]
enum RenderFormat {
    #[default]
    Svg,
    Png,
    Jpeg,
    Pdf,
}

impl FromStr for RenderFormat {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "svg" => Ok(Self::Svg),
            "png" => Ok(Self::Png),
            "jpg" | "jpeg" => Ok(Self::Jpeg),
            "pdf" => Ok(Self::Pdf),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Default)]
struct Args {
    command: Command,
    input: Option<String>,
    pretty: bool,
    with_meta: bool,
    suppress_errors: bool,
    connection_seed: Option<u64>,
    render_format: RenderFormat,
    render_scale: f32,
    background: Option<String>,
    width: Option<f64>,
    height: Option<f64>,
    diagram_id: Option<String>,
    out: Option<String>,
}

#[derive(Serialize)]
struct MetaOut<'a> {
    kind: &'a str,
    config: &'a Value,
    effective_config: &'a Value,
    title: Option<&'a str>,
}

#[derive(Serialize)]
struct ParseOut<'a> {
    meta: MetaOut<'a>,
    model: &'a ChartModel,
}

fn usage() -> &'static str {
    "chordate-cli\n\
\n\
USAGE:\n\
  chordate-cli [parse] [--pretty] [--meta] [--suppress-errors] [<path>|-]\n\
  chordate-cli detect [<path>|-]\n\
  chordate-cli layout [--pretty] [--width <w>] [--height <h>] [--connection-seed <n>] [--suppress-errors] [<path>|-]\n\
  chordate-cli render [--format svg|png|jpg|pdf] [--scale <n>] [--background <css-color>] [--width <w>] [--height <h>] [--connection-seed <n>] [--id <svg-id>] [--out <path>] [--suppress-errors] [<path>|-]\n\
\n\
NOTES:\n\
  - If <path> is omitted or '-', input is read from stdin.\n\
  - parse prints the semantic JSON model by default; --meta wraps it with parse metadata.\n\
  - --width/--height override the chart viewport in the site config.\n\
  - --connection-seed synthesizes a reproducible connection set for chord charts without one.\n\
  - render prints SVG to stdout by default; use --out to write a file.\n\
  - PNG output defaults to writing next to the input file (or ./out.png for stdin).\n\
  - JPG output defaults to writing next to the input file (or ./out.jpg for stdin).\n\
  - PDF output defaults to writing next to the input file (or ./out.pdf for stdin).\n\
"
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args {
        command: Command::Parse,
        render_format: RenderFormat::Svg,
        render_scale: 1.0,
        ..Default::default()
    };

    let mut it = argv.iter().skip(1);
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "parse" => args.command = Command::Parse,
            "detect" => args.command = Command::Detect,
            "layout" => args.command = Command::Layout,
            "render" => args.command = Command::Render,
            "--pretty" => args.pretty = true,
            "--meta" => args.with_meta = true,
            "--suppress-errors" => args.suppress_errors = true,
            "--format" => {
                let Some(fmt) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.render_format = fmt
                    .parse::<RenderFormat>()
                    .map_err(|_| CliError::Usage(usage()))?;
            }
            "--scale" => {
                let Some(scale) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.render_scale = scale.parse::<f32>().map_err(|_| CliError::Usage(usage()))?;
                if !(args.render_scale.is_finite() && args.render_scale > 0.0) {
                    return Err(CliError::Usage(usage()));
                }
            }
            "--background" => {
                let Some(bg) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                if !bg.trim().is_empty() {
                    args.background = Some(bg.trim().to_string());
                }
            }
            "--width" => {
                let Some(w) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.width = Some(w.parse::<f64>().map_err(|_| CliError::Usage(usage()))?);
            }
            "--height" => {
                let Some(h) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.height = Some(h.parse::<f64>().map_err(|_| CliError::Usage(usage()))?);
            }
            "--connection-seed" => {
                let Some(seed) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.connection_seed =
                    Some(seed.parse::<u64>().map_err(|_| CliError::Usage(usage()))?);
            }
            "--id" => {
                let Some(id) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.diagram_id = Some(id.clone());
            }
            "--out" => {
                let Some(out) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.out = Some(out.clone());
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
    Ok(())
}

fn write_text(text: &str, out: Option<&str>) -> Result<(), CliError> {
    match out {
        None => {
            print!("{text}");
            Ok(())
        }
        Some(path) => {
            std::fs::write(path, text)?;
            Ok(())
        }
    }
}

fn write_bytes(bytes: &[u8], out: &str) -> Result<(), CliError> {
    if out == "-" {
        use std::io::Write;
        std::io::stdout().lock().write_all(bytes)?;
    } else {
        std::fs::write(out, bytes)?;
    }
    Ok(())
}

fn default_raster_out_path(input: Option<&str>, ext: &str) -> std::path::PathBuf {
    match input {
        Some(path) if path != "-" => std::path::PathBuf::from(path).with_extension(ext),
        _ => std::path::PathBuf::from(format!("out.{ext}")),
    }
}

fn run(args: Args) -> Result<(), CliError> {
    let text = read_input(args.input.as_deref())?;

    let mut engine = Engine::new();
    if args.width.is_some() || args.height.is_some() {
        let mut cfg = ChartConfig::empty_object();
        for section in ["chord", "barChart"] {
            if let Some(w) = args.width {
                cfg.set_value(&format!("{section}.width"), serde_json::json!(w));
            }
            if let Some(h) = args.height {
                cfg.set_value(&format!("{section}.height"), serde_json::json!(h));
            }
        }
        engine = engine.with_site_config(cfg);
    }
    let options = ParseOptions {
        suppress_errors: args.suppress_errors,
    };

    match args.command {
        Command::Detect => {
            let Some(meta) = block_on(engine.parse_meta(&text, options))? else {
                return Err(CliError::NoChart);
            };
            println!("{}", meta.kind);
            Ok(())
        }
        Command::Parse => {
            let Some(parsed) = block_on(engine.parse_chart(&text, options))? else {
                return Err(CliError::NoChart);
            };

            if args.with_meta {
                let out = ParseOut {
                    meta: MetaOut {
                        kind: &parsed.meta.kind,
                        config: parsed.meta.config.as_value(),
                        effective_config: parsed.meta.effective_config.as_value(),
                        title: parsed.meta.title.as_deref(),
                    },
                    model: &parsed.model,
                };
                write_json(&out, args.pretty)?;
            } else {
                write_json(&parsed.model, args.pretty)?;
            }
            Ok(())
        }
        Command::Layout => {
            let Some(parsed) = block_on(engine.parse_chart(&text, options))? else {
                return Err(CliError::NoChart);
            };

            let layout_opts = layout_options(args.connection_seed);
            let layouted = chordate_render::layout_parsed(&parsed, &layout_opts)?;
            write_json(&layouted, args.pretty)?;
            Ok(())
        }
        Command::Render => {
            let Some(parsed) = block_on(engine.parse_chart(&text, options))? else {
                return Err(CliError::NoChart);
            };

            let layout_opts = layout_options(args.connection_seed);
            let layouted = chordate_render::layout_parsed(&parsed, &layout_opts)?;

            let svg_options = SvgRenderOptions {
                diagram_id: args.diagram_id.as_deref().map(sanitize_svg_id),
                ..Default::default()
            };
            let svg = chordate_render::render_svg(&layouted, &svg_options);

            let raster_opts = RasterOptions {
                scale: args.render_scale,
                background: args.background.clone(),
                ..RasterOptions::default()
            };

            match args.render_format {
                RenderFormat::Svg => write_text(&svg, args.out.as_deref()),
                RenderFormat::Png => {
                    let bytes = raster::svg_to_png(&svg, &raster_opts)?;
                    let out = args.out.clone().unwrap_or_else(|| {
                        default_raster_out_path(args.input.as_deref(), "png")
                            .to_string_lossy()
                            .to_string()
                    });
                    write_bytes(&bytes, &out)
                }
                RenderFormat::Jpeg => {
                    let bytes = raster::svg_to_jpeg(&svg, &raster_opts)?;
                    let out = args.out.clone().unwrap_or_else(|| {
                        default_raster_out_path(args.input.as_deref(), "jpg")
                            .to_string_lossy()
                            .to_string()
                    });
                    write_bytes(&bytes, &out)
                }
                RenderFormat::Pdf => {
                    let bytes = raster::svg_to_pdf(&svg)?;
                    let out = args.out.clone().unwrap_or_else(|| {
                        default_raster_out_path(args.input.as_deref(), "pdf")
                            .to_string_lossy()
                            .to_string()
                    });
                    write_bytes(&bytes, &out)
                }
            }
        }
    }
}

fn layout_options(connection_seed: Option<u64>) -> LayoutOptions {
    let connections = match connection_seed {
        Some(seed) => ConnectionSource::Synthesize { seed },
        None => ConnectionSource::Omit,
    };
    LayoutOptions {
        connections,
        ..LayoutOptions::default()
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

    match run(args) {
        Ok(()) => {}
        Err(CliError::NoChart) => {
            eprintln!("{}", CliError::NoChart);
            std::process::exit(3);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    }
}
