use onecut::{Backend, BoxMask, Connectivity, OneCut, OneCutParams};
use serde::Serialize;
use std::path::Path;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Io(std::io::Error),
    Image(image::ImageError),
    Segment(onecut::Error),
    Json(serde_json::Error),
    Degenerate,
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Image(err) => write!(f, "image error: {err}"),
            CliError::Segment(err) => write!(f, "{err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
            CliError::Degenerate => write!(f, "segmentation put every pixel on one side"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<image::ImageError> for CliError {
    fn from(value: image::ImageError) -> Self {
        Self::Image(value)
    }
}

impl From<onecut::Error> for CliError {
    fn from(value: onecut::Error) -> Self {
        Self::Segment(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

#[derive(Debug, Default)]
struct Args {
    image: Option<String>,
    bounding_box: Option<String>,
    out: Option<String>,
    ground_truth: Option<String>,
    config: Option<String>,
    bin_size: Option<u32>,
    connectivity: Option<Connectivity>,
    potts: Option<f64>,
    backend: Option<Backend>,
    log_level: Option<String>,
    pretty: bool,
}

#[derive(Serialize)]
struct Summary<'a> {
    width: u32,
    height: u32,
    color_bins: usize,
    box_size: usize,
    params: &'a OneCutParams,
    flow: ibfs::Capacity,
    object_pixels: usize,
    degenerate: bool,
    error_rate: Option<f64>,
    construct_ms: f64,
    solve_ms: f64,
    stats: Option<&'a ibfs::SolverStats>,
    out: Option<&'a str>,
}

fn usage() -> &'static str {
    "onecut-cli\n\
\n\
USAGE:\n\
  onecut-cli --image <path> --box <path> [--out <path>] [--gt <path>] [--config <json>] [--bin-size <n>] [--connectivity 4|8|16] [--potts <w>] [--backend ibfs|dinic] [--log-level <filter>] [--pretty]\n\
\n\
NOTES:\n\
  - --box is a mask the size of the image; white pixels (255) are outside the box, all others inside.\n\
  - --gt is a ground-truth mask (255 object, 0 background) used to report the error rate.\n\
  - --out writes the object on a white background; the format follows the extension (bmp, png).\n\
  - Flags override values loaded from --config.\n\
  - A JSON summary is printed to stdout; logs go to stderr (RUST_LOG is honored).\n\
  - Exit codes: 2 usage, 1 runtime error, 3 degenerate segmentation.\n\
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
            "--image" => args.image = Some(next_value(&mut it)?.clone()),
            "--box" => args.bounding_box = Some(next_value(&mut it)?.clone()),
            "--out" => args.out = Some(next_value(&mut it)?.clone()),
            "--gt" => args.ground_truth = Some(next_value(&mut it)?.clone()),
            "--config" => args.config = Some(next_value(&mut it)?.clone()),
            "--log-level" => args.log_level = Some(next_value(&mut it)?.clone()),
            "--pretty" => args.pretty = true,
            "--bin-size" => {
                let n = next_value(&mut it)?;
                args.bin_size = Some(n.parse::<u32>().map_err(|_| CliError::Usage(usage()))?);
            }
            "--connectivity" => {
                let n = next_value(&mut it)?
                    .parse::<u32>()
                    .map_err(|_| CliError::Usage(usage()))?;
                args.connectivity =
                    Some(Connectivity::try_from(n).map_err(|_| CliError::Usage(usage()))?);
            }
            "--potts" => {
                let w = next_value(&mut it)?
                    .parse::<f64>()
                    .map_err(|_| CliError::Usage(usage()))?;
                if !(w.is_finite() && w >= 0.0) {
                    return Err(CliError::Usage(usage()));
                }
                args.potts = Some(w);
            }
            "--backend" => {
                args.backend = match next_value(&mut it)?.trim().to_ascii_lowercase().as_str() {
                    "ibfs" => Some(Backend::Ibfs),
                    "dinic" => Some(Backend::Dinic),
                    _ => return Err(CliError::Usage(usage())),
                };
            }
            _ => return Err(CliError::Usage(usage())),
        }
    }

    if args.image.is_none() || args.bounding_box.is_none() {
        return Err(CliError::Usage(usage()));
    }
    Ok(args)
}

fn init_logging(level: Option<&str>) -> Result<(), CliError> {
    let filter = match level {
        Some(level) => EnvFilter::try_new(level).map_err(|_| CliError::Usage(usage()))?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

fn load_params(args: &Args) -> Result<OneCutParams, CliError> {
    let mut params = match &args.config {
        Some(path) => serde_json::from_str::<OneCutParams>(&std::fs::read_to_string(path)?)?,
        None => OneCutParams::default(),
    };
    if let Some(n) = args.bin_size {
        params.color_bin_size = n;
    }
    if let Some(c) = args.connectivity {
        params.connectivity = c;
    }
    if let Some(w) = args.potts {
        params.potts_weight = w;
    }
    if let Some(b) = args.backend {
        params.backend = b;
    }
    Ok(params)
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

fn run(args: Args) -> Result<(), CliError> {
    let params = load_params(&args)?;
    let (Some(image_path), Some(box_path)) = (args.image.as_deref(), args.bounding_box.as_deref())
    else {
        return Err(CliError::Usage(usage()));
    };

    let image = image::open(image_path)?.to_rgb8();
    let mask = BoxMask::from_image(&image::open(box_path)?);
    tracing::info!(image = image_path, bounding_box = box_path, "inputs loaded");

    let start = Instant::now();
    let mut cut = OneCut::new(&image, params.clone())?;
    cut.construct(&mask)?;
    let construct_ms = elapsed_ms(start);

    let start = Instant::now();
    let segmentation = cut.run()?;
    let solve_ms = elapsed_ms(start);

    let error_rate = match &args.ground_truth {
        Some(path) => {
            let truth = image::open(path)?.to_luma8();
            Some(segmentation.error_rate(&truth, mask.size())?)
        }
        None => None,
    };

    if let Some(out) = &args.out {
        segmentation.to_image(&image)?.save(Path::new(out))?;
        tracing::info!(out = out.as_str(), "segmentation written");
    }

    let summary = Summary {
        width: image.width(),
        height: image.height(),
        color_bins: cut.bins().len(),
        box_size: mask.size(),
        params: &params,
        flow: segmentation.flow(),
        object_pixels: segmentation.object_pixels(),
        degenerate: segmentation.is_degenerate(),
        error_rate,
        construct_ms,
        solve_ms,
        stats: cut.solver_stats(),
        out: args.out.as_deref(),
    };
    if args.pretty {
        serde_json::to_writer_pretty(std::io::stdout().lock(), &summary)?;
    } else {
        serde_json::to_writer(std::io::stdout().lock(), &summary)?;
    }
    println!();

    if summary.degenerate {
        return Err(CliError::Degenerate);
    }
    Ok(())
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

    if let Err(err) = init_logging(args.log_level.as_deref()) {
        eprintln!("{err}");
        std::process::exit(2);
    }

    match run(args) {
        Ok(()) => {}
        Err(CliError::Degenerate) => {
            eprintln!("{}", CliError::Degenerate);
            std::process::exit(3);
        }
        Err(err) => {
            tracing::error!(error = %err, "segmentation failed");
            eprintln!("{err}");
            std::process::exit(1);
        }
    }
}
