//! motion_heatmap - tint the regions of a time-lapse that change the most

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use regex::Regex;
use std::path::PathBuf;

use motion_heatmap::parallel_pipeline::analyze_parallel;
use motion_heatmap::pipeline::{
    DEFAULT_COLOR_INTENSITY_FACTOR, DEFAULT_OUTPUT_PATH, DEFAULT_SIGMA, HeatmapBuilder,
    HeatmapConfig,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Generate a motion heatmap from a directory of time-lapse frames")]
struct Args {
    /// Directory containing the frames, read in file name order.
    #[arg(env = "MOTION_HEATMAP_IMAGE_PATH")]
    image_path: PathBuf,
    /// Number of block rows in the heatmap.
    #[arg(long, env = "MOTION_HEATMAP_VERTICAL_DIVISIONS")]
    vertical_divisions: u32,
    /// Number of block columns in the heatmap.
    #[arg(long, env = "MOTION_HEATMAP_HORIZONTAL_DIVISIONS")]
    horizontal_divisions: u32,
    /// Output image path; the format follows the extension.
    #[arg(long, short, default_value = DEFAULT_OUTPUT_PATH, env = "MOTION_HEATMAP_OUTPUT")]
    output: PathBuf,
    /// Only use frames whose file name matches this regular expression.
    #[arg(long, env = "MOTION_HEATMAP_FILTER")]
    filter: Option<String>,
    /// Paint the overlay on the first frame instead of the average of all frames.
    #[arg(long)]
    no_average: bool,
    /// Standard deviation, in blocks, of the Gaussian smoothing of the heatmap.
    #[arg(long, default_value_t = DEFAULT_SIGMA, env = "MOTION_HEATMAP_SIGMA")]
    sigma: f64,
    /// Strength of the red/blue tint.
    #[arg(long, default_value_t = DEFAULT_COLOR_INTENSITY_FACTOR, env = "MOTION_HEATMAP_COLOR_INTENSITY")]
    color_intensity: f64,
    /// Seed for sample pixel selection, for reproducible output.
    #[arg(long, env = "MOTION_HEATMAP_SEED")]
    seed: Option<u64>,
    /// Decode frames on all CPU cores.
    #[arg(long)]
    parallel: bool,
}

fn file_filter(args: &Args) -> Result<Option<Regex>> {
    args.filter
        .as_deref()
        .map(Regex::new)
        .transpose()
        .context("invalid --filter expression")
}

fn config_from_args(args: &Args) -> HeatmapConfig {
    HeatmapConfig {
        use_average_overlay: !args.no_average,
        sigma: args.sigma,
        color_intensity_factor: args.color_intensity,
        seed: args.seed,
        ..HeatmapConfig::new(args.vertical_divisions, args.horizontal_divisions, &args.image_path)
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let filter = file_filter(&args)?;
    let config = config_from_args(&args);

    let builder = HeatmapBuilder::new(config, |name: &str| {
        filter.as_ref().is_none_or(|re| re.is_match(name))
    })
    .with_context(|| format!("failed to prepare frames in {}", args.image_path.display()))?;

    let motion = if args.parallel {
        tokio::runtime::Runtime::new()
            .context("failed to start tokio runtime")?
            .block_on(analyze_parallel(builder))
    } else {
        builder.analyze()
    }
    .context("failed to analyze frames")?;

    if !motion.render(&args.output) {
        return Err(anyhow!("failed to write {}", args.output.display()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(extra: &[&str]) -> Args {
        let base = ["motion_heatmap", "frames", "--vertical-divisions", "4", "--horizontal-divisions", "6"];
        Args::try_parse_from(base.iter().chain(extra)).expect("valid arguments")
    }

    #[test]
    fn defaults_map_onto_the_config() {
        let args = parse(&[]);
        assert_eq!(args.output, PathBuf::from(DEFAULT_OUTPUT_PATH));
        assert!(!args.parallel);
        assert!(file_filter(&args).unwrap().is_none());

        let config = config_from_args(&args);
        assert_eq!(config, HeatmapConfig::new(4, 6, "frames"));
    }

    #[test]
    fn flags_override_the_defaults() {
        let args = parse(&[
            "--no-average",
            "--sigma",
            "0.5",
            "--color-intensity",
            "3",
            "--seed",
            "42",
            "--parallel",
            "-o",
            "out.png",
        ]);
        assert!(args.parallel);
        assert_eq!(args.output, PathBuf::from("out.png"));

        let config = config_from_args(&args);
        assert!(!config.use_average_overlay);
        assert_eq!(config.sigma, 0.5);
        assert_eq!(config.color_intensity_factor, 3.0);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.num_vertical_divisions, 4);
        assert_eq!(config.num_horizontal_divisions, 6);
        assert_eq!(config.image_path, PathBuf::from("frames"));
    }

    #[test]
    fn filter_matches_file_names() {
        let args = parse(&["--filter", r"^frame_\d+\.png$"]);
        let filter = file_filter(&args).unwrap().expect("filter set");
        assert!(filter.is_match("frame_001.png"));
        assert!(!filter.is_match("notes.txt"));
    }

    #[test]
    fn invalid_filter_is_an_error() {
        let args = parse(&["--filter", "("]);
        assert!(file_filter(&args).is_err());
    }

    #[test]
    fn divisions_are_required() {
        assert!(Args::try_parse_from(["motion_heatmap", "frames"]).is_err());
    }
}
