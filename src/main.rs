use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use clap_complete::Shell;
use tracing::{info, warn};

use plotline::error::{Error, Result};
use plotline::export::{OutputFormat, svg_to_pdf, svg_to_png};
use plotline::{
    DateBounds, DateFormat, FilterMode, LayoutConfig, LayoutOptions, SortMode, Story, TagFilter,
    Theme, TimelineStyle, compute_scene, render_scene,
};

/// Render a story's plot events as a timeline of tag lanes
#[derive(Parser, Debug)]
#[command(name = "plotline")]
#[command(version)]
#[command(about = "Render story timelines to SVG, PNG or PDF", long_about = None)]
struct Args {
    /// Story document: JSON, YAML or TOML (use "-" for JSON on stdin)
    #[arg(value_name = "INPUT", required_unless_present = "completions")]
    input: Option<PathBuf>,

    /// Output file path (extension determines format: .svg, .png or .pdf)
    #[arg(short, long, value_name = "OUTPUT", required_unless_present = "completions")]
    output: Option<PathBuf>,

    /// Tag type whose tags become lanes (id or name; defaults to the first)
    #[arg(short, long, value_name = "TAG_TYPE")]
    group_by: Option<String>,

    /// Lane ordering: chronological (date) or sequential (story)
    #[arg(short, long, default_value = "chronological")]
    sort: SortMode,

    /// Earliest date to show, in the story's date format
    #[arg(long, value_name = "DATE")]
    start: Option<String>,

    /// Latest date to show, in the story's date format
    #[arg(long, value_name = "DATE")]
    end: Option<String>,

    /// Only show events carrying these tag ids
    #[arg(long, value_name = "TAG_ID", value_delimiter = ',')]
    tags: Vec<i64>,

    /// How --tags combine: any (or) / all (and)
    #[arg(long, default_value = "any")]
    filter_mode: FilterMode,

    /// Canvas width in pixels
    #[arg(short, long, default_value_t = 800.0)]
    width: f64,

    /// Canvas height in pixels
    #[arg(long, default_value_t = 300.0)]
    height: f64,

    /// Path to Alacritty theme file (YAML or TOML)
    #[arg(short, long, value_name = "THEME", conflicts_with = "builtin_theme")]
    theme: Option<PathBuf>,

    /// Built-in theme name (light, dark)
    #[arg(long, value_name = "NAME")]
    builtin_theme: Option<String>,

    /// TOML file overriding layout constants (margins, lane heights, ...)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Raster scale multiplier for PNG output
    #[arg(long, default_value_t = 1.0)]
    png_scale: f32,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Print shell completions and exit
    #[arg(long, value_name = "SHELL")]
    completions: Option<Shell>,
}

fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(e) = plotline::logging::init(args.verbose) {
        eprintln!("{}", e);
    }

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<()> {
    if let Some(shell) = args.completions {
        let mut command = Args::command();
        clap_complete::generate(shell, &mut command, "plotline", &mut std::io::stdout());
        return Ok(());
    }

    let (Some(input), Some(output)) = (args.input.as_deref(), args.output.as_deref()) else {
        return Err(Error::Usage("INPUT and --output are required".to_string()));
    };

    let story = load_story(input)?;
    let theme = load_theme(args.theme.as_deref(), args.builtin_theme.as_deref())?;
    let config = match args.config.as_deref() {
        Some(path) => LayoutConfig::from_toml(&read_file(path)?)?,
        None => LayoutConfig::default(),
    };

    let group_by = match args.group_by.as_deref() {
        Some(key) => story
            .resolve_tag_type(key)
            .ok_or_else(|| Error::Usage(format!("Unknown tag type: {}", key)))?,
        None => story
            .tag_types
            .first()
            .ok_or_else(|| Error::Usage("Story has no tag types to group by".to_string()))?,
    };

    let date_format = story.date_format().map(DateFormat::parse).transpose()?;
    let sort = match (args.sort, &date_format) {
        (SortMode::Chronological, None) => {
            warn!("story has no date format; falling back to sequential layout");
            SortMode::Sequential
        }
        (mode, _) => mode,
    };

    let mut options = LayoutOptions::new(group_by.tag_type_id, sort, args.width, args.height)
        .with_config(config);

    if let Some(format) = date_format {
        if sort == SortMode::Chronological {
            let bounds = DateBounds::new(
                parse_bound(&format, args.start.as_deref())?,
                parse_bound(&format, args.end.as_deref())?,
            );
            options = options.with_bounds(bounds);
        }
        options = options.with_date_format(format);
    }
    if sort == SortMode::Sequential && (args.start.is_some() || args.end.is_some()) {
        warn!("--start/--end only apply to chronological layout");
    }

    if !args.tags.is_empty() {
        options = options.with_filter(TagFilter::new(args.filter_mode, args.tags.iter().copied()));
    }

    let scene = compute_scene(&story.events, &options)?;
    info!(
        group_by = %group_by.name,
        lanes = scene.lanes.len(),
        "laid out story timeline"
    );

    let svg = render_scene(&scene, &TimelineStyle::from_theme(&theme), None);

    let bytes = match OutputFormat::from_path(output)? {
        OutputFormat::Svg => svg.into_bytes(),
        OutputFormat::Png => svg_to_png(&svg, args.png_scale)?,
        OutputFormat::Pdf => svg_to_pdf(&svg)?,
    };
    std::fs::write(output, bytes).map_err(|source| Error::Write {
        path: output.to_path_buf(),
        source,
    })?;
    eprintln!("Timeline saved to: {}", output.display());

    Ok(())
}

fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn load_story(input: &Path) -> Result<Story> {
    if input.to_str() == Some("-") {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .map_err(|source| Error::Read {
                path: input.to_path_buf(),
                source,
            })?;
        return Story::parse(&buffer, None);
    }

    let content = read_file(input)?;
    Story::parse(&content, input.extension().and_then(|e| e.to_str()))
}

fn load_theme(path: Option<&Path>, builtin: Option<&str>) -> Result<Theme> {
    if let Some(path) = path {
        if !path.is_file() {
            return Err(Error::Theme(format!("Theme file not found: {}", path.display())));
        }
        return Theme::from_alacritty(&read_file(path)?).map_err(Error::Theme);
    }
    match builtin {
        Some(name) => Theme::from_builtin(name).map_err(Error::Theme),
        None => Ok(Theme::default()),
    }
}

fn parse_bound(format: &DateFormat, date: Option<&str>) -> Result<Option<i64>> {
    date.map(|date| {
        format.linearize(date).ok_or_else(|| {
            Error::Usage(format!("Date '{}' does not match format {}", date, format))
        })
    })
    .transpose()
}
