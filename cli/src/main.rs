//! relayout CLI - page layout reconstruction tool

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use relayout::parser::page_values_from_json;
use relayout::render::{self, PlotFrame};
use relayout::{
    ConvertOptions, Converter, DocumentBuilder, JsonFormat, LayoutOptions, LayoutStats,
    PageLayout, PageSelection, PlotRecorder, RawPage,
};

#[derive(Parser)]
#[command(name = "relayout")]
#[command(version)]
#[command(about = "Rebuild paragraphs and tables from raw page geometry", long_about = None)]
struct Cli {
    /// Print a summary of every pipeline stage to stderr
    #[arg(long, global = true)]
    plot: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert raw pages to the assembled document JSON
    Convert {
        /// Input page dump (JSON)
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Page range (e.g., "1-10", "1,3,5")
        #[arg(long)]
        pages: Option<String>,

        /// Fail on the first page that cannot be converted
        #[arg(long)]
        strict: bool,

        /// Convert pages one after another
        #[arg(long)]
        sequential: bool,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,

        #[command(flatten)]
        layout: LayoutArgs,
    },

    /// Write the parsed layout snapshot of one page
    Snapshot {
        /// Input page dump (JSON)
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Page number (1-indexed)
        #[arg(long, default_value = "1")]
        page: u32,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        #[command(flatten)]
        layout: LayoutArgs,
    },

    /// Print the text grids of bordered tables
    Tables {
        /// Input page dump (JSON)
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Page range (e.g., "1-10", "1,3,5")
        #[arg(long)]
        pages: Option<String>,
    },

    /// Convert raw pages to plain text
    Text {
        /// Input page dump (JSON)
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Page range (e.g., "1-10", "1,3,5")
        #[arg(long)]
        pages: Option<String>,
    },

    /// Show per-page layout statistics
    Info {
        /// Input page dump (JSON)
        #[arg(value_name = "FILE")]
        input: PathBuf,

        #[command(flatten)]
        layout: LayoutArgs,
    },

    /// Show version information
    Version,
}

/// Layout tuning flags shared by several commands.
#[derive(Args, Clone, Copy)]
struct LayoutArgs {
    /// Upper bound for every page margin, in points
    #[arg(long, env = "RELAYOUT_MAX_MARGIN")]
    max_margin: Option<f32>,

    /// Free space subtracted from the raw right margin, in points
    #[arg(long, env = "RELAYOUT_RIGHT_TOLERANCE")]
    right_tolerance: Option<f32>,
}

impl LayoutArgs {
    fn options(self) -> LayoutOptions {
        let mut options = LayoutOptions::new();
        if let Some(max_margin) = self.max_margin {
            options = options.with_max_margin(max_margin);
        }
        if let Some(tolerance) = self.right_tolerance {
            options = options.with_right_margin_tolerance(tolerance);
        }
        options
    }
}

type CliResult = Result<(), Box<dyn std::error::Error>>;

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    let plot = cli.plot;

    let result = match cli.command {
        Commands::Convert {
            input,
            output,
            pages,
            strict,
            sequential,
            compact,
            layout,
        } => convert_options(pages.as_deref(), strict, sequential, layout)
            .and_then(|options| cmd_convert(&input, output.as_deref(), options, compact, plot)),
        Commands::Snapshot {
            input,
            page,
            output,
            layout,
        } => cmd_snapshot(&input, page, output.as_deref(), layout.options(), plot),
        Commands::Tables { input, pages } => cmd_tables(&input, pages.as_deref()),
        Commands::Text {
            input,
            output,
            pages,
        } => cmd_text(&input, output.as_deref(), pages.as_deref(), plot),
        Commands::Info { input, layout } => cmd_info(&input, layout.options(), plot),
        Commands::Version => {
            cmd_version();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn page_selection(pages: Option<&str>) -> Result<PageSelection, Box<dyn std::error::Error>> {
    match pages {
        Some(p) => Ok(PageSelection::parse(p)?),
        None => Ok(PageSelection::All),
    }
}

fn convert_options(
    pages: Option<&str>,
    strict: bool,
    sequential: bool,
    layout: LayoutArgs,
) -> Result<ConvertOptions, Box<dyn std::error::Error>> {
    let mut options = ConvertOptions::new()
        .with_layout_options(layout.options())
        .with_pages(page_selection(pages)?)
        .with_parallel(!sequential);
    if strict {
        options = options.strict();
    }
    Ok(options)
}

fn write_output(output: Option<&Path>, content: &str) -> CliResult {
    if let Some(path) = output {
        fs::write(path, content)?;
        eprintln!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", content);
    }
    Ok(())
}

fn read_pages(input: &Path) -> Result<Vec<RawPage>, Box<dyn std::error::Error>> {
    let json = fs::read_to_string(input)?;
    Ok(relayout::parser::pages_from_json(&json)?)
}

fn print_frames(page: u32, frames: &[PlotFrame]) {
    eprintln!("{} {}", "Page".cyan().bold(), page);
    for frame in frames {
        eprintln!(
            "  {} {} ({} items)",
            "├─".dimmed(),
            frame.title,
            frame.items.len()
        );
    }
}

/// Run the pipeline on every selected page with a recorder attached and
/// print what each stage produced. Pages that do not deserialize are left
/// to the converter to report.
fn plot_pages(json: &str, selection: &PageSelection, options: &LayoutOptions) -> CliResult {
    for (i, value) in page_values_from_json(json)?.into_iter().enumerate() {
        let number = i as u32 + 1;
        if !selection.includes(number) {
            continue;
        }
        let Ok(raw) = serde_json::from_value::<RawPage>(value) else {
            continue;
        };
        let mut layout = PageLayout::from_raw(&raw).with_options(options.clone());
        let mut recorder = PlotRecorder::new();
        layout.parse_with(&mut recorder)?;
        print_frames(number, recorder.frames());
    }
    Ok(())
}

fn cmd_convert(
    input: &Path,
    output: Option<&Path>,
    options: ConvertOptions,
    compact: bool,
    plot: bool,
) -> CliResult {
    let pb = ProgressBar::new(3);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {msg}")?
            .progress_chars("#>-"),
    );

    pb.set_message("Reading pages...");
    let json = fs::read_to_string(input)?;
    pb.inc(1);

    pb.set_message("Rebuilding layout...");
    if plot {
        plot_pages(&json, &options.pages, &options.layout)?;
    }
    let result = Converter::with_options(options).convert_json(&json)?;
    pb.inc(1);

    pb.set_message("Writing document...");
    let format = if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    };
    let rendered = result.to_json(format)?;
    pb.inc(1);
    pb.finish_and_clear();

    write_output(output, &rendered)?;

    for failure in &result.failures {
        eprintln!(
            "{} page {}: {}",
            "Skipped".yellow(),
            failure.page,
            failure.message
        );
    }
    eprintln!(
        "{} {} pages, {} tables",
        "Done!".green().bold(),
        result.stats.page_count,
        result.stats.table_count
    );
    Ok(())
}

fn cmd_snapshot(
    input: &Path,
    page: u32,
    output: Option<&Path>,
    options: LayoutOptions,
    plot: bool,
) -> CliResult {
    let json = fs::read_to_string(input)?;
    let values = page_values_from_json(&json)?;
    let value = page
        .checked_sub(1)
        .and_then(|i| values.get(i as usize))
        .ok_or_else(|| format!("page {} out of range (1-{})", page, values.len()))?;
    let raw: RawPage = serde_json::from_value(value.clone())?;

    let mut layout = PageLayout::from_raw(&raw).with_options(options);
    let mut recorder = PlotRecorder::new();
    layout.parse_with(&mut recorder)?;
    if plot {
        print_frames(page, recorder.frames());
    }

    let snapshot = render::value_to_json(&layout.store(), JsonFormat::Pretty)?;
    write_output(output, &snapshot)
}

fn cmd_tables(input: &Path, pages: Option<&str>) -> CliResult {
    let selection = page_selection(pages)?;
    let raw_pages = read_pages(input)?;

    let mut count = 0;
    for (i, raw) in raw_pages.iter().enumerate() {
        let number = i as u32 + 1;
        if !selection.includes(number) {
            continue;
        }
        let mut layout = PageLayout::from_raw(raw);
        for (t, table) in layout.extract_tables().iter().enumerate() {
            println!("{}", format!("Page {} / Table {}", number, t + 1).cyan().bold());
            println!("{}", "─".repeat(40).dimmed());
            for row in table {
                println!("{}", row.join("\t"));
            }
            println!();
            count += 1;
        }
    }

    eprintln!("{} {} tables found", "Done!".green().bold(), count);
    Ok(())
}

fn cmd_text(input: &Path, output: Option<&Path>, pages: Option<&str>, plot: bool) -> CliResult {
    let selection = page_selection(pages)?;
    let json = fs::read_to_string(input)?;
    if plot {
        plot_pages(&json, &selection, &LayoutOptions::default())?;
    }

    let options = ConvertOptions::new().with_pages(selection);
    let result = Converter::with_options(options).convert_json(&json)?;
    write_output(output, &result.to_text())
}

fn cmd_info(input: &Path, options: LayoutOptions, plot: bool) -> CliResult {
    let raw_pages = read_pages(input)?;

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "File".bold(), input.display());
    println!("{}: {}", "Pages".bold(), raw_pages.len());

    let mut total = LayoutStats::new();
    for (i, raw) in raw_pages.iter().enumerate() {
        let number = i as u32 + 1;
        let mut layout = PageLayout::from_raw(raw).with_options(options.clone());
        let mut recorder = PlotRecorder::new();
        layout.parse_with(&mut recorder)?;

        let mut builder = DocumentBuilder::new();
        layout.make_page(&mut builder)?;
        let document = builder.finish();

        let mut stats = LayoutStats::new();
        stats.record_layout(&layout);
        for section in &document.sections {
            stats.record_section(section);
        }

        println!();
        println!("{}", format!("Page {}", number).cyan().bold());
        println!("{}", "─".repeat(40).dimmed());
        println!("{}: {} x {}", "Size".bold(), layout.width(), layout.height());
        if let Some(m) = layout.margin() {
            println!(
                "{}: left {}, right {}, top {}, bottom {}",
                "Margin".bold(),
                m.left,
                m.right,
                m.top,
                m.bottom
            );
        }
        println!("{}: {}", "Blocks".bold(), layout.blocks().len());
        println!("{}: {}", "Shapes".bold(), layout.shapes().len());
        println!("{}: {}", "Paragraphs".bold(), stats.paragraph_count);
        println!(
            "{}: {} ({} explicit, {} implicit)",
            "Tables".bold(),
            stats.table_count,
            stats.explicit_table_count,
            stats.implicit_table_count
        );
        println!("{}: {}", "Styled spans".bold(), stats.styled_span_count);

        if plot {
            print_frames(number, recorder.frames());
        }
        total.merge(&stats);
    }

    println!();
    println!("{}", "Totals".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "Paragraphs".bold(), total.paragraph_count);
    println!("{}: {}", "Fillers".bold(), total.filler_count);
    println!("{}: {}", "Tables".bold(), total.table_count);
    println!("{}: {}", "Characters".bold(), total.char_count);

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "relayout".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Page layout reconstruction tool");
    println!();
    println!("License: MIT");
}
