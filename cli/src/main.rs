//! pdf2html CLI - PDF to HTML conversion tool

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use pdf2html::{
    parse_file_with_options, HtmlConverter, JsonFormat, OutputTarget, PageSelection, ParseOptions,
    RenderOptions,
};

/// Output directory used by batch mode when none is given.
const DEFAULT_OUTPUT_DIR: &str = "output";

#[derive(Parser)]
#[command(name = "pdf2html")]
#[command(version)]
#[command(about = "Convert PDF documents into self-contained HTML", long_about = None)]
struct Cli {
    /// Input PDF files, each converted to <DIR>/<stem>.html
    #[arg(value_name = "FILE")]
    inputs: Vec<PathBuf>,

    /// Output directory for batch conversion
    #[arg(short, long, value_name = "DIR", env = "PDF2HTML_OUTPUT_DIR")]
    output: Option<PathBuf>,

    /// Use the plain template
    #[arg(long)]
    plain: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a single PDF to HTML
    Html {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (<stem>.html in the current directory if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Use the plain template
        #[arg(long)]
        plain: bool,

        /// Page range (e.g., "1-10", "1,3,5")
        #[arg(long)]
        pages: Option<String>,

        /// Emit vector drawings as positioned elements
        #[arg(long)]
        drawings: bool,

        /// Leave images out of the output
        #[arg(long)]
        no_images: bool,

        /// Keep pages whose content cannot be read, empty
        #[arg(long)]
        lenient: bool,

        /// Document title (defaults to the file stem)
        #[arg(long)]
        title: Option<String>,
    },

    /// Dump the extracted content as JSON
    Json {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,

        /// Leave base64 image payloads out of the dump
        #[arg(long)]
        no_image_data: bool,
    },

    /// Show document information
    Info {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Show version information
    Version,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Html {
            input,
            output,
            plain,
            pages,
            drawings,
            no_images,
            lenient,
            title,
        }) => cmd_html(
            &input,
            output,
            HtmlFlags {
                plain,
                pages,
                drawings,
                no_images,
                lenient,
                title,
            },
        ),
        Some(Commands::Json {
            input,
            output,
            compact,
            no_image_data,
        }) => cmd_json(&input, output.as_deref(), compact, no_image_data),
        Some(Commands::Info { input }) => cmd_info(&input),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            if cli.inputs.is_empty() {
                println!("{}", "Usage: pdf2html <FILE>... [-o DIR]".yellow());
                println!("       pdf2html --help for more information");
                Ok(())
            } else {
                cmd_batch(&cli.inputs, &output_dir(cli.output), cli.plain)
            }
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

/// Options of the `html` subcommand.
struct HtmlFlags {
    plain: bool,
    pages: Option<String>,
    drawings: bool,
    no_images: bool,
    lenient: bool,
    title: Option<String>,
}

fn output_dir(output: Option<PathBuf>) -> PathBuf {
    output.unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR))
}

fn page_selection(pages: Option<&str>) -> pdf2html::Result<PageSelection> {
    match pages {
        Some(p) => PageSelection::parse(p),
        None => Ok(PageSelection::All),
    }
}

fn cmd_batch(inputs: &[PathBuf], output_dir: &Path, plain: bool) -> Result<(), Box<dyn std::error::Error>> {
    let mut render_options = RenderOptions::new();
    if plain {
        render_options = render_options.plain();
    }
    let converter = HtmlConverter::new().with_render_options(render_options);
    let target = OutputTarget::Dir(output_dir.to_path_buf());

    let pb = ProgressBar::new(inputs.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let mut written = Vec::new();
    let mut failed = 0usize;

    for input in inputs {
        pb.set_message(input.display().to_string());
        match converter.convert_file(input, target.clone()) {
            Ok(path) => written.push(path),
            Err(e) => {
                failed += 1;
                pb.println(format!("{} {}: {}", "Failed".red(), input.display(), e));
            }
        }
        pb.inc(1);
    }

    pb.finish_with_message("Done!");

    if !written.is_empty() {
        println!("\n{}", "Output files:".green().bold());
        for (i, path) in written.iter().enumerate() {
            let branch = if i + 1 == written.len() { "└─" } else { "├─" };
            println!("  {} {}", branch.dimmed(), path.display());
        }
    }

    if failed > 0 {
        return Err(format!("{} of {} files failed to convert", failed, inputs.len()).into());
    }

    Ok(())
}

fn cmd_html(input: &Path, output: Option<PathBuf>, flags: HtmlFlags) -> Result<(), Box<dyn std::error::Error>> {
    let pages = page_selection(flags.pages.as_deref())?;

    let mut parse_options = ParseOptions::new()
        .with_pages(pages.clone())
        .with_images(!flags.no_images)
        .with_drawings(flags.drawings);
    if flags.lenient {
        parse_options = parse_options.lenient();
    }

    let mut render_options = RenderOptions::new()
        .with_pages(pages)
        .with_images(!flags.no_images)
        .with_drawings(flags.drawings);
    if flags.plain {
        render_options = render_options.plain();
    }
    if let Some(title) = flags.title {
        render_options = render_options.with_title(title);
    }

    let path = HtmlConverter::new()
        .with_parse_options(parse_options)
        .with_render_options(render_options)
        .convert_file(input, OutputTarget::from(output))?;

    println!("{} {}", "Saved to".green(), path.display());
    Ok(())
}

fn cmd_json(
    input: &Path,
    output: Option<&Path>,
    compact: bool,
    no_image_data: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let doc = pdf2html::parse_file(input)?;

    let format = if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    };

    let json = if no_image_data {
        pdf2html::render::to_json_without_image_data(&doc, format)?
    } else {
        pdf2html::render::to_json(&doc, format)?
    };

    if let Some(path) = output {
        fs::write(path, &json)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", json);
    }

    Ok(())
}

fn cmd_info(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    // Lenient: show metadata even if a page cannot be read
    let options = ParseOptions::new().lenient().with_drawings(false);
    let doc = parse_file_with_options(input, options)?;

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), input.display());
    println!("{}: PDF {}", "Format".bold(), doc.metadata.pdf_version);
    println!("{}: {}", "Pages".bold(), doc.metadata.page_count);
    println!(
        "{}: {}",
        "Encrypted".bold(),
        if doc.metadata.encrypted { "Yes" } else { "No" }
    );

    if let Some(ref title) = doc.metadata.title {
        println!("{}: {}", "Title".bold(), title);
    }
    if let Some(ref author) = doc.metadata.author {
        println!("{}: {}", "Author".bold(), author);
    }
    if let Some(ref creator) = doc.metadata.creator {
        println!("{}: {}", "Creator".bold(), creator);
    }
    if let Some(ref producer) = doc.metadata.producer {
        println!("{}: {}", "Producer".bold(), producer);
    }
    if let Some(ref created) = doc.metadata.created {
        println!("{}: {}", "Created".bold(), created);
    }
    if let Some(ref modified) = doc.metadata.modified {
        println!("{}: {}", "Modified".bold(), modified);
    }

    println!();
    println!("{}", "Content Statistics".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    let text = doc.plain_text();
    let blocks: usize = doc.pages.iter().map(|p| p.text_blocks.len()).sum();

    println!("{}: {}", "Words".bold(), text.split_whitespace().count());
    println!("{}: {}", "Characters".bold(), text.chars().count());
    println!("{}: {}", "Text blocks".bold(), blocks);
    println!("{}: {}", "Images".bold(), doc.image_count());

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "pdf2html".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("PDF to HTML conversion tool");
    println!();
    println!("License: {}", env!("CARGO_PKG_LICENSE"));
}
