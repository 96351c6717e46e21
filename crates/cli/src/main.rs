//! CLI tool for inspecting legacy PowerPoint files.

use anyhow::{Context, Result};
use clap::Parser;
use ppt97_core::{Presentation, Shape, ShapeKind};
use ppt97_reader::PptParser;
use std::fmt::{self, Write as _};
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};

/// Decode PowerPoint 97-2003 (.ppt) files and summarize their slides.
#[derive(Parser, Debug)]
#[command(name = "ppt97-inspect")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input PowerPoint file(s) (.ppt)
    #[arg(required = true)]
    input: Vec<PathBuf>,

    /// Output directory (default: print to stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Emit the decoded presentation as JSON
    #[arg(short, long)]
    json: bool,

    /// Skip speaker notes
    #[arg(long)]
    no_notes: bool,

    /// Skip the Pictures stream
    #[arg(long)]
    no_pictures: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    if args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    let parser = PptParser::new()
        .with_notes(!args.no_notes)
        .with_pictures(!args.no_pictures);

    let mut failures = 0;
    for input_path in &args.input {
        if args.verbose {
            eprintln!("Processing: {}", input_path.display());
        }

        match process_file(input_path, &args, &parser) {
            Ok(output) => match &args.output {
                Some(dir) => {
                    let output_path = get_output_path(input_path, dir, args.json)?;
                    write_output(&output_path, &output)?;
                    if args.verbose {
                        eprintln!("Written to: {}", output_path.display());
                    }
                }
                None => print!("{}", output),
            },
            Err(e) => {
                failures += 1;
                eprintln!("Error processing {}: {:#}", input_path.display(), e);
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{} of {} files failed", failures, args.input.len());
    }
    Ok(())
}

/// Decode one file and render it.
fn process_file(input_path: &Path, args: &Args, parser: &PptParser) -> Result<String> {
    let file = File::open(input_path)
        .with_context(|| format!("Failed to open {}", input_path.display()))?;
    let reader = BufReader::new(file);

    let presentation = parser
        .parse(reader)
        .with_context(|| format!("Failed to decode {}", input_path.display()))?;

    if args.verbose {
        eprintln!("  Found {} slides", presentation.slides.len());
    }

    if args.json {
        let mut json = serde_json::to_string_pretty(&presentation)
            .context("Failed to serialize presentation")?;
        json.push('\n');
        Ok(json)
    } else {
        summarize(input_path, &presentation).context("Failed to format summary")
    }
}

/// Human-readable outline of slides, shapes and text.
fn summarize(input_path: &Path, presentation: &Presentation) -> Result<String, fmt::Error> {
    let mut out = String::new();
    writeln!(out, "{}", input_path.display())?;
    if let Some(size) = presentation.slide_size {
        writeln!(out, "Slide size: {} x {} master units", size.width, size.height)?;
    }

    for slide in &presentation.slides {
        match slide.slide_id {
            Some(id) => writeln!(out, "Slide {} (id {})", slide.number, id)?,
            None => writeln!(out, "Slide {}", slide.number)?,
        }
        describe_shapes(&mut out, &slide.shapes, 1)?;
        if let Some(notes) = &slide.notes {
            writeln!(out, "  Notes:")?;
            describe_shapes(&mut out, &notes.shapes, 2)?;
        }
    }
    Ok(out)
}

/// One line per shape, group members indented under their group.
fn describe_shapes(out: &mut String, shapes: &[Shape], depth: usize) -> fmt::Result {
    let mut pending: Vec<(&Shape, usize)> = shapes.iter().rev().map(|s| (s, depth)).collect();

    while let Some((shape, depth)) = pending.pop() {
        let indent = "  ".repeat(depth);
        let g = &shape.geometry;
        let place = format!("({}, {}) {}x{}", g.x, g.y, g.width, g.height);

        match &shape.kind {
            ShapeKind::Picture(picture) => writeln!(
                out,
                "{}#{} picture {} {} [{} bytes, .{}]",
                indent,
                shape.id,
                picture.blip_index,
                place,
                picture.byte_len,
                picture.format.extension()
            )?,
            ShapeKind::Line(line) => {
                let color = line.color.map(|c| c.to_hex()).unwrap_or_default();
                writeln!(out, "{}#{} line {} {}", indent, shape.id, place, color)?;
            }
            ShapeKind::RichText(text) => {
                writeln!(out, "{}#{} text {}", indent, shape.id, place)?;
                for paragraph in &text.paragraphs {
                    writeln!(out, "{}  | {}", indent, paragraph.text())?;
                }
            }
            ShapeKind::Group(group) => {
                writeln!(
                    out,
                    "{}#{} group {} [{} members]",
                    indent,
                    shape.id,
                    place,
                    group.shapes.len()
                )?;
                pending.extend(group.shapes.iter().rev().map(|m| (m, depth + 1)));
            }
        }
    }
    Ok(())
}

/// Determine the output path for a processed file.
fn get_output_path(input_path: &Path, output_dir: &Path, json: bool) -> Result<PathBuf> {
    let stem = input_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");

    let extension = if json { "json" } else { "txt" };
    let output_filename = format!("{}.{}", stem, extension);

    std::fs::create_dir_all(output_dir).with_context(|| {
        format!("Failed to create output directory: {}", output_dir.display())
    })?;
    Ok(output_dir.join(output_filename))
}

/// Write output to a file.
fn write_output(path: &Path, content: &str) -> Result<()> {
    let mut file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;

    file.write_all(content.as_bytes())
        .with_context(|| format!("Failed to write to {}", path.display()))?;

    Ok(())
}
