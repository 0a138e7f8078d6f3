use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use bitlabel_core::{EntityMap, OutputFormat};
use bitlabel_cv::{annotate_file, annotate_layer_file};
use tracing::{error, info};

mod labels;

struct Args {
    format: OutputFormat,
    area_threshold: f64,
    layered: bool,
    entity_map: Option<PathBuf>,
    export_json: bool,
    save_visible: bool,
    inputs: Vec<PathBuf>,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            format: OutputFormat::Center,
            area_threshold: 0.0,
            layered: false,
            entity_map: None,
            export_json: false,
            save_visible: false,
            inputs: Vec::new(),
        }
    }
}

fn print_usage() {
    eprintln!(
        "usage: bitlabel [--format bbox|center] [--threshold AREA] [--layered] \
         [--names entities.json] [--json] [--save-visible] <image>..."
    );
}

fn parse_args() -> Result<Args> {
    let mut parsed = Args::default();
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--format" => {
                let value = args.next().context("--format needs a value")?;
                parsed.format = value.parse()?;
            }
            "--threshold" => {
                let value = args.next().context("--threshold needs a value")?;
                parsed.area_threshold = value
                    .parse()
                    .with_context(|| format!("bad threshold \"{}\"", value))?;
            }
            "--layered" => parsed.layered = true,
            "--names" => {
                let value = args.next().context("--names needs a path")?;
                parsed.entity_map = Some(PathBuf::from(value));
            }
            "--json" => parsed.export_json = true,
            "--save-visible" => parsed.save_visible = true,
            flag if flag.starts_with("--") => bail!("unknown flag {}", flag),
            input => parsed.inputs.push(PathBuf::from(input)),
        }
    }
    Ok(parsed)
}

fn main() -> ExitCode {
    tracing_subscriber::fmt::init();

    let args = match parse_args() {
        Ok(args) if !args.inputs.is_empty() => args,
        Ok(_) => {
            print_usage();
            return ExitCode::FAILURE;
        }
        Err(e) => {
            eprintln!("{e:#}");
            print_usage();
            return ExitCode::FAILURE;
        }
    };

    let entity_map = match args.entity_map.as_deref().map(EntityMap::load) {
        Some(Ok(map)) => Some(map),
        Some(Err(e)) => {
            eprintln!("{e:#}");
            return ExitCode::FAILURE;
        }
        None => None,
    };

    // A bad image only skips that image; the rest of the batch continues.
    let mut failures = 0usize;
    for input in &args.inputs {
        match process(input, &args, entity_map.as_ref()) {
            Ok(count) => info!(path = %input.display(), annotations = count, "labeled"),
            Err(e) => {
                error!(path = %input.display(), "{e:#}");
                failures += 1;
            }
        }
    }

    if failures == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn process(input: &Path, args: &Args, entities: Option<&EntityMap>) -> Result<usize> {
    let (visible, annotations) = if args.layered {
        annotate_layer_file(input, args.format)?
    } else {
        annotate_file(input, args.format, args.area_threshold)?
    };

    if let Some(map) = entities {
        for annotation in &annotations {
            match map.name_of(annotation.entity_id) {
                Some(name) => info!(id = annotation.entity_id, name, "entity"),
                None => info!(id = annotation.entity_id, "unregistered entity"),
            }
        }
    }

    labels::write_label_file(&input.with_extension("txt"), &annotations)?;
    if args.export_json {
        labels::export_json(&input.with_extension("json"), &annotations)?;
    }
    if args.save_visible {
        let visible_path = input.with_extension("visible.png");
        visible
            .save(&visible_path)
            .with_context(|| format!("Failed to save visible quadrant: {:?}", visible_path))?;
    }

    Ok(annotations.len())
}
