use specsheet_core::error::SpecsheetError;
use specsheet_core::options::{load_options, ParseOptions};
use std::path::PathBuf;

use crate::output;
use crate::store::DirStore;

pub struct ParseArgs {
    pub input_file: PathBuf,
    pub template: Option<String>,
    pub output_format: String,
    pub out: Option<PathBuf>,
    pub images_dir: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub no_images: bool,
}

pub fn run(args: ParseArgs) -> Result<(), SpecsheetError> {
    let mut options = match &args.config {
        Some(path) => load_options(path)?,
        None => ParseOptions::default(),
    };
    if args.template.is_some() {
        options.template = args.template;
    }
    if args.no_images {
        options.extract_images = false;
    }

    let bytes = std::fs::read(&args.input_file)?;
    let filename = args
        .input_file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| args.input_file.display().to_string());

    let mut parsed = specsheet_core::parse_workbook(&bytes, &filename, &options)?;
    if let Some(dir) = &args.images_dir {
        let mut store = DirStore::new(dir);
        parsed = parsed.persist_images(&mut store)?;
        eprintln!("Saved {} image(s) under {}", parsed.images.len(), dir.display());
    }

    match args.out {
        Some(path) => {
            // Always write JSON when saving to file
            std::fs::write(&path, output::json::to_string(&parsed)?)?;
            eprintln!(
                "Parsed '{}' as {} ({} section(s)), written to {}",
                parsed.title,
                parsed.template_kind,
                parsed.sections.len(),
                path.display()
            );
            for w in &parsed.warnings {
                eprintln!("  warning: {w}");
            }
        }
        None => match args.output_format.as_str() {
            "json" => println!("{}", output::json::to_string(&parsed)?),
            _ => println!("{}", output::table::format_parsed(&parsed)),
        },
    }

    Ok(())
}
