use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;

use facetile_core::imaging::domain::grid_tiler::GridTiler;
use facetile_core::imaging::infrastructure::image_file_reader::{list_images, ImageFileReader};
use facetile_core::imaging::infrastructure::image_file_writer::ImageFileWriter;
use facetile_core::pipeline::recognize_faces_use_case::{RecognitionReport, RecognizeFacesUseCase};
use facetile_core::recognition::domain::face_recognizer::{FaceId, IdentifyOptions};
use facetile_core::recognition::infrastructure::azure_face_client::AzureFaceClient;
use facetile_core::shared::config::FaceApiConfig;
use facetile_core::shared::constants::{
    DEFAULT_CONFIDENCE_THRESHOLD, DEFAULT_GRID_SIZE, DEFAULT_MAX_CANDIDATES,
    DEFAULT_RECOGNITION_MODEL, DEFAULT_TILE_SIZE,
};

/// Tile face images into a composite and identify and group the faces in it.
///
/// Reads FACE_ENDPOINT, FACE_SUBSCRIPTION_KEY and FACE_PERSON_GROUP_ID from
/// the environment or a .env file.
#[derive(Parser)]
#[command(name = "facetile")]
struct Cli {
    /// Input PNG files or directories containing them.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Tiles per composite row and column.
    #[arg(long, default_value_t = DEFAULT_GRID_SIZE)]
    grid_size: usize,

    /// Side length in pixels each image is normalized to.
    #[arg(long, default_value_t = DEFAULT_TILE_SIZE)]
    tile_size: u32,

    /// Candidates returned per identified face.
    #[arg(long, default_value_t = DEFAULT_MAX_CANDIDATES)]
    max_candidates: u32,

    /// Minimum identification confidence (0.0-1.0).
    #[arg(long, default_value_t = DEFAULT_CONFIDENCE_THRESHOLD)]
    confidence_threshold: f64,

    /// Recognition model requested at detection time.
    #[arg(long, default_value = DEFAULT_RECOGNITION_MODEL)]
    recognition_model: String,

    /// Person group to identify against (overrides FACE_PERSON_GROUP_ID).
    #[arg(long)]
    person_group_id: Option<String>,

    /// Write each composite image to this directory.
    #[arg(long)]
    save_composite: Option<PathBuf>,
}

fn main() {
    let dotenv_path = dotenv::dotenv().ok();
    env_logger::init();
    if let Some(path) = dotenv_path {
        log::debug!("Loaded environment from {}", path.display());
    }

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;

    let mut config =
        FaceApiConfig::from_env()?.with_recognition_model(cli.recognition_model.clone());
    if let Some(group) = &cli.person_group_id {
        config = config.with_person_group_id(group.clone());
    }

    let paths = expand_inputs(&cli.inputs)?;
    log::info!("Found {} input images", paths.len());

    let identify_options = IdentifyOptions {
        person_group_id: config.person_group_id.clone(),
        max_candidates: cli.max_candidates,
        confidence_threshold: cli.confidence_threshold,
    };
    let client = AzureFaceClient::new(config)?;

    let mut use_case = RecognizeFacesUseCase::new(
        Box::new(ImageFileReader::new(cli.tile_size)),
        Box::new(client),
        GridTiler::new(cli.grid_size, cli.tile_size)?,
        identify_options,
    );
    if let Some(dir) = &cli.save_composite {
        use_case = use_case.with_composite_output(Box::new(ImageFileWriter::new()), dir);
    }

    let report = use_case.execute(&paths)?;
    print_report(&report);
    Ok(())
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    for input in &cli.inputs {
        if !input.exists() {
            return Err(format!("Input not found: {}", input.display()).into());
        }
    }
    if cli.grid_size == 0 {
        return Err("Grid size must be at least 1".into());
    }
    if cli.tile_size == 0 {
        return Err("Tile size must be at least 1".into());
    }
    if cli.max_candidates == 0 {
        return Err("Max candidates must be at least 1".into());
    }
    if !(0.0..=1.0).contains(&cli.confidence_threshold) {
        return Err(format!(
            "Confidence threshold must be between 0.0 and 1.0, got {}",
            cli.confidence_threshold
        )
        .into());
    }
    Ok(())
}

/// Directories contribute their PNG files; files are taken as given.
fn expand_inputs(inputs: &[PathBuf]) -> Result<Vec<PathBuf>, Box<dyn std::error::Error>> {
    let mut paths = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let found = list_images(input)?;
            if found.is_empty() {
                log::warn!("No PNG files in {}", input.display());
            }
            paths.extend(found);
        } else {
            paths.push(input.clone());
        }
    }
    if paths.is_empty() {
        return Err("No input images found".into());
    }
    Ok(paths)
}

fn print_report(report: &RecognitionReport) {
    let sources: HashMap<&FaceId, &Path> = report
        .faces
        .iter()
        .filter_map(|f| f.source.as_deref().map(|s| (&f.face.face_id, s)))
        .collect();

    for result in &report.identifications {
        println!("face_id: {}", result.face_id);
        if let Some(source) = sources.get(&result.face_id) {
            println!("source: {}", source.display());
        }
        match result.top_candidate() {
            Some(candidate) => {
                println!("candidate.person_id: {}", candidate.person_id);
                println!("candidate.confidence: {}", candidate.confidence);
            }
            None => println!("No candidates"),
        }
    }

    for group in &report.grouping.groups {
        println!("group: {}", join_ids(group));
    }
    println!("messy_group: {}", join_ids(&report.grouping.messy_group));
}

fn join_ids(ids: &[FaceId]) -> String {
    let ids: Vec<&str> = ids.iter().map(FaceId::as_str).collect();
    format!("[{}]", ids.join(", "))
}
