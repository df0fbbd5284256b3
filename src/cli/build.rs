//! Build command implementation.
//!
//! Renders every card in a deck, in parallel, and writes one PNG per face.

use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;
use image::RgbaImage;
use rayon::prelude::*;

use crate::assets::AssetLibrary;
use crate::card::Card;
use crate::deck::{load_deck, output_stems};
use crate::error::{CardError, Result};
use crate::output::{display_path, plural, Printer};
use crate::types::CardMetadata;

use super::Project;

/// Render every card in a deck to PNG
#[derive(Args, Debug)]
pub struct BuildArgs {
    /// Deck file (.yaml, .yml or .json)
    pub deck: PathBuf,

    /// Output directory (default: the manifest's `output`)
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Manifest to use instead of cardpress.yaml beside the deck
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Number of render threads (default: one per core)
    #[arg(long, short)]
    pub jobs: Option<usize>,
}

pub fn run(args: BuildArgs, printer: &Printer) -> Result<()> {
    let cards = load_deck(&args.deck)?;
    let project = Project::load(args.config.as_deref(), &args.deck, printer)?;
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| project.root.join(&project.manifest.output));

    fs::create_dir_all(&output).map_err(|e| CardError::Io {
        path: output.clone(),
        message: format!("Failed to create output directory: {}", e),
    })?;

    printer.status(
        "Rendering",
        &format!("{} from {}", plural(cards.len(), "card", "cards"), display_path(&args.deck)),
    );

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(args.jobs.unwrap_or(0))
        .build()
        .map_err(|e| CardError::Build {
            message: format!("Failed to start render threads: {}", e),
            help: None,
        })?;

    let stems = output_stems(&cards);
    let outcomes: Vec<Result<Vec<PathBuf>>> = pool.install(|| {
        cards
            .par_iter()
            .zip(stems.par_iter())
            .map(|(card, stem)| {
                let outcome = render_card_files(card, &project.assets, &output, stem);
                match &outcome {
                    Ok(paths) => {
                        let files: Vec<String> = paths.iter().map(|p| display_path(p)).collect();
                        printer.status("Rendered", &format!("{} -> {}", card.title(), files.join(", ")));
                    }
                    Err(e) => printer.error("Failed", &format!("{}: {}", card.title(), e)),
                }
                outcome
            })
            .collect()
    });

    let failed = outcomes.iter().filter(|o| o.is_err()).count();
    let written: usize = outcomes.iter().flatten().map(Vec::len).sum();

    if failed > 0 {
        return Err(CardError::Build {
            message: format!(
                "{} of {} failed to render",
                plural(failed, "card", "cards"),
                cards.len()
            ),
            help: Some("Run `cardpress validate` on the deck for details".to_string()),
        });
    }

    printer.success(
        "Finished",
        &format!("{} in {}", plural(written, "image", "images"), display_path(&output)),
    );
    Ok(())
}

/// Render one card and its back face, if any, into `dir`.
///
/// Returns the paths written: `<stem>.png`, then `<stem>-back.png`.
pub fn render_card_files(
    metadata: &CardMetadata,
    assets: &AssetLibrary,
    dir: &Path,
    stem: &str,
) -> Result<Vec<PathBuf>> {
    let card = Card::new(metadata, assets)?;
    let back = card.back();

    let front_path = dir.join(format!("{}.png", stem));
    write_png(&card.render_card()?, &front_path)?;
    let mut written = vec![front_path];

    if let Some(back) = back {
        let back_path = dir.join(format!("{}-back.png", stem));
        write_png(&Card::new(back, assets)?.render_card()?, &back_path)?;
        written.push(back_path);
    }

    Ok(written)
}

/// Write an image as PNG.
pub fn write_png(image: &RgbaImage, path: &Path) -> Result<()> {
    image.save(path).map_err(|e| CardError::Io {
        path: path.to_path_buf(),
        message: format!("Failed to write PNG: {}", e),
    })?;
    tracing::debug!(path = %path.display(), "wrote image");
    Ok(())
}
