pub mod build;
pub mod completions;
pub mod validate;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use crate::assets::{AssetLibrary, Manifest, MANIFEST_FILENAME};
use crate::error::Result;
use crate::output::{display_path, Printer};

/// cardpress - Trading card image generator
#[derive(Parser, Debug)]
#[command(name = "cardpress")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Log more detail (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Render every card in a deck to PNG
    Build(build::BuildArgs),

    /// Check a deck for problems without rendering
    Validate(validate::ValidateArgs),

    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}

/// The manifest and assets a deck renders with.
pub struct Project {
    pub manifest: Manifest,
    /// Directory manifest paths are relative to.
    pub root: PathBuf,
    pub assets: AssetLibrary,
}

impl Project {
    /// Load `config` if given, else `cardpress.yaml` beside the deck, else
    /// the defaults.
    pub fn load(config: Option<&Path>, deck: &Path, printer: &Printer) -> Result<Self> {
        let (manifest, root) = match config {
            Some(path) => {
                printer.info("Config", &display_path(path));
                (Manifest::load(path)?, parent_dir(path))
            }
            None => {
                let root = parent_dir(deck);
                let (manifest, found) = Manifest::find(&root)?;
                if found {
                    printer.info("Config", &display_path(&root.join(MANIFEST_FILENAME)));
                }
                (manifest, root)
            }
        };

        let assets = AssetLibrary::load(&manifest, &root)?;
        Ok(Self { manifest, root, assets })
    }
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use tempfile::tempdir;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_build_args() {
        let cli = Cli::parse_from(["cardpress", "-vv", "build", "deck.yaml", "-o", "out", "-j", "4"]);
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Build(args) => {
                assert_eq!(args.deck, PathBuf::from("deck.yaml"));
                assert_eq!(args.output, Some(PathBuf::from("out")));
                assert_eq!(args.jobs, Some(4));
            }
            other => panic!("expected build, got {:?}", other),
        }
    }

    #[test]
    fn test_project_finds_manifest_beside_deck() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(MANIFEST_FILENAME), "output: cards\ngap_ratio: 2").unwrap();
        let deck = dir.path().join("deck.yaml");

        let project = Project::load(None, &deck, &Printer::plain()).unwrap();
        assert_eq!(project.manifest.output, PathBuf::from("cards"));
        assert_eq!(project.assets.gap_ratio, 2.0);
        assert_eq!(project.root, dir.path());
    }

    #[test]
    fn test_parent_dir_of_bare_file() {
        assert_eq!(parent_dir(Path::new("deck.yaml")), PathBuf::from("."));
    }
}
