//! Validate command implementation.

use std::path::PathBuf;

use clap::Args;

use crate::deck::load_deck;
use crate::error::{CardError, Result};
use crate::output::{display_path, plural, Printer};
use crate::validation::{print_diagnostics, validate_deck};

use super::Project;

/// Check a deck for problems without rendering
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Deck file (.yaml, .yml or .json)
    pub deck: PathBuf,

    /// Manifest to use instead of cardpress.yaml beside the deck
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Treat warnings as errors
    #[arg(long)]
    pub strict: bool,
}

pub fn run(args: ValidateArgs, printer: &Printer) -> Result<()> {
    let cards = load_deck(&args.deck)?;
    let project = Project::load(args.config.as_deref(), &args.deck, printer)?;

    printer.status(
        "Validating",
        &format!("{} in {}", plural(cards.len(), "card", "cards"), display_path(&args.deck)),
    );
    let result = validate_deck(&cards, &project.assets);
    print_diagnostics(&result, printer);

    if result.has_errors() || (args.strict && result.has_warnings()) {
        return Err(CardError::Build {
            message: format!("{} failed validation", display_path(&args.deck)),
            help: None,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn validate(content: &str, strict: bool) -> Result<()> {
        let dir = tempdir().unwrap();
        let deck = dir.path().join("deck.yaml");
        std::fs::write(&deck, content).unwrap();
        run(ValidateArgs { deck, config: None, strict }, &Printer::plain())
    }

    #[test]
    fn test_clean_deck_passes() {
        assert!(validate("- title: Opt\n  rules_text: Draw a card.\n", true).is_ok());
    }

    #[test]
    fn test_warnings_fail_only_when_strict() {
        let deck = "- title: Opt\n  rules_text: \"{chaos}\"\n";
        assert!(validate(deck, false).is_ok());
        assert!(validate(deck, true).is_err());
    }

    #[test]
    fn test_errors_fail() {
        assert!(validate("- title: Opt\n  layout: meld\n", false).is_err());
    }
}
