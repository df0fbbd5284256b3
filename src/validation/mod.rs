//! Deck validation.
//!
//! Runs every check against each card record, including back faces, and
//! reports errors and warnings without rendering or writing anything.
//! Used by `cardpress validate`.

mod checks;
mod warning;

pub use warning::{Diagnostic, Severity, ValidationResult};

use crate::assets::AssetLibrary;
use crate::card::CardLayoutConfig;
use crate::output::{plural, Printer};
use crate::types::CardMetadata;

/// Run all checks against one card.
pub fn validate_card(card: &CardMetadata, assets: &AssetLibrary) -> ValidationResult {
    let mut result = ValidationResult::new();

    result.merge(checks::check_layout(card));
    result.merge(checks::check_title(card));
    result.merge(checks::check_unknown_fields(card));
    result.merge(checks::check_symbols(card, assets));
    result.merge(checks::check_images(card, assets));

    let layout = card.text("layout").unwrap_or(crate::card::DEFAULT_LAYOUT);
    if let Some(config) = CardLayoutConfig::for_layout(layout) {
        result.merge(checks::check_back_face(card, config));
        result.merge(checks::check_fit(card, config, assets));

        if config.capabilities.back_face {
            for back in card.cards("back") {
                result.merge_for(back.title(), validate_card(back, assets));
            }
        }
    }

    result
}

/// Run all checks against every card in a deck.
pub fn validate_deck(cards: &[CardMetadata], assets: &AssetLibrary) -> ValidationResult {
    let mut result = ValidationResult::new();
    for card in cards {
        result.merge_for(card.title(), validate_card(card, assets));
    }
    result
}

/// Print diagnostics and a summary line to stderr.
pub fn print_diagnostics(result: &ValidationResult, printer: &Printer) {
    for d in result.iter() {
        let severity = printer.severity(&d.severity.to_string(), d.is_error());
        let card = d.card.as_deref().map(|c| format!(" {}", printer.cyan(c))).unwrap_or_default();
        eprintln!("{}[{}]:{} {}", severity, printer.dim(&d.code), card, d.message);
        if let Some(help) = &d.help {
            eprintln!("  {} {}", printer.dim("help:"), help);
        }
    }

    let errors = result.error_count();
    let warnings = result.warning_count();

    if errors > 0 {
        printer.error(
            "Failed",
            &format!(
                "{}, {}",
                plural(errors, "error", "errors"),
                plural(warnings, "warning", "warnings")
            ),
        );
    } else if warnings > 0 {
        printer.warning("Passed", &format!("with {}", plural(warnings, "warning", "warnings")));
    } else {
        printer.success("Passed", "no problems found");
    }
}
