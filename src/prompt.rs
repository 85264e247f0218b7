//! Yes/no questions put to the operator.
//!
//! Preflight only needs one answer (whether an existing error log may be
//! overwritten), but it asks through [`Confirmer`] so that non-interactive
//! callers can substitute [`DenyConfirmer`].

use dialoguer::Confirm;
use std::io::IsTerminal;

/// Something that can answer a yes/no question.
#[cfg_attr(test, mockall::automock)]
pub trait Confirmer {
    /// Ask `prompt`; anything other than an explicit yes is `false`.
    fn ask(&self, prompt: &str) -> bool;
}

/// Prompts on the terminal, defaulting to "no".
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalConfirmer;

impl Confirmer for TerminalConfirmer {
    fn ask(&self, prompt: &str) -> bool {
        match Confirm::new().with_prompt(prompt).default(false).interact() {
            Ok(answer) => answer,
            Err(e) => {
                tracing::warn!("Confirmation prompt failed, assuming no: {}", e);
                false
            }
        }
    }
}

/// Declines every question.
#[derive(Debug, Default, Clone, Copy)]
pub struct DenyConfirmer;

impl Confirmer for DenyConfirmer {
    fn ask(&self, prompt: &str) -> bool {
        tracing::info!("Non-interactive session, declining: {}", prompt);
        false
    }
}

/// Terminal prompts when stdin is a TTY, otherwise deny.
pub fn default_confirmer() -> Box<dyn Confirmer> {
    if std::io::stdin().is_terminal() {
        Box::new(TerminalConfirmer)
    } else {
        Box::new(DenyConfirmer)
    }
}
