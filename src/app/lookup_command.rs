use crate::app::presenter::{render, OutputFormat};
use crate::domain::model::PostalCode;
use crate::domain::ports::AddressLookup;
use crate::utils::error::{CepError, Result};

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;
pub const EXIT_TIMEOUT: i32 = 2;

/// What the CLI prints and how it exits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupReport {
    pub rendered: String,
    pub exit_code: i32,
}

/// Looks up one code and renders the outcome. Lookup failures become a
/// rendered report; only rendering itself can fail.
pub async fn run<L: AddressLookup + ?Sized>(
    lookup: &L,
    cep: &PostalCode,
    format: OutputFormat,
) -> Result<LookupReport> {
    let outcome = lookup.lookup(cep).await;

    let exit_code = match &outcome {
        Ok(_) => EXIT_SUCCESS,
        Err(e) if e.is_timeout() => EXIT_TIMEOUT,
        Err(e) => {
            tracing::error!("❌ Lookup of {} failed: {}", cep, e);
            tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
            EXIT_FAILURE
        }
    };

    Ok(LookupReport {
        rendered: render(&outcome, format)?,
        exit_code,
    })
}

/// Exit code for errors raised before any lookup ran, such as a bad config
/// file or an empty prompt.
pub fn exit_code_for(error: &CepError) -> i32 {
    if error.is_timeout() {
        EXIT_TIMEOUT
    } else {
        EXIT_FAILURE
    }
}
