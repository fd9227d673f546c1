use crate::domain::model::PostalCode;
use crate::utils::error::{CepError, Result};
use std::io::{BufRead, Write};

pub const PROMPT: &str = "CEP: ";

/// Asks for a postal code on `output` and reads one line from `input`.
/// Surrounding whitespace is stripped; nothing else is checked.
pub fn read_postal_code<R: BufRead, W: Write>(mut input: R, mut output: W) -> Result<PostalCode> {
    output.write_all(PROMPT.as_bytes())?;
    output.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;

    let code = line.trim();
    if code.is_empty() {
        return Err(CepError::MissingConfigError {
            field: "cep".to_string(),
        });
    }
    Ok(PostalCode::from(code))
}
