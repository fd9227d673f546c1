// Application layer: the thin shell around the resolver (prompt, rendering,
// exit codes).

pub mod lookup_command;
pub mod presenter;
pub mod prompt;
