//! Implementation of the `prompty check` command.

use crate::cli::CheckArgs;
use prompty::Result;
use prompty::pipeline::validate_inputs;
use serde_json::Value;

/// Execute the `prompty check` command.
///
/// Runs the same input validation `prepare` does, without rendering.
pub fn cmd_check(args: CheckArgs) -> Result<()> {
    let prompty = prompty::load(&args.file, &args.connection)?;
    let values = validate_inputs(&prompty, &args.inputs, args.merge_sample)?;

    tracing::debug!(file = %args.file.display(), inputs = values.len(), "inputs valid");
    println!("{:#}", Value::Object(values));
    Ok(())
}
