//! Implementation of the `prompty sample` command.

use crate::cli::SampleArgs;
use prompty::Result;
use serde_json::Value;

/// Execute the `prompty sample` command.
pub fn cmd_sample(args: SampleArgs) -> Result<()> {
    let prompty = prompty::load(&args.file, &args.connection)?;
    println!("{:#}", Value::Object(prompty.sample()));
    Ok(())
}
