//! Presets command implementation.

use crate::cli::{PresetsAction, PresetsArgs};
use crate::error::Result;
use crate::output::Formatter;
use studio_domain::Preset;

/// Execute the presets command.
pub fn execute_presets(args: PresetsArgs, formatter: &Formatter) -> Result<()> {
    match args.action {
        None => println!("{}", formatter.format_presets(&Preset::all())?),
        Some(PresetsAction::Show { id }) => {
            let preset = Preset::resolve(&id)?;
            println!("{}", formatter.format_preset(&preset)?);
        }
    }
    Ok(())
}
