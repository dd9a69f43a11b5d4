//! Prompt theme and output styles shared by the commands.
//!
//! Everything styled here goes to stderr so stdout stays clean for piped data.

use console::{style, Style};
use dialoguer::theme::ColorfulTheme;

/// `ColorfulTheme` with Imprint's prompt glyphs.
pub fn imprint_theme() -> ColorfulTheme {
    ColorfulTheme {
        prompt_prefix: style("?".to_string()).for_stderr().cyan(),
        prompt_style: Style::new().for_stderr().bold(),
        prompt_suffix: style("›".to_string()).for_stderr().bright().black(),
        success_prefix: style("✓".to_string()).for_stderr().green(),
        success_suffix: style("·".to_string()).for_stderr().bright().black(),
        error_prefix: style("✗".to_string()).for_stderr().red(),
        error_style: Style::new().for_stderr().red(),
        values_style: Style::new().for_stderr().green(),
        ..ColorfulTheme::default()
    }
}

/// Print a success line to stderr.
pub fn success(message: impl std::fmt::Display) {
    let green = Style::new().for_stderr().green();
    eprintln!("{} {}", green.apply_to("✓"), message);
}

/// Dimmed style for secondary details.
pub fn dim() -> Style {
    Style::new().for_stderr().dim()
}

/// Ask for confirmation unless `assume_yes` is set.
pub fn confirm(prompt: &str, assume_yes: bool) -> anyhow::Result<bool> {
    if assume_yes {
        return Ok(true);
    }
    match dialoguer::Confirm::with_theme(&imprint_theme())
        .with_prompt(prompt)
        .default(false)
        .interact()
    {
        Ok(answer) => Ok(answer),
        Err(dialoguer::Error::IO(e)) if e.kind() == std::io::ErrorKind::Interrupted => Ok(false),
        Err(e) => Err(e.into()),
    }
}
