use std::io::{self, Write};

use clap::{Args, Subcommand};

use crate::config::{Settings, TOKEN_ENV, settings_file_path};
use crate::error::AppResult;

#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommand {
    /// Prompt for the Shortcut API token and save it.
    Init,
    /// Show the stored settings (token masked).
    Show,
}

pub fn run(command: ConfigCommand) -> AppResult<()> {
    match command {
        ConfigCommand::Init => run_init(),
        ConfigCommand::Show => run_show(),
    }
}

fn run_init() -> AppResult<()> {
    let mut settings = Settings::load()?;

    println!("Configuring Shortcut ticket widgets.");
    println!(
        "Create a token at https://app.shortcut.com/<your-workspace>/settings/account/api-tokens"
    );
    println!("Press Enter to keep the current value, '-' to clear it.");
    println!();

    match prompt("Shortcut API token", &settings.shortcut_api_key)? {
        PromptAction::Keep => {}
        PromptAction::Clear => settings.shortcut_api_key.clear(),
        PromptAction::Set(value) => settings.shortcut_api_key = value,
    }

    settings.save()?;

    let path = settings_file_path()?;
    println!("\nSettings saved to {}", path.display());
    Ok(())
}

fn run_show() -> AppResult<()> {
    let settings = Settings::load()?;
    let path = settings_file_path()?;

    println!("Settings file: {}", path.display());
    println!(
        "Shortcut API token: {}",
        mask_secret(&settings.shortcut_api_key)
    );
    if settings.token_override.is_some() {
        println!("{TOKEN_ENV} is set and overrides the stored token.");
    }

    Ok(())
}

fn prompt(field: &str, current: &str) -> AppResult<PromptAction> {
    let mut stdout = io::stdout();

    if current.is_empty() {
        write!(stdout, "{field} (Enter to skip): ")?;
    } else {
        write!(stdout, "{field} [****] (Enter to keep, '-' to clear): ")?;
    }
    stdout.flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(parse_answer(&input))
}

fn parse_answer(input: &str) -> PromptAction {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        PromptAction::Keep
    } else if trimmed == "-" {
        PromptAction::Clear
    } else {
        PromptAction::Set(trimmed.to_string())
    }
}

fn mask_secret(value: &str) -> String {
    match value.chars().count() {
        0 => "<not set>".to_string(),
        1..=6 => "***".to_string(),
        count => {
            let prefix: String = value.chars().take(3).collect();
            let suffix: String = value.chars().skip(count - 3).collect();
            format!("{prefix}***{suffix}")
        }
    }
}

#[derive(Debug, PartialEq)]
enum PromptAction {
    Keep,
    Clear,
    Set(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masks_tokens_by_length() {
        assert_eq!(mask_secret(""), "<not set>");
        assert_eq!(mask_secret("abc"), "***");
        assert_eq!(mask_secret("abcdef1234"), "abc***234");
    }

    #[test]
    fn parses_prompt_answers() {
        assert_eq!(parse_answer("\n"), PromptAction::Keep);
        assert_eq!(parse_answer(" - \n"), PromptAction::Clear);
        assert_eq!(
            parse_answer(" tok \n"),
            PromptAction::Set("tok".to_string())
        );
    }
}
