use std::io::{self, Write};

use anyhow::Result;
use colored::Colorize;
use dialoguer::{Confirm, Input, Password, theme::ColorfulTheme};

/// Yes/no confirmation with a default answer
pub fn confirm(prompt: &str, default: bool) -> Result<bool> {
    Ok(Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .default(default)
        .interact()?)
}

/// Free-text input, must be non-empty
pub fn input(prompt: &str) -> Result<String> {
    Ok(Input::<String>::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .interact_text()?)
}

/// Free-text input where an empty submission means "cancel"
pub fn input_optional(prompt: &str) -> Result<String> {
    Ok(Input::<String>::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .allow_empty(true)
        .interact_text()?)
}

/// Free-text input pre-filled with a default value
pub fn input_default(prompt: &str, default: &str) -> Result<String> {
    Ok(Input::<String>::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .default(default.to_string())
        .allow_empty(true)
        .interact_text()?)
}

/// Masked input for values that must not echo
pub fn secret(prompt: &str) -> Result<String> {
    Ok(Password::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .allow_empty_password(true)
        .interact()?)
}

/// Verbatim-name check used before destructive operations. Surrounding
/// whitespace in the typed value is ignored; everything else must match
/// exactly.
pub fn names_match(expected: &str, typed: &str) -> bool {
    typed.trim() == expected
}

/// Require the user to retype `name` exactly. Returns false, without
/// side effects, on any mismatch.
pub fn confirm_typed(name: &str) -> Result<bool> {
    println!(
        "{}",
        format!("This action is irreversible. Type '{name}' to confirm.").red()
    );
    let typed = input_optional("Resource name")?;
    Ok(names_match(name, &typed))
}

/// Block until the user presses Enter
pub fn pause() -> Result<()> {
    print!("\nPress Enter to continue...");
    io::stdout().flush()?;
    let mut buf = String::new();
    io::stdin().read_line(&mut buf)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_match_exact() {
        assert!(names_match("myapp-instance", "myapp-instance"));
    }

    #[test]
    fn test_names_match_rejects_typo() {
        assert!(!names_match("myapp-instance", "myapp-instnace"));
    }

    #[test]
    fn test_names_match_rejects_empty_and_case() {
        assert!(!names_match("myapp-instance", ""));
        assert!(!names_match("myapp-instance", "MYAPP-INSTANCE"));
    }

    #[test]
    fn test_names_match_trims_typed_value() {
        assert!(names_match("myapp-instance", "  myapp-instance \n"));
    }
}
