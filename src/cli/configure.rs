//! Configuration handlers.

use crate::config::{save_settings, Settings};
use crate::error::{Error, Result};

/// `config`, `config show`, `config mode [...]`, `config -- set key=value`.
pub fn handle(settings: &mut Settings, commands: &[String], freeform: &str) -> Result<()> {
    if !freeform.is_empty() {
        return set_from_freeform(settings, freeform);
    }

    match commands.get(1).map(String::as_str) {
        None | Some("show") => show(settings),
        Some("mode") => mode(settings, commands.get(2).map(String::as_str)),
        Some("set") => Err(Error::Usage(
            "Settings are changed via the free string: crew config -- set key=value".to_string(),
        )),
        Some(other) => Err(Error::Usage(format!(
            "Unknown config command: {}\nAvailable: show, mode, -- set key=value",
            other
        ))),
    }
}

fn set_from_freeform(settings: &mut Settings, freeform: &str) -> Result<()> {
    let assignment = freeform.strip_prefix("set ").ok_or_else(|| {
        Error::Usage("Invalid config free string, expected: set key=value".to_string())
    })?;
    let (key, value) = assignment.split_once('=').ok_or_else(|| {
        Error::Usage("Invalid assignment, expected: set key=value".to_string())
    })?;

    settings.set_value(key.trim(), value.trim())?;
    save_settings(settings)?;
    println!("✓ Set {} = {}", key.trim(), value.trim());
    Ok(())
}

fn show(settings: &Settings) -> Result<()> {
    println!("Crew Commander configuration");
    if let Ok(path) = crate::config::get_settings_path() {
        println!("  Settings file: {}", path.display());
    }
    println!("  Log level: {}", settings.log_level);
    println!(
        "  Preferred mode: {}",
        settings.version_management.preferred_mode
    );
    println!("  Guard: {}", settings.guard.mode);
    println!("  PPA: {}", settings.packaging.ppa);
    if let Some(dir) = &settings.git.repo_dir {
        println!("  Repo dir: {}", dir.display());
    }
    if let Some(dir) = &settings.git.homepage_dir {
        println!("  Homepage dir: {}", dir.display());
    }
    println!("  Messaging targets:");
    let mut targets: Vec<_> = settings.messaging.targets.iter().collect();
    targets.sort();
    for (identity, target) in targets {
        println!("    {} -> tmux:{}", identity, target);
    }
    Ok(())
}

fn mode(settings: &mut Settings, selected: Option<&str>) -> Result<()> {
    match selected {
        None => {
            println!(
                "Preferred mode: {}",
                settings.version_management.preferred_mode
            );
            for (name, path) in &settings.version_management.available_modes {
                println!("  {} -> {}", name, path);
            }
            Ok(())
        }
        Some(mode @ ("dev" | "pip" | "apt")) => {
            settings.version_management.preferred_mode = mode.to_string();
            save_settings(settings)?;
            println!("✓ Preferred mode set to {}", mode);
            Ok(())
        }
        Some(other) => Err(Error::Usage(format!(
            "Unknown mode: {} (expected dev, pip or apt)",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn freeform_assignment_requires_set_prefix() {
        let mut settings = Settings::default();
        assert!(matches!(
            set_from_freeform(&mut settings, "log_level=debug"),
            Err(Error::Usage(_))
        ));
        assert!(matches!(
            set_from_freeform(&mut settings, "set log_level debug"),
            Err(Error::Usage(_))
        ));
    }
}
