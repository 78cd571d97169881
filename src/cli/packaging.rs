//! Packaging and upload handlers. Thin wrappers over the Debian toolchain;
//! build and signing logic stay with the external tools.

use std::path::PathBuf;

use crate::config::Settings;
use crate::error::{Error, Result};
use crate::exec;

/// `exec upload ppa [crew|crewcmd]`, `exec upload meta`, `exec show ppa`,
/// `exec fix gpg`, `exec debian [build|upload|full]`.
pub async fn handle(settings: &Settings, commands: &[String]) -> Result<()> {
    match (
        commands.get(1).map(String::as_str),
        commands.get(2).map(String::as_str),
    ) {
        (Some("upload"), Some("ppa")) => {
            upload_ppa(settings, commands.get(3).map(String::as_str)).await
        }
        (Some("upload"), Some("meta")) => upload_packages(settings, &settings.packaging.meta_packages).await,
        (Some("show"), Some("ppa")) => show_ppa(settings),
        (Some("fix"), Some("gpg")) => fix_gpg(settings).await,
        (Some("debian"), action) => debian(settings, action).await,
        _ => {
            println!("Available exec commands:");
            println!("  crew exec upload ppa [crew|crewcmd]   Upload base and/or meta packages");
            println!("  crew exec upload meta                 Upload meta packages");
            println!("  crew exec show ppa                    Show packaging configuration");
            println!("  crew exec fix gpg                     Re-sign package uploads");
            println!("  crew exec debian [build|upload|full]  Debian packaging");
            Err(Error::Usage("Unknown exec command".to_string()))
        }
    }
}

async fn upload_ppa(settings: &Settings, target: Option<&str>) -> Result<()> {
    match target {
        // No target: upload everything, base and meta.
        None => {
            let all: Vec<String> = settings
                .packaging
                .base_packages
                .iter()
                .chain(&settings.packaging.meta_packages)
                .cloned()
                .collect();
            upload_packages(settings, &all).await
        }
        Some("crew") => upload_packages(settings, &settings.packaging.base_packages).await,
        Some("crewcmd") => upload_packages(settings, &settings.packaging.meta_packages).await,
        Some(other) => Err(Error::Usage(format!(
            "Unknown PPA target: {}\nAvailable targets: crew (base), crewcmd (meta)",
            other
        ))),
    }
}

async fn upload_packages(settings: &Settings, packages: &[String]) -> Result<()> {
    let dir = build_dir(settings)?;
    let mut failed = Vec::new();

    for package in packages {
        let changes = format!("{}_source.changes", package);
        println!("Uploading {} to {} ...", changes, settings.packaging.ppa);
        match exec::run_checked(
            "dput",
            &[settings.packaging.ppa.as_str(), changes.as_str()],
            Some(&dir),
            settings.packaging.timeout_secs,
        )
        .await
        {
            Ok(_) => println!("✓ Uploaded {}", package),
            Err(e) => {
                tracing::warn!("Upload of {} failed: {}", package, e);
                println!("Upload of {} failed: {}", package, e);
                failed.push(package.clone());
            }
        }
    }

    if failed.is_empty() {
        println!("✓ All {} package(s) uploaded", packages.len());
        Ok(())
    } else {
        Err(Error::Exec(format!(
            "{} of {} uploads failed: {}",
            failed.len(),
            packages.len(),
            failed.join(", ")
        )))
    }
}

fn show_ppa(settings: &Settings) -> Result<()> {
    println!("Packaging configuration");
    println!("  PPA: {}", settings.packaging.ppa);
    println!("  Base packages: {}", settings.packaging.base_packages.join(", "));
    println!("  Meta packages: {}", settings.packaging.meta_packages.join(", "));
    match &settings.packaging.gpg_key {
        Some(key) => println!("  GPG key: {}", key),
        None => println!("  GPG key: (not configured)"),
    }
    match &settings.packaging.build_dir {
        Some(dir) => println!("  Build dir: {}", dir.display()),
        None => println!("  Build dir: (not configured)"),
    }
    Ok(())
}

async fn fix_gpg(settings: &Settings) -> Result<()> {
    let key = settings.packaging.gpg_key.as_deref().ok_or_else(|| {
        Error::Usage(
            "GPG key not configured.\nSet it first: crew config -- set packaging.gpg_key=<keyid>"
                .to_string(),
        )
    })?;
    let dir = build_dir(settings)?;
    let key_arg = format!("-k{}", key);

    let all: Vec<&String> = settings
        .packaging
        .base_packages
        .iter()
        .chain(&settings.packaging.meta_packages)
        .collect();
    for package in all {
        let changes = format!("{}_source.changes", package);
        println!("Re-signing {} ...", changes);
        exec::run_checked(
            "debsign",
            &["--re-sign", key_arg.as_str(), changes.as_str()],
            Some(&dir),
            settings.packaging.timeout_secs,
        )
        .await?;
        println!("✓ Re-signed {}", package);
    }
    Ok(())
}

async fn debian(settings: &Settings, action: Option<&str>) -> Result<()> {
    match action {
        None | Some("build") => debian_build(settings).await,
        Some("upload") => {
            upload_packages(settings, &settings.packaging.base_packages).await
        }
        Some("full") => {
            debian_build(settings).await?;
            upload_packages(settings, &settings.packaging.base_packages).await
        }
        Some(other) => Err(Error::Usage(format!(
            "Unknown debian action: {}\nAvailable: build, upload, full",
            other
        ))),
    }
}

async fn debian_build(settings: &Settings) -> Result<()> {
    let dir = build_dir(settings)?;
    println!("Building source package in {} ...", dir.display());
    exec::run_checked(
        "debuild",
        &["-S", "-sa", "-us", "-uc"],
        Some(&dir),
        settings.packaging.timeout_secs,
    )
    .await?;
    println!("✓ Source package built");
    Ok(())
}

fn build_dir(settings: &Settings) -> Result<PathBuf> {
    settings.packaging.build_dir.clone().ok_or_else(|| {
        Error::Usage(
            "Build directory not configured.\nSet it first: crew config -- set packaging.build_dir=<path>"
                .to_string(),
        )
    })
}
