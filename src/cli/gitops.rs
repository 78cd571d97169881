//! Git and CI wrapper handlers. Thin orchestration only; correctness of the
//! wrapped tools is out of scope.

use std::path::{Path, PathBuf};

use crate::config::Settings;
use crate::error::{Error, Result};
use crate::exec;

/// `git push homepage|crew [tests]`, `git status|logs|check`.
pub async fn handle(settings: &Settings, commands: &[String], freeform: &str) -> Result<()> {
    match (
        commands.get(1).map(String::as_str),
        commands.get(2).map(String::as_str),
    ) {
        (Some("push"), Some("homepage")) => push_homepage(settings, freeform).await,
        (Some("push"), Some("crew")) => {
            let run_tests = matches!(
                commands.get(3).map(String::as_str),
                Some("test" | "tests" | "full")
            );
            push_crew(settings, run_tests, freeform).await
        }
        (Some("status"), _) => status(settings).await,
        (Some("logs"), _) => logs(settings).await,
        (Some("check"), _) => check(settings).await,
        _ => {
            println!("Available git commands:");
            println!("  crew git push crew [tests]   Push the repository");
            println!("  crew git push homepage       Publish the homepage");
            println!("  crew git status              Repository + CI status");
            println!("  crew git logs                Recent CI runs");
            println!("  crew git check               Latest CI verdict");
            Err(Error::Usage("Unknown git command".to_string()))
        }
    }
}

fn repo_dir(settings: &Settings) -> PathBuf {
    settings
        .git
        .repo_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from("."))
}

async fn push_crew(settings: &Settings, run_tests: bool, message: &str) -> Result<()> {
    let dir = repo_dir(settings);
    let timeout = settings.git.timeout_secs;

    if run_tests {
        println!("Running tests before push: {}", settings.git.test_command);
        let mut parts = settings.git.test_command.split_whitespace();
        let program = parts
            .next()
            .ok_or_else(|| Error::Config("empty git.test_command".to_string()))?;
        let args: Vec<&str> = parts.collect();
        exec::run_checked(program, &args, Some(&dir), timeout).await?;
        println!("✓ Tests passed");
    }

    commit_and_push(&dir, message, timeout).await?;
    println!("✓ Pushed to origin");
    Ok(())
}

async fn push_homepage(settings: &Settings, message: &str) -> Result<()> {
    let dir = settings.git.homepage_dir.clone().ok_or_else(|| {
        Error::Usage(
            "Homepage directory not configured.\nSet it first: crew config -- set git.homepage_dir=<path>"
                .to_string(),
        )
    })?;

    commit_and_push(&dir, message, settings.git.timeout_secs).await?;
    println!("✓ Homepage published");
    Ok(())
}

async fn commit_and_push(dir: &Path, message: &str, timeout: u64) -> Result<()> {
    exec::run_checked("git", &["add", "-A"], Some(dir), timeout).await?;

    let message = if message.is_empty() {
        "Update via crew"
    } else {
        message
    };
    let commit = exec::run_command("git", &["commit", "-m", message], Some(dir), timeout).await?;
    if !commit.success() {
        let combined = format!("{}{}", commit.stdout, commit.stderr);
        if combined.contains("nothing to commit") {
            println!("Nothing to commit, pushing existing commits");
        } else {
            return Err(Error::Exec(format!(
                "git commit failed: {}",
                combined.trim()
            )));
        }
    }

    exec::run_checked("git", &["push"], Some(dir), timeout).await?;
    Ok(())
}

async fn status(settings: &Settings) -> Result<()> {
    let dir = repo_dir(settings);
    let timeout = settings.git.timeout_secs;

    let out = exec::run_checked("git", &["status", "--short", "--branch"], Some(&dir), timeout)
        .await?;
    print!("{}", out.stdout);

    // CI status is best-effort; gh may be absent.
    match exec::run_command("gh", &["run", "list", "--limit", "5"], Some(&dir), timeout).await {
        Ok(out) if out.success() => {
            println!("\nRecent CI runs:");
            print!("{}", out.stdout);
        }
        _ => println!("\n(gh unavailable, skipping CI status)"),
    }
    Ok(())
}

async fn logs(settings: &Settings) -> Result<()> {
    let dir = repo_dir(settings);
    let out = exec::run_checked(
        "gh",
        &["run", "list", "--limit", "10"],
        Some(&dir),
        settings.git.timeout_secs,
    )
    .await?;
    print!("{}", out.stdout);
    Ok(())
}

async fn check(settings: &Settings) -> Result<()> {
    let dir = repo_dir(settings);
    let out = exec::run_checked(
        "gh",
        &["run", "list", "--limit", "1"],
        Some(&dir),
        settings.git.timeout_secs,
    )
    .await?;

    if out.stdout.contains("completed") && out.stdout.contains("success") {
        println!("✓ Latest CI run succeeded");
    } else if out.stdout.trim().is_empty() {
        println!("No CI runs found");
    } else {
        println!("Latest CI run:");
        print!("{}", out.stdout);
    }
    Ok(())
}
