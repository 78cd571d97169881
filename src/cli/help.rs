//! Help and version rendering.

use crate::config::Settings;
use crate::error::Result;
use crate::session::Identity;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Overview shown when the tool is invoked without arguments.
pub fn print_overview() {
    println!("Crew Commander (crew) v{} - Multi-Agent AI Orchestration", VERSION);
    println!();
    println!("Available commands (flexible abbreviations):");
    println!("  ve[rsion]                    - Show version and installation");
    println!("  he[lp]                       - Show this help");
    println!("  he[lp] fu[ll]                - Show the full command reference");
    println!("  se[ssion]                    - Session management");
    println!("  co[ntext]                    - Session history and context");
    println!("  gi[t] pus[h] ho[mepage]      - Update the project homepage");
    println!("  gi[t] pus[h] crew [te[sts]]  - Push to GitHub (optionally with tests)");
    println!("  ex[ec] up[load] pp[a]        - Upload packages to the PPA");
    println!("  co[nfig] sh[ow]              - Show current configuration");
    println!("  co[nfig] -- set key=value    - Change a setting");
    println!();
    println!("Tip: at least 2 letters per command, e.g. 'crew gi pus crew te'");
}

/// `help`, `help full`, `help experimental`.
pub fn handle(commands: &[String]) {
    match commands.last().map(String::as_str) {
        Some("full") => print_full(),
        Some("experimental") => print_experimental(),
        _ => print_overview(),
    }
}

fn print_full() {
    println!("Crew Commander (crew) v{} - Full Command Reference", VERSION);
    println!();
    println!("CORE");
    println!("  crew help [full|experimental]    Show help");
    println!("  crew version [full]              Show version information");
    println!("  crew status                      Store, session and tmux status");
    println!();
    println!("SESSIONS");
    println!("  crew session start <id> [-- name]   Start a session (auto-ends a previous one)");
    println!("  crew session save [<id>] [-- msg]   Log a checkpoint for the active session");
    println!("  crew session end [<id>]             End the active session");
    println!("  crew session list                   List recent sessions");
    println!("  crew context                        Session history overview");
    println!();
    println!("IDENTITIES");
    for identity in Identity::ALL {
        println!(
            "  {:<10} {} - {}",
            identity.alias(),
            identity.display_name(),
            identity.role()
        );
    }
    println!();
    println!("MESSAGING");
    println!("  crew <id> -- <message>           Send a message to an agent's tmux session");
    println!();
    println!("GIT");
    println!("  crew git push crew [tests]       Push the repository (optionally run tests first)");
    println!("  crew git push homepage           Publish the homepage");
    println!("  crew git status|logs|check       Repository and CI status");
    println!();
    println!("PACKAGING");
    println!("  crew exec upload ppa [crew|crewcmd]   Upload base and/or meta packages");
    println!("  crew exec upload meta                 Upload meta packages");
    println!("  crew exec show ppa                    Show packaging configuration");
    println!("  crew exec fix gpg                     Re-sign package uploads");
    println!("  crew exec debian [build|upload|full]  Debian packaging");
    println!();
    println!("CONFIG");
    println!("  crew config [show]               Show configuration");
    println!("  crew config mode [dev|pip|apt]   Show or switch the preferred install mode");
    println!("  crew config -- set key=value     Change a setting");
}

fn print_experimental() {
    println!("Crew Commander (crew) v{} - Experimental Commands", VERSION);
    println!();
    println!("These commands resolve but are not dispatchable yet:");
    println!("  knowledge    Shared knowledge base across sessions");
    println!("  stop         Stop a running agent");
    println!("  restart      Restart a running agent");
}

/// `version` and `version full`.
pub fn version(commands: &[String], settings: &Settings) -> Result<()> {
    let mode = settings.version_management.preferred_mode.to_uppercase();

    if commands.iter().any(|c| c == "full") {
        println!("Crew Commander v{}", VERSION);
        println!("  Mode: {}", mode);
        for (name, path) in &settings.version_management.available_modes {
            println!("  {} -> {}", name, path);
        }
        if let Ok(path) = crate::config::get_settings_path() {
            println!("  Settings: {}", path.display());
        }
        if let Ok(path) = crate::session::store::default_db_path() {
            println!("  Database: {}", path.display());
        }
    } else {
        println!("{} Mode (v{})", mode, VERSION);
        println!("crew config mode dev|pip|apt  # Switch install mode");
    }
    Ok(())
}
