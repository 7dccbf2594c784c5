use std::io::{BufRead, IsTerminal, Write};

use crate::config::ConsoleSettings;

/// Wait for ENTER so a double-clicked console window stays open. No-op when
/// disabled or when stdin is not a terminal.
pub fn pause(settings: &ConsoleSettings) {
    let stdin = std::io::stdin();
    if !settings.pause_on_exit || !stdin.is_terminal() {
        return;
    }
    print!("\nAppuie sur ENTREE pour fermer...");
    let _ = std::io::stdout().flush();
    let mut line = String::new();
    let _ = stdin.lock().read_line(&mut line);
}

/// `=` rule framing a banner.
pub fn rule(width: usize) -> String {
    "=".repeat(width)
}

pub fn banner(title: &str, width: usize) {
    println!("{}", rule(width));
    println!("{title}");
    println!("{}", rule(width));
}

/// Print a failed run: the French diagnostic, then a remediation hint when
/// the error is one we classify.
pub fn report_error(err: &anyhow::Error) {
    log::error!("{err:#}");
    println!("\nERREUR : {err:#}");
    if let Some(hint) = err.downcast_ref::<crate::error::RnaError>().and_then(|e| e.hint()) {
        println!("{hint}");
    }
}
