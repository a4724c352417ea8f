use std::sync::LazyLock;

use regex::{Captures, Regex};

static REFRESHED_AT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?i)r(?:e|é|&eacute;)actualis(?:e|é|&eacute;)\s+(?:a|à|&agrave;)\s+",
        r"(\d{2}:\d{2})\s*\(run\s+([\w-]+)\s+de\s+(\d+z)\)",
    ))
    .expect("refresh regex must be valid")
});

static RUN_CLAUSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d{2}:\d{2})\s*\(run\s+([\w-]+)\s+de\s+(\d+z)\)")
        .expect("run clause regex must be valid")
});

/// Model run descriptor such as `16:12 (run ARPEGE de 12Z)`, read from the raw
/// markup. Advisory only: `None` when the page does not carry one.
pub fn extract_last_update(markup: &str) -> Option<String> {
    REFRESHED_AT
        .captures(markup)
        .or_else(|| RUN_CLAUSE.captures(markup))
        .map(|captures| describe_run(&captures))
}

fn describe_run(captures: &Captures<'_>) -> String {
    let (time, model, run) = (&captures[1], &captures[2], &captures[3]);
    format!("{time} (run {model} de {run})")
}
