use crate::domain::models::{JsonOut, ModEntry, Verdict};
use serde::Serialize;

pub fn print_out<T: Serialize>(
    json: bool,
    data: &[T],
    row: impl Fn(&T) -> String,
) -> anyhow::Result<()> {
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&JsonOut { ok: true, data })?
        );
    } else {
        for d in data {
            println!("{}", row(d));
        }
    }
    Ok(())
}

pub fn print_one<T: Serialize>(json: bool, data: T, row: impl Fn(&T) -> String) -> anyhow::Result<()> {
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&JsonOut { ok: true, data })?
        );
    } else {
        println!("{}", row(&data));
    }
    Ok(())
}

pub fn print_error(json: bool, code: &str, message: &str) {
    if json {
        let err = serde_json::json!({
            "ok": false,
            "error": {"code": code, "message": message}
        });
        println!("{}", serde_json::to_string_pretty(&err).unwrap_or_default());
    } else {
        eprintln!("ERROR: {}", message);
    }
}

fn verdict_header(verdict: Verdict) -> &'static str {
    match verdict {
        Verdict::Info => "|         --Mod Info--         |",
        Verdict::Unknown => "|     **Unknown Mod Found**    |",
        Verdict::Illegal => "|     **Illegal Mod Found**    |",
        Verdict::IllegalValue => "| **Illegal Mod Values Found** |",
        Verdict::NoMods => "|   --Firmware has no mods--   |",
    }
}

/// Boxed card per mod entry, the way the verification report has always
/// looked on the console.
pub fn render_mod_entry(e: &ModEntry) -> String {
    let mut out = String::new();
    out.push_str("--------------------------------\n");
    out.push_str(verdict_header(e.verdict));
    out.push('\n');
    out.push_str("--------------------------------\n");
    if e.verdict == Verdict::NoMods {
        return out;
    }
    out.push_str("|  Name:                       |\n");
    out.push_str(&format!("|     {:<20}     |\n", e.name));
    out.push_str(&format!("|{:30}|\n", ""));
    out.push_str(&format!(
        "|  Enabled: {:<19}|\n",
        if e.enabled { "Yes" } else { "No" }
    ));
    out.push_str(&format!("|{:30}|\n", ""));
    out.push_str("|  Values:                     |\n");
    for val in &e.vals {
        out.push_str(&format!("|     {:<20}     |\n", val));
    }
    out.push_str("--------------------------------\n");
    out
}

pub fn render_banner(title: &str, passed: bool) -> String {
    let mut out = String::new();
    out.push_str("--------------------------------\n");
    out.push_str(&format!("| {:^28} |\n", title));
    out.push_str("--------------------------------\n");
    out.push_str("|                              |\n");
    if passed {
        out.push_str("|                              |\n");
        out.push_str("|           SUCCESS!           |\n");
        out.push_str("|                              |\n");
    } else {
        out.push_str("|         ************         |\n");
        out.push_str("|         * FAILURE! *         |\n");
        out.push_str("|         ************         |\n");
    }
    out.push_str("|                              |\n");
    out.push_str("--------------------------------\n");
    out
}
