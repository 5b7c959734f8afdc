use crate::domain::models::{
    DeviceReport, Manifest, ModEntry, ReportedMod, ValidationResult, Verdict,
};

pub fn firmware_identity(report: &DeviceReport) -> String {
    format!(
        "{}-{}.{}",
        report.name, report.major_version, report.minor_version
    )
}

fn entry(verdict: Verdict, m: &ReportedMod) -> ModEntry {
    ModEntry {
        verdict,
        name: m.name.clone(),
        enabled: m.enabled,
        vals: m.vals.clone(),
    }
}

fn no_mods_entry() -> ModEntry {
    ModEntry {
        verdict: Verdict::NoMods,
        name: String::new(),
        enabled: false,
        vals: vec![],
    }
}

/// Evaluate every reported mod against manifest policy, in report order.
/// A single Unknown/Illegal/IllegalValue entry fails the whole batch, but
/// all mods are still evaluated and reported. An empty-named mod is the
/// firmware's "no mods" sentinel and ends validation successfully at the
/// point it appears.
pub fn validate(report: &DeviceReport, manifest: &Manifest) -> ValidationResult {
    if report.mods.is_empty() {
        return ValidationResult {
            passed: true,
            entries: vec![no_mods_entry()],
        };
    }

    let mut entries = Vec::with_capacity(report.mods.len());
    let mut failed = false;
    for m in &report.mods {
        if m.name.is_empty() {
            return ValidationResult {
                passed: true,
                entries: vec![no_mods_entry()],
            };
        }
        match manifest.find_mod_policy(&m.name) {
            None => {
                failed = true;
                entries.push(entry(Verdict::Unknown, m));
            }
            Some(policy) => {
                if m.enabled && !policy.permitted {
                    failed = true;
                    entries.push(entry(Verdict::Illegal, m));
                } else if m
                    .vals
                    .iter()
                    // first out-of-range value settles this mod
                    .any(|v| *v < policy.min_val || *v > policy.max_val)
                {
                    failed = true;
                    entries.push(entry(Verdict::IllegalValue, m));
                } else {
                    entries.push(entry(Verdict::Info, m));
                }
            }
        }
    }

    ValidationResult {
        passed: !failed,
        entries,
    }
}
