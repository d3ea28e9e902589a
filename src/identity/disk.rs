//! Disk and platform serial probes.

use super::probe::{first_line, CommandProbe, FileProbe, IdentityProbe};

/// Serial values firmware vendors ship in place of a real serial.
const PLACEHOLDER_SERIALS: &[&str] = &[
    "to be filled by o.e.m.",
    "default string",
    "system serial number",
    "not specified",
    "none",
];

/// Serial probes for the current platform, in priority order.
pub fn system_probes() -> Vec<Box<dyn IdentityProbe>> {
    let mut probes: Vec<Box<dyn IdentityProbe>> = Vec::new();

    if cfg!(target_os = "windows") {
        probes.push(Box::new(CommandProbe::new(
            "wmic-diskdrive",
            "wmic",
            &["diskdrive", "get", "serialnumber"],
            parse_wmic_serial,
        )));
        probes.push(Box::new(CommandProbe::new(
            "wmic-bios",
            "wmic",
            &["bios", "get", "serialnumber"],
            parse_wmic_serial,
        )));
    } else if cfg!(target_os = "macos") {
        probes.push(Box::new(CommandProbe::new(
            "ioreg-platform",
            "ioreg",
            &["-rd1", "-c", "IOPlatformExpertDevice"],
            parse_ioreg_serial,
        )));
    } else {
        probes.push(Box::new(CommandProbe::new(
            "lsblk-serial",
            "lsblk",
            &["-dnP", "-o", "SERIAL,RM,TYPE"],
            parse_lsblk_serial,
        )));
        probes.push(Box::new(FileProbe::new(
            "dmi-product-serial",
            "/sys/class/dmi/id/product_serial",
            parse_dmi_serial,
        )));
    }

    probes
}

fn is_placeholder(value: &str) -> bool {
    let lower = value.to_ascii_lowercase();
    PLACEHOLDER_SERIALS.contains(&lower.as_str())
}

/// Parse `wmic <class> get serialnumber` output: a header line, then values.
pub fn parse_wmic_serial(output: &str) -> Option<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .filter(|l| !l.eq_ignore_ascii_case("SerialNumber"))
        .find(|l| !is_placeholder(l))
        .map(String::from)
}

/// Parse `lsblk -dnP -o SERIAL,RM,TYPE`: one `KEY="value"` row per block
/// device. Only fixed disks count; removable media would change the identity
/// whenever a stick is plugged in.
pub fn parse_lsblk_serial(output: &str) -> Option<String> {
    output
        .lines()
        .filter(|row| lsblk_field(row, "RM") == Some("0"))
        .filter(|row| lsblk_field(row, "TYPE") == Some("disk"))
        .filter_map(|row| lsblk_field(row, "SERIAL"))
        .map(str::trim)
        .find(|serial| !serial.is_empty() && !is_placeholder(serial))
        .map(String::from)
}

fn lsblk_field<'a>(row: &'a str, key: &str) -> Option<&'a str> {
    let tag = format!("{}=\"", key);
    let (at, _) = row
        .match_indices(tag.as_str())
        .find(|(i, _)| *i == 0 || row.as_bytes()[*i - 1] == b' ')?;
    row[at + tag.len()..].split('"').next()
}

/// Parse `/sys/class/dmi/id/product_serial`.
pub fn parse_dmi_serial(contents: &str) -> Option<String> {
    first_line(contents).filter(|s| !is_placeholder(s))
}

/// Extract `IOPlatformSerialNumber` from `ioreg` output.
pub fn parse_ioreg_serial(output: &str) -> Option<String> {
    output
        .lines()
        .find(|l| l.contains("\"IOPlatformSerialNumber\""))
        .and_then(|l| l.split('"').nth(3))
        .map(str::trim)
        .filter(|s| !s.is_empty() && !is_placeholder(s))
        .map(String::from)
}
