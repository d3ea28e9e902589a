//! Network interface MAC address probes.
//!
//! Selects the first physical, non-loopback interface with a non-zero MAC.

use super::normalize;
use super::probe::{CommandProbe, IdentityProbe};
use std::fs;
use std::path::PathBuf;
use tracing::debug;

/// `IFF_LOOPBACK` from `<net/if.h>`.
const IFF_LOOPBACK: u32 = 0x8;

/// Network probes for the current platform, in priority order.
pub fn system_probes() -> Vec<Box<dyn IdentityProbe>> {
    let mut probes: Vec<Box<dyn IdentityProbe>> = Vec::new();

    if cfg!(target_os = "windows") {
        probes.push(Box::new(CommandProbe::new(
            "getmac",
            "getmac",
            &["/fo", "csv", "/nh"],
            parse_getmac,
        )));
    } else if cfg!(target_os = "macos") {
        probes.push(Box::new(CommandProbe::new(
            "ifconfig",
            "ifconfig",
            &[],
            parse_ifconfig,
        )));
    } else {
        probes.push(Box::new(SysfsProbe::new("/sys/class/net")));
    }

    probes
}

/// Whether `raw` is a 48-bit MAC that is not all zeros.
pub fn is_usable_mac(raw: &str) -> bool {
    let hex = normalize(raw);
    hex.len() == 12
        && hex.chars().all(|c| c.is_ascii_hexdigit())
        && hex.chars().any(|c| c != '0')
}

/// Walks `/sys/class/net/<iface>/{flags,address}` in interface-name order.
///
/// Interfaces without a `device` link (bridges, veths, tunnels) are virtual
/// and skipped; their MACs are regenerated when they are recreated.
pub struct SysfsProbe {
    root: PathBuf,
}

impl SysfsProbe {
    /// Probe interfaces under `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn is_physical(&self, iface: &str) -> bool {
        iface != "lo" && self.root.join(iface).join("device").exists() && !self.is_loopback(iface)
    }

    fn is_loopback(&self, iface: &str) -> bool {
        fs::read_to_string(self.root.join(iface).join("flags"))
            .ok()
            .and_then(|f| u32::from_str_radix(f.trim().trim_start_matches("0x"), 16).ok())
            .is_some_and(|flags| flags & IFF_LOOPBACK != 0)
    }
}

impl IdentityProbe for SysfsProbe {
    fn name(&self) -> &'static str {
        "sysfs-net"
    }

    fn probe(&self) -> Option<String> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) => {
                debug!(error = %e, "cannot list network interfaces");
                return None;
            }
        };

        let mut names: Vec<String> = entries
            .filter_map(Result::ok)
            .filter_map(|e| e.file_name().into_string().ok())
            .collect();
        names.sort();

        names
            .iter()
            .filter(|name| self.is_physical(name))
            .filter_map(|name| fs::read_to_string(self.root.join(name).join("address")).ok())
            .map(|addr| addr.trim().to_string())
            .find(|addr| is_usable_mac(addr))
    }
}

/// Parse `ifconfig` output, returning the first `ether` address of a
/// non-loopback interface.
pub fn parse_ifconfig(output: &str) -> Option<String> {
    let mut loopback = false;
    for line in output.lines() {
        if !line.starts_with(char::is_whitespace) && line.contains(':') {
            loopback = line.contains("LOOPBACK");
            continue;
        }
        if loopback {
            continue;
        }
        if let Some(rest) = line.trim().strip_prefix("ether ") {
            if let Some(mac) = rest.split_whitespace().next() {
                if is_usable_mac(mac) {
                    return Some(mac.to_string());
                }
            }
        }
    }
    None
}

/// Parse `getmac /fo csv /nh` output: `"AA-BB-CC-DD-EE-FF","\Device\..."`.
pub fn parse_getmac(output: &str) -> Option<String> {
    output
        .lines()
        .filter_map(|line| line.split(',').next())
        .map(|field| field.trim().trim_matches('"'))
        .find(|mac| is_usable_mac(mac))
        .map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn add_iface(root: &TempDir, name: &str, flags: &str, address: &str) {
        let dir = root.path().join(name);
        fs::create_dir_all(dir.join("device")).unwrap();
        fs::write(dir.join("flags"), flags).unwrap();
        fs::write(dir.join("address"), address).unwrap();
    }

    fn add_virtual_iface(root: &TempDir, name: &str, address: &str) {
        let dir = root.path().join(name);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("flags"), "0x1003\n").unwrap();
        fs::write(dir.join("address"), address).unwrap();
    }

    #[test]
    fn usable_mac_rules() {
        assert!(is_usable_mac("aa:bb:cc:dd:ee:ff"));
        assert!(is_usable_mac("AA-BB-CC-DD-EE-FF"));
        assert!(!is_usable_mac("00:00:00:00:00:00"));
        assert!(!is_usable_mac("N/A"));
        assert!(!is_usable_mac("aa:bb:cc"));
    }

    #[test]
    fn sysfs_skips_loopback_and_zero() {
        let root = TempDir::new().unwrap();
        add_iface(&root, "lo", "0x9\n", "00:00:00:00:00:00\n");
        add_iface(&root, "dummy0", "0x1003\n", "00:00:00:00:00:00\n");
        add_iface(&root, "loop1", "0x49\n", "12:34:56:78:9a:bc\n");
        add_iface(&root, "wlan0", "0x1003\n", "de:ad:be:ef:00:02\n");
        add_iface(&root, "eth0", "0x1003\n", "de:ad:be:ef:00:01\n");

        let probe = SysfsProbe::new(root.path());
        assert_eq!(probe.probe().as_deref(), Some("de:ad:be:ef:00:01"));
    }

    #[test]
    fn sysfs_skips_virtual_interfaces() {
        let root = TempDir::new().unwrap();
        add_virtual_iface(&root, "br-4f1c2a", "02:42:8e:11:22:33\n");
        add_virtual_iface(&root, "docker0", "02:42:ac:44:55:66\n");
        add_iface(&root, "enp3s0", "0x1003\n", "3c:7c:3f:aa:bb:cc\n");

        let probe = SysfsProbe::new(root.path());
        assert_eq!(probe.probe().as_deref(), Some("3c:7c:3f:aa:bb:cc"));
    }

    #[test]
    fn sysfs_only_virtual_interfaces() {
        let root = TempDir::new().unwrap();
        add_virtual_iface(&root, "docker0", "02:42:ac:44:55:66\n");
        assert_eq!(SysfsProbe::new(root.path()).probe(), None);
    }

    #[test]
    fn sysfs_missing_root() {
        let probe = SysfsProbe::new("/nonexistent/offlock/net");
        assert_eq!(probe.probe(), None);
    }

    #[test]
    fn ifconfig_first_physical_ether() {
        let out = "lo0: flags=8049<UP,LOOPBACK,RUNNING,MULTICAST> mtu 16384\n\
                   \tinet 127.0.0.1 netmask 0xff000000\n\
                   en0: flags=8863<UP,BROADCAST,SMART,RUNNING,SIMPLEX,MULTICAST> mtu 1500\n\
                   \tether a4:83:e7:12:34:56\n\
                   en1: flags=8863<UP,BROADCAST> mtu 1500\n\
                   \tether a4:83:e7:65:43:21\n";
        assert_eq!(parse_ifconfig(out).as_deref(), Some("a4:83:e7:12:34:56"));
    }

    #[test]
    fn ifconfig_without_ether() {
        assert_eq!(parse_ifconfig("lo0: flags=8049<LOOPBACK>\n\tinet 127.0.0.1\n"), None);
    }

    #[test]
    fn getmac_skips_disconnected() {
        let out = "\"N/A\",\"Hardware not present\"\r\n\
                   \"00-1A-2B-3C-4D-5E\",\"\\Device\\Tcpip_{1234}\"\r\n";
        assert_eq!(parse_getmac(out).as_deref(), Some("00-1A-2B-3C-4D-5E"));
    }
}
