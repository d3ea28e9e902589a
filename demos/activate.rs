//! Startup gate and license import example.
//!
//! # Running
//!
//! ```bash
//! # Check whether this machine is licensed
//! cargo run --example activate
//!
//! # Import a license file, then check again
//! cargo run --example activate -- customer.lic
//! ```
//!
//! # Note
//!
//! In production the public key location is fixed by the installer, not taken
//! from the command line or environment. Anyone who can point the application
//! at their own key can issue their own licenses.

use offlock::{LicenseGate, OfflockConfig, OfflockError, StartupVerdict};
use std::path::Path;
use tracing_subscriber::EnvFilter;

const APP_NAME: &str = "offlock-demo";
const PUBLIC_KEY_PATH: &str = "tests/fixtures/issuer_a.pub.pem";

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let gate = match LicenseGate::new(OfflockConfig::new(APP_NAME, PUBLIC_KEY_PATH)) {
        Ok(g) => g,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    println!("Machine id: {}", gate.machine_id());

    if let Some(lic) = std::env::args().nth(1) {
        match gate.activate_file(Path::new(&lic)) {
            Ok(record) => {
                println!("✓ Activated {}", record.key);
                if let Some(exp) = record.expire_at {
                    println!("  Expires: {}", exp);
                }
            }
            Err(e) => {
                match &e {
                    OfflockError::BoundMismatch { .. } => {
                        eprintln!("This license belongs to another machine: {}", e);
                    }
                    OfflockError::Expired { .. } => eprintln!("{}", e),
                    OfflockError::PublicKeyUnavailable(_) => {
                        eprintln!("Installation is damaged (public key missing)");
                    }
                    _ if e.is_fault() => eprintln!("Could not read license: {}", e),
                    _ => eprintln!("{}", e),
                }
                std::process::exit(1);
            }
        }
    }

    match gate.startup_verdict() {
        StartupVerdict::Allowed => {
            println!("✓ Licensed");
            if let Some(status) = gate.status() {
                println!("  Key: {}", status.key);
                if let Some(days) = status.days_remaining {
                    println!("  Days remaining: {}", days);
                }
            }
        }
        StartupVerdict::Revoke => {
            println!("✗ License was bound to another machine and has been removed");
            std::process::exit(2);
        }
        StartupVerdict::Denied(reason) => {
            println!("✗ Not licensed ({:?})", reason);
            std::process::exit(2);
        }
    }
}
