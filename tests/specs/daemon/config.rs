//! Configuration resolution specs
//!
//! Exercises `buildlet_daemon::config::resolve` from outside the crate,
//! the same way `main.rs` calls it after parsing flags.

use buildlet_daemon::config::{resolve, ResolveError};
use buildlet_daemon::flags::Flags;

fn bare_flags() -> Flags {
    Flags {
        listen: None,
        reverse: false,
        coordinator: None,
        proxy: None,
        tls_cert: None,
        tls_key: None,
        password: None,
        host_type: None,
        workdir: None,
        config_file: None,
    }
}

#[test]
fn a_lone_tls_cert_flag_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let cert_path = dir.path().join("cert.pem");
    std::fs::write(&cert_path, "cert").unwrap();

    let flags = Flags {
        tls_cert: Some(cert_path),
        ..bare_flags()
    };
    let err = resolve(flags).unwrap_err();
    assert!(matches!(err, ResolveError::IncompleteTlsMaterial));
}

#[test]
fn matched_tls_cert_and_key_resolve() {
    let dir = tempfile::tempdir().unwrap();
    let cert_path = dir.path().join("cert.pem");
    let key_path = dir.path().join("key.pem");
    std::fs::write(&cert_path, "cert").unwrap();
    std::fs::write(&key_path, "key").unwrap();

    let flags = Flags {
        tls_cert: Some(cert_path),
        tls_key: Some(key_path),
        ..bare_flags()
    };
    let config = resolve(flags).unwrap();
    assert!(config.tls_cert.is_some());
    assert!(config.tls_key.is_some());
}

#[test]
fn reverse_mode_without_a_coordinator_is_rejected() {
    let flags = Flags {
        reverse: true,
        ..bare_flags()
    };
    let err = resolve(flags).unwrap_err();
    assert!(matches!(err, ResolveError::MissingCoordinator));
}
