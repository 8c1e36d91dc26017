//! Library integration tests.

use node_doctor::DoctorError;

#[test]
fn error_types_are_public() {
    let err = DoctorError::DuplicateDetector {
        name: "nvm".into(),
    };
    assert!(err.to_string().contains("nvm"));
}

#[test]
fn result_type_alias_is_public() {
    fn test_fn() -> node_doctor::Result<()> {
        Ok(())
    }
    assert!(test_fn().is_ok());
}

#[test]
fn cli_types_are_public() {
    use clap::Parser;
    use node_doctor::cli::{Cli, Commands};

    let cli = Cli::parse_from(["node-doctor", "list", "--all"]);
    if let Some(Commands::List(args)) = cli.command {
        assert!(args.all);
    } else {
        panic!("Expected List command");
    }
}

#[test]
fn builtin_registry_is_valid() {
    use node_doctor::detectors::DetectorRegistry;

    let registry = DetectorRegistry::with_builtins().unwrap();
    assert!(registry.get("nvm").is_some());
    assert!(registry.get("fnm").is_some());
    assert!(registry.get("volta").is_some());
}

#[test]
fn scan_of_empty_home_finds_no_managers() {
    use node_doctor::detectors::managed::MANAGER_DEFS;
    use node_doctor::detectors::DetectorRegistry;
    use node_doctor::platform::{HostEnv, Platform};

    let temp = tempfile::TempDir::new().unwrap();
    let registry = DetectorRegistry::with_builtins().unwrap();
    let env = HostEnv::new(Platform::current(), temp.path(), temp.path());
    let results = registry.scan_all(&env);

    for def in MANAGER_DEFS {
        if def.platforms.contains(&env.platform) && def.absolute_paths.is_empty() {
            assert!(results.get(def.name).is_none(), "{} detected", def.name);
        }
    }
}
