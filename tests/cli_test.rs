use django_setting::cli::{Args, Command};
use clap::Parser;
use std::ffi::OsString;
use std::path::PathBuf;

fn make_args(args: &[&str]) -> Vec<OsString> {
    let mut res = vec![OsString::from("django-setting")];
    res.extend(args.iter().map(OsString::from));
    res
}

#[test]
fn test_startproject_args() {
    let parsed = Args::try_parse_from(make_args(&["startproject", "demo"])).unwrap();

    assert!(!parsed.verbose);
    assert!(parsed.directory.is_none());
    assert_eq!(parsed.command.project_name(), "demo");
    match parsed.command {
        Command::Startproject(args) => {
            assert!(!args.force);
            assert!(args.python.is_none());
        }
        other => panic!("Expected startproject, got {:?}", other),
    }
}

#[test]
fn test_startproject_flags() {
    let args = make_args(&["-v", "startproject", "-f", "--python", "3.11.6", "demo"]);
    let parsed = Args::try_parse_from(args).unwrap();

    assert!(parsed.verbose);
    match parsed.command {
        Command::Startproject(args) => {
            assert!(args.force);
            assert_eq!(args.python.as_deref(), Some("3.11.6"));
        }
        other => panic!("Expected startproject, got {:?}", other),
    }
}

#[test]
fn test_docker_args() {
    let parsed = Args::try_parse_from(make_args(&["docker", "demo"])).unwrap();
    match parsed.command {
        Command::Docker(args) => {
            assert!(!args.keep_going);
            assert!(!args.no_build);
            assert_eq!(args.docker_bin, "docker");
        }
        other => panic!("Expected docker, got {:?}", other),
    }

    let args =
        make_args(&["docker", "--keep-going", "--no-build", "--docker-bin", "podman", "demo"]);
    match Args::try_parse_from(args).unwrap().command {
        Command::Docker(args) => {
            assert!(args.keep_going);
            assert!(args.no_build);
            assert_eq!(args.docker_bin, "podman");
        }
        other => panic!("Expected docker, got {:?}", other),
    }
}

#[test]
fn test_settings_args() {
    let args = make_args(&["settings", "--deploy", "--encrypt", "--reset-config", "demo"]);
    match Args::try_parse_from(args).unwrap().command {
        Command::Settings(args) => {
            assert!(args.deploy);
            assert!(args.encrypt);
            assert!(args.reset_config);
        }
        other => panic!("Expected settings, got {:?}", other),
    }
}

#[test]
fn test_global_flags_after_subcommand() {
    let args = make_args(&["removeproject", "demo", "-y", "-C", "/tmp/work", "--verbose"]);
    let parsed = Args::try_parse_from(args).unwrap();

    assert!(parsed.verbose);
    assert_eq!(parsed.directory, Some(PathBuf::from("/tmp/work")));
    match parsed.command {
        Command::Removeproject(args) => assert!(args.yes),
        other => panic!("Expected removeproject, got {:?}", other),
    }
}

#[test]
fn test_missing_args() {
    assert!(Args::try_parse_from(make_args(&[])).is_err());
    assert!(Args::try_parse_from(make_args(&["docker"])).is_err());
    assert!(Args::try_parse_from(make_args(&["unknown", "demo"])).is_err());
}
