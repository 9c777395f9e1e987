// tests/options_parsing.rs

use proptest::prelude::*;
use quietshell::options::{DEFAULT_TIMEOUT_SECS, Payload, RunOptions};
use quietshell::types::ExecutionMode;

#[test]
fn typical_scheduled_task_command_line() {
    let options = RunOptions::parse(&[
        "-UseProcess",
        "-ExecutionPolicy",
        "Bypass",
        "-NoProfile",
        "-Timeout",
        "600",
        "-LogPath",
        "C:\\Logs\\job.log",
        "-File",
        "C:\\Scripts\\job.ps1",
        "first",
        "second",
    ]);

    assert_eq!(options.mode(), ExecutionMode::Process);
    assert_eq!(options.execution_policy.as_deref(), Some("Bypass"));
    assert!(options.no_profile);
    assert_eq!(options.timeout_secs, 600);
    assert_eq!(
        options.payload(),
        Some(Payload::Script {
            path: "C:\\Scripts\\job.ps1".into(),
            args: vec!["first".into(), "second".into()],
        })
    );
}

#[test]
fn unknown_flag_ends_file_arguments() {
    let options = RunOptions::parse(&["-f", "C:\\a.ps1", "x", "y", "-z"]);
    assert_eq!(options.script_arguments, vec!["x", "y"]);
}

#[test]
fn command_with_spaces_stays_one_value() {
    let options = RunOptions::parse(&["-Command", "Get-Process | Select -First 1"]);
    assert_eq!(
        options.payload(),
        Some(Payload::Command("Get-Process | Select -First 1".into()))
    );
    assert_eq!(options.mode(), ExecutionMode::Host);
}

fn flag() -> impl Strategy<Value = String> {
    prop_oneof![
        prop::sample::select(vec![
            "-useprocess",
            "/UseRunspace",
            "-NoProfile",
            "-MTA",
            "-LogOutputStream",
            "-Timeout",
            "-t",
            "-Command",
            "-ExecutionPolicy",
            "-bogus",
        ])
        .prop_map(str::to_string),
        "-?[a-zA-Z0-9.]{0,8}",
    ]
}

proptest! {
    #[test]
    fn parsing_never_panics_and_timeout_stays_positive(
        args in proptest::collection::vec(flag(), 0..12)
    ) {
        let options = RunOptions::parse(&args);
        prop_assert!(options.timeout_secs > 0);
    }

    #[test]
    fn positive_timeouts_are_taken_verbatim(secs in 1u32..1_000_000) {
        let options = RunOptions::parse(&["-timeout".to_string(), secs.to_string()]);
        prop_assert_eq!(options.timeout_secs, u64::from(secs));
    }

    #[test]
    fn non_positive_timeouts_keep_the_default(secs in -1_000_000i64..=0) {
        let options = RunOptions::parse(&["-t".to_string(), secs.to_string()]);
        prop_assert_eq!(options.timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn positional_script_takes_every_following_token(
        rest in proptest::collection::vec("[-/]?[a-z]{1,6}", 0..6)
    ) {
        let mut args = vec!["job.ps1".to_string()];
        args.extend(rest.iter().cloned());
        let options = RunOptions::parse(&args);
        prop_assert_eq!(options.script_path.as_deref(), Some("job.ps1"));
        prop_assert_eq!(options.script_arguments, rest);
    }
}
