// src/exec/cmdline.rs

use crate::options::{Payload, RunOptions};

/// Engine command-line arguments for the process strategy.
///
/// `-ExecutionPolicy` and `-MTA` are mutually exclusive here: the policy wins
/// when both are requested.
pub fn build_arguments(options: &RunOptions, payload: &Payload) -> Vec<String> {
    let mut args = vec!["-NoLogo".to_string(), "-NonInteractive".to_string()];

    if options.no_profile {
        args.push("-NoProfile".to_string());
    }

    match options.execution_policy.as_deref().filter(|p| !p.is_empty()) {
        Some(policy) => {
            args.push("-ExecutionPolicy".to_string());
            args.push(policy.to_string());
        }
        None if options.mta => args.push("-MTA".to_string()),
        None => {}
    }

    match payload {
        Payload::Script { path, args: script_args } => {
            args.push("-File".to_string());
            args.push(path.clone());
            args.extend(script_args.iter().cloned());
        }
        Payload::Command(command) => {
            args.push("-Command".to_string());
            args.push(command.clone());
        }
        Payload::Encoded(encoded) => {
            args.push("-EncodedCommand".to_string());
            args.push(encoded.clone());
        }
    }

    args
}

/// Join arguments into one command line, quoting those that contain a space.
pub fn join_quoted<S: AsRef<str>>(args: &[S]) -> String {
    args.iter()
        .map(|a| {
            let a = a.as_ref();
            if a.contains(' ') {
                format!("\"{a}\"")
            } else {
                a.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn script(path: &str, args: &[&str]) -> Payload {
        Payload::Script {
            path: path.to_string(),
            args: args.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn minimal_arguments_for_command() {
        let options = RunOptions::default();
        let args = build_arguments(&options, &Payload::Command("Get-Date".into()));
        assert_eq!(args, vec!["-NoLogo", "-NonInteractive", "-Command", "Get-Date"]);
    }

    #[test]
    fn execution_policy_takes_precedence_over_mta() {
        let options = RunOptions {
            no_profile: true,
            execution_policy: Some("Bypass".into()),
            mta: true,
            ..RunOptions::default()
        };
        let args = build_arguments(&options, &script("a.ps1", &["x"]));
        assert_eq!(
            args,
            vec![
                "-NoLogo",
                "-NonInteractive",
                "-NoProfile",
                "-ExecutionPolicy",
                "Bypass",
                "-File",
                "a.ps1",
                "x"
            ]
        );
        assert!(!args.contains(&"-MTA".to_string()));
    }

    #[test]
    fn mta_is_added_without_execution_policy() {
        let options = RunOptions {
            mta: true,
            ..RunOptions::default()
        };
        let args = build_arguments(&options, &Payload::Encoded("ZQA=".into()));
        assert_eq!(
            args,
            vec!["-NoLogo", "-NonInteractive", "-MTA", "-EncodedCommand", "ZQA="]
        );
    }

    #[test]
    fn join_quotes_only_arguments_with_spaces() {
        let joined = join_quoted(&["-File", "C:\\My Scripts\\run.ps1", "plain", "two words"]);
        assert_eq!(
            joined,
            "-File \"C:\\My Scripts\\run.ps1\" plain \"two words\""
        );
    }
}
