// src/types.rs

use std::fmt;
use std::str::FromStr;

/// Which execution strategy runs the payload.
///
/// - `Host`: drive an engine session through the [`crate::exec::host`] API
///   (default, selected with `-userunspace`).
/// - `Process`: spawn the engine executable with its public command-line
///   contract (selected with `-useprocess`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionMode {
    #[default]
    Host,
    Process,
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionMode::Host => f.write_str("Embedded Runspace"),
            ExecutionMode::Process => f.write_str("External Process"),
        }
    }
}

/// Threading apartment an engine session runs under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Apartment {
    #[default]
    Sta,
    Mta,
}

impl Apartment {
    pub fn from_mta_flag(mta: bool) -> Self {
        if mta { Apartment::Mta } else { Apartment::Sta }
    }
}

/// Script-trust level understood by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionPolicy {
    Unrestricted,
    RemoteSigned,
    AllSigned,
    Restricted,
    Bypass,
    Undefined,
    #[default]
    Default,
}

impl ExecutionPolicy {
    /// Name as the engine spells it on its command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionPolicy::Unrestricted => "Unrestricted",
            ExecutionPolicy::RemoteSigned => "RemoteSigned",
            ExecutionPolicy::AllSigned => "AllSigned",
            ExecutionPolicy::Restricted => "Restricted",
            ExecutionPolicy::Bypass => "Bypass",
            ExecutionPolicy::Undefined => "Undefined",
            ExecutionPolicy::Default => "Default",
        }
    }
}

impl fmt::Display for ExecutionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExecutionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "unrestricted" => Ok(ExecutionPolicy::Unrestricted),
            "remotesigned" => Ok(ExecutionPolicy::RemoteSigned),
            "allsigned" => Ok(ExecutionPolicy::AllSigned),
            "restricted" => Ok(ExecutionPolicy::Restricted),
            "bypass" => Ok(ExecutionPolicy::Bypass),
            "undefined" => Ok(ExecutionPolicy::Undefined),
            "default" => Ok(ExecutionPolicy::Default),
            other => Err(format!("invalid execution policy: {other}")),
        }
    }
}
