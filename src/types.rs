use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Declares a closed enum whose member names are written verbatim into log
/// lines, together with the name table used to parse them back.
macro_rules! named_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
        pub enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$( $name::$variant ),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $( $name::$variant => stringify!($variant) ),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( stringify!($variant) => Ok($name::$variant), )+
                    _ => Err(format!("unknown {} {:?}", stringify!($name), s)),
                }
            }
        }
    };
}

named_enum! {
    /// Severity of a record. Declaration order is the on-disk rank order.
    pub enum Severity {
        #[default]
        Information,
        Warning,
        Error,
        Critical,
        Debug,
    }
}

impl Severity {
    /// Numeric rank compared against the threshold cutoff.
    pub fn rank(self) -> u8 {
        match self {
            Severity::Information => 0,
            Severity::Warning => 1,
            Severity::Error => 2,
            Severity::Critical => 3,
            Severity::Debug => 4,
        }
    }
}

named_enum! {
    /// Subsystem that emitted a record.
    pub enum Source {
        #[default]
        Application,
        WindowsAPI,
        Process,
    }
}

named_enum! {
    /// Activity tag attached to a record. Opaque to the store; the names are
    /// part of the file format, misspellings included.
    pub enum Action {
        #[default]
        ApplicationStartup,
        ApplicationShutdown,
        SettingsLoad,
        SettingsSave,
        LogInitialization,
        LogRotation,
        LogClear,
        ProcessStart,
        ProcessTermination,
        ProcessSuspension,
        ProcessResume,
        ProcessPriorityChange,
        ProcessAffinityChange,
        ProcessListRefresh,
        ProcessInfoRetrieval,
        ProcessModulesEnumeration,
        ProcessHandlesEnumeration,
        ProcessTokenInfoRetrieval,
        ProcessMitigationPoliciesRetrieval,
        ProcessMemoryInfoRetrieval,
        ProcessDebugStart,
        ProcessDump,
        ThreadTermination,
        ThreadSuspension,
        ThreadResume,
        ThreadPriorityChange,
        ThreadListRefresh,
        ThreadInfoRetrieval,
        WindowListRefresh,
        WindowInfoRetrieval,
        WindowClose,
        WindowShow,
        WindowHide,
        WindowMinimize,
        WindowMaximize,
        WindowRestore,
        ServiceListRefresh,
        ServiceStart,
        ServiceStop,
        ServicePause,
        ServiceResume,
        ServiceInfoRetrieval,
        WatchdogInizialization,
        WatchdogRuleAdd,
        WatchdogRuleRemove,
        WatchdogRuleTriggered,
        WatchdogShutdown,
        PermittedProcessAdd,
        PermittedProcessRemove,
        DisallowedProcessDetected,
        EnergyUsageMonitoring,
        NetworkConnectionsRefresh,
        FileOpen,
        FileDelete,
        PrivilegeEnable,
        PrivilegeDisable,
        TokenDuplication,
        ComputerShutdown,
        ComputerRestart,
        ComputerLogoff,
        ComputerLock,
        ComputerHibernate,
        ComputerSleep,
    }
}

/// Verbosity setting deciding which severities reach the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SeverityThreshold {
    None,
    Low,
    Medium,
    #[default]
    High,
}

impl SeverityThreshold {
    /// Highest admitted severity rank, or `None` when nothing is recorded.
    pub fn cutoff(self) -> Option<u8> {
        match self {
            SeverityThreshold::None => None,
            SeverityThreshold::Low => Some(Severity::Information.rank()),
            SeverityThreshold::Medium => Some(Severity::Warning.rank()),
            SeverityThreshold::High => Some(Severity::Critical.rank()),
        }
    }

    /// Debug ranks above Critical, so no threshold ever admits it.
    pub fn admits(self, severity: Severity) -> bool {
        self.cutoff().is_some_and(|cutoff| severity.rank() <= cutoff)
    }
}

impl FromStr for SeverityThreshold {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(SeverityThreshold::None),
            "low" => Ok(SeverityThreshold::Low),
            "medium" => Ok(SeverityThreshold::Medium),
            "high" => Ok(SeverityThreshold::High),
            _ => Err(format!("unknown threshold {:?}", s)),
        }
    }
}
