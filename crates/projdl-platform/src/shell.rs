//! Host shell used to run hook scripts.

/// Shells a script string can be handed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shell {
    Sh,
    Cmd,
}

impl Shell {
    /// The shell the host OS runs scripts with: `cmd` on Windows, `sh` elsewhere.
    pub fn host() -> Self {
        if cfg!(target_os = "windows") { Shell::Cmd } else { Shell::Sh }
    }

    pub fn executable(self) -> &'static str {
        match self {
            Shell::Sh => "sh",
            Shell::Cmd => "cmd",
        }
    }

    /// Flag that makes the shell execute the next argument as a script.
    pub fn script_flag(self) -> &'static str {
        match self {
            Shell::Sh => "-c",
            Shell::Cmd => "/C",
        }
    }
}
