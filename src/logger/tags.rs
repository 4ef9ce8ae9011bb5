/// Log tags identify the subsystem a message comes from
///
/// The debug key of a tag is what `--debug <module>` matches against.
use colored::{ColoredString, Colorize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LogTag {
    System,
    Config,
    Hub,
    Session,
    Webserver,
    Clock,
    Subscriber,
    Dedup,
    Storage,
    Other(String),
}

impl LogTag {
    /// Key matched by `--debug <module>` and `logging.debug_modules`
    pub fn to_debug_key(&self) -> String {
        match self {
            LogTag::System => "system".to_string(),
            LogTag::Config => "config".to_string(),
            LogTag::Hub => "hub".to_string(),
            LogTag::Session => "session".to_string(),
            LogTag::Webserver => "webserver".to_string(),
            LogTag::Clock => "clock".to_string(),
            LogTag::Subscriber => "subscriber".to_string(),
            LogTag::Dedup => "dedup".to_string(),
            LogTag::Storage => "storage".to_string(),
            LogTag::Other(name) => name.to_lowercase(),
        }
    }

    /// Uncolored label used in the file sink
    pub fn to_plain_string(&self) -> String {
        match self {
            LogTag::System => "SYSTEM".to_string(),
            LogTag::Config => "CONFIG".to_string(),
            LogTag::Hub => "HUB".to_string(),
            LogTag::Session => "SESSION".to_string(),
            LogTag::Webserver => "WEBSERVER".to_string(),
            LogTag::Clock => "CLOCK".to_string(),
            LogTag::Subscriber => "SUBSCRIBER".to_string(),
            LogTag::Dedup => "DEDUP".to_string(),
            LogTag::Storage => "STORAGE".to_string(),
            LogTag::Other(name) => name.to_uppercase(),
        }
    }

    /// Console label, padded to `width` and colored per subsystem
    pub fn colored(&self, width: usize) -> ColoredString {
        let label = format!("{:<width$}", self.to_plain_string(), width = width);
        match self {
            LogTag::System => label.bright_yellow().bold(),
            LogTag::Config => label.bright_white().bold(),
            LogTag::Hub => label.bright_cyan().bold(),
            LogTag::Session => label.bright_blue().bold(),
            LogTag::Webserver => label.bright_green().bold(),
            LogTag::Clock => label.bright_magenta().bold(),
            LogTag::Subscriber => label.bright_cyan().bold(),
            LogTag::Dedup => label.bright_purple().bold(),
            LogTag::Storage => label.bright_green().bold(),
            LogTag::Other(_) => label.white().bold(),
        }
    }
}

impl fmt::Display for LogTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_plain_string())
    }
}
