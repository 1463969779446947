//! Scan categories and the user's choice among them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One category of scan. Declaration order is dispatch order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Section {
    Startup,
    SharedDlls,
    Fonts,
    AppInfo,
    AppPaths,
    Activex,
    Drivers,
    HelpFiles,
    Sounds,
    AppSettings,
    HistoryList,
}

impl Section {
    pub const ALL: [Self; 11] = [
        Self::Startup,
        Self::SharedDlls,
        Self::Fonts,
        Self::AppInfo,
        Self::AppPaths,
        Self::Activex,
        Self::Drivers,
        Self::HelpFiles,
        Self::Sounds,
        Self::AppSettings,
        Self::HistoryList,
    ];

    /// Identifier used on the command line and in serialized output.
    #[must_use]
    pub fn id(self) -> &'static str {
        match self {
            Self::Startup => "startup",
            Self::SharedDlls => "shared-dlls",
            Self::Fonts => "fonts",
            Self::AppInfo => "app-info",
            Self::AppPaths => "app-paths",
            Self::Activex => "activex",
            Self::Drivers => "drivers",
            Self::HelpFiles => "help-files",
            Self::Sounds => "sounds",
            Self::AppSettings => "app-settings",
            Self::HistoryList => "history-list",
        }
    }

    /// Name shown while the section is scanned.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Startup => "Startup entries",
            Self::SharedDlls => "Shared DLLs",
            Self::Fonts => "Windows Fonts",
            Self::AppInfo => "Application info",
            Self::AppPaths => "Program Locations",
            Self::Activex => "ActiveX/COM objects",
            Self::Drivers => "Drivers",
            Self::HelpFiles => "Help files",
            Self::Sounds => "Sound events",
            Self::AppSettings => "Software settings",
            Self::HistoryList => "History List",
        }
    }

    /// Line written to the session log when the section starts.
    #[must_use]
    pub fn log_description(self) -> &'static str {
        match self {
            Self::Startup => "Checking for invalid startup entries",
            Self::SharedDlls => "Checking for invalid DLL entries",
            Self::Fonts => "Checking for invalid font references",
            Self::AppInfo => "Checking for invalid application info",
            Self::AppPaths => "Checking for invalid application paths",
            Self::Activex => "Checking for invalid ActiveX/COM objects",
            Self::Drivers => "Checking for invalid driver entries",
            Self::HelpFiles => "Checking for invalid help files",
            Self::Sounds => "Checking for missing windows sounds",
            Self::AppSettings => "Checking for missing software settings",
            Self::HistoryList => "Checking for missing recent documents links",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Section {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|section| section.id().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                let known: Vec<&str> = Self::ALL.iter().map(|s| s.id()).collect();
                format!("unknown section '{s}' (expected one of: {})", known.join(", "))
            })
    }
}

/// The set of enabled sections, always iterated in dispatch order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionSelection {
    enabled: Vec<Section>,
}

impl SectionSelection {
    /// Every section enabled.
    #[must_use]
    pub fn all() -> Self {
        Self {
            enabled: Section::ALL.to_vec(),
        }
    }

    /// Nothing enabled.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    pub fn enable(&mut self, section: Section) {
        if !self.enabled.contains(&section) {
            self.enabled.push(section);
            self.enabled.sort();
        }
    }

    pub fn disable(&mut self, section: Section) {
        self.enabled.retain(|s| *s != section);
    }

    #[must_use]
    pub fn is_enabled(&self, section: Section) -> bool {
        self.enabled.contains(&section)
    }

    /// Enabled sections in dispatch order.
    pub fn iter(&self) -> impl Iterator<Item = Section> + '_ {
        self.enabled.iter().copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.enabled.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.enabled.is_empty()
    }
}

impl FromIterator<Section> for SectionSelection {
    fn from_iter<I: IntoIterator<Item = Section>>(iter: I) -> Self {
        let mut selection = Self::none();
        for section in iter {
            selection.enable(section);
        }
        selection
    }
}
