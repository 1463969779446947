//! The built-in validators, one per [`Section`].

pub mod activex;
pub mod app_info;
pub mod app_paths;
pub mod app_settings;
pub mod drivers;
pub mod fonts;
pub mod help_files;
pub mod history_list;
pub mod paths;
pub mod shared_dlls;
pub mod sounds;
pub mod startup;

pub use activex::ActiveX;
pub use app_info::AppInfo;
pub use app_paths::AppPaths;
pub use app_settings::AppSettings;
pub use drivers::Drivers;
pub use fonts::Fonts;
pub use help_files::HelpFiles;
pub use history_list::HistoryList;
pub use shared_dlls::SharedDlls;
pub use sounds::Sounds;
pub use startup::Startup;

use crate::section::{Section, SectionSelection};
use crate::validator::Validator;

/// The validator that scans `section`.
#[must_use]
pub fn for_section(section: Section) -> Box<dyn Validator> {
    match section {
        Section::Startup => Box::new(Startup),
        Section::SharedDlls => Box::new(SharedDlls),
        Section::Fonts => Box::new(Fonts),
        Section::AppInfo => Box::new(AppInfo),
        Section::AppPaths => Box::new(AppPaths),
        Section::Activex => Box::new(ActiveX),
        Section::Drivers => Box::new(Drivers),
        Section::HelpFiles => Box::new(HelpFiles),
        Section::Sounds => Box::new(Sounds),
        Section::AppSettings => Box::new(AppSettings),
        Section::HistoryList => Box::new(HistoryList),
    }
}

/// Validators for the enabled sections, in dispatch order.
#[must_use]
pub fn for_sections(selection: &SectionSelection) -> Vec<Box<dyn Validator>> {
    selection.iter().map(for_section).collect()
}


#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_every_section_has_a_matching_validator() {
        for section in Section::ALL {
            let validator = for_section(section);
            assert_eq!(validator.label(), section.label());
            assert_eq!(validator.log_description(), section.log_description());
        }
    }

    #[test]
    fn test_for_sections_follows_dispatch_order() {
        let selection: SectionSelection = [Section::HistoryList, Section::Startup].into_iter().collect();
        let labels: Vec<String> = for_sections(&selection)
            .iter()
            .map(|v| v.label().to_owned())
            .collect();
        assert_eq!(labels, vec!["Startup entries", "History List"]);
    }
}
