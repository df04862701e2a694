//! Download-section preset translation

use crate::options::DownloadSections;

/// Value for `--download-sections`, or `None` when nothing should be emitted
///
/// Custom presets with blank text emit nothing; a custom time range is prefixed
/// with `*` so the tool reads it as a time range rather than a chapter regex.
pub fn section_arg(sections: &DownloadSections) -> Option<String> {
    let arg = match sections {
        DownloadSections::Disabled | DownloadSections::EntireVideo => return None,
        DownloadSections::IntroChapter => "intro".to_string(),
        DownloadSections::FirstFiveMinutes => "*0:00-5:00".to_string(),
        DownloadSections::LastFiveMinutes => "*-5:00-inf".to_string(),
        DownloadSections::CustomChapter(pattern) => pattern.trim().to_string(),
        DownloadSections::CustomTimeRange(range) => {
            let range = range.trim();
            if range.is_empty() {
                return None;
            }
            format!("*{}", range)
        }
    };
    (!arg.is_empty()).then_some(arg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_presets() {
        assert_eq!(section_arg(&DownloadSections::Disabled), None);
        assert_eq!(section_arg(&DownloadSections::EntireVideo), None);
        assert_eq!(
            section_arg(&DownloadSections::IntroChapter).as_deref(),
            Some("intro")
        );
        assert_eq!(
            section_arg(&DownloadSections::FirstFiveMinutes).as_deref(),
            Some("*0:00-5:00")
        );
        assert_eq!(
            section_arg(&DownloadSections::LastFiveMinutes).as_deref(),
            Some("*-5:00-inf")
        );
    }

    #[test]
    fn custom_presets() {
        assert_eq!(
            section_arg(&DownloadSections::CustomChapter(" ^Part \\d+ ".into())).as_deref(),
            Some("^Part \\d+")
        );
        assert_eq!(
            section_arg(&DownloadSections::CustomTimeRange("1:00-2:30".into())).as_deref(),
            Some("*1:00-2:30")
        );
        assert_eq!(
            section_arg(&DownloadSections::CustomTimeRange("  ".into())),
            None
        );
        assert_eq!(section_arg(&DownloadSections::CustomChapter(String::new())), None);
    }
}
