//! Download options snapshot
//!
//! [`Options`] is everything the user can set for a job. It is owned by the
//! embedding UI, read by [`crate::command::build`] and never mutated by the core.
//! Defaults mirror what a fresh front-end shows on first launch.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Subdirectory name used when the subdirectory option is on but left blank
pub const DEFAULT_SUBDIR_NAME: &str = "yt-dlp output";

/// Filename template used when the filename field is left blank
pub const DEFAULT_FILENAME_FORMAT: &str = "%(title)s";

/// Placeholder meaning "no output-directory sub-template" / "tool-native extension"
pub const DEFAULT_PLACEHOLDER: &str = "Default";

/// Browser-impersonation targets offered by the front-end
pub const IMPERSONATE_TARGETS: [&str; 6] = [
    "chrome",
    "chrome-116:windows-10",
    "chrome-133:macos-15",
    "firefox",
    "safari",
    "edge",
];

/// Subtitle languages offered for specific-language selection
pub const SUBTITLE_LANGUAGES: [&str; 17] = [
    "en", "es", "fr", "de", "nl", "it", "pt", "el", "ru", "fi", "uk", "sv", "ar", "tr", "ja",
    "ko", "zh",
];

/// Filename template presets
pub const FILENAME_FORMATS: [&str; 17] = [
    "%(uploader)s - %(title)s",
    "%(uploader)s %(title)s - %(upload_date)s",
    "%(title)s",
    "%(title)s - %(uploader)s",
    "%(upload_date)s - %(title)s",
    "%(title)s [%(id)s]",
    "%(channel)s - %(title)s",
    "%(channel)s",
    "%(playlist)s",
    "%(playlist)s - %(playlist_index)s",
    "%(playlist_index)s",
    "%(view_count)s",
    "%(like_count)s",
    "%(extractor)s",
    "%(title)s - %(duration)s",
    "%(uploader)s - %(id)s",
    "%(title)s - %(resolution)s",
];

/// Output-directory sub-template presets ("Default" means none)
pub const OUTPUT_DIR_FORMATS: [&str; 9] = [
    DEFAULT_PLACEHOLDER,
    "%(channel)s",
    "%(uploader)s",
    "%(playlist)s",
    "%(extractor)s",
    "%(upload_date)s",
    "%(channel)s/%(playlist)s",
    "%(uploader)s/%(upload_date)s",
    "%(extractor)s/%(channel)s",
];

/// Quick format presets, copied into [`FormatOptions::code`] when picked
pub const QUICK_FORMATS: [&str; 14] = [
    "bestvideo[height=720]+bestaudio",
    "bestvideo[height=1080]+bestaudio",
    "bestvideo[height=1440]+bestaudio",
    "bestvideo[height=2160]+bestaudio",
    "bestvideo[height<=720]+bestaudio/best",
    "bestvideo[height<=1080]+bestaudio/best",
    "bestvideo[height<=1440]+bestaudio/best",
    "bestvideo[height<=2160]+bestaudio/best",
    "bestvideo[height>=720]+bestaudio/best",
    "bestvideo[height>=1080]+bestaudio/best",
    "bestvideo[height>=1440]+bestaudio/best",
    "bestvideo[height>=2160]+bestaudio/best",
    "bestvideo",
    "bestaudio",
];

/// Quick format preset selected on first launch
pub const DEFAULT_QUICK_FORMAT: usize = 4;

/// aria2c argument strings, indexed by parallelism preset
pub const ARIA2C_ARGS: [&str; 4] = [
    "-x 2 -s 2 -k 1M",
    "-x 4 -s 4 -k 2M",
    "-x 8 -s 8 -k 4M",
    "-x 16 -s 16 -k 8M",
];

/// `--parse-metadata` patterns that pull video URLs out of a description
pub const VIDEO_URL_PATTERNS: [&str; 4] = [
    r"description:(?P<additional_urls>https?://(?:www\.youtube\.com/watch\?v=|youtu\.be/)[a-zA-Z0-9_.-]{11})",
    r"description:(?P<additional_urls>https?://www\.youtube\.com/watch\?v=[a-zA-Z0-9_.-]{11})",
    r"description:(?P<additional_urls>https?://youtu\.be/[a-zA-Z0-9_.-]{11})",
    r"description:(?P<additional_urls>https?://(?:www\.youtube\.com/watch\?v=|youtu\.be/)[a-zA-Z0-9_.-]{11}(?:&[a-zA-Z0-9_=&-]*)*)",
];

/// `--parse-metadata` pattern for playlist URLs in a description
pub const PLAYLIST_URL_PATTERN: &str =
    r"description:(?P<additional_urls>https?://www\.youtube\.com/playlist\?list=[a-zA-Z0-9_.-]+)";

/// `--parse-metadata` pattern for channel URLs in a description
pub const CHANNEL_URL_PATTERN: &str = r"description:(?P<additional_urls>https?://www\.youtube\.com/(?:channel/[a-zA-Z0-9_.-]+|@[a-zA-Z0-9_.-]+))";

/// `--parse-metadata` pattern for mobile watch URLs in a description
pub const MOBILE_URL_PATTERN: &str = r"description:(?P<additional_urls>https?://(?:www\.youtube\.com|m\.youtube\.com)/watch\?v=[a-zA-Z0-9_.-]{11})";

/// A numeric option that only takes effect when enabled
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundedSetting {
    /// Whether the flag is emitted at all
    pub enabled: bool,
    /// Current value (ignored while disabled)
    pub value: u32,
}

impl BoundedSetting {
    const fn off(value: u32) -> Self {
        Self {
            enabled: false,
            value,
        }
    }

    /// The value, if the setting is enabled
    pub fn active(&self) -> Option<u32> {
        self.enabled.then_some(self.value)
    }
}

/// Browser to extract cookies from
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Browser {
    /// Brave
    #[default]
    Brave,
    /// Google Chrome
    Chrome,
    /// Mozilla Firefox
    Firefox,
}

impl Browser {
    /// Identifier understood by `--cookies-from-browser`
    pub fn as_arg(&self) -> &'static str {
        match self {
            Browser::Brave => "brave",
            Browser::Chrome => "chrome",
            Browser::Firefox => "firefox",
        }
    }
}

/// Target audio format for audio-only downloads
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioFormat {
    /// MP3
    #[default]
    Mp3,
    /// AAC
    Aac,
    /// M4A
    M4a,
    /// Opus
    Opus,
    /// Vorbis
    Vorbis,
}

impl AudioFormat {
    /// Value for `--audio-format`
    pub fn as_arg(&self) -> &'static str {
        match self {
            AudioFormat::Mp3 => "mp3",
            AudioFormat::Aac => "aac",
            AudioFormat::M4a => "m4a",
            AudioFormat::Opus => "opus",
            AudioFormat::Vorbis => "vorbis",
        }
    }
}

/// Container to merge into
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeFormat {
    /// Keep whatever the tool picks (`%(ext)s`)
    #[default]
    Default,
    /// Matroska
    Mkv,
    /// MP4
    Mp4,
    /// WebM
    Webm,
}

impl MergeFormat {
    /// Explicit extension, `None` for the tool-native placeholder
    pub fn extension(&self) -> Option<&'static str> {
        match self {
            MergeFormat::Default => None,
            MergeFormat::Mkv => Some("mkv"),
            MergeFormat::Mp4 => Some("mp4"),
            MergeFormat::Webm => Some("webm"),
        }
    }
}

/// SponsorBlock segment category
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SponsorCategory {
    /// Paid promotion
    Sponsor,
    /// Unpaid self promotion
    SelfPromo,
    /// Reminders to like/subscribe
    Interaction,
    /// Tangents and filler
    Filler,
    /// Endcards and credits
    Outro,
    /// Intermission and intro animation
    Intro,
    /// Previews and recaps
    Preview,
    /// Non-music section of a music video
    MusicOfftopic,
}

impl SponsorCategory {
    /// Every category, in the order they are emitted
    pub const ALL: [SponsorCategory; 8] = [
        SponsorCategory::Sponsor,
        SponsorCategory::SelfPromo,
        SponsorCategory::Interaction,
        SponsorCategory::Filler,
        SponsorCategory::Outro,
        SponsorCategory::Intro,
        SponsorCategory::Preview,
        SponsorCategory::MusicOfftopic,
    ];

    /// Name understood by `--sponsorblock-remove`
    pub fn as_arg(&self) -> &'static str {
        match self {
            SponsorCategory::Sponsor => "sponsor",
            SponsorCategory::SelfPromo => "selfpromo",
            SponsorCategory::Interaction => "interaction",
            SponsorCategory::Filler => "filler",
            SponsorCategory::Outro => "outro",
            SponsorCategory::Intro => "intro",
            SponsorCategory::Preview => "preview",
            SponsorCategory::MusicOfftopic => "music_offtopic",
        }
    }
}

/// Which subtitles to fetch
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "languages", rename_all = "snake_case")]
pub enum SubtitleLanguages {
    /// Every available language
    #[default]
    All,
    /// Only the listed language codes
    Specific(Vec<String>),
}

/// Part of each video to download
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "preset", content = "value", rename_all = "snake_case")]
pub enum DownloadSections {
    /// Option switched off
    #[default]
    Disabled,
    /// Whole video (same as off)
    EntireVideo,
    /// Only the chapter named "intro"
    IntroChapter,
    /// `*0:00-5:00`
    FirstFiveMinutes,
    /// `*-5:00-inf`
    LastFiveMinutes,
    /// Chapters whose title matches a user regex
    CustomChapter(String),
    /// A user time range, e.g. `1:00-2:30`
    CustomTimeRange(String),
}

/// Section of a channel to list and download from
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelContent {
    /// Uploaded videos
    #[default]
    Videos,
    /// Shorts
    Shorts,
    /// Past live streams
    LiveStreams,
}

impl ChannelContent {
    /// Path appended to the channel root
    pub fn endpoint(&self) -> &'static str {
        match self {
            ChannelContent::Videos => "/videos",
            ChannelContent::Shorts => "/shorts",
            ChannelContent::LiveStreams => "/streams",
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            ChannelContent::Videos => "Videos",
            ChannelContent::Shorts => "Shorts",
            ChannelContent::LiveStreams => "Live Streams",
        }
    }
}

/// Upper bound on how many channel entries are listed
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListLimit {
    /// No bound
    #[default]
    All,
    /// At most this many entries (`--playlist-end`)
    Limit(u32),
}

impl ListLimit {
    /// Limits offered by the front-end, largest first
    pub const PRESETS: [ListLimit; 10] = [
        ListLimit::All,
        ListLimit::Limit(1000),
        ListLimit::Limit(500),
        ListLimit::Limit(250),
        ListLimit::Limit(100),
        ListLimit::Limit(50),
        ListLimit::Limit(25),
        ListLimit::Limit(10),
        ListLimit::Limit(5),
        ListLimit::Limit(1),
    ];

    /// Value for `--playlist-end`, if bounded
    pub fn playlist_end(&self) -> Option<u32> {
        match self {
            ListLimit::All => None,
            ListLimit::Limit(n) => Some(*n),
        }
    }
}

impl fmt::Display for ListLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListLimit::All => write!(f, "All"),
            ListLimit::Limit(n) => write!(f, "{}", n),
        }
    }
}

impl FromStr for ListLimit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("all") {
            return Ok(ListLimit::All);
        }
        s.parse::<u32>()
            .map(ListLimit::Limit)
            .map_err(|_| format!("invalid list limit: {}", s))
    }
}

/// General behavior toggles
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralOptions {
    /// `--ignore-config`
    pub ignore_config: bool,
    /// `--ignore-errors`
    pub ignore_errors: bool,
    /// `--force-generic-extractor`
    pub force_generic_extractor: bool,
    /// `--legacy-server-connect`
    pub legacy_server_connect: bool,
    /// `--no-check-certificate`
    pub no_check_certificate: bool,
    /// `--embed-thumbnail`
    pub embed_thumbnail: bool,
    /// `--add-metadata`
    pub add_metadata: bool,
    /// `--embed-info-json`
    pub embed_info_json: bool,
    /// `--embed-chapters`
    pub embed_chapters: bool,
    /// `--sleep-interval` seconds (1-600)
    pub sleep_interval: BoundedSetting,
    /// `--wait-for-video` seconds (1-600)
    pub wait_for_video: BoundedSetting,
    /// `--impersonate` target, when set
    pub impersonate: Option<String>,
}

impl Default for GeneralOptions {
    fn default() -> Self {
        Self {
            ignore_config: true,
            ignore_errors: false,
            force_generic_extractor: false,
            legacy_server_connect: false,
            no_check_certificate: false,
            embed_thumbnail: true,
            add_metadata: true,
            embed_info_json: true,
            embed_chapters: true,
            sleep_interval: BoundedSetting::off(5),
            wait_for_video: BoundedSetting::off(30),
            impersonate: None,
        }
    }
}

/// Where files go and what they are called
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputOptions {
    /// Base output directory
    pub output_dir: String,
    /// Put everything under a fixed subdirectory
    pub use_subdir: bool,
    /// Name of that subdirectory (blank means [`DEFAULT_SUBDIR_NAME`])
    pub subdir_name: String,
    /// Output-directory sub-template ("Default" or blank means none)
    pub output_dir_format: String,
    /// Filename template (blank means [`DEFAULT_FILENAME_FORMAT`])
    pub filename_format: String,
    /// Container to merge into
    pub merge_format: MergeFormat,
    /// `--autonumber-start 1`
    pub autonumber: bool,
    /// `--restrict-filenames`
    pub restrict_filenames: bool,
    /// Replace whitespace with `_` in title/uploader/channel metadata
    pub replace_spaces: bool,
    /// `--compat-options allow-unsafe-ext`
    pub allow_unsafe_ext: bool,
    /// `--force-overwrites`
    pub force_overwrites: bool,
    /// `--trim-filenames` length (1-100)
    pub trim_filenames: BoundedSetting,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            output_dir: String::new(),
            use_subdir: true,
            subdir_name: DEFAULT_SUBDIR_NAME.to_string(),
            output_dir_format: DEFAULT_PLACEHOLDER.to_string(),
            filename_format: FILENAME_FORMATS[2].to_string(),
            merge_format: MergeFormat::Default,
            autonumber: false,
            restrict_filenames: false,
            replace_spaces: false,
            allow_unsafe_ext: false,
            force_overwrites: false,
            trim_filenames: BoundedSetting::off(50),
        }
    }
}

impl OutputOptions {
    /// Subdirectory name with the blank fallback applied, if the option is on
    pub fn effective_subdir(&self) -> Option<&str> {
        if !self.use_subdir {
            return None;
        }
        let name = self.subdir_name.trim();
        Some(if name.is_empty() {
            DEFAULT_SUBDIR_NAME
        } else {
            name
        })
    }
}

/// Subtitle download settings
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubtitleOptions {
    /// `--write-subs`
    pub enabled: bool,
    /// Languages to request
    pub languages: SubtitleLanguages,
    /// `--embed-subs`
    pub embed: bool,
}

/// SponsorBlock settings
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SponsorBlockOptions {
    /// Mark all segments as chapters
    pub enabled: bool,
    /// Categories to cut out
    pub remove: Vec<SponsorCategory>,
}

impl Default for SponsorBlockOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            remove: vec![SponsorCategory::Sponsor],
        }
    }
}

/// Site login
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthOptions {
    /// Send credentials at all
    pub enabled: bool,
    /// Account name
    pub username: String,
    /// Account password
    pub password: String,
}

impl fmt::Debug for AuthOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthOptions")
            .field("enabled", &self.enabled)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Cookie source
///
/// A cookies file and browser extraction are mutually exclusive in the UI; if both
/// are set, the cookies file wins.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CookieOptions {
    /// Read cookies from `file`
    pub use_file: bool,
    /// Netscape cookies file
    pub file: String,
    /// Extract cookies from `browser`
    pub from_browser: bool,
    /// Browser to read
    pub browser: Browser,
    /// Optional profile name or user-data path
    pub profile: String,
}

/// Extra URLs scraped from metadata with `--parse-metadata`
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdditionalUrlOptions {
    /// Emit `--parse-metadata`
    pub enabled: bool,
    /// The `FIELD:REGEX` pattern (blank emits nothing)
    pub regex: String,
}


/// Format selection
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatOptions {
    /// `-f` value (blank means let the tool decide)
    pub code: String,
    /// Index into [`QUICK_FORMATS`] last picked
    pub quick_preset: usize,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            code: String::new(),
            quick_preset: DEFAULT_QUICK_FORMAT,
        }
    }
}

impl FormatOptions {
    /// Copy a quick preset into the format code; out-of-range indices are ignored
    pub fn apply_quick_preset(&mut self, index: usize) -> bool {
        match QUICK_FORMATS.get(index) {
            Some(code) => {
                self.quick_preset = index;
                self.code = (*code).to_string();
                true
            }
            None => false,
        }
    }
}

/// aria2c external downloader
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Aria2Options {
    /// Hand downloads to aria2c
    pub enabled: bool,
    /// Index into [`ARIA2C_ARGS`]
    pub preset: usize,
}

/// Audio extraction
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioOptions {
    /// `-x`
    pub enabled: bool,
    /// `--audio-format`
    pub format: AudioFormat,
}

/// Restrict a playlist download to listed positions
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaylistSelection {
    /// Selection mode is active
    pub use_selected: bool,
    /// 1-based positions chosen from the playlist listing
    pub selected: Vec<u32>,
}

/// Channel browsing and selection
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelOptions {
    /// Which part of the channel to list
    pub content: ChannelContent,
    /// How many entries to list
    pub list_limit: ListLimit,
    /// List upload dates next to titles
    pub show_upload_dates: bool,
    /// Selection mode is active
    pub use_selected: bool,
    /// 1-based positions chosen from the channel listing
    pub selected: Vec<u32>,
}

/// Complete option snapshot for one build
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Whitespace-separated destination URLs
    pub urls: String,
    /// General toggles
    pub general: GeneralOptions,
    /// Output location and naming
    pub output: OutputOptions,
    /// Subtitles
    pub subtitles: SubtitleOptions,
    /// SponsorBlock
    pub sponsorblock: SponsorBlockOptions,
    /// Login
    pub auth: AuthOptions,
    /// Cookies
    pub cookies: CookieOptions,
    /// Extra URLs from metadata
    pub additional_urls: AdditionalUrlOptions,
    /// Download sections
    pub sections: DownloadSections,
    /// Format code
    pub format: FormatOptions,
    /// aria2c
    pub aria2: Aria2Options,
    /// Audio-only
    pub audio: AudioOptions,
    /// Playlist item selection
    pub playlist: PlaylistSelection,
    /// Channel listing and selection
    pub channel: ChannelOptions,
}

impl Options {
    /// Destination URLs as individual tokens
    pub fn url_list(&self) -> Vec<String> {
        crate::urls::split_urls(&self.urls)
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_first_launch_state() {
        let options = Options::default();
        assert!(options.general.ignore_config);
        assert!(options.general.embed_thumbnail);
        assert!(options.general.add_metadata);
        assert!(options.general.embed_info_json);
        assert!(options.general.embed_chapters);
        assert_eq!(options.general.sleep_interval.active(), None);
        assert_eq!(options.general.sleep_interval.value, 5);
        assert_eq!(options.general.wait_for_video.value, 30);
        assert_eq!(options.output.trim_filenames.value, 50);
        assert_eq!(options.output.effective_subdir(), Some(DEFAULT_SUBDIR_NAME));
        assert!(options.sponsorblock.enabled);
        assert_eq!(options.sponsorblock.remove, vec![SponsorCategory::Sponsor]);
        assert_eq!(options.subtitles.languages, SubtitleLanguages::All);
        assert_eq!(options.format.quick_preset, DEFAULT_QUICK_FORMAT);
        assert_eq!(
            QUICK_FORMATS[DEFAULT_QUICK_FORMAT],
            "bestvideo[height<=720]+bestaudio/best"
        );
    }

    #[test]
    fn blank_subdir_falls_back_to_default_name() {
        let output = OutputOptions {
            subdir_name: "   ".into(),
            ..Default::default()
        };
        assert_eq!(output.effective_subdir(), Some(DEFAULT_SUBDIR_NAME));

        let output = OutputOptions {
            use_subdir: false,
            ..Default::default()
        };
        assert_eq!(output.effective_subdir(), None);
    }

    #[test]
    fn list_limit_parses_bookmark_text() {
        assert_eq!("All".parse::<ListLimit>().unwrap(), ListLimit::All);
        assert_eq!("".parse::<ListLimit>().unwrap(), ListLimit::All);
        assert_eq!("250".parse::<ListLimit>().unwrap(), ListLimit::Limit(250));
        assert!("lots".parse::<ListLimit>().is_err());
        assert_eq!(ListLimit::Limit(25).to_string(), "25");
        assert_eq!(ListLimit::All.playlist_end(), None);
    }

    #[test]
    fn quick_preset_copies_code() {
        let mut format = FormatOptions::default();
        assert!(format.apply_quick_preset(11));
        assert_eq!(format.quick_preset, 11);
        assert_eq!(format.code, QUICK_FORMATS[11]);
        assert_eq!(format.code, "bestvideo[height>=2160]+bestaudio/best");

        // Out-of-range index leaves the previous preset in place
        assert!(!format.apply_quick_preset(QUICK_FORMATS.len()));
        assert_eq!(format.quick_preset, 11);
        assert_eq!(format.code, QUICK_FORMATS[11]);
    }

    #[test]
    fn auth_debug_redacts_password() {
        let auth = AuthOptions {
            enabled: true,
            username: "me".into(),
            password: "hunter2".into(),
        };
        let debug = format!("{:?}", auth);
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("me"));
    }

    #[test]
    fn partial_json_fills_in_defaults() {
        let options: Options = serde_json::from_str(
            r#"{"urls": "https://youtu.be/abc", "sections": {"preset": "custom_time_range", "value": "1:00-2:00"}}"#,
        )
        .expect("deserialize failed");
        assert_eq!(options.urls, "https://youtu.be/abc");
        assert_eq!(
            options.sections,
            DownloadSections::CustomTimeRange("1:00-2:00".into())
        );
        assert!(options.general.ignore_config);
    }
}
