//! Argument construction for the external tool
//!
//! [`build`] is a pure function from an [`Options`] snapshot to an [`ArgumentVector`].
//! It never fails and is cheap enough to run on every keystroke for a live preview.
//! [`build_for_job`] adds the checks that only matter when a job is really started.
//!
//! ## Submodules
//!
//! - [`selection`] - compresses selected positions into a range expression
//! - [`sections`] - translates download-section presets
//! - [`config_file`] - writes a reusable option file from a built vector

use crate::config::YTDLP_PROGRAM;
use crate::error::{Result, ValidationError};
use crate::options::{
    ARIA2C_ARGS, CookieOptions, DEFAULT_FILENAME_FORMAT, DEFAULT_PLACEHOLDER, GeneralOptions,
    Options, OutputOptions, SponsorCategory, SubtitleLanguages,
};
use crate::urls;
use std::fmt;
use std::path::PathBuf;

pub mod config_file;
pub mod sections;
pub mod selection;

pub use config_file::{render_config_file, save_config_file};
pub use sections::section_arg;
pub use selection::compress_ranges;

/// Ordered argument list for one invocation of the external tool
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ArgumentVector(Vec<String>);

impl ArgumentVector {
    /// Empty vector
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one argument
    pub fn push(&mut self, arg: impl Into<String>) {
        self.0.push(arg.into());
    }

    /// Append a flag followed by its value
    pub fn push_pair(&mut self, flag: &str, value: impl Into<String>) {
        self.0.push(flag.to_string());
        self.0.push(value.into());
    }

    fn flag_if(&mut self, enabled: bool, flag: &str) {
        if enabled {
            self.push(flag);
        }
    }

    /// Arguments as a slice
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Number of arguments
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when no arguments were produced
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether any argument equals `arg`
    pub fn contains(&self, arg: &str) -> bool {
        self.0.iter().any(|a| a == arg)
    }

    /// Iterate over the arguments
    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }

    /// Take the underlying vector
    pub fn into_inner(self) -> Vec<String> {
        self.0
    }
}

impl From<Vec<String>> for ArgumentVector {
    fn from(args: Vec<String>) -> Self {
        Self(args)
    }
}

impl<'a> IntoIterator for &'a ArgumentVector {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Human-readable command line, e.g. `yt-dlp --progress ... URL`
impl fmt::Display for ArgumentVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", YTDLP_PROGRAM)?;
        for arg in &self.0 {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Build the argument vector for a download
///
/// Flags appear in a fixed order: progress reporting first, then general toggles,
/// playlist items, subtitles, SponsorBlock, naming and output template, login,
/// extra-URL metadata parsing, cookies, sections, format, aria2c, audio, and the
/// destination URLs last.
pub fn build(options: &Options) -> ArgumentVector {
    let mut args = ArgumentVector::new();
    args.push("--progress");

    push_general(&mut args, &options.general);

    let url_list = options.url_list();
    if playlist_selection_applies(options, &url_list) {
        let items = compress_ranges(&positive(&options.playlist.selected));
        if !items.is_empty() {
            args.push_pair("--playlist-items", items);
        }
    }

    if options.subtitles.enabled {
        args.push("--write-subs");
        match &options.subtitles.languages {
            SubtitleLanguages::All => args.push_pair("--sub-langs", "all"),
            SubtitleLanguages::Specific(langs) if !langs.is_empty() => {
                args.push_pair("--sub-langs", langs.join(","))
            }
            SubtitleLanguages::Specific(_) => {}
        }
        args.flag_if(options.subtitles.embed, "--embed-subs");
    }

    if options.sponsorblock.enabled {
        args.push_pair("--sponsorblock-mark", "all");
        let remove: Vec<&str> = SponsorCategory::ALL
            .iter()
            .filter(|c| options.sponsorblock.remove.contains(c))
            .map(SponsorCategory::as_arg)
            .collect();
        if !remove.is_empty() {
            args.push_pair("--sponsorblock-remove", remove.join(","));
        }
    }

    push_output(&mut args, &options.output);

    let auth = &options.auth;
    if auth.enabled && !auth.username.is_empty() {
        args.push_pair("--username", auth.username.clone());
    }
    if auth.enabled && !auth.password.is_empty() {
        args.push_pair("--password", auth.password.clone());
    }

    if options.additional_urls.enabled && !options.additional_urls.regex.is_empty() {
        args.push_pair("--parse-metadata", options.additional_urls.regex.clone());
    }

    push_cookies(&mut args, &options.cookies);

    if let Some(section) = section_arg(&options.sections) {
        args.push_pair("--download-sections", section);
    }

    let format_code = options.format.code.trim();
    if !format_code.is_empty() {
        args.push_pair("-f", format_code);
    }

    if options.aria2.enabled
        && let Some(aria2_args) = ARIA2C_ARGS.get(options.aria2.preset)
    {
        args.push_pair("--external-downloader", "aria2c");
        args.push_pair("--external-downloader-args", *aria2_args);
    }

    if options.audio.enabled {
        args.push("-x");
        args.push_pair("--audio-format", options.audio.format.as_arg());
    }

    for url in url_list {
        args.push(url);
    }

    args
}

/// Build the argument vector for a job that is about to be spawned
///
/// Fails when there is nothing to download, or when playlist selection mode is
/// active for a playlist URL but no positions are selected.
pub fn build_for_job(options: &Options) -> Result<ArgumentVector> {
    let url_list = options.url_list();
    if url_list.is_empty() {
        return Err(ValidationError::EmptyUrls.into());
    }
    if playlist_selection_applies(options, &url_list)
        && positive(&options.playlist.selected).is_empty()
    {
        return Err(ValidationError::EmptySelection.into());
    }
    Ok(build(options))
}

/// Playlist selection mode is on and the first URL is playlist-shaped
pub fn playlist_selection_applies(options: &Options, url_list: &[String]) -> bool {
    options.playlist.use_selected
        && url_list
            .first()
            .is_some_and(|url| urls::is_playlist_url(url))
}

/// Output template: base dir, optional subdir, optional dir template, filename and extension
///
/// With every optional part left at its default this ends in
/// `yt-dlp output/%(title)s.%(ext)s`.
pub fn output_template(output: &OutputOptions) -> String {
    let filename = match output.filename_format.trim() {
        "" => DEFAULT_FILENAME_FORMAT,
        name => name,
    };
    let extension = output.merge_format.extension().unwrap_or("%(ext)s");

    let mut path = PathBuf::from(output.output_dir.trim());
    if let Some(subdir) = output.effective_subdir() {
        path.push(subdir);
    }
    if let Some(dir_format) = effective_dir_format(output) {
        path.push(dir_format);
    }
    path.push(format!("{}.{}", filename, extension));

    path.to_string_lossy().into_owned()
}

fn effective_dir_format(output: &OutputOptions) -> Option<&str> {
    match output.output_dir_format.trim() {
        "" | DEFAULT_PLACEHOLDER => None,
        format => Some(format),
    }
}

fn push_general(args: &mut ArgumentVector, general: &GeneralOptions) {
    args.flag_if(general.ignore_config, "--ignore-config");
    args.flag_if(general.ignore_errors, "--ignore-errors");
    args.flag_if(general.force_generic_extractor, "--force-generic-extractor");
    args.flag_if(general.legacy_server_connect, "--legacy-server-connect");
    args.flag_if(general.no_check_certificate, "--no-check-certificate");
    args.flag_if(general.embed_thumbnail, "--embed-thumbnail");
    args.flag_if(general.add_metadata, "--add-metadata");
    args.flag_if(general.embed_info_json, "--embed-info-json");
    args.flag_if(general.embed_chapters, "--embed-chapters");

    if let Some(secs) = general.sleep_interval.active() {
        args.push_pair("--sleep-interval", secs.to_string());
    }
    if let Some(secs) = general.wait_for_video.active() {
        args.push_pair("--wait-for-video", secs.to_string());
    }
    if let Some(target) = general.impersonate.as_deref().map(str::trim)
        && !target.is_empty()
    {
        args.push_pair("--impersonate", target);
    }
}

fn push_output(args: &mut ArgumentVector, output: &OutputOptions) {
    if output.autonumber {
        args.push_pair("--autonumber-start", "1");
    }
    args.flag_if(output.restrict_filenames, "--restrict-filenames");
    if output.replace_spaces {
        args.push_pair("--replace-in-metadata", "title,uploader,channel");
        args.push(r"\s");
        args.push("_");
    }
    if output.allow_unsafe_ext {
        args.push_pair("--compat-options", "allow-unsafe-ext");
    }
    args.flag_if(output.force_overwrites, "--force-overwrites");

    if let Some(ext) = output.merge_format.extension() {
        args.push_pair("--merge-output-format", ext);
    }
    args.push_pair("--output", output_template(output));

    if let Some(len) = output.trim_filenames.active() {
        args.push_pair("--trim-filenames", len.to_string());
    }
}

// A cookies file wins over browser extraction if both are somehow set.
fn push_cookies(args: &mut ArgumentVector, cookies: &CookieOptions) {
    if cookies.use_file && !cookies.file.is_empty() {
        args.push_pair("--cookies", cookies.file.clone());
    } else if cookies.from_browser {
        let profile = cookies.profile.trim();
        let source = if profile.is_empty() {
            cookies.browser.as_arg().to_string()
        } else {
            format!("{}:{}", cookies.browser.as_arg(), profile)
        };
        args.push_pair("--cookies-from-browser", source);
    }
}

fn positive(selected: &[u32]) -> Vec<u32> {
    selected.iter().copied().filter(|&n| n > 0).collect()
}
