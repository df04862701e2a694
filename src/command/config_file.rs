//! Option-file emission
//!
//! Turns a built command into a yt-dlp configuration file so the same options apply
//! when the tool is run by hand. Progress reporting, `--ignore-config` and the URLs
//! are left out; every other flag goes on its own line with its parameters.

use super::{ArgumentVector, build};
use crate::Result;
use crate::options::Options;
use std::path::{Path, PathBuf};

/// Flags that only make sense for this front-end's own invocation
const SESSION_ONLY_FLAGS: [&str; 2] = ["--progress", "--ignore-config"];

/// Group a built vector into config-file lines
///
/// A token starting with `-` opens a new line; following tokens that do not look
/// like flags are appended as parameters. Parameters the tool's config parser would
/// split or unescape are double-quoted. Tokens equal to one of `urls` are dropped.
pub fn config_lines(args: &ArgumentVector, urls: &[String]) -> Vec<String> {
    let tokens: Vec<&str> = args
        .iter()
        .map(String::as_str)
        .filter(|t| !SESSION_ONLY_FLAGS.contains(t))
        .filter(|t| !urls.iter().any(|u| u == t))
        .collect();

    let mut lines = Vec::new();
    let mut i = 0;
    while i < tokens.len() {
        if !looks_like_flag(tokens[i]) {
            i += 1;
            continue;
        }
        let mut line = tokens[i].to_string();
        i += 1;
        while i < tokens.len() && !looks_like_flag(tokens[i]) {
            line.push(' ');
            line.push_str(&quote(tokens[i]));
            i += 1;
        }
        lines.push(line);
    }
    lines
}

/// Render the config file for an options snapshot
pub fn render_config_file(options: &Options) -> String {
    let args = build(options);
    let mut out = String::new();
    for line in config_lines(&args, &options.url_list()) {
        out.push_str(&line);
        out.push('\n');
    }
    out
}

/// Write the config file for `options` to `path`, creating parent directories
pub async fn save_config_file(options: &Options, path: &Path) -> Result<PathBuf> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent).await?;
    }
    let contents = render_config_file(options);
    tokio::fs::write(path, contents).await?;
    tracing::info!(path = %path.display(), "Configuration saved");
    Ok(path.to_path_buf())
}

// Multi-word values such as aria2c's "-x 2 -s 2" start with a dash but are parameters.
fn looks_like_flag(token: &str) -> bool {
    token.starts_with('-') && !token.contains(char::is_whitespace)
}

fn quote(param: &str) -> String {
    let needs_quotes = param.is_empty()
        || param
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '"' | '\'' | '\\' | '#'));
    if !needs_quotes {
        return param.to_string();
    }
    let escaped = param.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{}\"", escaped)
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{Aria2Options, BoundedSetting};

    #[test]
    fn drops_session_flags_and_urls() {
        let args = ArgumentVector::from(
            [
                "--progress",
                "--ignore-config",
                "--embed-thumbnail",
                "--sleep-interval",
                "5",
                "https://youtu.be/a",
                "https://youtu.be/b",
            ]
            .map(String::from)
            .to_vec(),
        );
        let urls = vec!["https://youtu.be/a".to_string(), "https://youtu.be/b".to_string()];
        assert_eq!(
            config_lines(&args, &urls),
            vec!["--embed-thumbnail", "--sleep-interval 5"]
        );
    }

    #[test]
    fn multiword_parameters_are_quoted() {
        let args = ArgumentVector::from(
            [
                "--replace-in-metadata",
                "title,uploader,channel",
                r"\s",
                "_",
                "--external-downloader-args",
                "-x 2 -s 2 -k 1M",
                "--output",
                "/media/yt-dlp output/%(title)s.%(ext)s",
            ]
            .map(String::from)
            .to_vec(),
        );
        assert_eq!(
            config_lines(&args, &[]),
            vec![
                r#"--replace-in-metadata title,uploader,channel "\\s" _"#,
                r#"--external-downloader-args "-x 2 -s 2 -k 1M""#,
                r#"--output "/media/yt-dlp output/%(title)s.%(ext)s""#,
            ]
        );
    }

    #[test]
    fn rendered_file_has_one_flag_per_line() {
        let mut options = Options::default();
        options.urls = "https://youtu.be/x".into();
        options.output.output_dir = "/media".into();
        options.output.use_subdir = false;
        options.general.sleep_interval = BoundedSetting {
            enabled: true,
            value: 10,
        };
        options.aria2 = Aria2Options {
            enabled: true,
            preset: 0,
        };

        let rendered = render_config_file(&options);
        let lines: Vec<&str> = rendered.lines().collect();
        assert!(!rendered.contains("--progress"));
        assert!(!rendered.contains("--ignore-config"));
        assert!(!rendered.contains("youtu.be"));
        assert!(lines.contains(&"--sleep-interval 10"));
        assert!(lines.contains(&"--output /media/%(title)s.%(ext)s"));
        assert!(lines.contains(&"--external-downloader aria2c"));
        assert!(lines.contains(&r#"--external-downloader-args "-x 2 -s 2 -k 1M""#));
        assert!(lines.iter().all(|l| l.starts_with("--")));
    }

    #[tokio::test]
    async fn save_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("yt-dlp").join("config");
        let mut options = Options::default();
        options.output.output_dir = "/media".into();

        let written = save_config_file(&options, &path).await.unwrap();
        assert_eq!(written, path);
        let contents = tokio::fs::read_to_string(&path).await.unwrap();
        assert!(contents.starts_with("--embed-thumbnail\n"));
    }
}
