//! Range compression for selected list positions

/// Compress 1-based positions into a `--playlist-items` expression
///
/// Each maximal run of consecutive values becomes `start-end` (or a bare number
/// for a run of one), runs in ascending order, joined by commas. Duplicates are
/// ignored and an empty input gives an empty string.
///
/// ```
/// use ytdlp_frontend::command::compress_ranges;
///
/// assert_eq!(compress_ranges(&[9, 1, 2, 3, 5, 7, 8]), "1-3,5,7-9");
/// ```
pub fn compress_ranges(positions: &[u32]) -> String {
    let mut sorted = positions.to_vec();
    sorted.sort_unstable();
    sorted.dedup();

    let Some((&first, rest)) = sorted.split_first() else {
        return String::new();
    };

    let mut runs = Vec::new();
    let (mut start, mut end) = (first, first);
    for &value in rest {
        if value == end + 1 {
            end = value;
        } else {
            runs.push(format_run(start, end));
            start = value;
            end = value;
        }
    }
    runs.push(format_run(start, end));

    runs.join(",")
}

fn format_run(start: u32, end: u32) -> String {
    if start == end {
        start.to_string()
    } else {
        format!("{}-{}", start, end)
    }
}
