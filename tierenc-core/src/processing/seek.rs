//! Trim ranges applied as input seeking.
//!
//! ffmpeg treats `-ss`/`-t`/`-to` as input options when they appear before
//! the `-i` they refer to. Trimming must be applied that way: loudness
//! measurement and both encode passes have to see exactly the same decoded
//! range.

use serde::Serialize;

/// End bound of a trim range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SeekEnd {
    /// Absolute end timestamp (`-to`).
    To(String),
    /// Length from the start (`-t`).
    Duration(String),
}

/// Optional `{start, end}` or `{start, duration}` range.
///
/// Timestamps are kept as the engine's own syntax (`90`, `1:39`, `00:01:39.5`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SeekRange {
    pub start: Option<String>,
    pub end: Option<SeekEnd>,
}

impl SeekRange {
    /// Creates a range; when both `to` and `duration` are given the duration wins.
    pub fn new(start: Option<String>, to: Option<String>, duration: Option<String>) -> Self {
        let start = start.filter(|s| !s.trim().is_empty());
        let to = to.filter(|s| !s.trim().is_empty());
        let duration = duration.filter(|s| !s.trim().is_empty());

        let end = match (to, duration) {
            (Some(to), Some(duration)) => {
                log::debug!("Both end ({to}) and duration ({duration}) given; using duration");
                Some(SeekEnd::Duration(duration))
            }
            (None, Some(duration)) => Some(SeekEnd::Duration(duration)),
            (Some(to), None) => Some(SeekEnd::To(to)),
            (None, None) => None,
        };

        Self { start, end }
    }

    pub fn is_empty(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    /// Input-seek arguments, to be placed before the matching `-i`.
    pub fn to_input_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if let Some(start) = &self.start {
            args.extend(["-ss".to_string(), start.clone(), "-accurate_seek".to_string()]);
        }
        match &self.end {
            Some(SeekEnd::Duration(duration)) => {
                args.extend(["-t".to_string(), duration.clone()]);
            }
            Some(SeekEnd::To(to)) => {
                args.extend(["-to".to_string(), to.clone()]);
            }
            None => {}
        }
        args
    }
}
