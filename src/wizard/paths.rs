/// Hash pathnames derived from the step order
use serde::Serialize;

use super::steps::{StepId, StepPosition};

/// Previous, current and next step pathnames (`prefix#id`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StepPathnames {
    pub previous: Option<String>,
    pub current: Option<String>,
    pub next: Option<String>,
}

/// Strip the trailing segment of a pathname pattern.
///
/// `/signup/[step]` becomes `/signup/`; a pattern already ending in `/` is
/// kept as is.
pub fn pathname_prefix(pattern: &str) -> String {
    if pattern.ends_with('/') {
        return pattern.to_string();
    }
    match pattern.rfind('/') {
        Some(pos) => pattern[..=pos].to_string(),
        None => String::new(),
    }
}

pub fn step_pathname(prefix: &str, id: &StepId) -> String {
    format!("{}#{}", prefix, id)
}

pub fn derive_pathnames(position: StepPosition, step_ids: &[StepId], prefix: &str) -> StepPathnames {
    let total = step_ids.len();
    let index = match position {
        StepPosition::At(index) => index.min(total.saturating_sub(1)),
        StepPosition::Finished => total,
    };

    let at = |i: usize| step_ids.get(i).map(|id| step_pathname(prefix, id));

    StepPathnames {
        previous: index.checked_sub(1).and_then(at),
        current: at(index),
        next: index.checked_add(1).and_then(at),
    }
}

/// Step id named by a destination URL.
///
/// The fragment wins. A URL without a fragment maps to the first step when its
/// path ends with the prefix stripped of trailing `/`. An empty prefix only
/// matches the root path.
pub fn destination_step<'a>(url: &'a str, prefix: &str, step_ids: &'a [StepId]) -> Option<&'a str> {
    if let Some((_, fragment)) = url.split_once('#') {
        if !fragment.is_empty() {
            return Some(fragment);
        }
    }

    let base = prefix.trim_end_matches('/');
    let path = url_path(url).trim_end_matches('/');
    let at_base = if base.is_empty() {
        path.is_empty()
    } else {
        path.ends_with(base)
    };

    if at_base {
        step_ids.first().map(StepId::as_str)
    } else {
        None
    }
}

/// Path part of an absolute or relative URL, without query or fragment
fn url_path(url: &str) -> &str {
    let url = url.split(['#', '?']).next().unwrap_or(url);
    match url.split_once("://") {
        Some((_, rest)) => rest.find('/').map_or("", |pos| &rest[pos..]),
        None => url,
    }
}
