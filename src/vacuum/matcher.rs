//! Picks the files a vacuum is going to archive.
//!
//! The pattern is the plain concatenation of the vacuum path with its prefix
//! and suffix, resolved with shell-glob rules: wildcards never cross a `/`
//! and every directory level is enumerated in file-name order. Braces are
//! plain characters, there is no `{a,b}` alternation.

use crate::vacuum::function_path;
use crate::vacuum::result_error::error::Error;
use crate::vacuum::result_error::result::Result;
use crate::vacuum::result_error::{WithDebugObjectAndFnName, WithMsg};
use function_name::named;
use globset::{GlobBuilder, GlobMatcher};
use itertools::Itertools;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

static GLOB_META: &[char] = &['*', '?', '['];

/// Builds the files pattern of a vacuum.
///
/// With neither prefix nor suffix every entry of `dir` matches; otherwise the
/// non-empty parts are appended to `dir` in prefix, suffix order.
pub fn build_pattern(dir: &str, prefix: Option<&str>, suffix: Option<&str>) -> String {
    let prefix = prefix.unwrap_or_default();
    let suffix = suffix.unwrap_or_default();
    if prefix.is_empty() && suffix.is_empty() {
        format!("{dir}*")
    } else {
        format!("{dir}{prefix}{suffix}")
    }
}

/// Returns the paths matching the vacuum pattern rooted at `dir`.
///
/// `dir` must exist, otherwise [`Error::NotFound`] is returned before any
/// globbing happens. No match is an empty vector.
#[named]
pub fn find_matches(dir: &str, prefix: Option<&str>, suffix: Option<&str>) -> Result<Vec<PathBuf>> {
    if let Err(e) = std::fs::metadata(dir) {
        tracing::debug!("Cannot stat vacuum path {:?}: {}", dir, e);
        return Err(Error::NotFound { path: dir.into() });
    }

    let pattern = build_pattern(dir, prefix, suffix);
    tracing::debug!("Matching files with pattern {:?}", pattern);
    glob_paths(&pattern).with_debug_object_and_fn_name(pattern.clone(), function_path!())
}

fn glob_paths(pattern: &str) -> Result<Vec<PathBuf>> {
    let Some(meta_idx) = pattern.find(GLOB_META) else {
        let path = PathBuf::from(pattern);
        return Ok(if std::fs::symlink_metadata(&path).is_ok() {
            vec![path]
        } else {
            vec![]
        });
    };

    let base = match pattern[..meta_idx].rfind('/') {
        Some(idx) => &pattern[..=idx],
        None => "",
    };
    let depth = pattern[base.len()..].trim_end_matches('/').split('/').count();

    let matcher = compile(pattern)?;
    let walk_root = if base.is_empty() { Path::new(".") } else { Path::new(base) };

    let paths = WalkDir::new(walk_root)
        .follow_links(true)
        .min_depth(depth)
        .max_depth(depth)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|res| match res {
            Ok(de) => Some(de.into_path()),
            Err(e) => {
                tracing::warn!(
                    "{}",
                    Error::from(e).with_msg(format!("Skipping entry while matching {pattern:?}"))
                );
                None
            }
        })
        .map(|path| match base {
            "" => path
                .strip_prefix(".")
                .map(Path::to_path_buf)
                .unwrap_or(path),
            _ => path,
        })
        .filter(|path| {
            let is_match = matcher.is_match(path);
            if !is_match {
                tracing::trace!("Skipping {:?}, pattern not match", path);
            }
            is_match
        })
        .collect_vec();

    Ok(paths)
}

fn compile(pattern: &str) -> Result<GlobMatcher> {
    GlobBuilder::new(&escape_braces(pattern))
        .literal_separator(true)
        .backslash_escape(true)
        .build()
        .map(|glob| glob.compile_matcher())
        .map_err(|e| Error::BadPattern {
            pattern: pattern.into(),
            reason: e.kind().to_string(),
        })
}

/// Escapes `{` and `}` outside character classes so globset reads them as
/// literals.
fn escape_braces(pattern: &str) -> String {
    let mut escaped = String::with_capacity(pattern.len());
    let mut in_class = false;
    let mut chars = pattern.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                escaped.push(c);
                escaped.extend(chars.next());
            }
            '[' if !in_class => {
                in_class = true;
                escaped.push(c);
                escaped.extend(chars.next_if(|&n| n == '!' || n == '^'));
                escaped.extend(chars.next_if_eq(&']'));
            }
            ']' if in_class => {
                in_class = false;
                escaped.push(c);
            }
            '{' | '}' if !in_class => {
                escaped.push('\\');
                escaped.push(c);
            }
            _ => escaped.push(c),
        }
    }
    escaped
}
