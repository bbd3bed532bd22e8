use std::cmp::Ordering;

fn segment_value(segment: &str) -> u64 {
    segment.parse().unwrap_or(0)
}

/// Compare two version identifiers segment by segment.
///
/// Segments are compared as integers (non-numeric segments count as `0`);
/// when every shared segment is equal the identifier with more segments is
/// higher, so `3.78.1` orders above `3.78`.  Identifiers that are still equal
/// after that fall back to plain string order to keep sorting deterministic.
#[must_use]
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let mut left = a.split('.');
    let mut right = b.split('.');

    loop {
        match (left.next(), right.next()) {
            (Some(l), Some(r)) => match segment_value(l).cmp(&segment_value(r)) {
                Ordering::Equal => {}
                unequal => return unequal,
            },
            (Some(_), None) => return Ordering::Greater,
            (None, Some(_)) => return Ordering::Less,
            (None, None) => return a.cmp(b),
        }
    }
}

/// Sort identifiers highest first.
pub fn sort_descending(versions: &mut [String]) {
    versions.sort_by(|a, b| compare_versions(b, a));
}

/// Remove a conventional tag prefix such as the leading `v` in `v3.78.1`.
#[must_use]
pub fn strip_tag_prefix(tag: &str) -> &str {
    tag.trim_start_matches(|c: char| !c.is_ascii_digit())
}

/// Whether `version` starts with every dotted segment of `prefix`.
///
/// `3.78` matches `3.78.0` and `3.78.1` but not `3.7.9` or `3.780.0`.
#[must_use]
pub fn matches_prefix(version: &str, prefix: &str) -> bool {
    let mut segments = version.split('.');
    prefix
        .split('.')
        .all(|wanted| segments.next().is_some_and(|segment| segment == wanted))
}

/// The highest member of `versions` matching `prefix`.
#[must_use]
pub fn highest_matching<'a, I>(versions: I, prefix: &str) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a String>,
{
    versions
        .into_iter()
        .map(String::as_str)
        .filter(|version| matches_prefix(version, prefix))
        .max_by(|a, b| compare_versions(a, b))
}
