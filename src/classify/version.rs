use std::cmp::Ordering;

/// Tags are release candidates only when they carry this prefix.
pub const VERSION_TAG_PREFIX: char = 'v';

/// Semantic version: MAJOR.MINOR.PATCH with optional pre-release and build
/// metadata. Build metadata is parsed but ignored for ordering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    pub pre: Vec<Identifier>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identifier {
    Numeric(u64),
    Alpha(String),
}

impl Ord for Identifier {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Numeric(a), Self::Numeric(b)) => a.cmp(b),
            (Self::Numeric(_), Self::Alpha(_)) => Ordering::Less,
            (Self::Alpha(_), Self::Numeric(_)) => Ordering::Greater,
            (Self::Alpha(a), Self::Alpha(b)) => a.cmp(b),
        }
    }
}

impl PartialOrd for Identifier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.major, self.minor, self.patch)
            .cmp(&(other.major, other.minor, other.patch))
            .then_with(|| match (self.pre.is_empty(), other.pre.is_empty()) {
                (true, true) => Ordering::Equal,
                // A pre-release sorts below the release it precedes.
                (false, true) => Ordering::Less,
                (true, false) => Ordering::Greater,
                (false, false) => self.pre.cmp(&other.pre),
            })
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Parse a tag name such as `v1.10.0` or `v2.0.0-rc.1+build.5`.
#[must_use]
pub fn parse_version(tag: &str) -> Option<Version> {
    let text = tag.trim();
    let text = text.strip_prefix('=').unwrap_or(text);
    let text = text.strip_prefix(VERSION_TAG_PREFIX).unwrap_or(text);

    let (text, build) = match text.split_once('+') {
        Some((head, build)) => (head, Some(build)),
        None => (text, None),
    };
    if let Some(build) = build
        && !build.split('.').all(is_valid_alnum_identifier)
    {
        return None;
    }

    let (core, pre) = match text.split_once('-') {
        Some((core, pre)) => (core, Some(pre)),
        None => (text, None),
    };

    let mut parts = core.split('.');
    let major = parse_numeric(parts.next()?)?;
    let minor = parse_numeric(parts.next()?)?;
    let patch = parse_numeric(parts.next()?)?;
    if parts.next().is_some() {
        return None;
    }

    let pre = match pre {
        Some(pre) => pre
            .split('.')
            .map(parse_pre_identifier)
            .collect::<Option<Vec<_>>>()?,
        None => Vec::new(),
    };

    Some(Version {
        major,
        minor,
        patch,
        pre,
    })
}

fn parse_numeric(part: &str) -> Option<u64> {
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if part.len() > 1 && part.starts_with('0') {
        return None;
    }
    part.parse().ok()
}

fn parse_pre_identifier(part: &str) -> Option<Identifier> {
    if !is_valid_alnum_identifier(part) {
        return None;
    }
    if part.bytes().all(|b| b.is_ascii_digit()) {
        parse_numeric(part).map(Identifier::Numeric)
    } else {
        Some(Identifier::Alpha(part.to_string()))
    }
}

fn is_valid_alnum_identifier(part: &str) -> bool {
    !part.is_empty() && part.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-')
}

/// Total order used to rank release tags: every parseable version sorts
/// before every unparseable name, and greater versions sort first.
/// Unparseable names compare equal, so a stable sort keeps their input order.
#[must_use]
pub fn compare_version_tags(a: &str, b: &str) -> Ordering {
    match (parse_version(a), parse_version(b)) {
        (Some(va), Some(vb)) => vb.cmp(&va),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Pick the highest semantic-version tag among names carrying the version
/// prefix. Returns `None` when no candidate parses.
#[must_use]
pub fn latest_version<S: AsRef<str>>(tags: &[S]) -> Option<&str> {
    tags.iter()
        .map(AsRef::as_ref)
        .filter(|name| name.starts_with(VERSION_TAG_PREFIX))
        .min_by(|a, b| compare_version_tags(a, b))
        .filter(|name| parse_version(name).is_some())
}
