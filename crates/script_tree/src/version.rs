use std::fmt;
use std::str::FromStr;

/// `major.minor` format version carried on the script root.
///
/// Ordering is lexicographic on `(major, minor)`, which is exactly the
/// compatibility rule: a document loads when its version is at least the
/// version the running core requires.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FormatVersion {
    pub major: u32,
    pub minor: u32,
}

impl FormatVersion {
    /// Version written by this core and required when loading.
    pub const CURRENT: FormatVersion = FormatVersion::new(1, 0);
    /// Assumed when a document carries no version at all.
    pub const UNVERSIONED: FormatVersion = FormatVersion::new(0, 0);

    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    pub fn satisfies(self, required: FormatVersion) -> bool {
        self >= required
    }
}

impl fmt::Display for FormatVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InvalidVersion;

impl FromStr for FormatVersion {
    type Err = InvalidVersion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (major, minor) = s.trim().split_once('.').ok_or(InvalidVersion)?;
        let major = major.parse().map_err(|_| InvalidVersion)?;
        let minor = minor.parse().map_err(|_| InvalidVersion)?;
        Ok(Self { major, minor })
    }
}
