use std::fmt;
use std::str::FromStr;

use super::io::{DataReader, DataWriter};
use crate::error::{DockError, DockResult};

/// Format version tag at the head of every layout stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl Version {
    pub const CURRENT: Version = Version::new(1, 1, 0);

    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Fails for any version newer than [`Version::CURRENT`].
    pub fn check_current(self) -> DockResult<()> {
        if self > Self::CURRENT {
            return Err(DockError::UnsupportedVersion {
                found: self,
                current: Self::CURRENT,
            });
        }
        Ok(())
    }

    pub fn write(self, out: &mut DataWriter) {
        for part in [self.major, self.minor, self.patch] {
            out.write_i32(i32::try_from(part).unwrap_or(i32::MAX));
        }
    }

    pub fn read(input: &mut DataReader<'_>) -> DockResult<Self> {
        let mut parts = [0u32; 3];
        for part in &mut parts {
            let raw = input.read_i32()?;
            *part = u32::try_from(raw)
                .map_err(|_| DockError::format(format!("negative version component {raw}")))?;
        }
        Ok(Self::new(parts[0], parts[1], parts[2]))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for Version {
    type Err = DockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split('.').map(|p| p.trim().parse::<u32>());
        let mut next = || {
            parts
                .next()
                .unwrap_or(Ok(0))
                .map_err(|_| DockError::format(format!("malformed version '{s}'")))
        };
        let version = Version::new(next()?, next()?, next()?);
        Ok(version)
    }
}
