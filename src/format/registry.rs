// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Supported version tags and their layouts.

use std::fmt;

use super::{gp3, gp4, gp5, Layout};
use crate::error::{GpError, Result};

/// Numeric format version parsed from a tag such as `v5.10`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    pub major: u8,
    pub minor: u8,
}

impl Version {
    pub const fn new(major: u8, minor: u8) -> Self {
        Self { major, minor }
    }

    /// Parse the trailing `d.dd` of a version tag
    pub fn from_tag(tag: &str) -> Option<Self> {
        let number = tag.rsplit(|c: char| c == 'v' || c == 'L' || c == ' ').next()?;
        let (major, minor) = number.split_once('.')?;
        Some(Self::new(major.parse().ok()?, minor.parse().ok()?))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.major, self.minor)
    }
}

pub const GP3_TAG: &str = "FICHIER GUITAR PRO v3.00";
pub const GP4_TAG: &str = "FICHIER GUITAR PRO v4.06";
pub const GP5_TAG: &str = "FICHIER GUITAR PRO v5.10";

static FORMATS: [(&str, Layout); 6] = [
    (GP3_TAG, gp3::LAYOUT),
    ("FICHIER GUITAR PRO v4.00", gp4::LAYOUT),
    (GP4_TAG, gp4::LAYOUT),
    ("FICHIER GUITAR PRO L4.06", gp4::LAYOUT),
    ("FICHIER GUITAR PRO v5.00", gp5::LAYOUT),
    (GP5_TAG, gp5::LAYOUT),
];

static EXTENSIONS: [(&str, &str); 3] = [("gp3", GP3_TAG), ("gp4", GP4_TAG), ("gp5", GP5_TAG)];

/// Fixed mapping from version tags to layouts
#[derive(Debug, Clone, Copy)]
pub struct Registry {
    formats: &'static [(&'static str, Layout)],
}

impl Registry {
    pub fn new() -> Self {
        Self { formats: &FORMATS }
    }

    /// Look up the layout for a version tag
    pub fn resolve(&self, tag: &str) -> Result<(Version, Layout)> {
        self.formats
            .iter()
            .find(|(known, _)| *known == tag)
            .and_then(|(known, layout)| Version::from_tag(known).map(|version| (version, *layout)))
            .ok_or_else(|| GpError::UnsupportedVersion(tag.to_string()))
    }

    pub fn is_supported(&self, tag: &str) -> bool {
        self.formats.iter().any(|(known, _)| *known == tag)
    }

    /// Registered version tags
    pub fn tags(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.formats.iter().map(|(tag, _)| *tag)
    }

    /// Default version tag for a file extension such as `gp4` or `.GP5`
    pub fn version_for_extension(&self, extension: &str) -> Option<&'static str> {
        let extension = extension.trim_start_matches('.').to_ascii_lowercase();
        EXTENSIONS
            .iter()
            .find(|(known, _)| *known == extension)
            .map(|(_, tag)| *tag)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Layout").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_from_tag() {
        assert_eq!(Version::from_tag(GP3_TAG), Some(Version::new(3, 0)));
        assert_eq!(Version::from_tag("FICHIER GUITAR PRO L4.06"), Some(Version::new(4, 6)));
        assert_eq!(Version::from_tag(GP5_TAG), Some(Version::new(5, 10)));
        assert_eq!(Version::new(5, 10).to_string(), "5.10");
        assert!(Version::new(5, 10) > Version::new(5, 0));
        assert_eq!(Version::from_tag("garbage"), None);
    }

    #[test]
    fn test_resolve_supported_tags() {
        let registry = Registry::new();
        for tag in registry.tags() {
            let (version, _) = registry.resolve(tag).unwrap();
            assert!((3..=5).contains(&version.major), "{tag}");
        }
        assert_eq!(registry.tags().count(), 6);
    }

    #[test]
    fn test_resolve_unknown_tag() {
        let err = Registry::new().resolve("FICHIER GUITAR PRO v6.00").unwrap_err();
        assert!(matches!(err, GpError::UnsupportedVersion(tag) if tag.ends_with("v6.00")));
    }

    #[test]
    fn test_extension_hint() {
        let registry = Registry::new();
        assert_eq!(registry.version_for_extension("gp4"), Some(GP4_TAG));
        assert_eq!(registry.version_for_extension(".GP5"), Some(GP5_TAG));
        assert_eq!(registry.version_for_extension("gpx"), None);
    }
}
