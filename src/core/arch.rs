//! Supported Android target architectures.
//!
//! Each architecture tag maps to the GNU triple used both as the NDK
//! standalone toolchain directory name and as the `--host` triple passed
//! to `configure`.

use std::fmt;

use crate::ops::errors::BuildError;

/// A target architecture and its cross-toolchain triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Arch {
    /// Android ABI tag (e.g. `armeabi-v7a`)
    pub tag: &'static str,

    /// Toolchain triple prefix (e.g. `arm-linux-androideabi`)
    pub triple: &'static str,
}

/// Every architecture the cross-compiler knows how to build.
///
/// A toolchain named `{triple}` (or `{triple}-{suffix}`) must exist in the
/// NDK toolchains directory for each architecture that is built.
pub const ARCHS: &[Arch] = &[
    Arch {
        tag: "armeabi",
        triple: "arm-linux-androideabi",
    },
    Arch {
        tag: "armeabi-v7a",
        triple: "arm-linux-androideabi",
    },
    Arch {
        tag: "x86",
        triple: "i686-linux-android",
    },
    Arch {
        tag: "mips",
        triple: "mipsel-linux-android",
    },
];

impl Arch {
    /// Look up an architecture by its tag.
    pub fn lookup(tag: &str) -> Option<&'static Arch> {
        ARCHS.iter().find(|arch| arch.tag == tag)
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag)
    }
}

/// All known tags, comma-separated, in table order.
pub fn default_platforms() -> String {
    ARCHS.iter().map(|a| a.tag).collect::<Vec<_>>().join(",")
}

/// Parse a comma-separated platform list.
///
/// Whitespace around tags and empty entries are ignored; repeated tags are
/// built once, at their first position.
pub fn parse_platforms(list: &str) -> Result<Vec<&'static Arch>, BuildError> {
    let mut archs: Vec<&'static Arch> = Vec::new();

    for tag in list.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        let arch = Arch::lookup(tag).ok_or_else(|| BuildError::UnknownPlatform {
            tag: tag.to_string(),
            supported: default_platforms(),
        })?;

        if !archs.contains(&arch) {
            archs.push(arch);
        }
    }

    Ok(archs)
}
