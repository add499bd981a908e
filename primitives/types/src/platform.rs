//! Type-safe platform tags for bridge calls.
//!
//! Every call reaching the bridge is tagged with the runtime it came from.
//! Registrations may target a single platform or [`Platform::All`], which is
//! fanned out into every concrete platform at registration time.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Runtime a bridge call originates from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Registration target covering every concrete platform
    #[default]
    All,
    /// Web content (immutable JSON payloads)
    Web,
    /// Declarative UI engine (mutable map payloads)
    Lynx,
    /// Sentinel for "no platform"; lookups under it never resolve
    None,
}

/// Platforms a method can actually be called from.
pub const CONCRETE_PLATFORMS: [Platform; 2] = [Platform::Web, Platform::Lynx];

impl Platform {
    /// Get the string representation of the platform tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::All => "all",
            Platform::Web => "web",
            Platform::Lynx => "lynx",
            Platform::None => "none",
        }
    }

    /// Whether calls can originate from this platform.
    pub fn is_concrete(&self) -> bool { matches!(self, Platform::Web | Platform::Lynx) }

    /// Buckets a registration under this platform is written into.
    ///
    /// `All` expands to itself plus every concrete platform, so a lookup
    /// under any of them succeeds. `None` expands to nothing.
    pub fn fan_out(&self) -> Vec<Platform> {
        match self {
            Platform::All => {
                let mut buckets = vec![Platform::All];
                buckets.extend(CONCRETE_PLATFORMS);
                buckets
            }
            Platform::None => Vec::new(),
            other => vec![*other],
        }
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(Platform::All),
            "web" | "webview" => Ok(Platform::Web),
            "lynx" => Ok(Platform::Lynx),
            "none" => Ok(Platform::None),
            _ => Err(format!("Unknown platform: {}", s)),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.as_str()) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_fans_out_to_every_concrete_platform() {
        let buckets = Platform::All.fan_out();
        assert_eq!(buckets, vec![Platform::All, Platform::Web, Platform::Lynx]);
        assert!(Platform::None.fan_out().is_empty());
        assert_eq!(Platform::Web.fan_out(), vec![Platform::Web]);
    }

    #[test]
    fn parses_platform_names() {
        assert_eq!("Lynx".parse::<Platform>(), Ok(Platform::Lynx));
        assert_eq!("webview".parse::<Platform>(), Ok(Platform::Web));
        assert!("ios".parse::<Platform>().is_err());
        assert_eq!(Platform::Web.to_string(), "web");
    }
}
