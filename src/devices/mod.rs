//! Device emulation profiles
//!
//! A fixed, ordered catalog of viewport/user-agent/touch configurations the
//! monitor rotates through. Catalog order is significant: it defines the
//! rotation order, and the same profile recurs every `len()` iterations.

use serde::{Deserialize, Serialize};

/// Broad device class a profile belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceCategory {
    Mobile,
    Tablet,
    Desktop,
}

impl std::fmt::Display for DeviceCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeviceCategory::Mobile => write!(f, "mobile"),
            DeviceCategory::Tablet => write!(f, "tablet"),
            DeviceCategory::Desktop => write!(f, "desktop"),
        }
    }
}

/// Page dimensions in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

/// A named device emulation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceProfile {
    /// Human-readable device name, also used (slugified) in screenshot filenames
    pub name: String,
    /// Device class, for log output
    pub category: DeviceCategory,
    /// Emulated viewport
    pub viewport: Viewport,
    /// User agent string sent with every request
    pub user_agent: String,
    /// Device pixel ratio
    pub device_scale_factor: f64,
    /// Whether the viewport is reported as a mobile device
    pub is_mobile: bool,
    /// Whether touch events are emulated
    pub has_touch: bool,
}

impl DeviceProfile {
    fn new(
        name: &str,
        category: DeviceCategory,
        width: u32,
        height: u32,
        user_agent: &str,
        device_scale_factor: f64,
        is_mobile: bool,
        has_touch: bool,
    ) -> Self {
        Self {
            name: name.to_string(),
            category,
            viewport: Viewport { width, height },
            user_agent: user_agent.to_string(),
            device_scale_factor,
            is_mobile,
            has_touch,
        }
    }
}

/// Ordered, fixed-length catalog of device profiles
#[derive(Debug, Clone)]
pub struct DeviceCatalog {
    profiles: Vec<DeviceProfile>,
}

impl DeviceCatalog {
    /// The standard rotation: phones first, then tablets, then desktops.
    pub fn standard() -> Self {
        let profiles = vec![
            DeviceProfile::new(
                "iPhone 14 Pro",
                DeviceCategory::Mobile,
                393,
                852,
                "Mozilla/5.0 (iPhone; CPU iPhone OS 16_6 like Mac OS X) AppleWebKit/605.1.15 \
                 (KHTML, like Gecko) Version/16.6 Mobile/15E148 Safari/604.1",
                3.0,
                true,
                true,
            ),
            DeviceProfile::new(
                "Pixel 7",
                DeviceCategory::Mobile,
                412,
                915,
                "Mozilla/5.0 (Linux; Android 13; Pixel 7) AppleWebKit/537.36 \
                 (KHTML, like Gecko) Chrome/118.0.0.0 Mobile Safari/537.36",
                2.625,
                true,
                true,
            ),
            DeviceProfile::new(
                "Galaxy S23",
                DeviceCategory::Mobile,
                360,
                780,
                "Mozilla/5.0 (Linux; Android 13; SM-S911B) AppleWebKit/537.36 \
                 (KHTML, like Gecko) Chrome/118.0.0.0 Mobile Safari/537.36",
                3.0,
                true,
                true,
            ),
            DeviceProfile::new(
                "iPad Air",
                DeviceCategory::Tablet,
                820,
                1180,
                "Mozilla/5.0 (iPad; CPU OS 16_6 like Mac OS X) AppleWebKit/605.1.15 \
                 (KHTML, like Gecko) Version/16.6 Mobile/15E148 Safari/604.1",
                2.0,
                true,
                true,
            ),
            DeviceProfile::new(
                "Galaxy Tab S8",
                DeviceCategory::Tablet,
                753,
                1205,
                "Mozilla/5.0 (Linux; Android 13; SM-X700) AppleWebKit/537.36 \
                 (KHTML, like Gecko) Chrome/118.0.0.0 Safari/537.36",
                2.0,
                true,
                true,
            ),
            DeviceProfile::new(
                "Desktop 1080p",
                DeviceCategory::Desktop,
                1920,
                1080,
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                 (KHTML, like Gecko) Chrome/118.0.0.0 Safari/537.36",
                1.0,
                false,
                false,
            ),
            DeviceProfile::new(
                "MacBook Pro 14",
                DeviceCategory::Desktop,
                1512,
                982,
                "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
                 (KHTML, like Gecko) Chrome/118.0.0.0 Safari/537.36",
                2.0,
                false,
                false,
            ),
        ];

        Self { profiles }
    }

    /// Number of profiles in the rotation
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    /// True when the catalog is empty (never the case for `standard()`)
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Profile for the given iteration: round-robin over the catalog
    pub fn profile_for(&self, iteration: u64) -> &DeviceProfile {
        let index = (iteration % self.profiles.len() as u64) as usize;
        &self.profiles[index]
    }

    /// All profiles, in rotation order
    pub fn profiles(&self) -> &[DeviceProfile] {
        &self.profiles
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_catalog_is_non_empty_and_covers_all_categories() {
        let catalog = DeviceCatalog::standard();
        assert!(!catalog.is_empty());

        let categories: HashSet<_> = catalog
            .profiles()
            .iter()
            .map(|p| p.category.to_string())
            .collect();
        assert!(categories.contains("mobile"));
        assert!(categories.contains("tablet"));
        assert!(categories.contains("desktop"));
    }

    #[test]
    fn test_rotation_is_round_robin() {
        let catalog = DeviceCatalog::standard();
        let len = catalog.len() as u64;

        for i in 0..len * 3 {
            let expected = &catalog.profiles()[(i % len) as usize];
            assert_eq!(catalog.profile_for(i).name, expected.name);
        }
    }

    #[test]
    fn test_every_profile_appears_once_per_cycle() {
        let catalog = DeviceCatalog::standard();
        let len = catalog.len() as u64;

        // Any window of `len` consecutive iterations covers each profile exactly once
        for start in [0u64, 3, 17, 1000] {
            let names: HashSet<_> = (start..start + len)
                .map(|i| catalog.profile_for(i).name.clone())
                .collect();
            assert_eq!(names.len(), catalog.len());
        }
    }

    #[test]
    fn test_mobile_profiles_report_touch() {
        let catalog = DeviceCatalog::standard();
        for profile in catalog.profiles() {
            if profile.category == DeviceCategory::Mobile {
                assert!(profile.is_mobile);
                assert!(profile.has_touch);
            }
            if profile.category == DeviceCategory::Desktop {
                assert!(!profile.is_mobile);
            }
        }
    }
}
