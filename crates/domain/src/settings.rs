//! Export settings
//!
//! Filter toggles and rule lists supplied by the host's preferences store.
//! They are passed explicitly into the filter; nothing here is global.

use serde::{Deserialize, Serialize};

use crate::export::ExportOptions;

/// Hosts of well known analytics and ad measurement services.
pub const DEFAULT_ANALYTICS_HOSTS: &[&str] = &[
    "google-analytics.com",
    "analytics.google.com",
    "googletagmanager.com",
    "doubleclick.net",
    "googleadservices.com",
    "mixpanel.com",
    "amplitude.com",
    "segment.io",
    "segment.com",
    "heapanalytics.com",
    "hotjar.com",
    "branch.io",
    "adjust.com",
    "appsflyer.com",
    "braze.com",
    "bat.bing.com",
    "connect.facebook.net",
];

/// Path patterns of measurement beacons served from first-party hosts.
pub const DEFAULT_ANALYTICS_PATH_PATTERNS: &[&str] = &[r"^/([gjr]/)?collect$"];

/// Endpoints of the Firebase and Crashlytics mobile SDKs.
pub const DEFAULT_TRACKING_SDK_HOSTS: &[&str] = &[
    "app-measurement.com",
    "firebaselogging-pa.googleapis.com",
    "firebaselogging.googleapis.com",
    "firebaseinstallations.googleapis.com",
    "firebaseremoteconfig.googleapis.com",
    "firebase-settings.crashlytics.com",
    "crashlyticsreports-pa.googleapis.com",
    "device-provisioning.googleapis.com",
];

fn owned(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| (*s).to_string()).collect()
}

fn default_analytics_hosts() -> Vec<String> {
    owned(DEFAULT_ANALYTICS_HOSTS)
}

fn default_analytics_path_patterns() -> Vec<String> {
    owned(DEFAULT_ANALYTICS_PATH_PATTERNS)
}

fn default_tracking_sdk_hosts() -> Vec<String> {
    owned(DEFAULT_TRACKING_SDK_HOSTS)
}

/// Exclusion toggles applied before multi-transaction exports.
///
/// Every toggle defaults to off, which makes filtering the identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSettings {
    /// Drop transactions whose response is an image.
    #[serde(default)]
    pub exclude_images: bool,

    /// Drop traffic to analytics services.
    #[serde(default)]
    pub exclude_analytics: bool,

    /// Drop traffic produced by the tracking SDK.
    #[serde(default)]
    pub exclude_tracking_sdk: bool,

    /// Hosts treated as analytics; subdomains match too.
    #[serde(default = "default_analytics_hosts")]
    pub analytics_hosts: Vec<String>,

    /// Regular expressions matched against the URL path.
    #[serde(default = "default_analytics_path_patterns")]
    pub analytics_path_patterns: Vec<String>,

    /// Hosts treated as tracking SDK endpoints; subdomains match too.
    #[serde(default = "default_tracking_sdk_hosts")]
    pub tracking_sdk_hosts: Vec<String>,
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            exclude_images: false,
            exclude_analytics: false,
            exclude_tracking_sdk: false,
            analytics_hosts: default_analytics_hosts(),
            analytics_path_patterns: default_analytics_path_patterns(),
            tracking_sdk_hosts: default_tracking_sdk_hosts(),
        }
    }
}

impl FilterSettings {
    /// Settings with every exclusion enabled.
    #[must_use]
    pub fn all_enabled() -> Self {
        Self {
            exclude_images: true,
            exclude_analytics: true,
            exclude_tracking_sdk: true,
            ..Self::default()
        }
    }

    /// Returns true if at least one toggle is on.
    #[must_use]
    pub const fn any_enabled(&self) -> bool {
        self.exclude_images || self.exclude_analytics || self.exclude_tracking_sdk
    }
}

/// Persisted export preferences.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportSettings {
    /// Filter toggles.
    #[serde(default)]
    pub filter: FilterSettings,

    /// Structured output options.
    #[serde(default)]
    pub options: ExportOptions,
}
