//! Export filter policy
//!
//! Decides which transactions are eligible for multi-transaction exports.
//! A transaction is dropped when any enabled rule matches it; everything
//! else is kept, in input order.

use regex::Regex;

use crate::error::{DomainError, DomainResult};
use crate::settings::FilterSettings;
use crate::transaction::HttpTransaction;

/// Why a transaction was excluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExclusionReason {
    /// The response is an image.
    Image,
    /// The request goes to an analytics service.
    Analytics,
    /// The request comes from the tracking SDK.
    TrackingSdk,
}

/// Compiled exclusion rules.
#[derive(Debug, Clone)]
pub struct ExportFilter {
    exclude_images: bool,
    exclude_analytics: bool,
    exclude_tracking_sdk: bool,
    analytics_hosts: Vec<String>,
    analytics_paths: Vec<Regex>,
    tracking_sdk_hosts: Vec<String>,
}

impl Default for ExportFilter {
    fn default() -> Self {
        Self::disabled()
    }
}

impl ExportFilter {
    /// Compiles the given settings.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidPattern`] if a configured path pattern
    /// is not a valid regular expression.
    pub fn new(settings: &FilterSettings) -> DomainResult<Self> {
        let analytics_paths = settings
            .analytics_path_patterns
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|e| DomainError::InvalidPattern {
                    pattern: pattern.clone(),
                    message: e.to_string(),
                })
            })
            .collect::<DomainResult<Vec<_>>>()?;

        Ok(Self {
            exclude_images: settings.exclude_images,
            exclude_analytics: settings.exclude_analytics,
            exclude_tracking_sdk: settings.exclude_tracking_sdk,
            analytics_hosts: normalize_hosts(&settings.analytics_hosts),
            analytics_paths,
            tracking_sdk_hosts: normalize_hosts(&settings.tracking_sdk_hosts),
        })
    }

    /// A filter that keeps every transaction.
    #[must_use]
    pub const fn disabled() -> Self {
        Self {
            exclude_images: false,
            exclude_analytics: false,
            exclude_tracking_sdk: false,
            analytics_hosts: Vec::new(),
            analytics_paths: Vec::new(),
            tracking_sdk_hosts: Vec::new(),
        }
    }

    /// Returns true if no rule is enabled.
    #[must_use]
    pub const fn is_identity(&self) -> bool {
        !(self.exclude_images || self.exclude_analytics || self.exclude_tracking_sdk)
    }

    /// Returns the first enabled rule that matches, if any.
    #[must_use]
    pub fn exclusion_reason(&self, transaction: &HttpTransaction) -> Option<ExclusionReason> {
        if self.is_identity() {
            return None;
        }

        let host = transaction.host().map(|h| h.to_ascii_lowercase());

        if self.exclude_tracking_sdk
            && host
                .as_deref()
                .is_some_and(|h| matches_any_host(h, &self.tracking_sdk_hosts))
        {
            return Some(ExclusionReason::TrackingSdk);
        }

        if self.exclude_analytics {
            let host_match = host
                .as_deref()
                .is_some_and(|h| matches_any_host(h, &self.analytics_hosts));
            if host_match || self.matches_analytics_path(transaction) {
                return Some(ExclusionReason::Analytics);
            }
        }

        if self.exclude_images && is_image(transaction) {
            return Some(ExclusionReason::Image);
        }

        None
    }

    /// Returns true if any enabled rule matches.
    #[must_use]
    pub fn is_excluded(&self, transaction: &HttpTransaction) -> bool {
        self.exclusion_reason(transaction).is_some()
    }

    /// Keeps the transactions no rule excludes, preserving order.
    pub fn apply<'a, I>(&self, transactions: I) -> Vec<&'a HttpTransaction>
    where
        I: IntoIterator<Item = &'a HttpTransaction>,
    {
        transactions
            .into_iter()
            .filter(|tx| !self.is_excluded(tx))
            .collect()
    }

    fn matches_analytics_path(&self, transaction: &HttpTransaction) -> bool {
        if self.analytics_paths.is_empty() {
            return false;
        }
        let path = transaction.path();
        self.analytics_paths.iter().any(|re| re.is_match(&path))
    }
}

fn normalize_hosts(hosts: &[String]) -> Vec<String> {
    hosts
        .iter()
        .map(|h| h.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|h| !h.is_empty())
        .collect()
}

/// Exact host or any subdomain of it.
fn matches_any_host(host: &str, rules: &[String]) -> bool {
    rules.iter().any(|rule| {
        host == rule
            || host
                .strip_suffix(rule.as_str())
                .is_some_and(|prefix| prefix.ends_with('.'))
    })
}

fn is_image(transaction: &HttpTransaction) -> bool {
    let by_mime = transaction
        .response_content_type()
        .and_then(|ct| ct.parse::<mime::Mime>().ok())
        .is_some_and(|m| m.type_() == mime::IMAGE);

    by_mime
        || mime_guess::from_path(transaction.path())
            .first()
            .is_some_and(|m| m.type_() == mime::IMAGE)
}
