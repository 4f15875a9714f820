//! Static blocklist of well-known third-party hosts.
//!
//! Browser captures are noisy: analytics beacons, ad exchanges, CDNs and
//! payment widgets show up alongside the traffic we actually want to
//! document. Hosts matching this list are always excluded, even when they
//! would otherwise pass the caller's domain allowlist.

/// Hostnames (and their subdomains) that never belong to the target API.
const THIRD_PARTY_BLOCKLIST: &[&str] = &[
    "google-analytics.com",
    "analytics.google.com",
    "googletagmanager.com",
    "googlesyndication.com",
    "fonts.googleapis.com",
    "fonts.gstatic.com",
    "doubleclick.net",
    // caution: might remove API calls to google; keep if we don't use Google
    "googleapis.com",
    "gstatic.com",
    "facebook.com",
    "connect.facebook.net",
    "ads.google.com",
    "scorecardresearch.com",
    "adsrvr.org",
    "adservice.google.com",
    "stripe.com",
    "checkout.stripe.com",
    "sentry.io",
    "hotjar.com",
    "mixpanel.com",
    "segment.com",
    "intercom.io",
    "newrelic.com",
    "cloudflare.com",
    "cdn.jsdelivr.net",
    "unpkg.com",
    "crashlytics.com",
];

/// Returns true when `host` equals a blocklisted entry or is one of its
/// subdomains. Matching is case-insensitive and tolerant of surrounding
/// whitespace.
pub fn is_blocked(host: &str) -> bool {
    let host = host.trim().to_ascii_lowercase();
    if host.is_empty() {
        return false;
    }

    THIRD_PARTY_BLOCKLIST.iter().any(|blocked| {
        host == *blocked || host.ends_with(&format!(".{blocked}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match_any_case() {
        assert!(is_blocked("doubleclick.net"));
        assert!(is_blocked("DoubleClick.NET"));
        assert!(is_blocked("  sentry.io  "));
    }

    #[test]
    fn test_subdomain_match() {
        assert!(is_blocked("tracker.ads.google.com"));
        assert!(is_blocked("js.stripe.com"));
        assert!(is_blocked("region1.google-analytics.com"));
    }

    #[test]
    fn test_suffix_requires_label_boundary() {
        // "notstripe.com" must not match "stripe.com"
        assert!(!is_blocked("notstripe.com"));
        assert!(!is_blocked("gstatic.com.evil.example"));
    }

    #[test]
    fn test_unlisted_hosts_pass() {
        assert!(!is_blocked("api.example.com"));
        assert!(!is_blocked(""));
        assert!(!is_blocked("   "));
    }
}
