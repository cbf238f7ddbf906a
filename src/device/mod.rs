//! Caller device fingerprints derived from user-agent strings.
//!
//! A fingerprint is `"{browser}-{os}{os_major}-{device}"`, lowercased, e.g.
//! `chrome-windows10-other` or `mobile safari-ios17-iphone`.

use once_cell::sync::Lazy;
use regex::Regex;

const OTHER: &str = "Other";

/// Derives a device fingerprint from a raw user-agent string.
pub trait DeviceResolver: Send + Sync {
    /// Returns `None` when nothing usable can be parsed from the user-agent.
    fn fingerprint(&self, user_agent: &str) -> Option<String>;
}

/// Browser, OS and device families parsed from a user-agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedAgent {
    pub family: String,
    pub os_family: String,
    pub os_major: String,
    pub device_family: String,
}

impl ParsedAgent {
    fn is_unknown(&self) -> bool {
        self.family == OTHER && self.os_family == OTHER && self.device_family == OTHER
    }

    pub fn fingerprint(&self) -> String {
        format!(
            "{}-{}{}-{}",
            self.family, self.os_family, self.os_major, self.device_family
        )
        .to_lowercase()
    }
}

/// Regex-driven user-agent parser covering the mainstream browser families.
#[derive(Debug, Default, Clone, Copy)]
pub struct UserAgentFingerprint;

// Order matters: several engines embed the tokens of the ones they imitate.
static BROWSERS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        (r"Edg(?:e|A|iOS)?/", "Edge"),
        (r"(?:OPR|Opera)[/ ]", "Opera"),
        (r"SamsungBrowser/", "Samsung Internet"),
        (r"CriOS/", "Chrome Mobile iOS"),
        (r"FxiOS/", "Firefox iOS"),
        (r"Chrome/[\d.]+ Mobile", "Chrome Mobile"),
        (r"Chrome/", "Chrome"),
        (r"Firefox/", "Firefox"),
        (r"Version/[\d.]+.*Mobile/\S+ Safari/", "Mobile Safari"),
        (r"Version/[\d.]+.*Safari/", "Safari"),
        (r"MSIE |Trident/", "IE"),
        (r"curl/", "curl"),
    ]
    .into_iter()
    .map(|(pattern, family)| (Regex::new(pattern).expect("valid browser pattern"), family))
    .collect()
});

static WINDOWS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Windows NT (\d+)\.(\d+)").expect("valid windows pattern"));
static IOS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:iPhone|iPad|iPod).*? OS (\d+)[_.]").expect("valid ios pattern")
});
static MAC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Mac OS X (\d+)[_.]").expect("valid mac pattern"));
static ANDROID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Android (\d+)").expect("valid android pattern"));
static APPLE_DEVICE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(iPhone|iPad|iPod)\b").expect("valid apple device pattern"));

impl UserAgentFingerprint {
    pub fn new() -> Self {
        Self
    }

    pub fn parse(&self, user_agent: &str) -> ParsedAgent {
        let family = BROWSERS
            .iter()
            .find(|(re, _)| re.is_match(user_agent))
            .map(|(_, family)| *family)
            .unwrap_or(OTHER)
            .to_string();

        let (os_family, os_major) = parse_os(user_agent);
        let device_family = parse_device(user_agent);

        ParsedAgent {
            family,
            os_family,
            os_major,
            device_family,
        }
    }
}

impl DeviceResolver for UserAgentFingerprint {
    fn fingerprint(&self, user_agent: &str) -> Option<String> {
        if user_agent.trim().is_empty() {
            return None;
        }
        let parsed = self.parse(user_agent);
        if parsed.is_unknown() {
            return None;
        }
        Some(parsed.fingerprint())
    }
}

fn parse_os(ua: &str) -> (String, String) {
    if let Some(caps) = WINDOWS.captures(ua) {
        // NT kernel versions map onto marketing versions
        let major = match (&caps[1], &caps[2]) {
            ("10", _) => "10",
            ("6", "3") | ("6", "2") => "8",
            ("6", "1") => "7",
            ("6", "0") => "Vista",
            ("5", _) => "XP",
            _ => "0",
        };
        return ("Windows".to_string(), major.to_string());
    }
    if let Some(caps) = IOS.captures(ua) {
        return ("iOS".to_string(), caps[1].to_string());
    }
    if let Some(caps) = ANDROID.captures(ua) {
        return ("Android".to_string(), caps[1].to_string());
    }
    if let Some(caps) = MAC.captures(ua) {
        return ("Mac OS X".to_string(), caps[1].to_string());
    }
    if ua.contains("CrOS") {
        return ("Chrome OS".to_string(), "0".to_string());
    }
    if ua.contains("Linux") {
        return ("Linux".to_string(), "0".to_string());
    }
    (OTHER.to_string(), "0".to_string())
}

fn parse_device(ua: &str) -> String {
    if let Some(caps) = APPLE_DEVICE.captures(ua) {
        return caps[1].to_string();
    }
    if ua.contains("Android") {
        return if ua.contains("Mobile") {
            "Generic Smartphone".to_string()
        } else {
            "Generic Tablet".to_string()
        };
    }
    OTHER.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHROME_WINDOWS: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
    const SAFARI_IPHONE: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_1 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.1 Mobile/15E148 Safari/604.1";
    const FIREFOX_LINUX: &str =
        "Mozilla/5.0 (X11; Ubuntu; Linux x86_64; rv:121.0) Gecko/20100101 Firefox/121.0";
    const EDGE_WINDOWS: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36 Edg/120.0.2210.91";
    const CHROME_ANDROID: &str = "Mozilla/5.0 (Linux; Android 14; Pixel 8) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.6099.144 Mobile Safari/537.36";

    #[test]
    fn fingerprints_common_agents() {
        let resolver = UserAgentFingerprint::new();
        assert_eq!(
            resolver.fingerprint(CHROME_WINDOWS).as_deref(),
            Some("chrome-windows10-other")
        );
        assert_eq!(
            resolver.fingerprint(SAFARI_IPHONE).as_deref(),
            Some("mobile safari-ios17-iphone")
        );
        assert_eq!(
            resolver.fingerprint(FIREFOX_LINUX).as_deref(),
            Some("firefox-linux0-other")
        );
        assert_eq!(
            resolver.fingerprint(EDGE_WINDOWS).as_deref(),
            Some("edge-windows10-other")
        );
        assert_eq!(
            resolver.fingerprint(CHROME_ANDROID).as_deref(),
            Some("chrome mobile-android14-generic smartphone")
        );
    }

    #[test]
    fn blank_agents_have_no_fingerprint() {
        let resolver = UserAgentFingerprint::new();
        assert_eq!(resolver.fingerprint(""), None);
        assert_eq!(resolver.fingerprint("   "), None);
    }

    #[test]
    fn unrecognizable_agents_have_no_fingerprint() {
        let resolver = UserAgentFingerprint::new();
        assert_eq!(resolver.fingerprint("totally-unknown-client"), None);
    }

    #[test]
    fn partially_recognized_agents_fall_back_to_other() {
        let resolver = UserAgentFingerprint::new();
        assert_eq!(
            resolver.fingerprint("curl/8.4.0").as_deref(),
            Some("curl-other0-other")
        );
    }

    #[test]
    fn maps_legacy_windows_versions() {
        let parsed = UserAgentFingerprint::new()
            .parse("Mozilla/5.0 (Windows NT 6.1; WOW64; Trident/7.0; rv:11.0) like Gecko");
        assert_eq!(parsed.family, "IE");
        assert_eq!(parsed.os_family, "Windows");
        assert_eq!(parsed.os_major, "7");
    }
}
