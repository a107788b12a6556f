//! Handle → (platform, identity) classification

use crate::platform::Platform;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

/// A classified, canonicalized identity
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity {
    pub platform: Platform,
    /// Canonical form as used by the identity graph backend
    pub handle: String,
}

impl Identity {
    /// Build an identity, normalizing the handle for the platform
    pub fn new(platform: Platform, handle: &str) -> Self {
        Self {
            platform,
            handle: normalize_handle(platform, handle),
        }
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.platform, self.handle)
    }
}

/// Inference order for bare handles. First match wins, even when a later
/// entry would be more specific. Twitter only claims `.twitter`-suffixed
/// handles, so a bare short name falls through to Farcaster.
pub const CLASSIFICATION_ORDER: [Platform; 15] = [
    Platform::Basenames,
    Platform::Linea,
    Platform::Ens,
    Platform::Ethereum,
    Platform::Lens,
    Platform::UnstoppableDomains,
    Platform::SpaceId,
    Platform::Crossbell,
    Platform::Dotbit,
    Platform::Sns,
    Platform::Bitcoin,
    Platform::Solana,
    Platform::Twitter,
    Platform::Farcaster,
    Platform::Nextid,
];

/// Platform used when no pattern matches
pub const FALLBACK_PLATFORM: Platform = Platform::Nextid;

static RULES: LazyLock<Vec<(Regex, Platform)>> = LazyLock::new(|| {
    CLASSIFICATION_ORDER
        .iter()
        .filter_map(|platform| {
            let pattern = platform.descriptor().pattern?;
            Some((Regex::new(pattern).unwrap(), *platform))
        })
        .collect()
});

static ETH_ADDRESS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^0x[a-f0-9]{40}$").unwrap());

const BURN_ADDRESSES: [&str; 2] = [
    "0x0000000000000000000000000000000000000000",
    "0x000000000000000000000000000000000000dead",
];

/// Classify a raw handle.
///
/// Accepts either the explicit `platform,identity` form or a bare handle.
/// Returns `None` only for empty, non-printable, or unparseable explicit input.
pub fn classify(raw: &str) -> Option<Identity> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.chars().any(|c| c.is_control() || c.is_whitespace()) {
        return None;
    }

    if let Some((platform, handle)) = trimmed.split_once(',') {
        let platform = platform.parse::<Platform>().ok()?;
        if handle.is_empty() {
            return None;
        }
        return Some(Identity::new(platform, handle));
    }

    Some(Identity::new(infer_platform(trimmed), trimmed))
}

/// Infer the platform of a bare handle from the ordered pattern table
pub fn infer_platform(handle: &str) -> Platform {
    RULES
        .iter()
        .find(|(re, _)| re.is_match(handle))
        .map(|(_, platform)| *platform)
        .unwrap_or(FALLBACK_PLATFORM)
}

/// Whether a handle is acceptable when the platform is fixed by the caller.
///
/// Checks the platform's own pattern rather than inference order, so
/// `dwr.eth` is a valid Farcaster name even though a bare `dwr.eth` infers ENS.
pub fn accepts_handle(platform: Platform, raw: &str) -> bool {
    let raw = raw.trim();
    if raw.is_empty() || raw.chars().any(|c| c.is_control() || c.is_whitespace()) {
        return false;
    }
    let Some(pattern) = RULES
        .iter()
        .find(|(_, candidate)| *candidate == platform)
        .map(|(re, _)| re)
    else {
        return false;
    };
    let normalized = normalize_handle(platform, raw);
    if pattern.is_match(raw) || pattern.is_match(&normalized) {
        return true;
    }
    // fnames may be ENS names
    platform == Platform::Farcaster && infer_platform(raw) == Platform::Ens
}

/// Canonicalize a handle for a platform
pub fn normalize_handle(platform: Platform, handle: &str) -> String {
    let handle = handle.trim();
    match platform {
        // base58 is case-sensitive
        Platform::Solana | Platform::Bitcoin => handle.to_string(),
        Platform::Lens => {
            let lowered = handle.to_lowercase();
            let name = lowered.strip_prefix("lens/").unwrap_or(&lowered);
            if name.ends_with(".lens") {
                name.to_string()
            } else {
                format!("{name}.lens")
            }
        }
        Platform::Farcaster => {
            let lowered = handle.to_lowercase();
            lowered
                .strip_suffix(".farcaster")
                .or_else(|| lowered.strip_suffix(".fcast.id"))
                .unwrap_or(&lowered)
                .to_string()
        }
        Platform::Twitter => {
            let lowered = handle.to_lowercase();
            lowered
                .strip_suffix(".twitter")
                .unwrap_or(&lowered)
                .trim_start_matches('@')
                .to_string()
        }
        _ => handle.to_lowercase(),
    }
}

/// Whether an address is a syntactically valid, non-burn Ethereum address
pub fn is_valid_ethereum_address(address: &str) -> bool {
    ETH_ADDRESS_RE.is_match(address) && !is_burn_address(address)
}

pub fn is_burn_address(address: &str) -> bool {
    let lowered = address.to_ascii_lowercase();
    BURN_ADDRESSES.contains(&lowered.as_str())
}

/// Shorten an address for display, e.g. `0xd8da…6045`
pub fn truncate_address(address: &str) -> String {
    if address.len() <= 12 || !address.is_ascii() {
        return address.to_string();
    }
    format!("{}...{}", &address[..6], &address[address.len() - 4..])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn platform_of(raw: &str) -> Platform {
        classify(raw).unwrap().platform
    }

    #[test]
    fn test_explicit_form_wins() {
        let identity = classify("ens,sujiyan.eth").unwrap();
        assert_eq!(identity.platform, Platform::Ens);
        assert_eq!(identity.handle, "sujiyan.eth");

        // Would infer as farcaster, but the prefix decides
        let identity = classify("lens,stani").unwrap();
        assert_eq!(identity.platform, Platform::Lens);
        assert_eq!(identity.handle, "stani.lens");
    }

    #[test]
    fn test_explicit_form_unknown_platform() {
        assert!(classify("myspace,tom").is_none());
        assert!(classify("ens,").is_none());
    }

    #[test]
    fn test_empty_and_non_printable() {
        assert!(classify("").is_none());
        assert!(classify("   ").is_none());
        assert!(classify("vitalik\u{0007}.eth").is_none());
        assert!(classify("two words").is_none());
    }

    #[test]
    fn test_implicit_patterns() {
        assert_eq!(platform_of("vitalik.eth"), Platform::Ens);
        assert_eq!(platform_of("jesse.base.eth"), Platform::Basenames);
        assert_eq!(platform_of("name.linea.eth"), Platform::Linea);
        assert_eq!(
            platform_of("0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045"),
            Platform::Ethereum
        );
        assert_eq!(platform_of("stani.lens"), Platform::Lens);
        assert_eq!(platform_of("lens/stani"), Platform::Lens);
        assert_eq!(platform_of("brad.crypto"), Platform::UnstoppableDomains);
        assert_eq!(platform_of("name.bnb"), Platform::SpaceId);
        assert_eq!(platform_of("song.csb"), Platform::Crossbell);
        assert_eq!(platform_of("bestcoin.bit"), Platform::Dotbit);
        assert_eq!(platform_of("bonfida.sol"), Platform::Sns);
        assert_eq!(
            platform_of("bc1qar0srrr7xfkvy5l643lydnw9re59gtzzwf5mdq"),
            Platform::Bitcoin
        );
        assert_eq!(
            platform_of("HKKp49qGWXd639QsuH7JiLijfVW5UtCVY4s1n2HANwEA"),
            Platform::Solana
        );
        assert_eq!(platform_of("jack.twitter"), Platform::Twitter);
        assert_eq!(platform_of("dwr"), Platform::Farcaster);
        assert_eq!(platform_of("dwr.farcaster"), Platform::Farcaster);
        assert_eq!(platform_of("#3"), Platform::Farcaster);
    }

    #[test]
    fn test_fallback_to_nextid() {
        assert_eq!(platform_of("not-a-real-handle.zzz"), Platform::Nextid);
    }

    #[test]
    fn test_first_listed_pattern_wins() {
        // Legacy bitcoin address is also valid base58 of Solana length
        let raw = "1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa";
        assert!(Platform::Solana.descriptor().pattern.is_some());
        assert_eq!(platform_of(raw), Platform::Bitcoin);

        // .base.eth also ends in .eth
        assert_eq!(platform_of("jesse.base.eth"), Platform::Basenames);

        // .farcaster.eth is still claimed by the ENS rule listed before farcaster
        assert_eq!(platform_of("dwr.farcaster.eth"), Platform::Ens);
    }

    #[test]
    fn test_bare_short_name_is_farcaster() {
        assert_eq!(platform_of("jack"), Platform::Farcaster);
        assert_eq!(platform_of("jack_"), Platform::Farcaster);
        assert_eq!(platform_of("jack.twitter"), Platform::Twitter);

        let explicit = classify("twitter,jack").unwrap();
        assert_eq!(explicit.platform, Platform::Twitter);
        assert_eq!(explicit.handle, "jack");
    }

    #[test]
    fn test_normalization() {
        let identity = classify("Vitalik.ETH").unwrap();
        assert_eq!(identity.handle, "vitalik.eth");

        let identity = classify("0xD8DA6BF26964AF9D7EED9E03E53415D37AA96045").unwrap();
        assert_eq!(identity.handle, "0xd8da6bf26964af9d7eed9e03e53415d37aa96045");

        let identity = classify("HKKp49qGWXd639QsuH7JiLijfVW5UtCVY4s1n2HANwEA").unwrap();
        assert_eq!(identity.handle, "HKKp49qGWXd639QsuH7JiLijfVW5UtCVY4s1n2HANwEA");

        let identity = classify("dwr.fcast.id").unwrap();
        assert_eq!(identity.handle, "dwr");

        let identity = classify("lens/Stani").unwrap();
        assert_eq!(identity.handle, "stani.lens");

        let identity = classify("jack.twitter").unwrap();
        assert_eq!(identity.handle, "jack");
    }

    #[test]
    fn test_burn_addresses_are_not_valid() {
        assert!(!is_valid_ethereum_address(
            "0x000000000000000000000000000000000000dEaD"
        ));
        assert!(!is_valid_ethereum_address(
            "0x0000000000000000000000000000000000000000"
        ));
        assert!(is_valid_ethereum_address(
            "0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045"
        ));
        assert!(!is_valid_ethereum_address("0x1234"));
    }

    #[test]
    fn test_truncate_address() {
        assert_eq!(
            truncate_address("0xd8da6bf26964af9d7eed9e03e53415d37aa96045"),
            "0xd8da...6045"
        );
        assert_eq!(truncate_address("short"), "short");
    }

    #[test]
    fn test_identity_display() {
        let identity = Identity::new(Platform::Ens, "Vitalik.eth");
        assert_eq!(identity.to_string(), "ens,vitalik.eth");
    }

    #[test]
    fn test_accepts_handle_for_fixed_platform() {
        assert!(accepts_handle(Platform::Farcaster, "dwr"));
        assert!(accepts_handle(Platform::Farcaster, "dwr.eth"));
        assert!(accepts_handle(Platform::Lens, "stani"));
        assert!(accepts_handle(Platform::Ens, "vitalik.eth"));
        assert!(!accepts_handle(Platform::Ens, "vitalik"));
        assert!(!accepts_handle(
            Platform::Ethereum,
            "not-an-address"
        ));
        assert!(!accepts_handle(Platform::Github, "octocat"));
        assert!(!accepts_handle(Platform::Farcaster, " "));
    }
}
