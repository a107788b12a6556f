//! Platform enumeration and its static descriptor table

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A naming or profile system an identity can live on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Platform {
    #[serde(rename = "ethereum")]
    Ethereum,
    #[serde(rename = "ens")]
    Ens,
    #[serde(rename = "basenames")]
    Basenames,
    #[serde(rename = "linea")]
    Linea,
    #[serde(rename = "lens")]
    Lens,
    #[serde(rename = "farcaster")]
    Farcaster,
    #[serde(rename = "dotbit")]
    Dotbit,
    #[serde(rename = "sns")]
    Sns,
    #[serde(rename = "solana")]
    Solana,
    #[serde(rename = "unstoppabledomains")]
    UnstoppableDomains,
    #[serde(rename = "space_id")]
    SpaceId,
    #[serde(rename = "crossbell")]
    Crossbell,
    #[serde(rename = "bitcoin")]
    Bitcoin,
    #[serde(rename = "twitter")]
    Twitter,
    #[serde(rename = "github")]
    Github,
    #[serde(rename = "discord")]
    Discord,
    #[serde(rename = "telegram")]
    Telegram,
    #[serde(rename = "reddit")]
    Reddit,
    #[serde(rename = "linkedin")]
    Linkedin,
    #[serde(rename = "instagram")]
    Instagram,
    #[serde(rename = "website")]
    Website,
    #[serde(rename = "nextid")]
    Nextid,
}

/// Immutable per-platform metadata
#[derive(Debug)]
pub struct PlatformDescriptor {
    /// Wire key, as used by the identity graph backend
    pub key: &'static str,
    /// Classification pattern for bare handles, if the platform can be inferred
    pub pattern: Option<&'static str>,
    /// Default cross-platform ranking (lower first); unranked platforms sort last
    pub rank: Option<u8>,
    /// Whether the aggregation engine resolves this platform into profiles
    pub fetchable: bool,
    /// Profile URL template, `{}` is replaced by the handle
    pub link_template: Option<&'static str>,
}

impl Platform {
    pub const ALL: [Platform; 22] = [
        Platform::Ethereum,
        Platform::Ens,
        Platform::Basenames,
        Platform::Linea,
        Platform::Lens,
        Platform::Farcaster,
        Platform::Dotbit,
        Platform::Sns,
        Platform::Solana,
        Platform::UnstoppableDomains,
        Platform::SpaceId,
        Platform::Crossbell,
        Platform::Bitcoin,
        Platform::Twitter,
        Platform::Github,
        Platform::Discord,
        Platform::Telegram,
        Platform::Reddit,
        Platform::Linkedin,
        Platform::Instagram,
        Platform::Website,
        Platform::Nextid,
    ];

    pub fn descriptor(self) -> &'static PlatformDescriptor {
        match self {
            Platform::Ethereum => &ETHEREUM,
            Platform::Ens => &ENS,
            Platform::Basenames => &BASENAMES,
            Platform::Linea => &LINEA,
            Platform::Lens => &LENS,
            Platform::Farcaster => &FARCASTER,
            Platform::Dotbit => &DOTBIT,
            Platform::Sns => &SNS,
            Platform::Solana => &SOLANA,
            Platform::UnstoppableDomains => &UNSTOPPABLE_DOMAINS,
            Platform::SpaceId => &SPACE_ID,
            Platform::Crossbell => &CROSSBELL,
            Platform::Bitcoin => &BITCOIN,
            Platform::Twitter => &TWITTER,
            Platform::Github => &GITHUB,
            Platform::Discord => &DISCORD,
            Platform::Telegram => &TELEGRAM,
            Platform::Reddit => &REDDIT,
            Platform::Linkedin => &LINKEDIN,
            Platform::Instagram => &INSTAGRAM,
            Platform::Website => &WEBSITE,
            Platform::Nextid => &NEXTID,
        }
    }

    pub fn key(self) -> &'static str {
        self.descriptor().key
    }

    pub fn is_fetchable(self) -> bool {
        self.descriptor().fetchable
    }

    /// Name services whose identities are registrable domains
    pub fn is_domain_service(self) -> bool {
        matches!(
            self,
            Platform::Ens
                | Platform::Basenames
                | Platform::Linea
                | Platform::Lens
                | Platform::Farcaster
                | Platform::Dotbit
                | Platform::Sns
                | Platform::UnstoppableDomains
        )
    }

    /// Chain address platforms whose identity is the address itself
    pub fn is_address(self) -> bool {
        matches!(
            self,
            Platform::Ethereum | Platform::Solana | Platform::Bitcoin
        )
    }

    /// Platforms an identity graph links to as off-chain social accounts
    pub fn is_web2(self) -> bool {
        matches!(
            self,
            Platform::Twitter
                | Platform::Github
                | Platform::Discord
                | Platform::Telegram
                | Platform::Reddit
                | Platform::Linkedin
                | Platform::Instagram
                | Platform::Website
        )
    }

    /// Build the public profile URL for a handle on this platform
    pub fn profile_link(self, handle: &str) -> Option<String> {
        let template = self.descriptor().link_template?;
        let handle = match self {
            Platform::Lens => handle.strip_suffix(".lens").unwrap_or(handle),
            Platform::Twitter | Platform::Github | Platform::Instagram => {
                handle.trim_start_matches('@')
            }
            Platform::Website => handle
                .trim_start_matches("https://")
                .trim_start_matches("http://"),
            _ => handle,
        };
        Some(template.replace("{}", handle))
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Error returned when a string names no known platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownPlatform(pub String);

impl fmt::Display for UnknownPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown platform: {}", self.0)
    }
}

impl std::error::Error for UnknownPlatform {}

impl FromStr for Platform {
    type Err = UnknownPlatform;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        if let Some(platform) = Platform::ALL.iter().find(|p| p.key() == lowered) {
            return Ok(*platform);
        }
        match lowered.as_str() {
            "eth" => Ok(Platform::Ethereum),
            "unstoppable_domains" | "ud" => Ok(Platform::UnstoppableDomains),
            "bit" => Ok(Platform::Dotbit),
            "spaceid" => Ok(Platform::SpaceId),
            "x" => Ok(Platform::Twitter),
            "web2" => Ok(Platform::Nextid),
            _ => Err(UnknownPlatform(s.to_string())),
        }
    }
}

static ETHEREUM: PlatformDescriptor = PlatformDescriptor {
    key: "ethereum",
    pattern: Some(r"(?i)^0x[a-f0-9]{40}$"),
    rank: Some(5),
    fetchable: true,
    link_template: Some("https://etherscan.io/address/{}"),
};

static ENS: PlatformDescriptor = PlatformDescriptor {
    key: "ens",
    pattern: Some(r"(?i)^.+\.(eth|xyz|bio|app|luxe|kred|art|ceo|club|box)$"),
    rank: Some(1),
    fetchable: true,
    link_template: Some("https://app.ens.domains/{}"),
};

static BASENAMES: PlatformDescriptor = PlatformDescriptor {
    key: "basenames",
    pattern: Some(r"(?i)^.+\.base(\.eth)?$"),
    rank: None,
    fetchable: true,
    link_template: Some("https://www.base.org/name/{}"),
};

static LINEA: PlatformDescriptor = PlatformDescriptor {
    key: "linea",
    pattern: Some(r"(?i)^.+\.linea(\.eth)?$"),
    rank: None,
    fetchable: true,
    link_template: Some("https://names.linea.build/{}"),
};

static LENS: PlatformDescriptor = PlatformDescriptor {
    key: "lens",
    pattern: Some(r"(?i)^(lens/.+|.+\.lens)$"),
    rank: Some(3),
    fetchable: true,
    link_template: Some("https://hey.xyz/u/{}"),
};

static FARCASTER: PlatformDescriptor = PlatformDescriptor {
    key: "farcaster",
    pattern: Some(r"(?i)^([a-z0-9][a-z0-9_-]{0,60}(\.farcaster|\.fcast\.id)?|#\d+)$"),
    rank: Some(2),
    fetchable: true,
    link_template: Some("https://warpcast.com/{}"),
};

static DOTBIT: PlatformDescriptor = PlatformDescriptor {
    key: "dotbit",
    pattern: Some(r"(?i)^.+\.bit$"),
    rank: None,
    fetchable: true,
    link_template: Some("https://d.id/{}"),
};

static SNS: PlatformDescriptor = PlatformDescriptor {
    key: "sns",
    pattern: Some(r"(?i)^.+\.sol$"),
    rank: None,
    fetchable: true,
    link_template: Some("https://www.sns.id/domain/{}"),
};

static SOLANA: PlatformDescriptor = PlatformDescriptor {
    key: "solana",
    pattern: Some(r"^[1-9A-HJ-NP-Za-km-z]{32,44}$"),
    rank: None,
    fetchable: true,
    link_template: Some("https://solscan.io/account/{}"),
};

static UNSTOPPABLE_DOMAINS: PlatformDescriptor = PlatformDescriptor {
    key: "unstoppabledomains",
    pattern: Some(concat!(
        r"(?i)^.+\.(crypto|888|nft|blockchain|bitcoin|dao|x|klever|hi|zil|kresus|",
        r"polygon|wallet|binanceus|anime|go|manga|unstoppable|pudgy)$"
    )),
    rank: Some(4),
    fetchable: true,
    link_template: Some("https://ud.me/{}"),
};

static SPACE_ID: PlatformDescriptor = PlatformDescriptor {
    key: "space_id",
    pattern: Some(r"(?i)^.+\.(bnb|arb)$"),
    rank: None,
    fetchable: false,
    link_template: None,
};

static CROSSBELL: PlatformDescriptor = PlatformDescriptor {
    key: "crossbell",
    pattern: Some(r"(?i)^.+\.csb$"),
    rank: None,
    fetchable: false,
    link_template: Some("https://xchar.app/{}"),
};

static BITCOIN: PlatformDescriptor = PlatformDescriptor {
    key: "bitcoin",
    pattern: Some(r"^([13][a-km-zA-HJ-NP-Z1-9]{25,34}|bc1[qp][a-z0-9]{11,71})$"),
    rank: None,
    fetchable: false,
    link_template: None,
};

static TWITTER: PlatformDescriptor = PlatformDescriptor {
    key: "twitter",
    pattern: Some(r"(?i)^[a-z0-9_]{1,15}\.twitter$"),
    rank: None,
    fetchable: false,
    link_template: Some("https://x.com/{}"),
};

static GITHUB: PlatformDescriptor = PlatformDescriptor {
    key: "github",
    pattern: None,
    rank: None,
    fetchable: false,
    link_template: Some("https://github.com/{}"),
};

static DISCORD: PlatformDescriptor = PlatformDescriptor {
    key: "discord",
    pattern: None,
    rank: None,
    fetchable: false,
    link_template: None,
};

static TELEGRAM: PlatformDescriptor = PlatformDescriptor {
    key: "telegram",
    pattern: None,
    rank: None,
    fetchable: false,
    link_template: Some("https://t.me/{}"),
};

static REDDIT: PlatformDescriptor = PlatformDescriptor {
    key: "reddit",
    pattern: None,
    rank: None,
    fetchable: false,
    link_template: Some("https://www.reddit.com/user/{}"),
};

static LINKEDIN: PlatformDescriptor = PlatformDescriptor {
    key: "linkedin",
    pattern: None,
    rank: None,
    fetchable: false,
    link_template: Some("https://www.linkedin.com/in/{}"),
};

static INSTAGRAM: PlatformDescriptor = PlatformDescriptor {
    key: "instagram",
    pattern: None,
    rank: None,
    fetchable: false,
    link_template: Some("https://www.instagram.com/{}"),
};

static WEBSITE: PlatformDescriptor = PlatformDescriptor {
    key: "website",
    pattern: None,
    rank: None,
    fetchable: false,
    link_template: Some("https://{}"),
};

static NEXTID: PlatformDescriptor = PlatformDescriptor {
    key: "nextid",
    pattern: None,
    rank: None,
    fetchable: false,
    link_template: None,
};
