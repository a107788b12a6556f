//! Pure URI normalization: gateways, proxies and token references

use regex::Regex;
use std::sync::LazyLock;

pub const IPFS_GATEWAY: &str = "https://ipfs.io/ipfs/";
pub const ARWEAVE_GATEWAY: &str = "https://arweave.net/";

/// Prefixes that wrap an IPFS path, canonical gateway first
const IPFS_PREFIXES: [&str; 12] = [
    "https://ipfs.io/ipfs/",
    "http://ipfs.io/ipfs/",
    "https://gateway.pinata.cloud/ipfs/",
    "https://cloudflare-ipfs.com/ipfs/",
    "https://ipfs.infura.io/ipfs/",
    "https://gateway.ipfscdn.io/ipfs/",
    "https://nftstorage.link/ipfs/",
    "https://dweb.link/ipfs/",
    "ipfs://ipfs/",
    "ipfs://",
    "/ipfs/",
    "ipfs/",
];

const CORS_PROXIES: [&str; 3] = [
    "https://cors.r2d2.to/?",
    "https://corsproxy.io/?",
    "https://cors-anywhere.herokuapp.com/",
];

static CID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(Qm[1-9A-HJ-NP-Za-km-z]{44}|b[a-z2-7]{58,})([/?#].*)?$").unwrap()
});

static EIP155_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^eip155:(\d+)/(erc721|erc1155):(0x[a-f0-9]{40})/(\d+)$").unwrap()
});

/// An EIP-155 NFT reference, `eip155:<chain>/<standard>:<contract>/<token>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenRef {
    pub chain_id: u64,
    pub standard: String,
    pub contract: String,
    pub token_id: String,
}

impl TokenRef {
    pub fn parse(uri: &str) -> Option<Self> {
        let caps = EIP155_RE.captures(uri)?;
        Some(Self {
            chain_id: caps[1].parse().ok()?,
            standard: caps[2].to_ascii_lowercase(),
            contract: caps[3].to_ascii_lowercase(),
            token_id: caps[4].to_string(),
        })
    }

    /// NFT provider network key for the chain
    pub fn network(&self) -> Option<&'static str> {
        match self.chain_id {
            1 => Some("ethereum"),
            10 => Some("optimism"),
            56 => Some("bsc"),
            137 => Some("polygon"),
            8453 => Some("base"),
            42161 => Some("arbitrum"),
            59144 => Some("linea"),
            7777777 => Some("zora"),
            _ => None,
        }
    }
}

/// Outcome of static normalization
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetUri {
    /// A fetchable URL
    Resolved(String),
    /// Needs an NFT metadata lookup
    Token(TokenRef),
    /// Unrecognized; served as given
    Opaque(String),
}

fn unwrap_cors_proxy(uri: &str) -> String {
    let mut current = uri.to_string();
    while let Some(inner) = CORS_PROXIES
        .iter()
        .find_map(|proxy| current.strip_prefix(proxy))
    {
        current = urlencoding::decode(inner)
            .map(|decoded| decoded.into_owned())
            .unwrap_or_else(|_| inner.to_string());
    }
    current
}

/// Strip any known gateway prefix and return the CID path, if the URI is IPFS
pub fn ipfs_path(uri: &str) -> Option<String> {
    let stripped = IPFS_PREFIXES
        .iter()
        .find_map(|prefix| uri.strip_prefix(prefix))
        .unwrap_or(uri);
    CID_RE.is_match(stripped).then(|| stripped.to_string())
}

/// Normalize a URI without any network access
pub fn classify_asset(uri: &str) -> AssetUri {
    let uri = unwrap_cors_proxy(uri.trim());

    if uri.starts_with("data:") {
        return AssetUri::Resolved(uri);
    }
    if let Some(rest) = uri.strip_prefix("ar://") {
        return AssetUri::Resolved(format!("{ARWEAVE_GATEWAY}{rest}"));
    }
    if let Some(path) = ipfs_path(&uri) {
        return AssetUri::Resolved(format!("{IPFS_GATEWAY}{path}"));
    }
    if let Some(token) = TokenRef::parse(&uri) {
        return AssetUri::Token(token);
    }
    if uri.starts_with("https://") {
        return AssetUri::Resolved(uri);
    }
    AssetUri::Opaque(uri)
}
