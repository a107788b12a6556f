//! Asset Resolver
//!
//! Normalizes avatar and contenthash URIs into stable gateway URLs:
//! `ar://` to Arweave, `ipfs://` and bare CIDs (including foreign gateways and
//! CORS-proxied links) to one IPFS gateway, and EIP-155 NFT references to the
//! token image reported by an NFT metadata provider.

mod error;
mod resolver;
mod uri;

pub use error::{AssetError, Result};
pub use resolver::{AssetResolver, DEFAULT_NFT_API_URL};
pub use uri::{classify_asset, ipfs_path, AssetUri, TokenRef, ARWEAVE_GATEWAY, IPFS_GATEWAY};
