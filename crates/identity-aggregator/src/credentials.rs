//! Credential aggregation into isHuman / isRisky / isSpam verdicts

use identity_graph_client::{CredentialCategory, CredentialRecord, IdentityGraphVertex};
use tracing::warn;

use crate::types::{CredentialAggregate, CredentialSummary};

/// Sources whose numeric score counts toward humanity
const PASSPORT_SOURCES: [&str; 3] = ["humanpassport", "gitcoinpassport", "passport"];
const PASSPORT_THRESHOLD: f64 = 20.0;

/// Risk types that flag an identity when their value is `true`
const RISK_TYPES: [&str; 6] = [
    "high_risk",
    "hacker",
    "scam",
    "phishing",
    "sanctioned",
    "malicious",
];

const SPAM_SOURCE: &str = "warpcast";
const SPAM_TYPE: &str = "score";

/// How the isHuman verdict is decided
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HumanPolicy {
    /// Any isHuman credential makes the identity human
    Presence,
    /// A literal `true`, or a passport score at or above the threshold
    Threshold,
}

/// Decode the vertex's credentials, dropping records that do not parse
pub fn parse_credentials(vertex: &IdentityGraphVertex) -> Vec<CredentialRecord> {
    vertex
        .credentials
        .iter()
        .filter_map(|raw| match serde_json::from_value(raw.clone()) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(
                    platform = %vertex.platform,
                    identity = %vertex.identity,
                    error = %e,
                    "Skipping malformed credential"
                );
                None
            }
        })
        .collect()
}

fn numeric(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok()
}

fn human_verdict(record: &CredentialRecord, policy: HumanPolicy) -> bool {
    match policy {
        HumanPolicy::Presence => true,
        HumanPolicy::Threshold => {
            record.value == "true"
                || (PASSPORT_SOURCES.contains(&record.data_source.to_lowercase().as_str())
                    && numeric(&record.value).is_some_and(|score| score >= PASSPORT_THRESHOLD))
        }
    }
}

fn risk_verdict(record: &CredentialRecord) -> bool {
    RISK_TYPES.contains(&record.credential_type.to_lowercase().as_str())
        && record.value == "true"
}

fn spam_verdict(record: &CredentialRecord) -> bool {
    record.data_source.eq_ignore_ascii_case(SPAM_SOURCE)
        && record.credential_type.eq_ignore_ascii_case(SPAM_TYPE)
        && numeric(&record.value) == Some(0.0)
}

fn summarize(
    records: &[CredentialRecord],
    category: CredentialCategory,
    verdict: impl Fn(&CredentialRecord) -> bool,
) -> Option<CredentialSummary> {
    let sources: Vec<CredentialRecord> = records
        .iter()
        .filter(|r| r.category == category)
        .cloned()
        .collect();
    if sources.is_empty() {
        return None;
    }
    Some(CredentialSummary {
        value: sources.iter().any(&verdict),
        sources,
    })
}

/// Aggregate already-decoded credential records. Every record of a category
/// is kept in its sources, including duplicates from the same provider.
pub fn aggregate_records(records: &[CredentialRecord], policy: HumanPolicy) -> CredentialAggregate {
    CredentialAggregate {
        is_human: summarize(records, CredentialCategory::IsHuman, |r| {
            human_verdict(r, policy)
        }),
        is_risky: summarize(records, CredentialCategory::IsRisky, risk_verdict),
        is_spam: summarize(records, CredentialCategory::IsSpam, spam_verdict),
    }
}

/// Aggregate the credentials of several vertices as one identity
pub fn aggregate<'a>(
    vertices: impl IntoIterator<Item = &'a IdentityGraphVertex>,
    policy: HumanPolicy,
) -> CredentialAggregate {
    let records: Vec<CredentialRecord> = vertices.into_iter().flat_map(parse_credentials).collect();
    aggregate_records(&records, policy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn vertex(credentials: serde_json::Value) -> IdentityGraphVertex {
        serde_json::from_value(json!({
            "platform": "ethereum",
            "identity": "0xd8da6bf26964af9d7eed9e03e53415d37aa96045",
            "credentials": credentials,
        }))
        .unwrap()
    }

    #[test]
    fn test_presence_versus_threshold() {
        let v = vertex(json!([
            {"category": "isHuman", "dataSource": "humanpassport", "type": "score", "value": 12},
            {"category": "isHuman", "dataSource": "talent", "type": "score", "value": "85"}
        ]));

        let presence = aggregate([&v], HumanPolicy::Presence);
        assert!(presence.is_human.as_ref().unwrap().value);

        let threshold = aggregate([&v], HumanPolicy::Threshold);
        let human = threshold.is_human.unwrap();
        assert!(!human.value);
        assert_eq!(human.sources.len(), 2);
    }

    #[test]
    fn test_threshold_passport_score_and_literal_true() {
        let passport = vertex(json!([
            {"category": "isHuman", "dataSource": "humanpassport", "type": "score", "value": 20}
        ]));
        assert!(aggregate([&passport], HumanPolicy::Threshold).is_human.unwrap().value);

        let verified = vertex(json!([
            {"category": "isHuman", "dataSource": "coinbase",
             "type": "verified_account", "value": true}
        ]));
        assert!(aggregate([&verified], HumanPolicy::Threshold).is_human.unwrap().value);
    }

    #[test]
    fn test_threshold_true_is_case_sensitive() {
        let shouted = vertex(json!([
            {"category": "isHuman", "dataSource": "coinbase",
             "type": "verified_account", "value": "TRUE"},
            {"category": "isRisky", "dataSource": "webacy", "type": "hacker", "value": "True"}
        ]));
        let verdicts = aggregate([&shouted], HumanPolicy::Threshold);

        let human = verdicts.is_human.unwrap();
        assert!(!human.value);
        assert_eq!(human.sources.len(), 1);
        assert!(!verdicts.is_risky.unwrap().value);
    }

    #[test]
    fn test_risky_keeps_every_source() {
        let v = vertex(json!([
            {"category": "isRisky", "dataSource": "webacy", "type": "high_risk", "value": "false"},
            {"category": "isRisky", "dataSource": "webacy", "type": "sanctioned", "value": "true"},
            {"category": "isRisky", "dataSource": "webacy", "type": "note", "value": "true"}
        ]));
        let risky = aggregate([&v], HumanPolicy::Presence).is_risky.unwrap();
        assert!(risky.value);
        assert_eq!(risky.sources.len(), 3);
    }

    #[test]
    fn test_spam_requires_zero_score_from_spam_source() {
        let flagged = vertex(json!([
            {"category": "isSpam", "dataSource": "warpcast", "type": "score", "value": 0}
        ]));
        assert!(aggregate([&flagged], HumanPolicy::Presence).is_spam.unwrap().value);

        let other = vertex(json!([
            {"category": "isSpam", "dataSource": "elsewhere", "type": "score", "value": 0},
            {"category": "isSpam", "dataSource": "warpcast", "type": "score", "value": 2}
        ]));
        assert!(!aggregate([&other], HumanPolicy::Presence).is_spam.unwrap().value);
    }

    #[test]
    fn test_malformed_records_are_skipped() {
        let v = vertex(json!([
            {"category": "isWeird", "dataSource": "x", "value": "true"},
            "garbage",
            {"category": "isHuman", "dataSource": "talent", "type": "score", "value": 1}
        ]));
        assert_eq!(parse_credentials(&v).len(), 1);
        let result = aggregate([&v], HumanPolicy::Presence);
        assert!(result.is_human.is_some());
        assert!(result.is_risky.is_none());
        assert!(result.is_spam.is_none());
    }

    #[test]
    fn test_no_credentials_is_empty() {
        let v = vertex(json!(null));
        assert!(aggregate([&v], HumanPolicy::Threshold).is_empty());
    }
}
