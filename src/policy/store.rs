use anyhow::{Context, Result};
use aws_sdk_iam::{types::PolicyScopeType, Client};
use aws_smithy_types::DateTime;
use percent_encoding::percent_decode_str;
use serde_json::Value;
use tracing::{debug, info};

use super::MAX_POLICY_VERSIONS;
use crate::errors::ProvisionError;

/// The live policy a run reconciles against.
#[derive(Debug, Clone)]
pub struct CurrentPolicy {
    pub arn: String,
    pub document: Value,
}

/// Reads and publishes versions of a named customer-managed policy.
pub struct PolicyStore<'a> {
    iam: &'a Client,
}

impl<'a> PolicyStore<'a> {
    pub fn new(iam: &'a Client) -> Self {
        Self { iam }
    }

    /// Locate the policy by name among account-local policies and return the
    /// document of its most recent version.
    ///
    /// The read is also where history compaction happens: at the retention
    /// cap the oldest version is deleted so the next publish has room.
    pub async fn get_current(&self, policy_name: &str) -> Result<CurrentPolicy, ProvisionError> {
        let arn = self
            .find_policy_arn(policy_name)
            .await
            .map_err(|cause| ProvisionError::CheckFailed { kind: "IAM policy", cause })?
            .ok_or_else(|| ProvisionError::PolicyNotFound { name: policy_name.to_string() })?;

        let versions = self
            .list_versions(&arn)
            .await
            .map_err(|cause| ProvisionError::CheckFailed { kind: "IAM policy versions", cause })?;
        let Some(current) = newest(&versions) else {
            return Err(ProvisionError::NoPolicyVersions { arn });
        };
        let current_id = current.version_id.clone();

        if versions.len() >= MAX_POLICY_VERSIONS {
            // min-timestamp eviction keeps the next create_policy_version
            // under the IAM per-policy version limit
            if let Some(old) = oldest(&versions) {
                info!(
                    "{} policy versions found for {arn}, deleting the oldest ({})",
                    versions.len(),
                    old.version_id
                );
                self.iam
                    .delete_policy_version()
                    .policy_arn(arn.as_str())
                    .version_id(old.version_id.as_str())
                    .send()
                    .await
                    .with_context(|| {
                        format!("Failed to delete policy version {} of {arn}", old.version_id)
                    })
                    .map_err(|cause| ProvisionError::CheckFailed {
                        kind: "IAM policy versions",
                        cause,
                    })?;
            }
        }

        let document = self
            .fetch_document(&arn, &current_id)
            .await
            .map_err(|cause| ProvisionError::CheckFailed { kind: "IAM policy document", cause })?;
        Ok(CurrentPolicy { arn, document })
    }

    /// Create a new version from `document` and make it the default. The
    /// only mutating policy operation; callers invoke it only after
    /// reconciliation produced a genuine change.
    ///
    /// There is no optimistic check that the current version is still the
    /// one this run read; two concurrent runs can race here and the later
    /// default silently wins.
    pub async fn publish(&self, policy_arn: &str, document: &Value) -> Result<()> {
        info!("updating IAM policy {policy_arn}");
        let body =
            serde_json::to_string(document).context("Failed to serialize policy document")?;
        self.iam
            .create_policy_version()
            .policy_arn(policy_arn)
            .policy_document(body)
            .set_as_default(true)
            .send()
            .await
            .with_context(|| format!("Failed to create a new version of {policy_arn}"))?;
        Ok(())
    }

    async fn find_policy_arn(&self, policy_name: &str) -> Result<Option<String>> {
        let mut marker: Option<String> = None;
        loop {
            let mut req = self.iam.list_policies().scope(PolicyScopeType::Local);
            if let Some(m) = &marker {
                req = req.marker(m.as_str());
            }
            let resp = req.send().await.context("Failed to list account-local policies")?;
            for policy in resp.policies() {
                if policy.policy_name() == Some(policy_name) {
                    if let Some(arn) = policy.arn() {
                        return Ok(Some(arn.to_string()));
                    }
                }
            }
            match resp.marker() {
                Some(m) => marker = Some(m.to_string()),
                None => return Ok(None),
            }
        }
    }

    async fn list_versions(&self, policy_arn: &str) -> Result<Vec<VersionInfo>> {
        let resp = self
            .iam
            .list_policy_versions()
            .policy_arn(policy_arn)
            .send()
            .await
            .with_context(|| format!("Failed to list versions of {policy_arn}"))?;
        let versions: Vec<VersionInfo> = resp
            .versions()
            .iter()
            .map(|v| VersionInfo {
                version_id: v.version_id().unwrap_or_default().to_string(),
                create_date: v.create_date().cloned(),
            })
            .collect();
        debug!("{policy_arn} has {} versions", versions.len());
        Ok(versions)
    }

    async fn fetch_document(&self, policy_arn: &str, version_id: &str) -> Result<Value> {
        let resp = self
            .iam
            .get_policy_version()
            .policy_arn(policy_arn)
            .version_id(version_id)
            .send()
            .await
            .with_context(|| format!("Failed to fetch version {version_id} of {policy_arn}"))?;
        let raw = resp
            .policy_version()
            .and_then(|v| v.document())
            .with_context(|| format!("Version {version_id} of {policy_arn} has no document"))?;
        decode_document(raw)
    }
}

/// A policy version, reduced to what selection and compaction need.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct VersionInfo {
    pub version_id: String,
    pub create_date: Option<DateTime>,
}

fn date_key(version: &VersionInfo) -> (i64, u32) {
    version.create_date.map(|d| (d.secs(), d.subsec_nanos())).unwrap_or((i64::MIN, 0))
}

/// The version with the greatest creation timestamp, i.e. the current one.
pub(crate) fn newest(versions: &[VersionInfo]) -> Option<&VersionInfo> {
    versions.iter().max_by_key(|v| date_key(v))
}

/// The version with the smallest creation timestamp, i.e. the one evicted at
/// the retention cap.
pub(crate) fn oldest(versions: &[VersionInfo]) -> Option<&VersionInfo> {
    versions.iter().min_by_key(|v| date_key(v))
}

/// IAM hands documents back URL-encoded; some tooling additionally wraps
/// them in a JSON string.
pub(crate) fn decode_document(raw: &str) -> Result<Value> {
    let decoded = percent_decode_str(raw)
        .decode_utf8()
        .context("Policy document is not valid UTF-8 after URL-decoding")?
        .into_owned();
    let decoded = if decoded.starts_with('"') {
        serde_json::from_str::<String>(&decoded).unwrap_or(decoded)
    } else {
        decoded
    };
    serde_json::from_str(&decoded).context("Failed to parse IAM policy document")
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn version(id: &str, secs: i64) -> VersionInfo {
        VersionInfo { version_id: id.to_string(), create_date: Some(DateTime::from_secs(secs)) }
    }

    #[test]
    fn newest_and_oldest_select_by_create_date() {
        let versions =
            vec![version("v2", 200), version("v5", 500), version("v1", 100), version("v3", 300)];
        assert_eq!(newest(&versions).unwrap().version_id, "v5");
        assert_eq!(oldest(&versions).unwrap().version_id, "v1");
    }

    #[test]
    fn versions_without_dates_sort_oldest() {
        let versions = vec![
            version("v2", 200),
            VersionInfo { version_id: "undated".to_string(), create_date: None },
        ];
        assert_eq!(newest(&versions).unwrap().version_id, "v2");
        assert_eq!(oldest(&versions).unwrap().version_id, "undated");
    }

    #[test]
    fn empty_history_selects_nothing() {
        assert_eq!(newest(&[]), None);
        assert_eq!(oldest(&[]), None);
    }

    #[test]
    fn decode_document_handles_url_encoding() {
        let raw = "%7B%22Version%22%3A%222012-10-17%22%2C%22Statement%22%3A%5B%5D%7D";
        let doc = decode_document(raw).unwrap();
        assert_eq!(doc, json!({"Version": "2012-10-17", "Statement": []}));
    }

    #[test]
    fn decode_document_accepts_plain_json() {
        let doc = decode_document(r#"{"Statement":[{"Action":["sqs:SendMessage"]}]}"#).unwrap();
        assert_eq!(doc["Statement"][0]["Action"], json!(["sqs:SendMessage"]));
    }

    #[test]
    fn decode_document_rejects_garbage() {
        assert!(decode_document("not-json").is_err());
    }
}
