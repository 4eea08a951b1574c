use anyhow::{Context, Result};
use aws_sdk_s3::Client;

/// Object key the monitoring agent credential lives under.
pub const MONITORING_KEY_OBJECT: &str = "monitoring/agent.key";

/// Fetch the monitoring agent key from the operator-supplied bucket.
///
/// Trailing whitespace is stripped so the value can be injected directly
/// into an environment property.
pub async fn fetch_monitoring_key(client: &Client, bucket: &str) -> Result<String> {
    let resp = client
        .get_object()
        .bucket(bucket)
        .key(MONITORING_KEY_OBJECT)
        .send()
        .await
        .with_context(|| format!("Failed to fetch s3://{bucket}/{MONITORING_KEY_OBJECT}"))?;
    let data = resp.body.collect().await.context("Failed to read S3 object body")?;
    let key =
        String::from_utf8(data.into_bytes().to_vec()).context("Monitoring key is not UTF-8")?;
    Ok(key.trim_end().to_string())
}
