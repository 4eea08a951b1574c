use anyhow::{Context, Result};
use aws_sdk_dynamodb::{
    types::{
        AttributeDefinition, KeySchemaElement, KeyType, ProvisionedThroughput,
        ScalarAttributeType,
    },
    Client,
};
use tracing::info;

/// Table that tracks export jobs, shared by every environment in a region.
pub const TABLE_NAME: &str = "export-service";

const KEY_ATTRIBUTE: &str = "job_id";

pub async fn table_exists(ddb: &Client) -> Result<bool> {
    info!("checking for table {TABLE_NAME:?}");
    let resp = ddb.list_tables().send().await.context("Failed to list tables")?;
    Ok(resp.table_names().iter().any(|name| name == TABLE_NAME))
}

/// Create the job-tracking table with its string hash key.
pub async fn create_table(ddb: &Client) -> Result<()> {
    ddb.create_table()
        .table_name(TABLE_NAME)
        .attribute_definitions(
            AttributeDefinition::builder()
                .attribute_name(KEY_ATTRIBUTE)
                .attribute_type(ScalarAttributeType::S)
                .build()
                .context("Invalid attribute definition")?,
        )
        .key_schema(
            KeySchemaElement::builder()
                .attribute_name(KEY_ATTRIBUTE)
                .key_type(KeyType::Hash)
                .build()
                .context("Invalid key schema")?,
        )
        .provisioned_throughput(
            ProvisionedThroughput::builder()
                .read_capacity_units(1)
                .write_capacity_units(1)
                .build()
                .context("Invalid provisioned throughput")?,
        )
        .send()
        .await
        .with_context(|| format!("Failed to create table {TABLE_NAME}"))?;
    info!("{TABLE_NAME} table created");
    Ok(())
}
