use anyhow::{Context, Result};
use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_sdk_elasticbeanstalk::types::Tag;
use tracing::debug;

use crate::arn::Arn;

/// One client per AWS service the workflow touches, all sharing a single
/// resolved configuration.
pub struct AwsClients {
    pub ec2: aws_sdk_ec2::Client,
    pub eb: aws_sdk_elasticbeanstalk::Client,
    pub dynamodb: aws_sdk_dynamodb::Client,
    pub iam: aws_sdk_iam::Client,
    pub s3: aws_sdk_s3::Client,
    pub sts: aws_sdk_sts::Client,
}

impl AwsClients {
    /// Resolve shared configuration for the given profile and region and
    /// construct the service clients from it.
    pub async fn connect(profile: Option<&str>, region: &str) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region.to_string()));
        if let Some(profile) = profile {
            loader = loader.profile_name(profile);
        }
        let config = loader.load().await;
        debug!("resolved AWS config for region {region}");
        Self::from_config(&config)
    }

    pub fn from_config(config: &SdkConfig) -> Self {
        Self {
            ec2: aws_sdk_ec2::Client::new(config),
            eb: aws_sdk_elasticbeanstalk::Client::new(config),
            dynamodb: aws_sdk_dynamodb::Client::new(config),
            iam: aws_sdk_iam::Client::new(config),
            s3: aws_sdk_s3::Client::new(config),
            sts: aws_sdk_sts::Client::new(config),
        }
    }

    /// The ARN of whoever the resolved credentials authenticate as.
    pub async fn caller_identity(&self) -> Result<Arn> {
        let resp = self
            .sts
            .get_caller_identity()
            .send()
            .await
            .context("Failed to call sts:GetCallerIdentity")?;
        let arn = resp.arn().context("GetCallerIdentity response missing ARN")?;
        Ok(Arn::parse(arn)?)
    }
}

/// Build Elastic Beanstalk tags from plain key/value pairs.
pub fn tags_from_pairs(pairs: &[(&str, String)]) -> Vec<Tag> {
    pairs.iter().map(|(k, v)| Tag::builder().key(*k).value(v.clone()).build()).collect()
}
