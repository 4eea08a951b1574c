use std::fmt;

use thiserror::Error;

/// Leading literal every ARN starts with.
pub const ARN_PREFIX: &str = "arn";

/// Errors produced while parsing or constructing an [`Arn`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ArnError {
    /// The input did not split into 6 or 7 colon-separated components.
    #[error("ARNs have 6 or 7 components, not {0}")]
    ComponentCount(usize),

    /// The first component was not the `arn` literal.
    #[error("ARN prefix must be {expected:?}, not {0:?}", expected = ARN_PREFIX)]
    Prefix(String),
}

/// A parsed AWS resource name.
///
/// Some resource types carry a colon inside the trailing resource component
/// (a 7-field string on the wire); parsing rejoins those so that formatting
/// always produces exactly 6 colon-separated fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Arn {
    pub partition: String,
    pub service: String,
    pub region: String,
    pub account: String,
    pub resource: String,
}

impl Arn {
    /// Parse a colon-delimited ARN string.
    pub fn parse(input: &str) -> Result<Self, ArnError> {
        let fields: Vec<&str> = input.split(':').collect();
        let resource = match fields.len() {
            6 => fields[5].to_string(),
            7 => format!("{}:{}", fields[5], fields[6]),
            n => return Err(ArnError::ComponentCount(n)),
        };
        Self::from_parts(fields[0], fields[1], fields[2], fields[3], fields[4], &resource)
    }

    /// Construct an ARN from its 6 components, validating the leading literal.
    pub fn from_parts(
        prefix: &str,
        partition: &str,
        service: &str,
        region: &str,
        account: &str,
        resource: &str,
    ) -> Result<Self, ArnError> {
        if prefix != ARN_PREFIX {
            return Err(ArnError::Prefix(prefix.to_string()));
        }
        Ok(Self {
            partition: partition.to_string(),
            service: service.to_string(),
            region: region.to_string(),
            account: account.to_string(),
            resource: resource.to_string(),
        })
    }

    /// Build a sibling ARN in the same partition.
    ///
    /// Used to name resources (queue, stack, role) that belong to the same
    /// account family as the caller's identity.
    pub fn derive(&self, service: &str, region: &str, account: &str, resource: &str) -> Self {
        Self {
            partition: self.partition.clone(),
            service: service.to_string(),
            region: region.to_string(),
            account: account.to_string(),
            resource: resource.to_string(),
        }
    }
}

impl fmt::Display for Arn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{ARN_PREFIX}:{}:{}:{}:{}:{}",
            self.partition, self.service, self.region, self.account, self.resource
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_six_field_round_trip() {
        let input = "arn:aws:sqs:us-east-1:123456789012:worker-queue";
        let arn = Arn::parse(input).unwrap();
        assert_eq!(arn.partition, "aws");
        assert_eq!(arn.service, "sqs");
        assert_eq!(arn.region, "us-east-1");
        assert_eq!(arn.account, "123456789012");
        assert_eq!(arn.resource, "worker-queue");
        assert_eq!(arn.to_string(), input);
        assert_eq!(Arn::parse(&arn.to_string()).unwrap(), arn);
    }

    #[test]
    fn parse_seven_field_rejoins_resource() {
        let arn = Arn::parse("arn:aws:logs:us-east-1:123456789012:log-group:my-group").unwrap();
        assert_eq!(arn.resource, "log-group:my-group");
        assert_eq!(arn.to_string(), "arn:aws:logs:us-east-1:123456789012:log-group:my-group");
        assert_eq!(Arn::parse(&arn.to_string()).unwrap(), arn);
    }

    #[test]
    fn parse_rejects_wrong_component_count() {
        assert_eq!(
            Arn::parse("arn:aws:sqs:us-east-1:123456789012"),
            Err(ArnError::ComponentCount(5))
        );
        assert_eq!(
            Arn::parse("arn:aws:logs:us-east-1:123456789012:log-group:my-group:extra"),
            Err(ArnError::ComponentCount(8))
        );
    }

    #[test]
    fn parse_rejects_wrong_prefix() {
        assert_eq!(
            Arn::parse("urn:aws:sqs:us-east-1:123456789012:worker-queue"),
            Err(ArnError::Prefix("urn".to_string()))
        );
    }

    #[test]
    fn from_parts_validates_prefix() {
        let err = Arn::from_parts("nra", "aws", "iam", "", "123456789012", "role/deploy");
        assert_eq!(err, Err(ArnError::Prefix("nra".to_string())));
    }

    #[test]
    fn derive_keeps_partition() {
        let caller = Arn::parse("arn:aws-cn:iam::999999999999:user/deployer").unwrap();
        let queue = caller.derive("sqs", "cn-north-1", "999999999999", "awseb-e-abc123");
        assert_eq!(queue.to_string(), "arn:aws-cn:sqs:cn-north-1:999999999999:awseb-e-abc123");
    }
}
