use anyhow::{bail, Context, Result};
use aws_sdk_ec2::{types::Filter, Client};
use tracing::debug;

/// Deployment tier a subnet belongs to, taken from the leading segment of
/// its `Name` tag (`app-…`, `border-…`, `storage-…`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubnetTier {
    Instances,
    LoadBalancers,
    Databases,
}

/// Classify a subnet by the naming convention of its `Name` tag.
pub fn classify_subnet(name: &str) -> Option<SubnetTier> {
    match name.split('-').next().unwrap_or_default() {
        "app" => Some(SubnetTier::Instances),
        "border" => Some(SubnetTier::LoadBalancers),
        "storage" => Some(SubnetTier::Databases),
        _ => None,
    }
}

/// Subnets of one VPC grouped by deployment tier.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VpcLayout {
    pub vpc_id: String,
    pub ec2_subnets: Vec<String>,
    pub elb_subnets: Vec<String>,
    pub db_subnets: Vec<String>,
}

impl VpcLayout {
    /// Describe the VPC and bucket its subnets by tier.
    pub async fn gather(ec2: &Client, vpc_id: &str) -> Result<Self> {
        let vpcs = ec2
            .describe_vpcs()
            .vpc_ids(vpc_id)
            .send()
            .await
            .with_context(|| format!("Failed to describe VPC {vpc_id}"))?;
        if vpcs.vpcs().is_empty() {
            bail!("VPC {vpc_id} not found in this region");
        }

        let resp = ec2
            .describe_subnets()
            .filters(Filter::builder().name("vpc-id").values(vpc_id).build())
            .send()
            .await
            .with_context(|| format!("Failed to describe subnets of {vpc_id}"))?;
        debug!("describe subnets returned {} entries", resp.subnets().len());

        let mut layout = VpcLayout { vpc_id: vpc_id.to_string(), ..Default::default() };
        for subnet in resp.subnets() {
            let Some(subnet_id) = subnet.subnet_id() else { continue };
            let name = subnet
                .tags()
                .iter()
                .find(|tag| tag.key() == Some("Name"))
                .and_then(|tag| tag.value())
                .unwrap_or_default();
            layout.add(subnet_id, name);
        }
        Ok(layout)
    }

    fn add(&mut self, subnet_id: &str, name: &str) {
        match classify_subnet(name) {
            Some(SubnetTier::Instances) => self.ec2_subnets.push(subnet_id.to_string()),
            Some(SubnetTier::LoadBalancers) => self.elb_subnets.push(subnet_id.to_string()),
            Some(SubnetTier::Databases) => self.db_subnets.push(subnet_id.to_string()),
            None => debug!("skipping subnet {subnet_id} outside known tiers (name {name:?})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_subnet_by_name_prefix() {
        assert_eq!(classify_subnet("app-us-east-1a"), Some(SubnetTier::Instances));
        assert_eq!(classify_subnet("border-us-east-1b"), Some(SubnetTier::LoadBalancers));
        assert_eq!(classify_subnet("storage-us-east-1c"), Some(SubnetTier::Databases));
        assert_eq!(classify_subnet("utility-us-east-1a"), None);
        assert_eq!(classify_subnet(""), None);
    }

    #[test]
    fn add_buckets_subnets_by_tier() {
        let mut layout = VpcLayout { vpc_id: "vpc-1".into(), ..Default::default() };
        layout.add("subnet-a", "app-us-east-1a");
        layout.add("subnet-b", "border-us-east-1a");
        layout.add("subnet-c", "storage-us-east-1a");
        layout.add("subnet-d", "scratch-us-east-1a");
        assert_eq!(layout.ec2_subnets, vec!["subnet-a"]);
        assert_eq!(layout.elb_subnets, vec!["subnet-b"]);
        assert_eq!(layout.db_subnets, vec!["subnet-c"]);
    }
}
