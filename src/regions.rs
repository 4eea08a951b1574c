use std::collections::HashMap;

use serde::Serialize;

/// Static metadata for one deployment region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegionProfile {
    /// Internal short code, e.g. `va`.
    pub name: &'static str,
    /// The AWS region name, e.g. `us-east-1`.
    pub aws_name: &'static str,
    /// Partition the region lives in, e.g. `aws` or `aws-cn`.
    pub partition: &'static str,
    /// ISO-style location code, e.g. `us-va`.
    pub iso_name: &'static str,
    /// Default deployment VPC, when the region has one.
    pub dip_vpc: Option<&'static str>,
    /// Shared services VPC, when the region has one.
    pub services_vpc: Option<&'static str>,
}

impl RegionProfile {
    /// VPC used when the operator does not pass one explicitly: the shared
    /// services VPC when present, the default deployment VPC otherwise.
    pub fn default_vpc(&self) -> Option<&'static str> {
        self.services_vpc.or(self.dip_vpc)
    }
}

/// A partition and the region used when none is specified for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartitionProfile {
    pub name: &'static str,
    /// Short code of the partition's default region.
    pub default_region: &'static str,
}

/// Immutable lookup tables for every region the tool can deploy to.
///
/// Built once at startup and passed by reference; there is no module-level
/// mutable state.
pub struct RegionRegistry {
    regions: Vec<RegionProfile>,
    partitions: Vec<PartitionProfile>,
    by_name: HashMap<&'static str, usize>,
    by_aws_name: HashMap<&'static str, usize>,
    by_iso_name: HashMap<&'static str, usize>,
}

impl RegionRegistry {
    /// The regions this tool knows about.
    pub fn builtin() -> Self {
        Self::new(
            vec![
                RegionProfile {
                    name: "va",
                    aws_name: "us-east-1",
                    partition: "aws",
                    iso_name: "us-va",
                    dip_vpc: Some("vpc-31040c55"),
                    services_vpc: Some("vpc-2e252b57"),
                },
                RegionProfile {
                    name: "ie",
                    aws_name: "eu-west-1",
                    partition: "aws",
                    iso_name: "ie-be",
                    dip_vpc: Some("vpc-12065777"),
                    services_vpc: None,
                },
                RegionProfile {
                    name: "sy",
                    aws_name: "ap-southeast-2",
                    partition: "aws",
                    iso_name: "au-nsw",
                    dip_vpc: Some("vpc-78bdb41d"),
                    services_vpc: None,
                },
                RegionProfile {
                    name: "or",
                    aws_name: "us-west-2",
                    partition: "aws",
                    iso_name: "us-or",
                    dip_vpc: None,
                    services_vpc: None,
                },
                RegionProfile {
                    name: "sp",
                    aws_name: "sa-east-1",
                    partition: "aws",
                    iso_name: "br-sp",
                    dip_vpc: None,
                    services_vpc: None,
                },
                RegionProfile {
                    name: "cn",
                    aws_name: "cn-north-1",
                    partition: "aws-cn",
                    iso_name: "cn-11",
                    dip_vpc: Some("vpc-51994d35"),
                    services_vpc: None,
                },
            ],
            vec![
                PartitionProfile { name: "aws", default_region: "va" },
                PartitionProfile { name: "aws-cn", default_region: "cn" },
            ],
        )
    }

    fn new(regions: Vec<RegionProfile>, partitions: Vec<PartitionProfile>) -> Self {
        let mut by_name = HashMap::with_capacity(regions.len());
        let mut by_aws_name = HashMap::with_capacity(regions.len());
        let mut by_iso_name = HashMap::with_capacity(regions.len());
        for (idx, region) in regions.iter().enumerate() {
            by_name.insert(region.name, idx);
            by_aws_name.insert(region.aws_name, idx);
            by_iso_name.insert(region.iso_name, idx);
        }
        Self { regions, partitions, by_name, by_aws_name, by_iso_name }
    }

    pub fn by_name(&self, name: &str) -> Option<&RegionProfile> {
        self.by_name.get(name).map(|&idx| &self.regions[idx])
    }

    pub fn by_aws_name(&self, aws_name: &str) -> Option<&RegionProfile> {
        self.by_aws_name.get(aws_name).map(|&idx| &self.regions[idx])
    }

    pub fn by_iso_name(&self, iso_name: &str) -> Option<&RegionProfile> {
        self.by_iso_name.get(iso_name).map(|&idx| &self.regions[idx])
    }

    /// Look a region up by any of its three spellings.
    pub fn resolve(&self, input: &str) -> Option<&RegionProfile> {
        self.by_aws_name(input).or_else(|| self.by_name(input)).or_else(|| self.by_iso_name(input))
    }

    pub fn partition(&self, name: &str) -> Option<&PartitionProfile> {
        self.partitions.iter().find(|p| p.name == name)
    }

    /// Default region profile for a partition.
    pub fn partition_default_region(&self, partition: &str) -> Option<&RegionProfile> {
        self.partition(partition).and_then(|p| self.by_name(p.default_region))
    }

    pub fn regions(&self) -> &[RegionProfile] {
        &self.regions
    }

    pub fn partitions(&self) -> &[PartitionProfile] {
        &self.partitions
    }
}
