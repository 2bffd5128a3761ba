//! Azure regions.

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// An Azure location, stored in its normalised ARM form (`westus2`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Region(Cow<'static, str>);

impl Region {
    pub const US_EAST: Region = Region(Cow::Borrowed("eastus"));
    pub const US_EAST2: Region = Region(Cow::Borrowed("eastus2"));
    pub const US_WEST: Region = Region(Cow::Borrowed("westus"));
    pub const US_WEST2: Region = Region(Cow::Borrowed("westus2"));
    pub const US_WEST3: Region = Region(Cow::Borrowed("westus3"));
    pub const US_CENTRAL: Region = Region(Cow::Borrowed("centralus"));
    pub const US_NORTH_CENTRAL: Region = Region(Cow::Borrowed("northcentralus"));
    pub const US_SOUTH_CENTRAL: Region = Region(Cow::Borrowed("southcentralus"));
    pub const US_WEST_CENTRAL: Region = Region(Cow::Borrowed("westcentralus"));
    pub const CANADA_CENTRAL: Region = Region(Cow::Borrowed("canadacentral"));
    pub const CANADA_EAST: Region = Region(Cow::Borrowed("canadaeast"));
    pub const BRAZIL_SOUTH: Region = Region(Cow::Borrowed("brazilsouth"));
    pub const EUROPE_NORTH: Region = Region(Cow::Borrowed("northeurope"));
    pub const EUROPE_WEST: Region = Region(Cow::Borrowed("westeurope"));
    pub const UK_SOUTH: Region = Region(Cow::Borrowed("uksouth"));
    pub const UK_WEST: Region = Region(Cow::Borrowed("ukwest"));
    pub const FRANCE_CENTRAL: Region = Region(Cow::Borrowed("francecentral"));
    pub const GERMANY_WEST_CENTRAL: Region = Region(Cow::Borrowed("germanywestcentral"));
    pub const SWITZERLAND_NORTH: Region = Region(Cow::Borrowed("switzerlandnorth"));
    pub const NORWAY_EAST: Region = Region(Cow::Borrowed("norwayeast"));
    pub const SWEDEN_CENTRAL: Region = Region(Cow::Borrowed("swedencentral"));
    pub const ASIA_EAST: Region = Region(Cow::Borrowed("eastasia"));
    pub const ASIA_SOUTHEAST: Region = Region(Cow::Borrowed("southeastasia"));
    pub const JAPAN_EAST: Region = Region(Cow::Borrowed("japaneast"));
    pub const JAPAN_WEST: Region = Region(Cow::Borrowed("japanwest"));
    pub const AUSTRALIA_EAST: Region = Region(Cow::Borrowed("australiaeast"));
    pub const AUSTRALIA_SOUTHEAST: Region = Region(Cow::Borrowed("australiasoutheast"));
    pub const INDIA_CENTRAL: Region = Region(Cow::Borrowed("centralindia"));
    pub const INDIA_SOUTH: Region = Region(Cow::Borrowed("southindia"));
    pub const KOREA_CENTRAL: Region = Region(Cow::Borrowed("koreacentral"));
    pub const UAE_NORTH: Region = Region(Cow::Borrowed("uaenorth"));
    pub const SOUTHAFRICA_NORTH: Region = Region(Cow::Borrowed("southafricanorth"));
    pub const CHINA_NORTH: Region = Region(Cow::Borrowed("chinanorth"));
    pub const CHINA_EAST: Region = Region(Cow::Borrowed("chinaeast"));
    pub const GOV_US_VIRGINIA: Region = Region(Cow::Borrowed("usgovvirginia"));
    pub const GOV_US_ARIZONA: Region = Region(Cow::Borrowed("usgovarizona"));

    /// Normalise a display name (`"West US 2"`) or ARM name (`"westus2"`).
    pub fn from_name(name: &str) -> Self {
        let normalised: String = name
            .chars()
            .filter(|c| !c.is_whitespace())
            .flat_map(char::to_lowercase)
            .collect();
        Region(Cow::Owned(normalised))
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Region {
    fn from(name: &str) -> Self {
        Region::from_name(name)
    }
}

impl From<String> for Region {
    fn from(name: String) -> Self {
        Region::from_name(&name)
    }
}

impl From<&Region> for Region {
    fn from(region: &Region) -> Self {
        region.clone()
    }
}

impl Serialize for Region {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Region {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Region::from_name(&raw))
    }
}
