use serde::{Deserialize, Serialize};

/// One row of the inventory snapshot.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceRecord {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "AWS Account ID")]
    pub account_id: String,
    #[serde(rename = "AWS Account Name", default)]
    pub account_name: String,
    #[serde(rename = "State", default)]
    pub state: String,
    #[serde(rename = "EC2 Name", default)]
    pub name: String,
    #[serde(rename = "Service", default)]
    pub service: String,
    #[serde(rename = "Owner", default)]
    pub owner: String,
    #[serde(rename = "Region")]
    pub region: String,
    #[serde(rename = "EnvironmentClass", default)]
    pub environment_class: String,
}

impl InstanceRecord {
    pub fn is_running(&self) -> bool {
        self.state.trim().eq_ignore_ascii_case("running")
    }
}
