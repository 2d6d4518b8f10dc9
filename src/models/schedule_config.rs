use serde::{Deserialize, Serialize};

/// Maintenance windows, expressed in each instance's regional time.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleConfig {
    pub stg_dev_day: String,
    pub stg_dev_time: String,
    pub prod_day: String,
    pub prod_time: String,
}

pub const WEEKDAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];
