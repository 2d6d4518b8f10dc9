use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, RwLock};

use serde::Deserialize;

use crate::models::InstanceRecord;

/// Instance id to record, swapped wholesale on every inventory refresh.
#[derive(Clone, Default)]
pub struct InstanceDirectory {
    inner: Arc<RwLock<Arc<HashMap<String, InstanceRecord>>>>,
}

impl InstanceDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole directory. Later rows win on duplicate ids.
    pub fn replace(&self, records: Vec<InstanceRecord>) -> usize {
        let map: HashMap<String, InstanceRecord> = records
            .into_iter()
            .map(|r| (r.id.clone(), r))
            .collect();
        let count = map.len();
        *self.inner.write().unwrap_or_else(|e| e.into_inner()) = Arc::new(map);
        count
    }

    fn snapshot(&self) -> Arc<HashMap<String, InstanceRecord>> {
        self.inner.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn get(&self, instance_id: &str) -> Option<InstanceRecord> {
        self.snapshot().get(instance_id).cloned()
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All records ordered by name, then id.
    pub fn list(&self) -> Vec<InstanceRecord> {
        let mut records: Vec<InstanceRecord> = self.snapshot().values().cloned().collect();
        records.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        records
    }

    pub fn filter(&self, filter: &InstanceFilter) -> Vec<InstanceRecord> {
        self.list().into_iter().filter(|r| filter.matches(r)).collect()
    }
}

/// Listing page filters; an empty value matches everything.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct InstanceFilter {
    pub owner: String,
    pub service: String,
    pub account_name: String,
    pub region: String,
    pub environment_class: String,
}

impl InstanceFilter {
    pub fn matches(&self, r: &InstanceRecord) -> bool {
        field_matches(&self.owner, &r.owner)
            && field_matches(&self.service, &r.service)
            && field_matches(&self.account_name, &r.account_name)
            && field_matches(&self.region, &r.region)
            && field_matches(&self.environment_class, &r.environment_class)
    }
}

fn field_matches(wanted: &str, actual: &str) -> bool {
    wanted.is_empty() || wanted == actual
}

/// Distinct, sorted values for each filter drop-down.
#[derive(Clone, Debug, Default)]
pub struct FilterOptions {
    pub owners: Vec<String>,
    pub services: Vec<String>,
    pub account_names: Vec<String>,
    pub regions: Vec<String>,
    pub environment_classes: Vec<String>,
}

impl FilterOptions {
    pub fn from_records(records: &[InstanceRecord]) -> Self {
        Self {
            owners: unique_values(records, |r| &r.owner),
            services: unique_values(records, |r| &r.service),
            account_names: unique_values(records, |r| &r.account_name),
            regions: unique_values(records, |r| &r.region),
            environment_classes: unique_values(records, |r| &r.environment_class),
        }
    }
}

pub fn unique_values<F>(records: &[InstanceRecord], field: F) -> Vec<String>
where
    F: Fn(&InstanceRecord) -> &String,
{
    records
        .iter()
        .map(|r| field(r).trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
