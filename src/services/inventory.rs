use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::models::InstanceRecord;
use crate::services::directory::InstanceDirectory;

/// Where the inventory CSV comes from (an S3 object in production).
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    async fn fetch(&self) -> Result<Vec<u8>>;

    /// Human readable location, used in logs.
    fn describe(&self) -> String;
}

/// Decodes the inventory CSV, keeping only running instances.
pub fn parse_inventory(csv_content: &[u8]) -> Result<Vec<InstanceRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(csv_content);
    let mut instances = Vec::new();
    for (idx, row) in reader.deserialize::<InstanceRecord>().enumerate() {
        let record = row.map_err(|e| Error::Inventory(format!("row {}: {e}", idx + 1)))?;
        if record.is_running() {
            instances.push(record);
        }
    }
    Ok(instances)
}

/// Fetches the snapshot and swaps it into `directory`. Returns the number of
/// running instances loaded.
pub async fn refresh(source: &dyn SnapshotSource, directory: &InstanceDirectory) -> Result<usize> {
    let content = source.fetch().await?;
    let instances = parse_inventory(&content)?;
    let count = directory.replace(instances);
    tracing::info!(source = %source.describe(), count, "Instance inventory refreshed");
    Ok(count)
}

/// Background task refreshing the directory every `interval`. A failed refresh
/// keeps the previous directory.
pub fn spawn_refresher(
    source: Arc<dyn SnapshotSource>,
    directory: InstanceDirectory,
    interval: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // The first tick completes immediately; startup already loaded once.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            if let Err(e) = refresh(source.as_ref(), &directory).await {
                tracing::warn!(%e, source = %source.describe(), "Inventory refresh failed; keeping previous snapshot");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "\
AWS Account Name,AWS Account ID,State,EC2 Name,Service,Owner,ID,Region,EnvironmentClass
payments-prod,123456789012,running,pay-api-1,payments,team-pay,i-0aaa,eu-west-2,prod
payments-prod,123456789012,stopped,pay-api-2,payments,team-pay,i-0bbb,eu-west-2,prod
data-dev,210987654321, running ,etl-worker,data,team-data,i-0ccc,us-east-1,dev
";

    struct StaticSource(Vec<u8>);

    #[async_trait]
    impl SnapshotSource for StaticSource {
        async fn fetch(&self) -> Result<Vec<u8>> {
            Ok(self.0.clone())
        }

        fn describe(&self) -> String {
            "memory".into()
        }
    }

    #[test]
    fn keeps_only_running_rows() {
        let instances = parse_inventory(CSV.as_bytes()).unwrap();
        let ids: Vec<&str> = instances.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["i-0aaa", "i-0ccc"]);
        assert_eq!(instances[1].account_id, "210987654321");
        assert_eq!(instances[1].environment_class, "dev");
        assert_eq!(instances[0].name, "pay-api-1");
    }

    #[test]
    fn missing_required_column_is_an_error() {
        let csv = "State,EC2 Name\nrunning,web\n";
        assert!(matches!(parse_inventory(csv.as_bytes()), Err(Error::Inventory(_))));
    }

    #[tokio::test]
    async fn refresh_replaces_directory() {
        let directory = InstanceDirectory::new();
        directory.replace(vec![InstanceRecord { id: "i-old".into(), ..Default::default() }]);
        let count = refresh(&StaticSource(CSV.as_bytes().to_vec()), &directory).await.unwrap();
        assert_eq!(count, 2);
        assert!(directory.get("i-old").is_none());
        assert!(directory.get("i-0ccc").is_some());
    }
}
