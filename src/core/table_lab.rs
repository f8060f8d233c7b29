use crate::domain::model::{AttributeValue, Item, TableSpec, TableState};
use crate::domain::ports::KeyValueStore;
use crate::utils::error::Result;
use chrono::{DateTime, Utc};
use std::time::Duration;

pub const DEFAULT_TABLE_PREFIX: &str = "coffee-shop";
pub const DEFAULT_WAIT: Duration = Duration::from_secs(60);

/// `<prefix>-<epoch millis>`, unique per run.
pub fn lab_table_name(prefix: &str, now: DateTime<Utc>) -> String {
    format!("{}-{}", prefix, now.timestamp_millis())
}

fn coffee(id: &str, name: &str, size: &str, price: &str) -> Item {
    let mut item = Item::new();
    item.insert("id".to_string(), AttributeValue::S(id.to_string()));
    item.insert("name".to_string(), AttributeValue::S(name.to_string()));
    item.insert("size".to_string(), AttributeValue::S(size.to_string()));
    item.insert("price".to_string(), AttributeValue::N(price.to_string()));
    item
}

pub fn coffee_menu() -> Vec<Item> {
    vec![
        coffee("coffee-1", "Espresso", "Tall", "3.50"),
        coffee("coffee-2", "Latte", "Grande", "4.20"),
        coffee("coffee-3", "Cappuccino", "Venti", "4.80"),
    ]
}

fn field<'a>(item: &'a Item, name: &str) -> &'a str {
    item.get(name)
        .and_then(|value| value.as_s().or_else(|| value.as_n()))
        .unwrap_or("?")
}

/// `Latte (Grande) - €4.20`
pub fn describe_coffee(item: &Item) -> String {
    format!(
        "{} ({}) - €{}",
        field(item, "name"),
        field(item, "size"),
        field(item, "price")
    )
}

pub fn format_menu_line(position: usize, item: &Item) -> String {
    format!("{}. {}", position, describe_coffee(item))
}

/// Create a table, fill it, read it back and delete it again.
pub struct TableLab<K: KeyValueStore> {
    store: K,
    table: TableSpec,
    max_wait: Duration,
}

impl<K: KeyValueStore> TableLab<K> {
    pub fn new(store: K, table_name: String) -> Self {
        Self {
            store,
            table: TableSpec {
                name: table_name,
                partition_key: "id".to_string(),
            },
            max_wait: DEFAULT_WAIT,
        }
    }

    pub fn with_max_wait(mut self, max_wait: Duration) -> Self {
        self.max_wait = max_wait;
        self
    }

    pub fn table_name(&self) -> &str {
        &self.table.name
    }

    /// Returns the items read back. On failure one cleanup attempt is made
    /// before the original error is returned.
    pub async fn run(&self) -> Result<Vec<Item>> {
        tracing::info!("🚀 Starting DynamoDB operations...");

        match self.run_steps().await {
            Ok(items) => {
                tracing::info!("✅ All operations completed successfully!");
                Ok(items)
            }
            Err(err) => {
                tracing::error!("❌ Error: {}", err);
                self.cleanup().await;
                Err(err)
            }
        }
    }

    async fn run_steps(&self) -> Result<Vec<Item>> {
        self.create_table().await?;
        self.insert_items().await?;
        let items = self.read_all_items().await?;
        self.delete_table().await?;
        Ok(items)
    }

    async fn create_table(&self) -> Result<()> {
        tracing::info!("📋 Creating table: {}", self.table.name);
        self.store.create_table(&self.table).await?;

        tracing::info!("⏳ Waiting for table to be created...");
        self.store
            .wait_for_table(&self.table.name, TableState::Active, self.max_wait)
            .await?;
        tracing::info!("✅ Table created successfully!");
        Ok(())
    }

    async fn insert_items(&self) -> Result<()> {
        tracing::info!("☕ Inserting coffee items...");
        for item in coffee_menu() {
            let description = describe_coffee(&item);
            self.store.put_item(&self.table.name, item).await?;
            tracing::info!("✅ Inserted: {}", description);
        }
        tracing::info!("✅ All coffee items inserted successfully!");
        Ok(())
    }

    async fn read_all_items(&self) -> Result<Vec<Item>> {
        tracing::info!("📖 Reading all items from the table...");
        let items = self.store.scan(&self.table.name).await?;

        if items.is_empty() {
            tracing::info!("📭 No items found in the table.");
        } else {
            tracing::info!("📋 Coffee Menu:");
            for (index, item) in items.iter().enumerate() {
                tracing::info!("{}", format_menu_line(index + 1, item));
            }
            tracing::info!("📊 Total items found: {}", items.len());
        }
        Ok(items)
    }

    async fn delete_table(&self) -> Result<()> {
        tracing::info!("🗑️ Deleting table: {}", self.table.name);
        self.store.delete_table(&self.table.name).await?;

        tracing::info!("⏳ Waiting for table to be deleted...");
        self.store
            .wait_for_table(&self.table.name, TableState::Deleted, self.max_wait)
            .await?;
        tracing::info!("✅ Table deleted successfully!");
        Ok(())
    }

    async fn cleanup(&self) {
        tracing::info!("🧹 Attempting cleanup...");
        if let Err(cleanup_err) = self.delete_table().await {
            tracing::error!("❌ Cleanup failed: {}", cleanup_err);
            tracing::warn!(
                "⚠️ Please manually delete table {} via the AWS console if it exists.",
                self.table.name
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_lab_table_name_uses_epoch_millis() {
        let now = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(lab_table_name("coffee-shop", now), "coffee-shop-1704164645000");
    }

    #[test]
    fn test_menu_lines() {
        let menu = coffee_menu();
        assert_eq!(menu.len(), 3);
        assert_eq!(format_menu_line(2, &menu[1]), "2. Latte (Grande) - €4.20");

        let empty = Item::new();
        assert_eq!(format_menu_line(1, &empty), "1. ? (?) - €?");
    }
}
