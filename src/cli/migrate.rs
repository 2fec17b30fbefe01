use serde_json::json;
use storefront::context::migrate_database;

use super::output::Output;

pub(crate) async fn run(url: &str, output: &Output) -> Result<(), String> {
    migrate_database(url)
        .await
        .map_err(|error| format!("failed to migrate database: {error}"))?;

    output.emit(&json!({ "migrated": true }), |_| "migrations applied".to_string())
}
