use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::render::Rendered;
use crate::{Config, Result};
use anyhow::Context;
use std::path::Path;

/// Creates the erp home directory and:
/// - Creates an initial `config.json` file with default settings
/// - Creates an empty ledger database with the current schema
///
/// # Arguments
/// - `erp_home` - The directory that will be the root of data directory, e.g. `$HOME/erp`
///
/// # Errors
/// - Returns an error if the directory is already initialized or if any file operations fail.
pub async fn init(erp_home: &Path) -> Result<Out<Rendered>> {
    let config = Config::create(erp_home)
        .await
        .context("Unable to create the erp home directory and config")
        .pub_result(ErrorType::Config)?;
    Ok(format!(
        "Successfully created the erp home directory at '{}' with the database '{}'",
        config.root().display(),
        config.database_path().display()
    )
    .into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::error_type;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_init() {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("erp");
        let out = init(&home).await.unwrap();
        assert!(out.message().starts_with("Successfully created"));
        assert!(out.structure().is_none());
        assert!(home.join("config.json").is_file());
        assert!(Config::load(&home).await.is_ok());
    }

    #[tokio::test]
    async fn test_init_twice_is_config_error() {
        let dir = TempDir::new().unwrap();
        init(dir.path()).await.unwrap();
        let err = init(dir.path()).await.unwrap_err();
        assert_eq!(error_type(&err), Some(ErrorType::Config));
    }
}
