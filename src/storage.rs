use crate::models::AppData;
use std::path::Path;
use thiserror::Error;
use tokio::fs;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum DataError {
    #[error("failed to read data file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse data file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("row {index}: {reason}")]
    Invalid { index: usize, reason: String },
}

/// Loads the company data file. A missing file yields an empty dataset; a
/// file that does not match the schema is an error.
pub async fn load_data(path: &Path) -> Result<AppData, DataError> {
    let bytes = match fs::read(path).await {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            warn!(path = %path.display(), "data file not found, starting empty");
            return Ok(AppData::default());
        }
        Err(err) => return Err(err.into()),
    };

    let data: AppData = serde_json::from_slice(&bytes)?;
    validate(&data)?;
    info!(rows = data.rows.len(), path = %path.display(), "loaded company data");
    Ok(data)
}

pub fn validate(data: &AppData) -> Result<(), DataError> {
    for (index, row) in data.rows.iter().enumerate() {
        let invalid = |reason: String| DataError::Invalid { index, reason };

        if row.stock_code.trim().is_empty() {
            return Err(invalid("empty stock_code".to_string()));
        }
        if row.company_name.trim().is_empty() {
            return Err(invalid(format!("empty company_name for {}", row.stock_code)));
        }
        if let Some(prob) = row.default_prob {
            if !prob.is_finite() || !(0.0..=1.0).contains(&prob) {
                return Err(invalid(format!(
                    "default_prob {prob} outside [0, 1] for {}",
                    row.stock_code
                )));
            }
        }
    }
    Ok(())
}
