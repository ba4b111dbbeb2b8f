use crate::domain::model::ProductId;
use crate::utils::error::{DispatchError, Result};
use std::path::Path;

pub const DEFAULT_PRODUCT_LIST: &str = "bom_product_list.json";

/// Load the product list: a JSON file holding a single array of strings.
///
/// Order is kept and duplicates are not removed, since every element becomes
/// one job. Any read or parse problem is reported as
/// [`DispatchError::ProductListError`] naming the file.
pub fn load_product_list<P: AsRef<Path>>(path: P) -> Result<Vec<ProductId>> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| product_list_error(path, e))?;
    parse_product_list(&content).map_err(|e| product_list_error(path, e))
}

pub fn parse_product_list(content: &str) -> serde_json::Result<Vec<ProductId>> {
    serde_json::from_str(content)
}

fn product_list_error(path: &Path, err: impl std::fmt::Display) -> DispatchError {
    DispatchError::ProductListError {
        path: path.display().to_string(),
        message: err.to_string(),
    }
}
