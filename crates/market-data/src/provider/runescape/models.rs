//! RuneScape Grand Exchange graph API response models.

use std::collections::HashMap;

use serde::Deserialize;

/// Response of the `/api/graph/{id}.json` endpoint.
///
/// Both maps are keyed by epoch milliseconds encoded as strings.
#[derive(Debug, Deserialize)]
pub struct GraphResponse {
    /// Daily trade price, one point per day the item traded
    pub daily: HashMap<String, i64>,

    /// 30-day moving average of the daily price
    // Note: exposed by the API but not served by the datasource
    #[serde(default)]
    #[allow(dead_code)]
    pub average: HashMap<String, i64>,
}
