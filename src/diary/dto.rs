use serde::Deserialize;
use time::Date;

use super::repo_types::iso_date;

#[derive(Debug, Deserialize)]
pub struct DateQuery {
    #[serde(with = "iso_date")]
    pub date: Date,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRangeQuery {
    #[serde(with = "iso_date")]
    pub start_date: Date,
    #[serde(with = "iso_date")]
    pub end_date: Date,
}
