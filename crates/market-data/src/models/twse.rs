use serde::Deserialize;

/// Success sentinel in the `stat` field of a STOCK_DAY response.
pub(crate) const STAT_OK: &str = "OK";

/// Daily trading payload returned by the exchange's STOCK_DAY endpoint.
///
/// All fields default because error responses carry only `stat`. Each row in
/// `data` is an array of strings ordered: date (ROC calendar), trade volume,
/// trade value, open, high, low, close, change, transaction count.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct TwseDayResponse {
    #[serde(default)]
    pub stat: String,

    #[serde(default)]
    pub date: String,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub fields: Vec<String>,

    #[serde(default)]
    pub data: Vec<Vec<String>>,

    #[serde(default)]
    pub notes: Vec<String>,
}

impl TwseDayResponse {
    /// Whether the exchange reported success.
    pub fn is_ok(&self) -> bool {
        self.stat == STAT_OK
    }
}
