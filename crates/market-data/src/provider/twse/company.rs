//! Static company-name lookup for common listed codes.

use lazy_static::lazy_static;
use std::collections::HashMap;

lazy_static! {
    /// Display names for frequently watched codes. Anything outside this
    /// table gets a placeholder; a full listing would come from a separate
    /// endpoint.
    static ref COMPANY_NAMES: HashMap<&'static str, &'static str> = HashMap::from([
        ("0050", "元大台灣50"),
        ("2330", "台積電"),
        ("2454", "聯發科"),
        ("2412", "中華電"),
        ("2317", "鴻海"),
        ("1301", "台塑"),
        ("1303", "南亞"),
        ("2881", "富邦金"),
        ("2882", "國泰金"),
        ("2884", "玉山金"),
    ]);
}

/// Resolve the display name for a bare numeric code.
///
/// Unknown codes are not an error; they resolve to a placeholder embedding
/// the code.
pub fn company_name(code: &str) -> String {
    COMPANY_NAMES
        .get(code)
        .map(|name| (*name).to_string())
        .unwrap_or_else(|| format!("Unknown company ({code})"))
}
