//! Built-in series catalog and JSON catalog loading.

use std::fs;
use std::path::Path;

use crate::domain::{Granularity, Provider, SeriesSpec};
use crate::error::{AppError, ErrorKind};

use Granularity::{Monthly, Quarterly};
use Provider::{CentralBank, IndexPortal, NationalStats};

/// (title, stat_code, granularity, item_code_1, item_code_2)
const ECOS_SERIES: &[(&str, &str, Granularity, &str, Option<&str>)] = &[
    ("실질GDP", "200Y106", Quarterly, "1400", None),
    ("명목GDP", "200Y105", Quarterly, "1400", None),
    ("소비자물가지수", "901Y009", Monthly, "0", None),
    ("생산자물가지수(기본분류)", "404Y014", Monthly, "*AA", None),
    ("수출물가지수(기본분류)", "402Y014", Monthly, "*AA", Some("W")),
    ("수입물가지수(기본분류)", "401Y015", Monthly, "*AA", Some("W")),
    ("환율(달러)", "731Y006", Monthly, "0000002", Some("0000100")),
    ("환율(위안)", "731Y006", Monthly, "0000007", Some("0000100")),
    ("환율(엔화)", "731Y006", Monthly, "0000006", Some("0000100")),
    ("선행종합지수", "901Y067", Monthly, "I16A", None),
    ("동행종합지수", "901Y067", Monthly, "I16B", None),
    ("후행종합지수", "901Y067", Monthly, "I16C", None),
    ("선행지수순환변동치", "901Y067", Monthly, "I16E", None),
    ("동행지수순환변동치", "901Y067", Monthly, "I16D", None),
    ("향후경기전망CSI", "511Y002", Monthly, "FMBB", Some("99988")),
    ("소비자심리지수", "511Y002", Monthly, "FME", Some("99988")),
    ("기업경기실사지수(실적)_전체", "512Y013", Monthly, "99988", Some("AX")),
    ("기업경기실사지수(실적)_제조업", "512Y013", Monthly, "C0000", Some("AX")),
    ("기업경기실사지수(실적)_비제조업", "512Y013", Monthly, "Y9900", Some("AX")),
    ("기업경기실사지수(전망)_전체", "512Y014", Monthly, "99988", Some("BX")),
    ("기업경기실사지수(전망)_제조업", "512Y014", Monthly, "C0000", Some("BX")),
    ("기업경기실사지수(전망)_비제조업", "512Y014", Monthly, "Y9900", Some("BX")),
];

/// (title, stats_code, ix_code)
const INDEX_PORTAL_SERIES: &[(&str, &str, &str)] = &[
    ("국내총생산 및 경제성장률", "273601", "2736"),
    ("시장금리", "107301", "1073"),
    ("국제수지", "273501", "2735"),
];

/// The default configured series, in fetch order.
pub fn default_catalog() -> Vec<SeriesSpec> {
    let mut out = Vec::with_capacity(ECOS_SERIES.len() + INDEX_PORTAL_SERIES.len() + 1);

    for &(title, stat_code, granularity, item1, item2) in ECOS_SERIES {
        out.push(SeriesSpec::new(title, CentralBank, stat_code, granularity, item1, item2));
    }

    for &(title, stats_code, ix_code) in INDEX_PORTAL_SERIES {
        out.push(SeriesSpec::new(title, IndexPortal, stats_code, Monthly, ix_code, None));
    }

    // Industrial production index table; sheet title comes from the response.
    out.push(
        SeriesSpec::new(
            "KOSIS_지표",
            NationalStats,
            "DT_1J22042",
            Monthly,
            "T02+T03+T04+",
            Some("0+1+2+4+3+"),
        )
        .with_org_id("101"),
    );

    out
}

/// Load a catalog from a JSON array of [`SeriesSpec`] entries.
pub fn load_catalog(path: &Path) -> Result<Vec<SeriesSpec>, AppError> {
    let text = fs::read_to_string(path).map_err(|e| {
        AppError::new(
            ErrorKind::Config,
            format!("Failed to read catalog '{}': {e}", path.display()),
        )
    })?;
    parse_catalog(&text).map_err(|e| {
        AppError::new(
            ErrorKind::Config,
            format!("Invalid catalog '{}': {e}", path.display()),
        )
    })
}

pub fn parse_catalog(text: &str) -> Result<Vec<SeriesSpec>, serde_json::Error> {
    serde_json::from_str(text)
}
