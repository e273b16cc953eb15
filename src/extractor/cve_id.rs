//! CVE identifier recovery from noisy text.
//!
//! Each pattern covers one formatting convention seen in exploit sources.
//! All patterns scan the whole input independently and their matches are
//! merged into one canonical, deduplicated set.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::bytes::Regex;

/// Ordered ensemble of recovery patterns. Group 1 is the year, group 2 the sequence.
///
/// Digits are spelled `[0-9]`: Unicode digits never form a canonical id.
static CVE_ID_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        // CVE-2018-1111, CVE: 2018-1111, CVE; 2016-0953, CVE 2012-0550, cve-2018-8002
        r"(?i)CVE\s?[-–:;]?\s?([0-9]{4})[-–]\s?([0-9]{4,})",
        // CVE Number:   2011-4189
        r"CVE Number\s*[:;]\s*([0-9]{4})[-–]([0-9]{4,})",
        // [ 'CVE', '2009-0184' ]
        r"\[\s*'CVE'\s*,\s*'([0-9]{4})[-–]([0-9]{4,})\s*'\s*\]",
        // ['CVE'     => '2008-6825']
        r"\[\s*'CVE'\s*=>\s*'([0-9]{4})[-–]([0-9]{4,})\s*'\s*\]",
        // CVE : [2014-3443]
        r"CVE\s*:\s*\[([0-9]{4})[-–]([0-9]{4,})\]",
        // cve20113872, cve_2011_3556, CVE20120053, CVE_2012_4681
        r"(?i)CVE[-_]?([0-9]{4})[-_]?([0-9]{4,})",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("CVE id pattern must compile"))
    .collect()
});

static STRICT_CVE_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^CVE-[0-9]{4}-[0-9]+$").expect("strict CVE id pattern must compile"));

/// Recover every CVE identifier embedded in `text`, normalized to `CVE-YYYY-NNNN`.
///
/// Never fails; text without a recognizable identifier yields an empty set.
pub fn extract_cve_ids(text: &[u8]) -> BTreeSet<String> {
    let mut cve_ids = BTreeSet::new();
    for re in CVE_ID_PATTERNS.iter() {
        for caps in re.captures_iter(text) {
            if let (Some(year), Some(seq)) = (caps.get(1), caps.get(2)) {
                cve_ids.insert(format!(
                    "CVE-{}-{}",
                    String::from_utf8_lossy(year.as_bytes()),
                    String::from_utf8_lossy(seq.as_bytes()),
                ));
            }
        }
    }
    cve_ids
}

/// Strict shape check: the whole token is exactly `CVE-<4 digits>-<digits>`.
pub fn is_cve_id(token: &str) -> bool {
    STRICT_CVE_ID.is_match(token.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single(text: &str) -> Vec<String> {
        extract_cve_ids(text.as_bytes()).into_iter().collect()
    }

    #[test]
    fn test_all_patterns_compile() {
        assert_eq!(CVE_ID_PATTERNS.len(), 6);
        assert!(STRICT_CVE_ID.is_match(b"CVE-2018-1111"));
    }

    #[test]
    fn test_extract_noisy_formats() {
        let cases = [
            ("CVE-2018-1111", "CVE-2018-1111"),
            ("CVE: 2018-1111", "CVE-2018-1111"),
            ("CVE Number: 2011-4189", "CVE-2011-4189"),
            ("['CVE','2009-0184']", "CVE-2009-0184"),
            ("['CVE' => '2008-6825']", "CVE-2008-6825"),
            ("CVE:[2014-3443]", "CVE-2014-3443"),
            ("cve20113872", "CVE-2011-3872"),
            ("CVE_2012_4681", "CVE-2012-4681"),
            ("CVE; 2016-0953", "CVE-2016-0953"),
            ("cve-2018-8002", "CVE-2018-8002"),
            ("CVE–2018–14064", "CVE-2018-14064"),
        ];
        for (input, expected) in cases {
            let got = extract_cve_ids(input.as_bytes());
            assert!(got.contains(expected), "{:?} -> {:?}", input, got);
        }
    }

    #[test]
    fn test_extract_within_surrounding_text() {
        let text = "## Exploit Title: foo\n# CVE : [2014-3443]\n# Tested on: linux";
        assert_eq!(single(text), vec!["CVE-2014-3443"]);
    }

    #[test]
    fn test_extract_deduplicates_overlapping_matches() {
        // Patterns 1 and 6 both match here
        assert_eq!(single("see CVE-2018-1111 and again CVE-2018-1111"), vec!["CVE-2018-1111"]);
    }

    #[test]
    fn test_extract_multiple_ids() {
        let got = extract_cve_ids(b"CVE-2017-0144 / CVE-2017-0145");
        assert_eq!(got.len(), 2);
        assert!(got.contains("CVE-2017-0144"));
        assert!(got.contains("CVE-2017-0145"));
    }

    #[test]
    fn test_extract_no_match_is_empty() {
        assert!(extract_cve_ids(b"nothing to see here 2018-1111").is_empty());
        assert!(extract_cve_ids(b"").is_empty());
        assert!(extract_cve_ids(b"CVE-18-1").is_empty());
    }

    #[test]
    fn test_extract_is_stable_across_runs() {
        let text = b"exploit for cve_2012_4681 (CVE: 2012-4681), also CVE-2013-0422";
        assert_eq!(extract_cve_ids(text), extract_cve_ids(text));
    }

    #[test]
    fn test_extract_invalid_utf8_input() {
        let mut text = b"\xff\xfe CVE-2019-0708 ".to_vec();
        text.push(0xff);
        assert!(extract_cve_ids(&text).contains("CVE-2019-0708"));
    }

    #[test]
    fn test_extract_ignores_non_ascii_digits() {
        // Fullwidth and Arabic-Indic digits
        assert!(extract_cve_ids("CVE-２０１８-１１１１".as_bytes()).is_empty());
        assert!(extract_cve_ids("CVE-٢٠١٨-١١١١".as_bytes()).is_empty());
        assert!(extract_cve_ids("cve_２０１２_４６８１".as_bytes()).is_empty());
        assert!(!is_cve_id("CVE-２０１８-１１１１"));
        assert!(!is_cve_id("CVE-2018-١١١١"));
    }

    #[test]
    fn test_is_cve_id_strict() {
        assert!(is_cve_id("CVE-2018-1002105"));
        assert!(is_cve_id("CVE-2020-1"));
        assert!(!is_cve_id("cve-2018-1111"));
        assert!(!is_cve_id(" CVE-2018-1111"));
        assert!(!is_cve_id("CVE-2018-1111 poc"));
        assert!(!is_cve_id("CVE: 2018-1111"));
        assert!(!is_cve_id("CVE-18-1111"));
    }
}
