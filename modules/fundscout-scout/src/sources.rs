//! Monitored source roster. Profiles live in code and change out-of-band
//! with site redesigns; a status flip here is a one-line review, not a
//! database migration.
//!
//! Selector lists are ordered most-specific first. The structural extractor
//! stops at the first selector that matches anything.

use fundscout_common::{OriginClass, SourceProfile, SourceStatus};

fn profile(
    id: &str,
    name: &str,
    url: &str,
    selectors: &[&str],
    status: SourceStatus,
    origin: OriginClass,
) -> SourceProfile {
    SourceProfile {
        id: id.to_string(),
        name: name.to_string(),
        url: url.to_string(),
        selectors: selectors.iter().map(|s| s.to_string()).collect(),
        status,
        origin,
    }
}

/// The full monitored roster: state education agencies plus federal and
/// direct-crawl sources.
pub fn roster() -> Vec<SourceProfile> {
    vec![
        profile(
            "tx_tea",
            "Texas Education Agency",
            "https://tea.texas.gov/finance-and-grants/grants",
            &["a[href*='grant']", ".page-content a", "article a"],
            SourceStatus::Active,
            OriginClass::State,
        ),
        // CDE fronts its grant pages with a CAPTCHA wall; scraping it burns
        // requests for nothing until the roster is re-verified.
        profile(
            "ca_cde",
            "California Department of Education",
            "https://www.cde.ca.gov/fg/fo/",
            &["a[href*='fo']", ".main-content a"],
            SourceStatus::Blocked,
            OriginClass::State,
        ),
        profile(
            "ny_nysed",
            "New York State Education Department",
            "https://www.nysed.gov/funding-opportunities",
            &[".view-content a", "a[href*='funding']", ".field-content a"],
            SourceStatus::NeedsVerification,
            OriginClass::State,
        ),
        profile(
            "fl_fldoe",
            "Florida Department of Education",
            "https://www.fldoe.org/finance/grants/",
            &["a[href*='grant']", ".content a"],
            SourceStatus::Active,
            OriginClass::State,
        ),
        profile(
            "il_isbe",
            "Illinois State Board of Education",
            "https://www.isbe.net/Pages/Grants.aspx",
            &["a[href*='Grant']", "a[href*='grant']", ".ms-rtestate-field a"],
            SourceStatus::Active,
            OriginClass::State,
        ),
        profile(
            "pa_pde",
            "Pennsylvania Department of Education",
            "https://www.education.pa.gov/Teachers%20-%20Administrators/Grants/",
            &["a[href*='Grant']", ".ms-rtestate-field a"],
            SourceStatus::Active,
            OriginClass::State,
        ),
        profile(
            "oh_ode",
            "Ohio Department of Education",
            "https://education.ohio.gov/Topics/Finance-and-Funding/Grants",
            &["a[href*='Grant']", ".article-body a"],
            SourceStatus::Active,
            OriginClass::State,
        ),
        profile(
            "ga_gadoe",
            "Georgia Department of Education",
            "https://www.gadoe.org/Finance-and-Business-Operations/Budget-Services/Pages/Grants.aspx",
            &["a[href*='grant']", ".ms-rtestate-field a"],
            SourceStatus::Active,
            OriginClass::State,
        ),
        profile(
            "nc_dpi",
            "North Carolina Department of Public Instruction",
            "https://www.dpi.nc.gov/districts-schools/district-operations/financial-and-business-services/grants",
            &["a[href*='grant']", ".field-items a"],
            SourceStatus::Active,
            OriginClass::State,
        ),
        profile(
            "mi_mde",
            "Michigan Department of Education",
            "https://www.michigan.gov/mde/services/financial-management/grants",
            &["a[href*='grant']", ".page-content a"],
            SourceStatus::Active,
            OriginClass::State,
        ),
        profile(
            "grants_gov",
            "Grants.gov (Education)",
            "https://www.grants.gov/search-grants?cat=ED",
            &["a[href*='search-results-detail']", ".usa-table a"],
            SourceStatus::Active,
            OriginClass::Federal,
        ),
        profile(
            "us_ed",
            "U.S. Department of Education",
            "https://www.ed.gov/grants-and-programs",
            &["a[href*='grant']", ".usa-collection a"],
            SourceStatus::Active,
            OriginClass::Federal,
        ),
        profile(
            "stem_next",
            "STEM Next Opportunity Fund",
            "https://stemnext.org/funding-opportunities/",
            &["a[href*='funding']", ".entry-content a"],
            SourceStatus::Active,
            OriginClass::DirectCrawl,
        ),
    ]
}

pub fn find(id: &str) -> Option<SourceProfile> {
    roster().into_iter().find(|p| p.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roster_ids_are_unique() {
        let profiles = roster();
        let mut ids: Vec<_> = profiles.iter().map(|p| p.id.clone()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), profiles.len());
    }

    #[test]
    fn every_profile_is_well_formed() {
        for p in roster() {
            assert!(p.url.starts_with("https://"), "{} url", p.id);
            assert!(!p.selectors.is_empty(), "{} selectors", p.id);
            assert!(!p.name.is_empty(), "{} name", p.id);
        }
    }

    #[test]
    fn find_by_id() {
        assert!(find("tx_tea").is_some());
        assert!(find("nowhere").is_none());
    }
}
