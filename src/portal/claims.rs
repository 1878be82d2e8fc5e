//! Filtering and totals of the claims list.

use crate::portal::records::{Claim, ClaimStatus};

/// Search and status filter of the claims list.
///
/// # Examples
///
/// ```rust
/// use insurance_flags::portal::claims::ClaimFilter;
/// use insurance_flags::portal::records::ClaimStatus;
///
/// let filter = ClaimFilter::new().search("collision").status(ClaimStatus::Approved);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClaimFilter {
    search: String,
    status: Option<ClaimStatus>,
}

impl ClaimFilter {
    /// Creates a filter matching every claim.
    pub fn new() -> Self {
        Self::default()
    }

    /// Case-insensitive text matched against the claim number, description and type.
    pub fn search(mut self, query: &str) -> Self {
        self.search = query.to_lowercase();
        self
    }

    /// Keeps only claims in `status`.
    pub fn status(mut self, status: ClaimStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// True when `claim` passes the filter.
    pub fn matches(&self, claim: &Claim) -> bool {
        let matches_search = self.search.is_empty()
            || [&claim.claim_number, &claim.description, &claim.claim_type]
                .iter()
                .any(|field| field.to_lowercase().contains(self.search.as_str()));
        let matches_status = self.status.map_or(true, |status| claim.status == status);
        matches_search && matches_status
    }

    /// Claims passing the filter, in their original order.
    pub fn apply<'a>(&self, claims: &'a [Claim]) -> Vec<&'a Claim> {
        claims.iter().filter(|claim| self.matches(claim)).collect()
    }
}

/// Totals shown above the claims list.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ClaimSummary {
    /// Number of claims.
    pub total_claims: usize,
    /// Summed amount of every claim.
    pub total_amount: f64,
    /// Claims submitted or under review.
    pub pending_claims: usize,
    /// Summed amount of approved or paid claims.
    pub approved_amount: f64,
}

impl ClaimSummary {
    /// Aggregates every claim, regardless of any filter.
    pub fn from_claims(claims: &[Claim]) -> Self {
        claims.iter().fold(Self::default(), |mut acc, claim| {
            acc.total_claims += 1;
            acc.total_amount += claim.amount;
            if claim.status.is_pending() {
                acc.pending_claims += 1;
            }
            if claim.status.is_approved() {
                acc.approved_amount += claim.amount;
            }
            acc
        })
    }
}

#[cfg(test)]
mod claims_tests {
    use super::*;

    fn claim(number: &str, claim_type: &str, description: &str, status: ClaimStatus, amount: f64) -> Claim {
        Claim {
            id: number.to_lowercase(),
            policy_id: "p1".to_owned(),
            claim_number: number.to_owned(),
            claim_type: claim_type.to_owned(),
            status,
            amount,
            description: description.to_owned(),
            date_of_loss: "2024-01-01".to_owned(),
            submitted_date: "2024-01-02".to_owned(),
            resolved_date: None,
            created_at: "2024-01-02T00:00:00Z".to_owned(),
            updated_at: "2024-01-02T00:00:00Z".to_owned(),
        }
    }

    fn claims() -> Vec<Claim> {
        vec![
            claim("CLM-001", "Collision", "Parking lot scrape", ClaimStatus::Submitted, 500.0),
            claim("CLM-002", "Water Damage", "Burst pipe in kitchen", ClaimStatus::UnderReview, 4200.0),
            claim("CLM-003", "Theft", "Stolen bicycle", ClaimStatus::Approved, 800.0),
            claim("CLM-004", "Collision", "Highway accident", ClaimStatus::Paid, 12000.0),
            claim("CLM-005", "Hail", "Roof damage", ClaimStatus::Denied, 3000.0),
        ]
    }

    #[test]
    fn empty_filter_matches_all() {
        let claims = claims();
        assert_eq!(ClaimFilter::new().apply(&claims).len(), 5);
    }

    #[test]
    fn search_is_case_insensitive_over_fields() {
        let claims = claims();
        let numbers = |filter: ClaimFilter| {
            filter
                .apply(&claims)
                .iter()
                .map(|c| c.claim_number.as_str())
                .collect::<Vec<&str>>()
        };

        assert_eq!(numbers(ClaimFilter::new().search("COLLISION")), vec!["CLM-001", "CLM-004"]);
        assert_eq!(numbers(ClaimFilter::new().search("pipe")), vec!["CLM-002"]);
        assert_eq!(numbers(ClaimFilter::new().search("clm-003")), vec!["CLM-003"]);
        assert!(numbers(ClaimFilter::new().search("flood")).is_empty());
    }

    #[test]
    fn search_and_status_combine() {
        let claims = claims();
        let filtered = ClaimFilter::new()
            .search("collision")
            .status(ClaimStatus::Paid)
            .apply(&claims);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].claim_number, "CLM-004");
    }

    #[test]
    fn summary() {
        let summary = ClaimSummary::from_claims(&claims());
        assert_eq!(summary.total_claims, 5);
        assert_eq!(summary.total_amount, 20500.0);
        assert_eq!(summary.pending_claims, 2);
        assert_eq!(summary.approved_amount, 12800.0);
        assert_eq!(ClaimSummary::from_claims(&[]), ClaimSummary::default());
    }
}
