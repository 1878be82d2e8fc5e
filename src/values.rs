use crate::flags::Flag;
use serde::Serialize;

/// Every flag's value at the time of the call.
///
/// Meant for one-shot reads; subscribe to the runtime to follow changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlagValues {
    /// See [`Flag::AlertsBanner`].
    pub alerts_banner: bool,
    /// See [`Flag::ClaimsFilters`].
    pub claims_filters: bool,
    /// See [`Flag::PaymentsFilters`].
    pub payments_filters: bool,
    /// See [`Flag::EnhancedPolicyView`].
    pub enhanced_policy_view: bool,
    /// See [`Flag::QuickClaimFiling`].
    pub quick_claim_filing: bool,
}

impl FlagValues {
    pub(crate) fn from_fn(value_of: impl Fn(Flag) -> bool) -> Self {
        Self {
            alerts_banner: value_of(Flag::AlertsBanner),
            claims_filters: value_of(Flag::ClaimsFilters),
            payments_filters: value_of(Flag::PaymentsFilters),
            enhanced_policy_view: value_of(Flag::EnhancedPolicyView),
            quick_claim_filing: value_of(Flag::QuickClaimFiling),
        }
    }

    /// Value of `flag`.
    pub fn get(&self, flag: Flag) -> bool {
        match flag {
            Flag::AlertsBanner => self.alerts_banner,
            Flag::ClaimsFilters => self.claims_filters,
            Flag::PaymentsFilters => self.payments_filters,
            Flag::EnhancedPolicyView => self.enhanced_policy_view,
            Flag::QuickClaimFiling => self.quick_claim_filing,
        }
    }
}

impl Default for FlagValues {
    fn default() -> Self {
        Self::from_fn(|flag| flag.default_value())
    }
}
