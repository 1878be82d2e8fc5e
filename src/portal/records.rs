//! Claim and payment records as the backend API serves them.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Processing state of a [`Claim`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimStatus {
    /// Filed by the customer.
    Submitted,
    /// Picked up by an adjuster.
    UnderReview,
    /// Accepted, payout pending.
    Approved,
    /// Rejected.
    Denied,
    /// Paid out.
    Paid,
}

impl ClaimStatus {
    /// True while the claim still waits for a decision.
    pub fn is_pending(&self) -> bool {
        matches!(self, ClaimStatus::Submitted | ClaimStatus::UnderReview)
    }

    /// True once the claim was accepted.
    pub fn is_approved(&self) -> bool {
        matches!(self, ClaimStatus::Approved | ClaimStatus::Paid)
    }
}

impl Display for ClaimStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ClaimStatus::Submitted => f.write_str("submitted"),
            ClaimStatus::UnderReview => f.write_str("under_review"),
            ClaimStatus::Approved => f.write_str("approved"),
            ClaimStatus::Denied => f.write_str("denied"),
            ClaimStatus::Paid => f.write_str("paid"),
        }
    }
}

/// An insurance claim as returned by the claims endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claim {
    /// Record identifier.
    pub id: String,
    /// Policy the claim was filed against.
    pub policy_id: String,
    /// Customer-facing claim number.
    pub claim_number: String,
    /// Kind of loss, e.g. `collision` or `water_damage`.
    pub claim_type: String,
    /// Processing state.
    pub status: ClaimStatus,
    /// Claimed amount.
    pub amount: f64,
    /// Free-text description of the loss.
    pub description: String,
    /// ISO date of the loss.
    pub date_of_loss: String,
    /// ISO date the claim was filed.
    pub submitted_date: String,
    /// ISO date of the decision, once there is one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_date: Option<String>,
    /// Record creation timestamp.
    pub created_at: String,
    /// Last update timestamp.
    pub updated_at: String,
}

/// Kind of money movement of a [`Payment`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentType {
    /// Premium paid by the customer.
    Premium,
    /// Claim payout.
    Claim,
    /// Money returned to the customer.
    Refund,
}

/// Processing state of a [`Payment`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Not settled yet.
    Pending,
    /// Settled.
    Completed,
    /// Settlement failed.
    Failed,
    /// Settled, then reversed.
    Refunded,
}

/// A payment as returned by the payments endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    /// Record identifier.
    pub id: String,
    /// Policy the payment belongs to.
    pub policy_id: String,
    /// Paid amount.
    pub amount: f64,
    /// Kind of money movement.
    pub payment_type: PaymentType,
    /// Processing state.
    pub status: PaymentStatus,
    /// Card, bank transfer and the like, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
    /// ISO date of the payment.
    pub payment_date: String,
    /// Record creation timestamp.
    pub created_at: String,
}
