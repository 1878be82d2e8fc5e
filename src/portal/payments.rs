//! Filtering and totals of the payments list.

use crate::portal::records::{Payment, PaymentStatus, PaymentType};

/// Type and status filter of the payments list.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PaymentFilter {
    payment_type: Option<PaymentType>,
    status: Option<PaymentStatus>,
}

impl PaymentFilter {
    /// Creates a filter matching every payment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Keeps only payments of `payment_type`.
    pub fn payment_type(mut self, payment_type: PaymentType) -> Self {
        self.payment_type = Some(payment_type);
        self
    }

    /// Keeps only payments in `status`.
    pub fn status(mut self, status: PaymentStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// True when `payment` passes the filter.
    pub fn matches(&self, payment: &Payment) -> bool {
        self.payment_type.map_or(true, |t| payment.payment_type == t)
            && self.status.map_or(true, |s| payment.status == s)
    }

    /// Payments passing the filter, in their original order.
    pub fn apply<'a>(&self, payments: &'a [Payment]) -> Vec<&'a Payment> {
        payments.iter().filter(|payment| self.matches(payment)).collect()
    }
}

/// Totals shown above the payments list.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PaymentSummary {
    /// Number of payments.
    pub total_payments: usize,
    /// Summed amount of every payment.
    pub total_amount: f64,
    /// Summed amount of completed payments.
    pub completed_amount: f64,
    /// Summed amount of pending payments.
    pub pending_amount: f64,
    /// Summed amount of premium payments, whatever their status.
    pub premium_payments: f64,
}

impl PaymentSummary {
    /// Aggregates every payment, regardless of any filter.
    pub fn from_payments(payments: &[Payment]) -> Self {
        payments.iter().fold(Self::default(), |mut acc, payment| {
            acc.total_payments += 1;
            acc.total_amount += payment.amount;
            match payment.status {
                PaymentStatus::Completed => acc.completed_amount += payment.amount,
                PaymentStatus::Pending => acc.pending_amount += payment.amount,
                _ => {}
            }
            if payment.payment_type == PaymentType::Premium {
                acc.premium_payments += payment.amount;
            }
            acc
        })
    }
}
