use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};

pub type PurchaseId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PurchaseStatus {
    Pending,
    Accepted,
    Ready,
    Completed,
    Rejected,
    Cancelled,
    Unknown,
}

/// Colour family of the status badge in order lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeTone {
    Warning,
    Info,
    Success,
    Danger,
    Neutral,
}

impl PurchaseStatus {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "PENDING" => PurchaseStatus::Pending,
            "ACCEPTED" => PurchaseStatus::Accepted,
            "READY" => PurchaseStatus::Ready,
            "COMPLETED" => PurchaseStatus::Completed,
            "REJECTED" => PurchaseStatus::Rejected,
            "CANCELLED" | "CANCELED" => PurchaseStatus::Cancelled,
            _ => PurchaseStatus::Unknown,
        }
    }

    pub fn badge(self) -> BadgeTone {
        match self {
            PurchaseStatus::Pending => BadgeTone::Warning,
            PurchaseStatus::Accepted | PurchaseStatus::Ready => BadgeTone::Info,
            PurchaseStatus::Completed => BadgeTone::Success,
            PurchaseStatus::Rejected | PurchaseStatus::Cancelled => BadgeTone::Danger,
            PurchaseStatus::Unknown => BadgeTone::Neutral,
        }
    }
}

/// Read-only snapshot of an order as the server reports it.
#[derive(Debug, Clone, PartialEq)]
pub struct Purchase {
    pub purchase_id: PurchaseId,
    pub listing_title: String,
    pub quantity: u32,
    pub status: PurchaseStatus,
    pub purchase_date: DateTime<Utc>,
    pub total_price: BigDecimal,
}

/// One page of previous orders.
#[derive(Debug, Clone, PartialEq)]
pub struct PurchasePage {
    pub purchases: Vec<Purchase>,
    pub has_next: bool,
}

/// Body of the purchase-creation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseRequest {
    pub is_delivery: bool,
    pub notes: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_statuses_case_insensitively() {
        assert_eq!(PurchaseStatus::parse("pending"), PurchaseStatus::Pending);
        assert_eq!(PurchaseStatus::parse("COMPLETED"), PurchaseStatus::Completed);
        assert_eq!(PurchaseStatus::parse("canceled"), PurchaseStatus::Cancelled);
    }

    #[test]
    fn unknown_status_gets_neutral_badge() {
        let status = PurchaseStatus::parse("IN_TRANSIT");
        assert_eq!(status, PurchaseStatus::Unknown);
        assert_eq!(status.badge(), BadgeTone::Neutral);
    }

    #[test]
    fn rejected_orders_are_flagged_red() {
        assert_eq!(PurchaseStatus::Rejected.badge(), BadgeTone::Danger);
        assert_eq!(PurchaseStatus::Pending.badge(), BadgeTone::Warning);
    }
}
