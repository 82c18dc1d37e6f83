use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: String,
    pub customer_id: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_address: String,
    pub service: String,
    pub date: String,
    pub time: String,
    pub status: BookingStatus,
    pub otp: String,
    pub worker_id: Option<String>,
    pub worker_name: Option<String>,
    pub worker_phone: Option<String>,
    pub amount: Option<f64>,
    pub used_components: bool,
    pub component_details: Option<String>,
    pub warranty_months: Option<i64>,
    pub warranty_expiry: Option<NaiveDate>,
    pub completion_image: Option<String>,
    pub rating: Option<i64>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum BookingStatus {
    Pending,
    Assigned,
    InProgress,
    Completed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Assigned => "assigned",
            BookingStatus::InProgress => "in-progress",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(BookingStatus::Pending),
            "assigned" => Some(BookingStatus::Assigned),
            "in-progress" => Some(BookingStatus::InProgress),
            "completed" => Some(BookingStatus::Completed),
            "cancelled" => Some(BookingStatus::Cancelled),
            _ => None,
        }
    }

    /// Completed and cancelled bookings never change state again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, BookingStatus::Completed | BookingStatus::Cancelled)
    }

    /// Legal transitions: pending → assigned → in-progress → completed, with
    /// completion also allowed straight from assigned, and cancellation
    /// reachable from any non-terminal state.
    pub fn can_transition_to(&self, next: BookingStatus) -> bool {
        use BookingStatus::*;
        match (self, next) {
            (Pending, Assigned) => true,
            // Re-assignment overwrites the previous worker binding
            (Assigned, Assigned) => true,
            (Assigned, InProgress) => true,
            (Assigned, Completed) | (InProgress, Completed) => true,
            (from, Cancelled) => !from.is_terminal(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_round_trip() {
        for s in ["pending", "assigned", "in-progress", "completed", "cancelled"] {
            let status = BookingStatus::parse(s).unwrap();
            assert_eq!(status.as_str(), s);
        }
        assert!(BookingStatus::parse("unknown").is_none());
    }

    #[test]
    fn test_serde_uses_kebab_case() {
        let json = serde_json::to_string(&BookingStatus::InProgress).unwrap();
        assert_eq!(json, r#""in-progress""#);
    }

    #[test]
    fn test_terminal_states() {
        assert!(BookingStatus::Completed.is_terminal());
        assert!(BookingStatus::Cancelled.is_terminal());
        assert!(!BookingStatus::Pending.is_terminal());
        assert!(!BookingStatus::Assigned.is_terminal());
        assert!(!BookingStatus::InProgress.is_terminal());
    }

    #[test]
    fn test_forward_transitions() {
        use BookingStatus::*;
        assert!(Pending.can_transition_to(Assigned));
        assert!(Assigned.can_transition_to(Assigned));
        assert!(Assigned.can_transition_to(InProgress));
        assert!(Assigned.can_transition_to(Completed));
        assert!(InProgress.can_transition_to(Completed));
    }

    #[test]
    fn test_cancellation_from_non_terminal() {
        use BookingStatus::*;
        assert!(Pending.can_transition_to(Cancelled));
        assert!(Assigned.can_transition_to(Cancelled));
        assert!(InProgress.can_transition_to(Cancelled));
        assert!(!Completed.can_transition_to(Cancelled));
        assert!(!Cancelled.can_transition_to(Cancelled));
    }

    #[test]
    fn test_no_transition_leaves_terminal() {
        use BookingStatus::*;
        for next in [Pending, Assigned, InProgress, Completed, Cancelled] {
            assert!(!Completed.can_transition_to(next));
            assert!(!Cancelled.can_transition_to(next));
        }
    }

    #[test]
    fn test_no_backward_transitions() {
        use BookingStatus::*;
        assert!(!Assigned.can_transition_to(Pending));
        assert!(!InProgress.can_transition_to(Assigned));
        assert!(!Pending.can_transition_to(InProgress));
        assert!(!Pending.can_transition_to(Completed));
    }
}
