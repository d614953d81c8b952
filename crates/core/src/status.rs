//! Entity status machines.
//!
//! `PostStatus` discriminants match the SMALLINT values stored in the
//! `posts.status` column; `PaymentStatus` maps to the TEXT values stored
//! in `payments.status`. Both machines are one-directional except where
//! an edge is explicitly allowed below.

use crate::types::DbId;

/// Status ID type matching SMALLINT in the database.
pub type StatusId = i16;

/// Lifecycle status of a post.
#[repr(i16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostStatus {
    /// Awaiting its first moderation evaluation (or awaiting payment).
    Draft = 0,
    /// Awaiting an admin approve/reject decision.
    PendingManualReview = 1,
    /// Rejected by the classifier or an admin.
    Rejected = 2,
    /// Live and visible in listings.
    Published = 3,
    /// Aged out by the expiry sweep or archived by the owner.
    Archived = 4,
}

impl PostStatus {
    /// Return the database status ID.
    pub fn id(self) -> StatusId {
        self as StatusId
    }

    /// Map a raw database value back to a status.
    pub fn from_id(id: StatusId) -> Option<Self> {
        match id {
            0 => Some(Self::Draft),
            1 => Some(Self::PendingManualReview),
            2 => Some(Self::Rejected),
            3 => Some(Self::Published),
            4 => Some(Self::Archived),
            _ => None,
        }
    }

    /// Whether `from -> to` is a legal edge of the status machine.
    ///
    /// | From | To | Trigger |
    /// |---|---|---|
    /// | Draft | PendingManualReview | orchestrator, manual or hybrid mode |
    /// | Draft | Published | orchestrator, no moderation or auto pass |
    /// | Draft | Rejected | orchestrator, auto fail |
    /// | PendingManualReview | Published | admin approve |
    /// | PendingManualReview | Rejected | admin reject |
    /// | Published | Archived | expiry sweep or owner archive |
    /// | Archived | Draft | owner resubmission |
    /// | Rejected | Draft | owner edit |
    pub fn can_transition(from: Self, to: Self) -> bool {
        use PostStatus::*;
        matches!(
            (from, to),
            (Draft, PendingManualReview)
                | (Draft, Published)
                | (Draft, Rejected)
                | (PendingManualReview, Published)
                | (PendingManualReview, Rejected)
                | (Published, Archived)
                | (Archived, Draft)
                | (Rejected, Draft)
        )
    }
}

impl From<PostStatus> for StatusId {
    fn from(value: PostStatus) -> Self {
        value as StatusId
    }
}

impl std::fmt::Display for PostStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PostStatus::Draft => "draft",
            PostStatus::PendingManualReview => "pending_manual_review",
            PostStatus::Rejected => "rejected",
            PostStatus::Published => "published",
            PostStatus::Archived => "archived",
        };
        f.write_str(s)
    }
}

/// Ledger status of a payment. Stored as TEXT.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
    Cancelled,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Cancelled => "cancelled",
            PaymentStatus::Refunded => "refunded",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "paid" => Some(Self::Paid),
            "failed" => Some(Self::Failed),
            "cancelled" => Some(Self::Cancelled),
            "refunded" => Some(Self::Refunded),
            _ => None,
        }
    }

    /// Payment transitions are monotonic: `pending` resolves exactly once,
    /// and only a `paid` payment can be refunded.
    pub fn can_transition(from: Self, to: Self) -> bool {
        use PaymentStatus::*;
        matches!(
            (from, to),
            (Pending, Paid) | (Pending, Failed) | (Pending, Cancelled) | (Paid, Refunded)
        )
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Describe an illegal post transition for error messages.
pub fn illegal_transition(post_id: DbId, from: PostStatus, to: PostStatus) -> String {
    format!("Post {post_id} cannot move from '{from}' to '{to}'")
}
