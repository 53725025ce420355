//! Access decision model.
//!
//! An [`AccessDecision`] is transient render state: it is recomputed on
//! every evaluation and never persisted. [`AccessDecision::view`] turns it
//! into a presentation-neutral description of what the caller must show.

use serde::{Deserialize, Serialize};

/// Why access to a tool was refused.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum DenialReason {
    /// No actor, or the actor's session is no longer valid.
    Unauthenticated,
    /// An operator switched the tool off.
    ToolInactive,
    /// The actor holds no grant for the tool.
    NotEntitled,
}

impl DenialReason {
    /// Operator-caused denials are transient; the others are
    /// permission problems the actor has to raise with an admin.
    pub fn is_operator_caused(self) -> bool {
        matches!(self, DenialReason::ToolInactive)
    }
}

/// Advisory attached to a granted decision.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum AccessNotice {
    /// A super-admin opened a tool that regular users cannot reach.
    ToolInactive,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum AccessDecision {
    /// Resolution is still in flight.
    Pending,
    Granted { notice: Option<AccessNotice> },
    Denied(DenialReason),
}

impl AccessDecision {
    pub const GRANTED: AccessDecision = AccessDecision::Granted { notice: None };

    pub fn is_granted(&self) -> bool {
        matches!(self, AccessDecision::Granted { .. })
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, AccessDecision::Pending)
    }

    pub fn denial_reason(&self) -> Option<DenialReason> {
        match self {
            AccessDecision::Denied(reason) => Some(*reason),
            _ => None,
        }
    }

    pub fn notice(&self) -> Option<AccessNotice> {
        match self {
            AccessDecision::Granted { notice } => *notice,
            _ => None,
        }
    }

    /// Describe what the caller must render for this decision.
    ///
    /// `back_path` is the safe default view offered from a blocking
    /// message.
    pub fn view(&self, back_path: &str) -> AccessView {
        match self {
            AccessDecision::Pending => AccessView::Loading,
            AccessDecision::Granted { notice } => AccessView::Content {
                advisory: notice.map(|n| match n {
                    AccessNotice::ToolInactive => Advisory {
                        title: "Super Admin Notice",
                        message: "This tool is currently inactive. Regular users cannot access it.",
                    },
                }),
            },
            AccessDecision::Denied(reason) => {
                let (kind, title, message) = match reason {
                    DenialReason::ToolInactive => (
                        BlockedKind::Unavailable,
                        "Tool Unavailable",
                        "This tool is currently unavailable. Contact your admin for more information.",
                    ),
                    DenialReason::NotEntitled => (
                        BlockedKind::Forbidden,
                        "Access Denied",
                        "You don't have access to this tool. Contact your Organization Admin to request access.",
                    ),
                    DenialReason::Unauthenticated => (
                        BlockedKind::Forbidden,
                        "Access Denied",
                        "You need to sign in to access this tool.",
                    ),
                };
                AccessView::Blocked(BlockedView {
                    kind,
                    title,
                    message,
                    back_path: back_path.to_string(),
                    actions: vec![
                        BlockedAction::HistoryBack,
                        BlockedAction::Navigate(back_path.to_string()),
                    ],
                })
            }
        }
    }
}

/// What the caller must render for a decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessView {
    /// Neutral loading state. Neither gated content nor a denial.
    Loading,
    /// Gated content, with an operator-only advisory alongside it when set.
    Content { advisory: Option<Advisory> },
    Blocked(BlockedView),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Advisory {
    pub title: &'static str,
    pub message: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockedKind {
    /// Operator-caused (tool switched off).
    Unavailable,
    /// Permission-caused (not signed in, or not entitled).
    Forbidden,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockedView {
    pub kind: BlockedKind,
    pub title: &'static str,
    pub message: &'static str,
    pub back_path: String,
    /// Ways out of the blocking message, in display order.
    pub actions: Vec<BlockedAction>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockedAction {
    /// Return to the previous view in the caller's history.
    HistoryBack,
    /// Go to a fixed path, normally the safe default view.
    Navigate(String),
}

impl BlockedAction {
    pub fn label(&self) -> &'static str {
        match self {
            BlockedAction::HistoryBack => "Go Back",
            BlockedAction::Navigate(_) => "Go to Dashboard",
        }
    }
}
