// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Delete-confirmation dialog state.
//!
//! The dialog asks the user to confirm, then runs the delete action once.
//! While the action is outstanding the trigger is disabled and relabelled;
//! a second confirmation from the same control is ignored rather than
//! issuing a concurrent delete. Failures are not surfaced in the dialog.

use crate::actions::{DeleteEventAction, DeleteEventParams};
use crate::error::AppError;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};

pub const TITLE: &str = "Are you sure you want to delete?";
pub const DESCRIPTION: &str = "This will permanently delete this event";
pub const CANCEL_LABEL: &str = "Cancel";
pub const DELETE_LABEL: &str = "Delete";
pub const PENDING_LABEL: &str = "Deleting...";

/// Renderable snapshot of the dialog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DialogView {
    pub title: &'static str,
    pub description: &'static str,
    pub cancel_label: &'static str,
    pub confirm_label: &'static str,
    pub confirm_disabled: bool,
}

/// Result of pressing the confirm button.
#[derive(Debug)]
pub enum ConfirmOutcome {
    /// The delete action ran to completion.
    Completed(Result<bool, AppError>),
    /// A delete from this control was still outstanding; nothing was issued.
    AlreadyPending,
}

/// One delete-confirmation control, bound to an event and the current page.
#[derive(Debug)]
pub struct DeleteConfirmation {
    event_id: String,
    pathname: String,
    pending: AtomicBool,
}

/// Clears the pending flag when the action finishes, even if the future is
/// dropped part-way through.
struct PendingGuard<'a>(&'a AtomicBool);

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl DeleteConfirmation {
    pub fn new(event_id: impl Into<String>, pathname: impl Into<String>) -> Self {
        Self {
            event_id: event_id.into(),
            pathname: pathname.into(),
            pending: AtomicBool::new(false),
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }

    /// Label of the confirm button.
    pub fn label(&self) -> &'static str {
        if self.is_pending() {
            PENDING_LABEL
        } else {
            DELETE_LABEL
        }
    }

    pub fn view(&self) -> DialogView {
        DialogView {
            title: TITLE,
            description: DESCRIPTION,
            cancel_label: CANCEL_LABEL,
            confirm_label: self.label(),
            confirm_disabled: self.is_pending(),
        }
    }

    /// Handle an explicit confirmation.
    ///
    /// The current page path travels with the request so the list it shows
    /// is revalidated once the event is gone.
    pub async fn confirm<A: DeleteEventAction>(&self, action: &A) -> ConfirmOutcome {
        if self
            .pending
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::debug!(event_id = %self.event_id, "Delete already pending");
            return ConfirmOutcome::AlreadyPending;
        }
        let _guard = PendingGuard(&self.pending);

        let result = action
            .delete_event(DeleteEventParams {
                event_id: self.event_id.clone(),
                path: self.pathname.clone(),
            })
            .await;

        if let Err(e) = &result {
            tracing::warn!(event_id = %self.event_id, error = %e, "Delete action failed");
        }

        ConfirmOutcome::Completed(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::future::Future;
    use std::sync::atomic::AtomicUsize;
    use std::sync::{Arc, Mutex};
    use tokio::sync::Notify;

    /// Action that blocks until released and counts invocations.
    #[derive(Default)]
    struct GatedAction {
        calls: AtomicUsize,
        seen: Mutex<Vec<DeleteEventParams>>,
        started: Notify,
        release: Notify,
        fail: bool,
    }

    impl DeleteEventAction for Arc<GatedAction> {
        fn delete_event(
            &self,
            params: DeleteEventParams,
        ) -> impl Future<Output = Result<bool, AppError>> + Send {
            let this = self.clone();
            async move {
                this.calls.fetch_add(1, Ordering::SeqCst);
                this.seen.lock().unwrap().push(params);
                this.started.notify_one();
                this.release.notified().await;
                if this.fail {
                    Err(AppError::Database("boom".to_string()))
                } else {
                    Ok(true)
                }
            }
        }
    }

    #[tokio::test]
    async fn test_second_confirm_while_pending_is_ignored() {
        let action = Arc::new(GatedAction::default());
        let dialog = Arc::new(DeleteConfirmation::new("evt_1", "/events"));

        let first = {
            let (dialog, action) = (dialog.clone(), action.clone());
            tokio::spawn(async move { dialog.confirm(&action).await })
        };
        action.started.notified().await;

        assert!(dialog.is_pending());
        assert_eq!(dialog.label(), PENDING_LABEL);
        assert!(dialog.view().confirm_disabled);

        let second = dialog.confirm(&action).await;
        assert!(matches!(second, ConfirmOutcome::AlreadyPending));

        action.release.notify_one();
        let first = first.await.unwrap();
        assert!(matches!(first, ConfirmOutcome::Completed(Ok(true))));

        assert_eq!(action.calls.load(Ordering::SeqCst), 1);
        assert!(!dialog.is_pending());
        assert_eq!(dialog.label(), DELETE_LABEL);
        assert_eq!(
            action.seen.lock().unwrap()[0],
            DeleteEventParams {
                event_id: "evt_1".to_string(),
                path: "/events".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_failure_clears_pending() {
        let action = Arc::new(GatedAction {
            fail: true,
            ..Default::default()
        });
        let dialog = DeleteConfirmation::new("evt_1", "/profile");

        action.release.notify_one();
        let outcome = dialog.confirm(&action).await;

        assert!(matches!(outcome, ConfirmOutcome::Completed(Err(_))));
        assert!(!dialog.is_pending());
        assert_eq!(dialog.label(), DELETE_LABEL);
    }

    #[test]
    fn test_initial_view() {
        let dialog = DeleteConfirmation::new("evt_1", "/events");
        assert_eq!(
            dialog.view(),
            DialogView {
                title: TITLE,
                description: DESCRIPTION,
                cancel_label: CANCEL_LABEL,
                confirm_label: DELETE_LABEL,
                confirm_disabled: false,
            }
        );
    }
}
