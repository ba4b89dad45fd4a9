use super::*;
use async_trait::async_trait;
use teller_protocols::error::WorkflowError;
use teller_protocols::workflow::WorkflowContext;

struct Idle;

#[async_trait]
impl Workflow for Idle {
    async fn initialize(
        &self,
        _ctx: &WorkflowContext,
        _params: serde_json::Value,
    ) -> Result<(), WorkflowError> {
        Ok(())
    }

    async fn handle_primary_action(&self, _ctx: &WorkflowContext) -> Result<(), WorkflowError> {
        Ok(())
    }
}

fn push(
    stack: &mut WorkflowStack,
    id: &str,
    parent: Option<EntryId>,
) -> (EntryId, oneshot::Receiver<WorkflowResult>) {
    let pushed = stack.push(id, Arc::new(Idle), parent);
    stack.refocus();
    pushed
}

fn title(text: &str) -> PresentationUpdate {
    PresentationUpdate::Title {
        text: text.to_string(),
    }
}

#[test]
fn test_push_suspends_parent() {
    let mut stack = WorkflowStack::new();
    let (loan, _) = push(&mut stack, "loan", None);
    stack.get_mut(loan).unwrap().state = EntryState::Active;

    let (signing, _) = push(&mut stack, "signing", Some(loan));

    assert_eq!(stack.len(), 2);
    assert_eq!(stack.get(loan).unwrap().state, EntryState::Suspended);
    assert_eq!(stack.get(signing).unwrap().state, EntryState::Initializing);
    assert!(stack.is_top(signing));
    assert_eq!(stack.child_of(loan), Some(signing));
    assert_eq!(stack.child_of(signing), None);
}

#[test]
fn test_descendants_innermost_first() {
    let mut stack = WorkflowStack::new();
    let (account, _) = push(&mut stack, "account-opening", None);
    let (kyc, _) = push(&mut stack, "kyc", Some(account));
    let (verification, _) = push(&mut stack, "kyc-verification", Some(kyc));
    let (unrelated, _) = push(&mut stack, "loan", None);

    assert_eq!(stack.descendants(account), vec![verification, kyc]);
    assert_eq!(stack.descendants(kyc), vec![verification]);
    assert!(stack.descendants(unrelated).is_empty());
    assert!(stack.descendants(EntryId::new()).is_empty());
}

#[test]
fn test_remove_resolves_and_reactivates_parent() {
    let mut stack = WorkflowStack::new();
    let (loan, _) = push(&mut stack, "loan", None);
    let (signing, mut receiver) = push(&mut stack, "signing", Some(loan));

    let removed = stack
        .remove(signing, WorkflowResult::success())
        .expect("signing is live");
    assert_eq!(removed.workflow_id, "signing");
    assert_eq!(removed.parent, Some(loan));

    assert_eq!(receiver.try_recv().unwrap(), WorkflowResult::success());
    assert_eq!(stack.get(loan).unwrap().state, EntryState::Resuming);
    assert!(stack.remove(signing, WorkflowResult::success()).is_none());
}

#[test]
fn test_remove_with_dropped_receiver() {
    let mut stack = WorkflowStack::new();
    let (loan, receiver) = push(&mut stack, "loan", None);
    drop(receiver);

    assert!(stack.remove(loan, WorkflowResult::failure("gone")).is_some());
    assert!(stack.is_empty());
}

#[test]
fn test_relay_buffers_while_suspended() {
    let mut stack = WorkflowStack::new();
    let (loan, _) = push(&mut stack, "loan", None);
    assert_eq!(
        stack.relay(loan, title("Loan")),
        Relay::Deliver(title("Loan"))
    );

    let (signing, _) = push(&mut stack, "signing", Some(loan));
    assert_eq!(stack.relay(loan, title("Loan (step 2)")), Relay::Buffered);
    assert_eq!(
        stack.relay(signing, title("Sign")),
        Relay::Deliver(title("Sign"))
    );

    let snapshot = stack.get(loan).unwrap().snapshot();
    assert_eq!(snapshot.buffered, 1);
    assert_eq!(snapshot.presentation.title, "Loan (step 2)");

    assert_eq!(stack.relay(EntryId::new(), title("x")), Relay::Unknown);
}

#[test]
fn test_refocus_replays_restore_then_buffer() {
    let mut stack = WorkflowStack::new();
    let (loan, _) = push(&mut stack, "loan", None);
    stack.relay(loan, title("Loan"));

    let (signing, _) = push(&mut stack, "signing", Some(loan));
    stack.relay(loan, title("Buffered 1"));
    stack.relay(loan, title("Buffered 2"));

    stack.remove(signing, WorkflowResult::success());
    let Focus::Changed(updates) = stack.refocus() else {
        panic!("focus should move back to loan");
    };

    let mut before_suspend = PresentationState::default();
    before_suspend.apply(&title("Loan"));
    let restore = before_suspend.to_updates();
    assert_eq!(updates.len(), restore.len() + 2);
    assert_eq!(&updates[..restore.len()], restore.as_slice());
    assert_eq!(updates[restore.len()], title("Buffered 1"));
    assert_eq!(updates[restore.len() + 1], title("Buffered 2"));

    assert_eq!(stack.get(loan).unwrap().snapshot().buffered, 0);
    assert_eq!(stack.refocus(), Focus::Unchanged);
}

#[test]
fn test_refocus_cleared_when_empty() {
    let mut stack = WorkflowStack::new();
    let (loan, _) = push(&mut stack, "loan", None);
    stack.remove(loan, WorkflowResult::success());
    assert_eq!(stack.refocus(), Focus::Cleared);
    assert_eq!(stack.refocus(), Focus::Unchanged);
}

#[test]
fn test_new_entry_starts_from_default_presentation() {
    let mut stack = WorkflowStack::new();
    stack.push("loan", Arc::new(Idle), None);
    let Focus::Changed(updates) = stack.refocus() else {
        panic!("new entry takes focus");
    };
    assert_eq!(updates, PresentationState::default().to_updates());
}

#[test]
fn test_ids_top_down() {
    let mut stack = WorkflowStack::new();
    let (a, _) = push(&mut stack, "a", None);
    let (b, _) = push(&mut stack, "b", Some(a));
    assert_eq!(stack.ids_top_down(), vec![b, a]);
    assert_eq!(stack.snapshots().len(), 2);
}
