use std::future::Future;

use tracing::info;

use crate::{
    errors::ProvisionError,
    prompt::{Confirm, Decision},
};

/// What [`ensure_exists`] found or did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnsureOutcome {
    AlreadyExists,
    Created,
}

/// Create a resource only if it is absent, gated by operator confirmation.
///
/// Nothing is created unattended: an absent resource is only created after
/// the confirmation source approves, and a decline stops the whole run. A
/// failed create is fatal; resources created earlier in the run are left
/// as-is for an idempotent re-run to pick up.
pub async fn ensure_exists<E, EFut, C, CFut>(
    kind: &'static str,
    question: &str,
    confirm: &mut dyn Confirm,
    exists: E,
    create: C,
) -> Result<EnsureOutcome, ProvisionError>
where
    E: FnOnce() -> EFut,
    EFut: Future<Output = anyhow::Result<bool>>,
    C: FnOnce() -> CFut,
    CFut: Future<Output = anyhow::Result<()>>,
{
    if exists().await.map_err(|cause| ProvisionError::CheckFailed { kind, cause })? {
        info!("{kind} found");
        return Ok(EnsureOutcome::AlreadyExists);
    }
    info!("{kind} not found");
    let decision = confirm
        .confirm(question, None)
        .map_err(|cause| ProvisionError::CheckFailed { kind, cause: cause.into() })?;
    match decision {
        Decision::Declined => Err(ProvisionError::Declined { kind }),
        Decision::Approved => {
            info!("creating {kind}");
            create().await.map_err(|cause| ProvisionError::CreationFailed { kind, cause })?;
            Ok(EnsureOutcome::Created)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::Cell, io};

    use anyhow::anyhow;

    use super::*;

    struct ScriptedConfirm {
        answer: Decision,
        asked: Cell<usize>,
    }

    impl ScriptedConfirm {
        fn new(answer: Decision) -> Self {
            Self { answer, asked: Cell::new(0) }
        }
    }

    impl Confirm for ScriptedConfirm {
        fn confirm(&mut self, _question: &str, _default: Option<bool>) -> io::Result<Decision> {
            self.asked.set(self.asked.get() + 1);
            Ok(self.answer)
        }
    }

    #[tokio::test]
    async fn existing_resource_is_a_no_op() {
        let mut confirm = ScriptedConfirm::new(Decision::Declined);
        let created = Cell::new(false);
        let outcome = ensure_exists(
            "table",
            "create?",
            &mut confirm,
            || async { Ok(true) },
            || async {
                created.set(true);
                Ok(())
            },
        )
        .await
        .unwrap();
        assert_eq!(outcome, EnsureOutcome::AlreadyExists);
        assert!(!created.get(), "create_fn must not run for an existing resource");
        assert_eq!(confirm.asked.get(), 0, "no prompt for an existing resource");
    }

    #[tokio::test]
    async fn approved_creation_runs_create_once() {
        let mut confirm = ScriptedConfirm::new(Decision::Approved);
        let created = Cell::new(0);
        let outcome = ensure_exists(
            "application",
            "create?",
            &mut confirm,
            || async { Ok(false) },
            || async {
                created.set(created.get() + 1);
                Ok(())
            },
        )
        .await
        .unwrap();
        assert_eq!(outcome, EnsureOutcome::Created);
        assert_eq!(created.get(), 1);
        assert_eq!(confirm.asked.get(), 1);
    }

    #[tokio::test]
    async fn declined_creation_stops_without_creating() {
        let mut confirm = ScriptedConfirm::new(Decision::Declined);
        let created = Cell::new(false);
        let err = ensure_exists(
            "environment",
            "create?",
            &mut confirm,
            || async { Ok(false) },
            || async {
                created.set(true);
                Ok(())
            },
        )
        .await
        .unwrap_err();
        assert!(err.is_decline());
        assert!(!created.get(), "create_fn must not run after a decline");
    }

    #[tokio::test]
    async fn failed_create_is_fatal() {
        let mut confirm = ScriptedConfirm::new(Decision::Approved);
        let err = ensure_exists(
            "table",
            "create?",
            &mut confirm,
            || async { Ok(false) },
            || async { Err(anyhow!("limit exceeded")) },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ProvisionError::CreationFailed { kind: "table", .. }));
    }

    #[tokio::test]
    async fn failed_existence_check_is_fatal_and_never_prompts() {
        let mut confirm = ScriptedConfirm::new(Decision::Approved);
        let err = ensure_exists(
            "application",
            "create?",
            &mut confirm,
            || async { Err(anyhow!("access denied")) },
            || async { Ok(()) },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ProvisionError::CheckFailed { kind: "application", .. }));
        assert_eq!(confirm.asked.get(), 0);
    }
}
