use tracing::{debug, warn};

use {
    tutorbot_sessions::{BindingRecord, BindingStore},
    tutorbot_students::StudentDirectory,
};

use crate::Result;

/// Why a login attempt did not bind the identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// The message was not exactly `<id> <name>`.
    WrongTokenCount(usize),
    /// No data source has a row with that name, or the lookup failed.
    UnknownStudent,
    /// Id verification is on and the typed id differs from the record's.
    IdMismatch,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    Bound(BindingRecord),
    Rejected(RejectReason),
}

/// Split `"A001 吳志強"` into `("A001", "吳志強")`.
pub fn parse_login(text: &str) -> std::result::Result<(&str, &str), RejectReason> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    match tokens.as_slice() {
        [id, name] => Ok((*id, *name)),
        _ => Err(RejectReason::WrongTokenCount(tokens.len())),
    }
}

/// Try to bind `identity` from a login message.
///
/// `verify_id_column` names the record column the typed id must equal; with
/// `None` the id is taken as typed. Only a store failure is an error; every
/// other problem is a [`LoginOutcome::Rejected`].
pub async fn attempt_login(
    identity: &str,
    text: &str,
    directory: &dyn StudentDirectory,
    store: &dyn BindingStore,
    verify_id_column: Option<&str>,
) -> Result<LoginOutcome> {
    let (student_id, student_name) = match parse_login(text) {
        Ok(pair) => pair,
        Err(reason) => return Ok(LoginOutcome::Rejected(reason)),
    };

    let record = match directory.query_student(student_name).await {
        Ok(Some(record)) => record,
        Ok(None) => {
            debug!(identity, student = student_name, "login for unknown student");
            return Ok(LoginOutcome::Rejected(RejectReason::UnknownStudent));
        },
        Err(e) => {
            warn!(identity, error = %e, "student lookup failed during login");
            return Ok(LoginOutcome::Rejected(RejectReason::UnknownStudent));
        },
    };

    if let Some(column) = verify_id_column
        && let Some(expected) = record.get(column)
        && expected.trim() != student_id
    {
        debug!(identity, student = student_name, "login id does not match record");
        return Ok(LoginOutcome::Rejected(RejectReason::IdMismatch));
    }

    store.put(identity, student_id, student_name).await?;
    Ok(LoginOutcome::Bound(BindingRecord::new(student_id, student_name)))
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::testing::FakeDirectory,
        rstest::rstest,
        tutorbot_sessions::InMemoryBindingStore,
    };

    #[rstest]
    #[case("A001 吳志強", Ok(("A001", "吳志強")))]
    #[case("  A001\t吳志強 ", Ok(("A001", "吳志強")))]
    #[case("A001　吳志強", Ok(("A001", "吳志強")))]
    #[case("吳志強", Err(RejectReason::WrongTokenCount(1)))]
    #[case("A001 吳 志強", Err(RejectReason::WrongTokenCount(3)))]
    #[case("", Err(RejectReason::WrongTokenCount(0)))]
    fn parses_two_tokens(
        #[case] text: &str,
        #[case] expected: std::result::Result<(&str, &str), RejectReason>,
    ) {
        assert_eq!(parse_login(text), expected);
    }

    #[tokio::test]
    async fn known_student_binds_typed_id() {
        let directory = FakeDirectory::with_students(&[("A001", "吳志強")]);
        let store = InMemoryBindingStore::new();
        let outcome = attempt_login("U1", "Z999 吳志強", &directory, &store, None)
            .await
            .unwrap();
        assert_eq!(outcome, LoginOutcome::Bound(BindingRecord::new("Z999", "吳志強")));
        assert_eq!(
            store.get("U1").await.unwrap(),
            Some(BindingRecord::new("Z999", "吳志強"))
        );
    }

    #[tokio::test]
    async fn unknown_student_does_not_bind() {
        let directory = FakeDirectory::with_students(&[("A001", "吳志強")]);
        let store = InMemoryBindingStore::new();
        let outcome = attempt_login("U1", "A002 陳大文", &directory, &store, None)
            .await
            .unwrap();
        assert_eq!(outcome, LoginOutcome::Rejected(RejectReason::UnknownStudent));
        assert!(store.get("U1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn lookup_failure_is_a_rejection() {
        let directory = FakeDirectory::unavailable();
        let store = InMemoryBindingStore::new();
        let outcome = attempt_login("U1", "A001 吳志強", &directory, &store, None)
            .await
            .unwrap();
        assert_eq!(outcome, LoginOutcome::Rejected(RejectReason::UnknownStudent));
    }

    #[tokio::test]
    async fn verified_id_must_match() {
        let directory = FakeDirectory::with_students(&[("A001", "吳志強")]);
        let store = InMemoryBindingStore::new();
        let rejected = attempt_login("U1", "Z999 吳志強", &directory, &store, Some("學號"))
            .await
            .unwrap();
        assert_eq!(rejected, LoginOutcome::Rejected(RejectReason::IdMismatch));
        assert!(store.get("U1").await.unwrap().is_none());

        let bound = attempt_login("U1", "A001 吳志強", &directory, &store, Some("學號"))
            .await
            .unwrap();
        assert!(matches!(bound, LoginOutcome::Bound(_)));
    }
}
