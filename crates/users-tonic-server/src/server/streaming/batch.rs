use crate::server::store::UserStore;
use futures::{Stream, StreamExt};
use tokio_util::sync::CancellationToken;
use tonic::Status;
use users_tonic_core::{
    Error,
    proto::{CreateUserRequest, CreateUserResponse, User},
};

/// Users created so far by one `CreateMultipleUsers` call.
///
/// Lives only as long as the call; nothing is shared between calls.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    created: Vec<User>,
}

impl BatchOutcome {
    pub fn created_count(&self) -> usize {
        self.created.len()
    }

    /// The single summary message sent once the client finishes streaming.
    pub fn summary(&self) -> CreateUserResponse {
        CreateUserResponse {
            user: None,
            message: format!(
                "Successfully created {} users in batch",
                self.created_count()
            ),
        }
    }
}

/// Creates one user per inbound request until the client closes its side.
///
/// No response is produced per item. If storing an item fails, the call fails
/// with that error. An error reported by the client on the inbound stream
/// ends the call without a summary; users already created stay stored.
pub async fn create_batch<S>(
    store: &UserStore,
    inbound: S,
    cancel: CancellationToken,
) -> Result<BatchOutcome, Status>
where
    S: Stream<Item = Result<CreateUserRequest, Status>>,
{
    let mut inbound = std::pin::pin!(inbound);
    let mut outcome = BatchOutcome::default();

    loop {
        let next = tokio::select! {
            () = cancel.cancelled() => return Err(Error::ServiceShutdown.into()),
            next = inbound.next() => next,
        };

        match next {
            Some(Ok(req)) => {
                let user = store.create(req)?;
                tracing::debug!(id = user.id, name = %user.name, "Created user in batch");
                outcome.created.push(user);
            }
            Some(Err(status)) => {
                tracing::warn!(
                    created = outcome.created_count(),
                    "Client stream failed mid-batch: {}",
                    status.message()
                );
                return Err(status);
            }
            None => return Ok(outcome),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_stream::iter;
    use tonic::Code;

    fn request(name: &str, department: &str) -> Result<CreateUserRequest, Status> {
        Ok(CreateUserRequest {
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
            age: 30,
            department: department.to_string(),
        })
    }

    #[tokio::test]
    async fn three_items_yield_one_summary() -> Result<(), Status> {
        let store = UserStore::default();
        let before = store.len();
        let inbound = iter(vec![
            request("Bob Wilson", "Marketing"),
            request("Carol Davis", "Sales"),
            request("David Brown", "HR"),
        ]);

        let outcome = create_batch(&store, inbound, CancellationToken::new()).await?;

        assert_eq!(outcome.created_count(), 3);
        assert_eq!(
            outcome.summary().message,
            "Successfully created 3 users in batch"
        );
        assert_eq!(outcome.summary().user, None);
        assert_eq!(store.len(), before + 3);
        let ids: Vec<_> = outcome.created.iter().map(|u| u.id).collect();
        assert_eq!(ids, [3, 4, 5]);
        Ok(())
    }

    #[tokio::test]
    async fn empty_batch_still_summarises() -> Result<(), Status> {
        let store = UserStore::default();
        let outcome = create_batch(&store, iter(Vec::new()), CancellationToken::new()).await?;
        assert_eq!(
            outcome.summary().message,
            "Successfully created 0 users in batch"
        );
        assert_eq!(store.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn inbound_error_ends_call_and_keeps_created_users() {
        let store = UserStore::default();
        let inbound = iter(vec![
            request("Bob Wilson", "Marketing"),
            Err(Status::cancelled("client went away")),
            request("Never Seen", "Nowhere"),
        ]);

        let status = create_batch(&store, inbound, CancellationToken::new())
            .await
            .unwrap_err();

        assert_eq!(status.code(), Code::Cancelled);
        assert_eq!(store.len(), 3);
        assert!(store.values().iter().all(|u| u.name != "Never Seen"));
    }

    #[tokio::test]
    async fn shutdown_interrupts_an_open_batch() {
        let store = UserStore::default();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let status = create_batch(&store, futures::stream::pending(), cancel)
            .await
            .unwrap_err();
        assert_eq!(status.code(), Code::Unavailable);
    }
}
