use core::{ops::Range, time::Duration};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tonic::Status;
use users_tonic_core::{
    Error,
    proto::{ListUsersRequest, User},
};

/// Index range of the requested page within `len` filtered users.
///
/// Pages are 1-based. A page past the end, a page below 1, or a non-positive
/// page size all select nothing.
pub fn page_bounds(page: i32, page_size: i32, len: usize) -> Range<usize> {
    if page < 1 || page_size < 1 {
        return 0..0;
    }
    let page_size = page_size as usize;
    let start = (page as usize - 1).saturating_mul(page_size).min(len);
    let end = start.saturating_add(page_size).min(len);
    start..end
}

/// Applies the department filter and pagination of `req` to `snapshot`.
///
/// The department match is exact and case-sensitive; an empty department
/// keeps every user. Snapshot order is preserved.
pub fn select_page(snapshot: Vec<User>, req: &ListUsersRequest) -> Vec<User> {
    let filtered: Vec<User> = if req.department.is_empty() {
        snapshot
    } else {
        snapshot
            .into_iter()
            .filter(|user| user.department == req.department)
            .collect()
    };

    let bounds = page_bounds(req.page, req.page_size, filtered.len());
    filtered
        .into_iter()
        .skip(bounds.start)
        .take(bounds.len())
        .collect()
}

/// Sends `page` to the client one user at a time, `pacing` apart.
///
/// Returns the number of users delivered. Stops early when the client goes
/// away (the response channel closes) or when `cancel` fires during
/// shutdown; in the latter case the client is told the service is going
/// down.
pub async fn feed_page(
    page: Vec<User>,
    resp_tx: mpsc::Sender<Result<User, Status>>,
    pacing: Duration,
    cancel: CancellationToken,
) -> users_tonic_core::Result<usize> {
    let mut sent = 0;

    for user in page {
        if !pacing.is_zero() && sent > 0 {
            tokio::select! {
                () = cancel.cancelled() => return abort(&resp_tx).await,
                () = tokio::time::sleep(pacing) => {}
            }
        }

        if cancel.is_cancelled() {
            return abort(&resp_tx).await;
        }

        if let Err(e) = resp_tx.send(Ok(user)).await {
            return Err(Error::ChannelError {
                context: format!("Failed to forward user: {e}"),
            });
        }
        sent += 1;
    }

    Ok(sent)
}

async fn abort(resp_tx: &mpsc::Sender<Result<User, Status>>) -> users_tonic_core::Result<usize> {
    if let Err(e) = resp_tx.send(Err(Error::ServiceShutdown.into())).await {
        tracing::debug!("Failed to forward shutdown: {e}");
    }
    Err(Error::ServiceShutdown)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::store::UserStore;
    use tonic::Code;
    use users_tonic_core::proto::CreateUserRequest;

    fn list(page: i32, page_size: i32, department: &str) -> ListUsersRequest {
        ListUsersRequest {
            page,
            page_size,
            department: department.to_string(),
        }
    }

    fn names(users: &[User]) -> Vec<&str> {
        users.iter().map(|u| u.name.as_str()).collect()
    }

    #[test]
    fn page_bounds_slice_best_effort() {
        assert_eq!(page_bounds(1, 10, 2), 0..2);
        assert_eq!(page_bounds(2, 10, 2), 2..2);
        assert_eq!(page_bounds(2, 2, 5), 2..4);
        assert_eq!(page_bounds(3, 2, 5), 4..5);
        assert_eq!(page_bounds(0, 10, 5), 0..0);
        assert_eq!(page_bounds(1, 0, 5), 0..0);
        assert_eq!(page_bounds(-1, -1, 5), 0..0);
        assert_eq!(page_bounds(i32::MAX, i32::MAX, 5), 5..5);
    }

    #[test]
    fn engineering_filter_over_seeds_yields_john() {
        let store = UserStore::default();
        let page = select_page(store.values(), &list(1, 10, "Engineering"));
        assert_eq!(names(&page), ["John Doe"]);
    }

    #[test]
    fn department_match_is_case_sensitive() {
        let store = UserStore::default();
        assert!(select_page(store.values(), &list(1, 10, "engineering")).is_empty());
    }

    #[test]
    fn page_past_the_end_is_empty() {
        let store = UserStore::default();
        assert!(select_page(store.values(), &list(2, 10, "")).is_empty());
    }

    #[test]
    fn pages_follow_snapshot_order() -> users_tonic_core::Result<()> {
        let store = UserStore::default();
        for name in ["Bob Wilson", "Carol Davis", "David Brown"] {
            store.create(CreateUserRequest {
                name: name.to_string(),
                department: "Sales".to_string(),
                ..Default::default()
            })?;
        }
        let second = select_page(store.values(), &list(2, 2, ""));
        assert_eq!(names(&second), ["Bob Wilson", "Carol Davis"]);
        let sales = select_page(store.values(), &list(2, 2, "Sales"));
        assert_eq!(names(&sales), ["David Brown"]);
        Ok(())
    }

    #[tokio::test]
    async fn feed_delivers_every_user_then_closes() -> users_tonic_core::Result<()> {
        let store = UserStore::default();
        let (tx, mut rx) = mpsc::channel(1);
        let feeder = tokio::spawn(feed_page(
            store.values(),
            tx,
            Duration::ZERO,
            CancellationToken::new(),
        ));

        let mut received = Vec::new();
        while let Some(item) = rx.recv().await {
            received.push(item.expect("no errors").id);
        }
        assert_eq!(received, [1, 2]);
        assert_eq!(feeder.await.unwrap()?, 2);
        Ok(())
    }

    #[tokio::test]
    async fn feed_stops_when_consumer_disconnects() {
        let store = UserStore::default();
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let result = feed_page(
            store.values(),
            tx,
            Duration::ZERO,
            CancellationToken::new(),
        )
        .await;
        assert!(matches!(result, Err(Error::ChannelError { .. })));
    }

    #[tokio::test]
    async fn cancelled_feed_reports_shutdown() {
        let store = UserStore::default();
        let (tx, mut rx) = mpsc::channel(4);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = feed_page(store.values(), tx, Duration::from_secs(60), cancel).await;
        assert_eq!(result, Err(Error::ServiceShutdown));

        let status = rx.recv().await.expect("status sent").unwrap_err();
        assert_eq!(status.code(), Code::Unavailable);
        assert!(rx.recv().await.is_none());
    }
}
