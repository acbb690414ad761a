//! Property-based tests for the submission queue

use proptest::prelude::*;
use std::sync::Arc;

use price_survey::client::offline::{MemoryQueueStore, PendingSubmission, RetryDecision, RetryPolicy, SubmissionQueue};
use price_survey::shared::{ProductLine, ProductName, SubmissionDraft};

fn draft(outlet: &str) -> SubmissionDraft {
    SubmissionDraft::new(
        "Ada Obi",
        outlet,
        "Ikeja",
        vec![ProductLine::new(ProductName::RcCola40cl, 110.0, 150.0)],
    )
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
}

proptest! {
    #[test]
    fn test_removals_keep_remaining_order(count in 1usize..20, remove_mask in prop::collection::vec(any::<bool>(), 20)) {
        runtime().block_on(async {
            let queue = SubmissionQueue::new(Arc::new(MemoryQueueStore::new()));
            let mut ids = Vec::new();
            for i in 0..count {
                ids.push(queue.enqueue(draft(&format!("Outlet {}", i))).await.unwrap());
            }

            let mut expected = Vec::new();
            for (id, remove) in ids.iter().zip(&remove_mask) {
                if *remove {
                    queue.remove(id).await.unwrap();
                } else {
                    expected.push(id.clone());
                }
            }

            let remaining: Vec<String> = queue.list_all().await.unwrap().into_iter().map(|r| r.id).collect();
            assert_eq!(remaining, expected);
        });
    }

    #[test]
    fn test_retry_ceiling(max in 1u32..10) {
        let policy = RetryPolicy::new(max);
        let mut record = PendingSubmission::new(draft("Kiosk A"));

        for attempt in 1..max {
            prop_assert_eq!(policy.record_failure(&mut record, "503"), RetryDecision::Requeue);
            prop_assert_eq!(record.retry_count, attempt);
        }
        let exhausted = matches!(
            policy.record_failure(&mut record, "503"),
            RetryDecision::Exhausted { attempts } if attempts == max
        );
        prop_assert!(exhausted);
        prop_assert_eq!(record.last_error.as_deref(), Some("503"));
    }
}
