//! Integration tests for quota throttling and cancellation.
//!
//! Time is paused so sleeps complete instantly while still being measured.

#![allow(clippy::unwrap_used)]

mod support;

use chrono::TimeDelta;
use forgepub_release::{Error, Publisher, QuotaPolicy, Repo};
use std::time::Duration;
use support::{FakeForge, QuotaAnswer};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

fn repo() -> Repo {
    Repo::new("forgepub", "forgepub")
}

fn low(reset_in: TimeDelta) -> QuotaAnswer {
    QuotaAnswer {
        remaining: 50,
        reset_in,
    }
}

/// Waiting for the quota to reset.
mod throttling {
    use super::*;

    /// Low quota resetting in 2 seconds delays the call by at least that long.
    #[tokio::test(start_paused = true)]
    async fn test_sleeps_until_reset() {
        let fake = FakeForge::new();
        fake.with(|state| state.quota.push_back(low(TimeDelta::seconds(2))));
        let publisher = Publisher::new(fake.clone());

        let start = Instant::now();
        let branch = publisher.default_branch(&repo()).await.unwrap();

        assert_eq!(branch, "main");
        assert!(start.elapsed() >= Duration::from_secs(2));
        assert_eq!(fake.calls(), vec!["rate_limit", "rate_limit", "repository"]);
    }

    /// Plenty of quota proceeds without any delay.
    #[tokio::test(start_paused = true)]
    async fn test_plenty_of_quota_proceeds() {
        let fake = FakeForge::new();
        fake.with(|state| {
            state.quota.push_back(QuotaAnswer {
                remaining: 150,
                reset_in: TimeDelta::seconds(2),
            });
        });
        let publisher = Publisher::new(fake.clone());

        let start = Instant::now();
        publisher.default_branch(&repo()).await.unwrap();

        assert!(start.elapsed() < Duration::from_secs(1));
        assert_eq!(fake.count("rate_limit"), 1);
    }

    /// A reset time in the past falls back to the fixed delay.
    #[tokio::test(start_paused = true)]
    async fn test_past_reset_uses_fallback_delay() {
        let fake = FakeForge::new();
        fake.with(|state| state.quota.push_back(low(TimeDelta::seconds(-5))));
        let publisher = Publisher::new(fake.clone());

        let start = Instant::now();
        publisher.default_branch(&repo()).await.unwrap();

        assert!(start.elapsed() >= Duration::from_secs(15));
    }

    /// Each low reading sleeps again until the quota recovers.
    #[tokio::test(start_paused = true)]
    async fn test_keeps_waiting_while_low() {
        let fake = FakeForge::new();
        fake.with(|state| {
            state.quota.push_back(low(TimeDelta::seconds(3)));
            state.quota.push_back(low(TimeDelta::seconds(3)));
            state.quota.push_back(low(TimeDelta::seconds(3)));
        });
        let publisher = Publisher::new(fake.clone());

        let start = Instant::now();
        publisher.default_branch(&repo()).await.unwrap();

        assert!(start.elapsed() >= Duration::from_secs(9));
        assert_eq!(fake.count("rate_limit"), 4);
    }

    /// A configured cap stops waiting and lets the call through.
    #[tokio::test(start_paused = true)]
    async fn test_max_waits_caps_sleeping() {
        let fake = FakeForge::new();
        fake.with(|state| {
            for _ in 0..5 {
                state.quota.push_back(low(TimeDelta::seconds(10)));
            }
        });
        let policy = QuotaPolicy {
            max_waits: Some(1),
            ..QuotaPolicy::default()
        };
        let publisher = Publisher::new(fake.clone()).with_quota_policy(policy);

        let start = Instant::now();
        publisher.default_branch(&repo()).await.unwrap();

        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(10));
        assert!(elapsed < Duration::from_secs(20));
        assert_eq!(fake.count("repository"), 1);
    }

    /// A failing quota check never blocks the call.
    #[tokio::test(start_paused = true)]
    async fn test_quota_check_failure_proceeds() {
        let fake = FakeForge::new();
        fake.with(|state| state.quota_error = true);
        let publisher = Publisher::new(fake.clone());

        let start = Instant::now();
        let branch = publisher.default_branch(&repo()).await.unwrap();

        assert_eq!(branch, "main");
        assert!(start.elapsed() < Duration::from_secs(1));
    }
}

/// Aborting work through the cancellation token.
mod cancellation {
    use super::*;

    /// Cancelling during a quota sleep returns promptly without calling the API.
    #[tokio::test(start_paused = true)]
    async fn test_interrupts_quota_sleep() {
        let fake = FakeForge::new();
        fake.with(|state| {
            for _ in 0..10 {
                state.quota.push_back(low(TimeDelta::seconds(60)));
            }
        });
        let cancel = CancellationToken::new();
        let publisher = Publisher::new(fake.clone()).with_cancellation(cancel.clone());

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(5)).await;
            trigger.cancel();
        });

        let start = Instant::now();
        let err = publisher.default_branch(&repo()).await.unwrap_err();

        assert!(matches!(err, Error::Cancelled));
        assert!(start.elapsed() < Duration::from_secs(60));
        assert_eq!(fake.count("repository"), 0);
    }

    /// An already cancelled token stops a workflow before any mutation.
    #[tokio::test(start_paused = true)]
    async fn test_cancelled_token_stops_workflow() {
        let fake = FakeForge::new();
        fake.with(|state| {
            for _ in 0..10 {
                state.quota.push_back(low(TimeDelta::seconds(60)));
            }
        });
        let cancel = CancellationToken::new();
        cancel.cancel();
        let publisher = Publisher::new(fake.clone()).with_cancellation(cancel);

        let err = publisher
            .close_milestone(&repo(), "v1.2.0")
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Cancelled));
        assert!(fake.api_calls().is_empty());
    }
}
