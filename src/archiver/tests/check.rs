use super::*;
use crate::types::VideoStatus;

#[test]
fn test_batch_size_amortizes_one_sweep_over_the_interval() {
    // 700 records over 7 days of hourly batches
    assert_eq!(Archiver::check_batch_size(700, 7), 5);
    // Small archives still make progress every hour
    assert_eq!(Archiver::check_batch_size(1, 7), 1);
    assert_eq!(Archiver::check_batch_size(0, 7), 0);
    // Exact multiples do not round up
    assert_eq!(Archiver::check_batch_size(168, 7), 1);
    assert_eq!(Archiver::check_batch_size(169, 7), 2);
    // A zero interval is treated as one day rather than dividing by zero
    assert_eq!(Archiver::check_batch_size(24, 0), 1);
}

#[tokio::test]
async fn test_empty_archive_checks_nothing() {
    let h = harness().await;
    let report = h.archiver.check_availability_batch().await.unwrap();
    assert_eq!(report.total, 0);
    assert_eq!(report.checked, 0);
    assert_eq!(h.fetcher.calls(), 0);
}

#[tokio::test]
async fn test_available_video_only_advances_last_checked() {
    let h = harness().await;
    let before = h.seed_success("vid-1", 1000).await;
    h.fetcher
        .script("vid-1", FetchScript::Media(media("a video", None, "v")));

    let report = h.archiver.check_availability_batch().await.unwrap();

    assert_eq!(report.checked, 1);
    assert_eq!(report.unavailable, 0);
    let after = h.get("vid-1").await;
    assert_eq!(after.status(), VideoStatus::Success);
    assert_eq!(after.name, before.name);
    assert!(after.message_id.is_none());
}

#[tokio::test]
async fn test_disappearance_commits_deleted_with_handle_and_reason() {
    let h = harness().await;
    h.seed_success("vid-1", 1000).await;
    h.fetcher
        .script("vid-1", FetchScript::Fails("Video unavailable"));

    let report = h.archiver.check_availability_batch().await.unwrap();

    assert_eq!(report.unavailable, 1);
    assert_eq!(h.gateway.notify_calls(), 1);

    let video = h.get("vid-1").await;
    assert_eq!(video.status(), VideoStatus::Deleted);
    assert_eq!(video.message_id, Some(MessageId::new(777)));
    assert!(
        video
            .deleted_reason
            .as_deref()
            .unwrap()
            .contains("Video unavailable")
    );
    // The archived copy stays described
    assert_eq!(video.name.as_deref(), Some("a video"));
}

#[tokio::test]
async fn test_undeliverable_notification_holds_status_at_success() {
    let h = harness_with(true, None, true, |_| {}).await;
    let before = h.seed_success("vid-1", 1000).await;
    h.fetcher
        .script("vid-1", FetchScript::Fails("Video unavailable"));

    let report = h.archiver.check_availability_batch().await.unwrap();

    // Counted as an observed disappearance even though the transition is
    // held back for the next pass
    assert_eq!(report.unavailable, 1);

    let video = h.get("vid-1").await;
    assert_eq!(video.status(), VideoStatus::Success);
    assert!(video.message_id.is_none());
    assert!(video.deleted_reason.is_some());
    assert!(video.last_checked.is_some());
    assert_eq!(video.name, before.name, "archived copy stays described");
}

#[tokio::test]
async fn test_restoration_retires_notification_and_recommits_success() {
    let h = harness().await;
    h.seed_deleted("vid-1", 1000, MessageId::new(42)).await;
    h.fetcher
        .script("vid-1", FetchScript::Media(media("a video", None, "v")));

    let report = h.archiver.check_availability_batch().await.unwrap();

    assert_eq!(report.restored, 1);
    assert_eq!(h.gateway.retire_calls(), 1);

    let video = h.get("vid-1").await;
    assert_eq!(video.status(), VideoStatus::Success);
    assert!(video.message_id.is_none());
}

#[tokio::test]
async fn test_failed_retirement_leaves_deleted_record_untouched() {
    let h = harness_with(true, Some(MessageId::new(777)), false, |_| {}).await;
    let before = h.seed_deleted("vid-1", 1000, MessageId::new(42)).await;
    h.fetcher
        .script("vid-1", FetchScript::Media(media("a video", None, "v")));

    let report = h.archiver.check_availability_batch().await.unwrap();

    assert_eq!(report.restored, 0);
    assert_eq!(report.skipped, 1);

    let after = h.get("vid-1").await;
    assert_eq!(after.status(), VideoStatus::Deleted);
    assert_eq!(after.message_id, Some(MessageId::new(42)));
    assert_eq!(after.last_checked, before.last_checked);
    assert_eq!(after.updated_at, before.updated_at);
}

#[tokio::test]
async fn test_still_gone_deleted_record_only_advances_last_checked() {
    let h = harness().await;
    let before = h.seed_deleted("vid-1", 1000, MessageId::new(42)).await;
    h.fetcher
        .script("vid-1", FetchScript::Fails("Video unavailable"));

    let report = h.archiver.check_availability_batch().await.unwrap();

    assert_eq!(report.checked, 1);
    assert_eq!(report.unavailable, 0);
    assert_eq!(h.gateway.notify_calls(), 0, "no repeat notification");

    let after = h.get("vid-1").await;
    assert_eq!(after.status(), VideoStatus::Deleted);
    assert_eq!(after.message_id, Some(MessageId::new(42)));
    assert_eq!(after.deleted_reason, before.deleted_reason);
}

#[tokio::test]
async fn test_transient_probe_error_changes_nothing() {
    let h = harness().await;
    let before = h.seed_success("vid-1", 1000).await;
    h.fetcher.script("vid-1", FetchScript::Fails("Read timed out"));

    let report = h.archiver.check_availability_batch().await.unwrap();

    assert_eq!(report.checked, 0);
    assert_eq!(report.skipped, 1);
    assert_eq!(h.gateway.notify_calls(), 0);

    let after = h.get("vid-1").await;
    assert_eq!(after.status(), before.status());
    assert_eq!(after.last_checked, before.last_checked);
    assert_eq!(after.message_id, before.message_id);
    assert_eq!(after.updated_at, before.updated_at);
}

#[tokio::test]
async fn test_batch_skips_new_and_failed_records() {
    let h = harness().await;
    h.seed("vid-new", 1000).await;
    h.seed("vid-failed", 2000).await;
    h.archiver.db.record_download_failure("vid-failed").await.unwrap();
    h.seed_success("vid-ok", 3000).await;
    h.fetcher
        .script("vid-ok", FetchScript::Media(media("a video", None, "v")));

    let report = h.archiver.check_availability_batch().await.unwrap();

    assert_eq!(report.total, 1);
    assert_eq!(report.checked, 1);
    assert_eq!(h.fetcher.calls(), 1);
}
