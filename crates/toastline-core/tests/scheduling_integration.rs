//! Integration tests for toast scheduling.
//!
//! Drives the engine through the public API on a manual clock: merge,
//! expiry, pause, displacement and revival, dismissal and clearing.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use toastline_core::{
    Config, DismissReason, ManualClock, Position, ToastEngine, ToastEvent, ToastKind,
    ToastRequest,
};

fn engine() -> ToastEngine<ManualClock> {
    ToastEngine::with_clock(Config::default(), ManualClock::new())
}

fn visible_count(engine: &ToastEngine<ManualClock>, position: Position) -> usize {
    engine
        .snapshot(position)
        .iter()
        .filter(|v| v.is_interactive())
        .count()
}

#[test]
fn test_double_save_merges_and_expires_from_second_call() {
    let mut engine = engine();
    let request = || {
        ToastRequest::success("Saved")
            .at(Position::Top)
            .duration(2000)
    };

    let first = engine.request(request());
    assert_eq!(first.to_string(), "t1");

    engine.advance_to(700);
    let second = engine.request(request());
    assert_eq!(second, first);
    assert_eq!(engine.get(first).unwrap().update_count(), 1);

    engine.advance_to(2699);
    assert!(engine.get(first).unwrap().is_active());

    engine.advance_to(2700);
    assert!(engine.get(first).unwrap().is_removed());

    engine.advance_to(2900);
    assert!(engine.get(first).is_none());
}

#[test]
fn test_displaced_toast_returns_with_unspent_budget() {
    let mut engine = engine();
    let a = engine.request(ToastRequest::info("Syncing").duration(10_000));

    engine.advance_to(1200);
    let b = engine.request(ToastRequest::info("Offline").duration(500));
    let a_toast = engine.get(a).unwrap();
    assert!(a_toast.is_suspended());
    assert_eq!(a_toast.remaining_at(engine.now()), 8800);

    // B expires at 1700, is deleted at 1900, and A comes back then.
    engine.advance_to(1700);
    assert!(engine.get(b).unwrap().is_removed());
    assert!(engine.get(a).unwrap().is_suspended());

    engine.advance_to(1900);
    assert!(engine.get(b).is_none());
    let a_toast = engine.get(a).unwrap();
    assert!(a_toast.is_active());
    assert_eq!(a_toast.remaining_at(engine.now()), 8800);

    engine.advance_to(1900 + 8799);
    assert!(engine.get(a).unwrap().is_active());
    engine.advance_to(1900 + 8800);
    assert!(engine.get(a).unwrap().is_removed());
}

#[test]
fn test_suspension_chain_revives_latest_first() {
    let mut engine = engine();
    let a = engine.request(ToastRequest::info("A").duration(5000));
    engine.advance_to(100);
    let b = engine.request(ToastRequest::info("B").duration(5000));
    engine.advance_to(200);
    let c = engine.request(ToastRequest::info("C").duration(5000));

    assert!(engine.dismiss(c));
    engine.advance_by(200);
    assert!(engine.get(b).unwrap().is_active());
    assert!(engine.get(a).unwrap().is_suspended());

    assert!(engine.dismiss(b));
    engine.advance_by(200);
    assert!(engine.get(a).unwrap().is_active());
    assert_eq!(visible_count(&engine, Position::Bottom), 1);
}

#[test]
fn test_positions_are_independent_slots() {
    let mut engine = engine();
    let top = engine.request(ToastRequest::success("Top").at(Position::Top));
    let bottom = engine.request(ToastRequest::success("Bottom").at(Position::Bottom));

    assert!(engine.get(top).unwrap().is_active());
    assert!(engine.get(bottom).unwrap().is_active());
    assert_eq!(visible_count(&engine, Position::Top), 1);
    assert_eq!(visible_count(&engine, Position::Bottom), 1);
}

#[test]
fn test_hover_and_background_compose() {
    let mut engine = engine();
    let id = engine.request(ToastRequest::warning("Low battery").duration(1000));

    engine.advance_to(300);
    assert!(engine.pause(id));
    engine.set_document_visible(false);

    engine.advance_to(5000);
    assert!(engine.resume(id));
    // Still held by the background reason.
    assert!(engine.get(id).unwrap().paused_at().is_some());
    engine.advance_to(9000);
    assert!(engine.get(id).unwrap().is_active());

    engine.set_document_visible(true);
    engine.advance_to(9699);
    assert!(engine.get(id).unwrap().is_active());
    engine.advance_to(9700);
    assert!(engine.get(id).unwrap().is_removed());
}

#[test]
fn test_dismiss_callbacks_run_once() {
    let dismissed = Arc::new(AtomicUsize::new(0));
    let auto_closed = Arc::new(AtomicUsize::new(0));
    let mut engine = engine();

    let manual = {
        let dismissed = Arc::clone(&dismissed);
        engine.request(
            ToastRequest::error("Upload failed")
                .at(Position::Top)
                .on_dismiss(move |_| {
                    dismissed.fetch_add(1, Ordering::SeqCst);
                }),
        )
    };
    assert!(engine.dismiss(manual));
    assert!(!engine.dismiss(manual));
    engine.advance_by(1000);
    assert!(!engine.dismiss(manual));
    assert_eq!(dismissed.load(Ordering::SeqCst), 1);

    let timed = {
        let auto_closed = Arc::clone(&auto_closed);
        engine.request(
            ToastRequest::success("Copied")
                .duration(300)
                .on_auto_close(move |_| {
                    auto_closed.fetch_add(1, Ordering::SeqCst);
                }),
        )
    };
    engine.advance_by(300);
    assert!(!engine.dismiss(timed));
    assert_eq!(auto_closed.load(Ordering::SeqCst), 1);
}

#[test]
fn test_clear_all_leaves_nothing_to_revive() {
    let mut engine = engine();
    engine.request(ToastRequest::info("A"));
    engine.request(ToastRequest::info("B"));
    engine.request(ToastRequest::info("C").at(Position::Top));

    assert_eq!(engine.clear_all(), 3);
    engine.advance_by(200);
    assert!(engine.is_empty());
    assert_eq!(engine.pending_wakeups(), 0);
}

#[test]
fn test_loading_toast_stays_until_updated() {
    let mut engine = engine();
    let id = engine.request(ToastRequest::loading("Uploading"));

    engine.advance_to(60_000);
    assert!(engine.get(id).unwrap().is_active());

    let patch = toastline_core::ToastPatch {
        message: Some("Uploaded".into()),
        kind: Some(ToastKind::Success),
        ..Default::default()
    };
    assert!(engine.update(id, patch));
    assert_eq!(engine.get(id).unwrap().message(), Some("Uploaded"));

    engine.advance_to(64_000);
    assert!(engine.get(id).unwrap().is_removed());
}

#[test]
fn test_event_stream_describes_lifecycle() {
    let mut engine = engine();
    let id = engine.request(ToastRequest::info("Hello").duration(100));
    engine.advance_to(300);

    let events = engine.drain_events();
    let kinds: Vec<&str> = events
        .iter()
        .map(|e| match e {
            ToastEvent::Created { .. } => "created",
            ToastEvent::Dismissed {
                reason: DismissReason::Expired,
                ..
            } => "expired",
            ToastEvent::Deleted { .. } => "deleted",
            _ => "other",
        })
        .collect();
    assert_eq!(kinds, vec!["created", "expired", "deleted"]);
    assert!(events.iter().all(|e| e.toast_id() == Some(id)));
    assert!(events.windows(2).all(|w| w[0].at() <= w[1].at()));
}
