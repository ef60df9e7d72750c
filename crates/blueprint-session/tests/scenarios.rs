//! End-to-end walkthroughs of the gate, focus, and reset behavior.

use blueprint_session::{BookmarkOutcome, CommitOutcome, SessionConfig, SessionEvent};
use blueprint_test_utils::setup_session;
use pretty_assertions::assert_eq;
use std::time::Duration;

/// Two sections, one subsection each: committing the first unlocks the
/// second; restart locks it again and wipes both stores.
#[tokio::test(start_paused = true)]
async fn gate_unlocks_and_restart_relocks() {
    let mut h = setup_session(&[1, 1], SessionConfig::new()).await;
    let ids = h.sequence_ids();
    let sections: Vec<_> = h.session.catalog().sections().iter().map(|s| s.id).collect();

    assert!(h.session.engine().is_section_editable(sections[0]));
    assert!(!h.session.engine().is_section_editable(sections[1]));

    h.session.set_response(ids[0], "a thoughtful first answer");
    h.session.flush_pending(ids[0]).await;
    assert_eq!(h.session.commit(ids[0]).await, CommitOutcome::Committed);

    assert!(h.session.engine().is_section_editable(sections[1]));

    h.session.restart().await;

    assert!(!h.session.engine().is_section_editable(sections[1]));
    assert!(h.session.response_text(ids[0]).is_none());
    assert_eq!(h.responses.count(h.user), 0);
    assert_eq!(h.progress.count(h.user), 0);
}

/// Short answers never commit; a ten-character trimmed answer does.
#[tokio::test(start_paused = true)]
async fn commit_threshold() {
    let mut h = setup_session(&[1], SessionConfig::new()).await;
    let id = h.sequence_ids()[0];

    h.session.set_response(id, "ok");
    assert!(!h.session.engine().is_committable(id));
    assert_eq!(h.session.commit(id).await, CommitOutcome::Rejected);

    h.session.set_response(id, "this is fine");
    assert!(h.session.engine().is_committable(id));
    assert_eq!(h.session.commit(id).await, CommitOutcome::Committed);
}

/// Focus mode at index 0 of 3, uncommitted but committable: next() commits
/// the current subsection and moves the cursor to 1.
#[tokio::test(start_paused = true)]
async fn focus_next_auto_commits() {
    let mut h = setup_session(&[3], SessionConfig::new()).await;
    let first = h.sequence_ids()[0];
    h.session.set_response(first, "a committable answer");

    let mut focus = h.session.enter_focus();
    focus.next().await;
    assert_eq!(focus.cursor(), 1);
    drop(focus);

    assert!(h.session.engine().is_committed(first));
}

/// Bookmarking advances the cursor; immediately unbookmarking the new
/// current subsection does not advance again.
#[tokio::test(start_paused = true)]
async fn bookmark_advance_asymmetry() {
    let mut h = setup_session(&[3], SessionConfig::new()).await;
    let ids = h.sequence_ids();

    let mut focus = h.session.enter_focus();

    assert_eq!(focus.toggle_bookmark().await, BookmarkOutcome::Added);
    assert_eq!(focus.cursor(), 1);

    // Bookmark the new current subsection so it can be removed.
    assert_eq!(focus.toggle_bookmark().await, BookmarkOutcome::Added);
    assert_eq!(focus.cursor(), 2);
    focus.jump_to(ids[1]);

    assert_eq!(focus.toggle_bookmark().await, BookmarkOutcome::Removed);
    assert_eq!(focus.cursor(), 1);
}

/// Clearing a completed middle section makes it incomplete and re-locks the
/// section after it.
#[tokio::test(start_paused = true)]
async fn clear_section_relocks_followers() {
    let mut h = setup_session(&[1, 2, 1], SessionConfig::new()).await;
    let ids = h.sequence_ids();
    let sections: Vec<_> = h.session.catalog().sections().iter().map(|s| s.id).collect();

    for &id in &ids[..3] {
        h.session.set_response(id, "a committable answer");
        assert_eq!(h.session.commit(id).await, CommitOutcome::Committed);
    }
    assert!(h.session.engine().is_section_complete(sections[1]));
    assert!(h.session.engine().is_section_editable(sections[2]));

    h.session.clear_section(sections[1]).await;

    assert!(!h.session.engine().is_section_complete(sections[1]));
    assert!(!h.session.engine().is_section_editable(sections[2]));
    // The first section is untouched.
    assert!(h.session.engine().is_section_complete(sections[0]));
    // Remote records for the cleared section are gone.
    assert!(h.progress.get(h.user, ids[1]).is_none());
    assert!(h.progress.get(h.user, ids[2]).is_none());
}

/// Typing across the quiet period produces exactly one write with the
/// newest text; the celebration fires once even with rapid commits.
#[tokio::test(start_paused = true)]
async fn debounce_and_one_shot_celebration() {
    let mut h = setup_session(&[2], SessionConfig::new()).await;
    let ids = h.sequence_ids();

    h.session.set_response(ids[0], "draft");
    tokio::time::sleep(Duration::from_millis(200)).await;
    h.session.set_response(ids[0], "draft, reworked a bit");
    tokio::time::sleep(Duration::from_millis(700)).await;

    assert_eq!(
        h.responses.upsert_log(),
        vec![(ids[0], "draft, reworked a bit".to_string())]
    );

    h.session.set_response(ids[1], "the closing answer");
    h.session.commit(ids[0]).await;
    h.session.commit(ids[1]).await;

    assert_eq!(
        h.events.try_recv().unwrap(),
        SessionEvent::AllSectionsComplete { user_id: h.user }
    );
    assert!(h.events.try_recv().is_err());

    // Redo after restart within the same session: still silent.
    h.session.restart().await;
    h.session.set_response(ids[0], "second pass answer one");
    h.session.set_response(ids[1], "second pass answer two");
    h.session.commit(ids[0]).await;
    h.session.commit(ids[1]).await;
    assert!(h.events.try_recv().is_err());

    // New login clears the session flags and re-arms the celebration.
    h.flags.reset();
    h.session.uncommit(ids[1]).await;
    h.session.commit(ids[1]).await;
    assert!(h.events.try_recv().is_ok());
}

/// A full pass through a small blueprint in focus mode: answer, advance,
/// and celebrate at the end.
#[tokio::test(start_paused = true)]
async fn focus_walkthrough_to_completion() {
    let mut h = setup_session(&[2, 1], SessionConfig::new()).await;
    let sections: Vec<_> = h.session.catalog().sections().iter().map(|s| s.id).collect();

    let mut focus = h.session.enter_focus();
    focus.set_response("what matters most to me");
    focus.next().await;
    focus.set_response("where I want to be in ten years");
    focus.next().await;
    focus.set_response("the first step I will take");
    focus.exit().await;

    assert!(h.session.engine().all_sections_complete());
    assert_eq!(h.session.engine().overall_progress(), 1.0);
    assert!(h.session.engine().is_section_editable(sections[1]));
    assert_eq!(
        h.events.try_recv().unwrap(),
        SessionEvent::AllSectionsComplete { user_id: h.user }
    );
}
