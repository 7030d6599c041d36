mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{ids, plain_views};
use herald::builder::Fragment;
use herald::config::StackConfig;
use herald::render::bind_linear;
use herald::render::linear::LinearState;
use herald::stream::{MainQueue, PassthroughSubject, PublisherExt};
use herald::view::{Insets, StackView, View};

/// After each value the children are exactly `content(value)`, in order, and
/// the previous children are fully detached.
#[test]
fn test_replacement_is_atomic_and_ordered() {
    let stack = StackView::empty(StackConfig::vertical());
    let anchor = View::plain();
    let subject = PassthroughSubject::new();
    let pin_to = anchor.clone();
    let _binding = bind_linear(&stack, &subject, move |views: Vec<View>| {
        for view in &views {
            view.pin(&pin_to, Insets::uniform(4.0));
        }
        views
    });

    let first = plain_views(3);
    subject.send(first.clone());
    assert_eq!(ids(&stack.arranged_subviews()), ids(&first));

    let second = plain_views(2);
    subject.send(second.clone());
    assert_eq!(ids(&stack.arranged_subviews()), ids(&second));
    assert_eq!(ids(&stack.view().subviews()), ids(&second));

    for old in &first {
        assert!(old.superview().is_none());
        assert!(old.active_constraints().is_empty());
    }
    for new in &second {
        assert_eq!(new.active_constraints().len(), 4);
    }
}

/// A value that maps to an empty fragment clears the stack.
#[test]
fn test_empty_content_clears_stack() {
    let stack = StackView::empty(StackConfig::horizontal());
    let subject = PassthroughSubject::new();
    let _binding = stack.render(&subject, |show: bool| {
        Fragment::optional(show, || plain_views(2))
    });

    subject.send(true);
    assert_eq!(stack.arranged_subviews().len(), 2);
    subject.send(false);
    assert!(stack.arranged_subviews().is_empty());
    assert_eq!(stack.render_state().generation(), 2);
}

/// Values after teardown neither panic nor mutate.
#[test]
fn test_values_after_teardown_are_ignored() {
    let stack = StackView::empty(StackConfig::vertical());
    let subject = PassthroughSubject::new();
    let _binding = stack.render(&subject, |n: usize| plain_views(n));

    subject.send(2);
    stack.tear_down();
    subject.send(5);

    assert!(stack.arranged_subviews().is_empty());
    assert_eq!(stack.render_state(), LinearState::Empty);
}

/// Dropping every handle to the stack leaves the binding inert.
#[test]
fn test_dropped_stack_is_not_kept_alive() {
    let subject = PassthroughSubject::new();
    let stack = StackView::empty(StackConfig::vertical());
    let view = stack.view().clone();
    let _binding = stack.render(&subject, |n: usize| plain_views(n));
    drop(stack);

    subject.send(3);
    assert!(view.subviews().is_empty());
}

/// Cancelling the binding stops further replacements.
#[test]
fn test_cancel_stops_rendering() {
    let stack = StackView::empty(StackConfig::vertical());
    let subject = PassthroughSubject::new();
    let mut binding = stack.render(&subject, |n: usize| plain_views(n));

    subject.send(1);
    binding.cancel();
    subject.send(4);

    assert_eq!(stack.arranged_subviews().len(), 1);
}

/// Values produced on another thread land only when the UI queue drains.
#[test]
fn test_receive_on_main_queue_defers_until_drained() {
    let queue = MainQueue::new();
    let stack = StackView::empty(StackConfig::vertical());
    let subject = Arc::new(PassthroughSubject::new());
    let hopped = Arc::clone(&subject).receive_on(&queue.handle());
    let _binding = stack.render(&hopped, |n: usize| plain_views(n));

    let producer = std::thread::spawn(move || {
        subject.send(2);
        subject.send(3);
    });
    producer.join().unwrap();

    assert!(stack.arranged_subviews().is_empty());
    queue.run_next(Duration::from_secs(1));
    assert_eq!(stack.arranged_subviews().len(), 3);
    assert_eq!(stack.render_state().generation(), 2);
}

/// A stream that completes right after its last values still renders them
/// once the UI queue drains.
#[test]
fn test_completed_stream_renders_queued_values() {
    let queue = MainQueue::new();
    let stack = StackView::empty(StackConfig::vertical());
    let subject = Arc::new(PassthroughSubject::new());
    let hopped = Arc::clone(&subject).receive_on(&queue.handle());
    let _binding = stack.render(&hopped, |n: usize| plain_views(n));

    subject.send(2);
    subject.send(3);
    subject.complete();
    assert!(stack.arranged_subviews().is_empty());

    queue.run_pending();
    assert_eq!(stack.arranged_subviews().len(), 3);
    assert_eq!(stack.view().subviews().len(), 3);
    assert_eq!(stack.render_state().generation(), 2);
}
