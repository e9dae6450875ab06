use std::{cell::Cell, rc::Rc};

use assert_call::{call, CallRecorder};
use rt_local::{runtime::core::test, spawn_local, wait_for_idle};

use super::*;
use crate::{effect, State};

#[test]
#[should_panic(expected = "Only one `Runtime` can exist in the same thread at the same time.")]
fn second_runtime_panics() {
    let _rt0 = Runtime::new();
    let _rt1 = Runtime::new();
}

#[test]
fn runtime_can_be_recreated_after_drop() {
    drop(Runtime::new());
    let _rt = Runtime::new();
}

#[test]
#[should_panic(expected = "`Runtime` is not created.")]
fn spawn_action_without_runtime_panics() {
    spawn_action(|_| {});
}

#[test]
fn spawn_action_runs_on_update() {
    let mut rt = Runtime::new();
    let mut cr = CallRecorder::new();
    spawn_action(|_| call!("action"));
    cr.verify(());
    rt.update();
    cr.verify("action");
}

#[test]
fn effect_can_write_through_action() {
    let mut rt = Runtime::new();
    let source = State::new(1);
    let target = State::new(0);
    let _e = effect({
        let source = source.clone();
        let target = target.clone();
        move |sc| {
            let value = source.get(sc) * 100;
            let target = target.clone();
            spawn_action(move |ac| target.set(value, ac));
        }
    });
    rt.update();
    assert_eq!(target.get(&mut rt.sc()), 100);

    source.set(2, rt.ac());
    rt.update();
    assert_eq!(target.get(&mut rt.sc()), 200);
}

#[test]
fn waker_schedules_action() {
    let mut rt = Runtime::new();
    let count = Rc::new(Cell::new(0));
    let waker = waker_from_weak_fn(Rc::downgrade(&count), |count, _ac| {
        count.set(count.get() + 1)
    });
    waker.wake_by_ref();
    assert_eq!(count.get(), 0);
    rt.update();
    assert_eq!(count.get(), 1);

    std::thread::spawn(move || waker.wake()).join().unwrap();
    rt.update();
    assert_eq!(count.get(), 2);
}

#[test]
fn waker_does_nothing_after_target_dropped() {
    let mut rt = Runtime::new();
    let count = Rc::new(Cell::new(0));
    let waker = waker_from_weak_fn(Rc::downgrade(&count), |count, _ac| {
        count.set(count.get() + 1)
    });
    drop(count);
    waker.wake();
    rt.update();
}

#[test]
async fn wait_for_ready_resolves_on_action() {
    let mut rt = Runtime::new();
    let mut cr = CallRecorder::new();
    let _task = spawn_local(async {
        call!("spawn");
        spawn_action(|_| call!("action"));
    });
    rt.wait_for_ready().await;
    wait_for_idle().await;
    cr.verify("spawn");
    rt.update();
    cr.verify("action");
}

#[test]
fn dirty_order() {
    assert_eq!(Dirty::Clean | Dirty::MaybeDirty, Dirty::MaybeDirty);
    assert_eq!(Dirty::Dirty | Dirty::MaybeDirty, Dirty::Dirty);
    let mut d = Dirty::Clean;
    d |= Dirty::Clean;
    assert!(d.is_clean());
}
