use std::{cell::RefCell, rc::Rc};

use assert_call::{call, CallRecorder};
use futures::StreamExt;
use rt_local::{runtime::core::test, spawn_local, wait_for_idle};

use crate::{core::Runtime, effect, Signal, State};

#[test]
fn new() {
    let mut rt = Runtime::new();

    let st = State::new(5);
    let st_ = st.clone();
    let s = Signal::new(move |sc| st_.get(sc) * 2);

    assert_eq!(s.get(&mut rt.sc()), 10);

    st.set(10, rt.ac());
    assert_eq!(s.get(&mut rt.sc()), 20);
}

#[test]
fn chain_is_recomputed_lazily() {
    let mut rt = Runtime::new();
    let mut cr = CallRecorder::new();

    let st = State::new(1);
    let s0 = Signal::new({
        let st = st.clone();
        move |sc| {
            call!("s0");
            st.get(sc) + 1
        }
    });
    let s1 = s0.map(|x| x * 10);

    st.set(2, rt.ac());
    st.set(3, rt.ac());
    cr.verify(());

    assert_eq!(s1.get(&mut rt.sc()), 40);
    cr.verify("s0");

    assert_eq!(s1.get(&mut rt.sc()), 40);
    cr.verify(());
}

#[test]
fn diamond_is_glitch_free() {
    let mut rt = Runtime::new();
    let mut cr = CallRecorder::new();

    let st = State::new(1);
    let a = st.to_signal().map(|x| x + 1);
    let b = st.to_signal().map(|x| x * 2);
    let _e = effect(move |sc| call!("{} {}", a.get(sc), b.get(sc)));
    rt.update();
    cr.verify("2 2");

    st.set(5, rt.ac());
    rt.update();
    cr.verify("6 10");
}

#[test]
fn new_dedup() {
    let mut rt = Runtime::new();
    let mut cr = CallRecorder::new();

    let st = State::new(1);
    let st_ = st.clone();
    let s = Signal::new_dedup(move |sc| st_.get(sc) / 10);
    let _e = s.subscribe(|x| call!("{x}"));
    rt.update();
    cr.verify("0");

    st.set(5, rt.ac());
    rt.update();
    cr.verify(());

    st.set(15, rt.ac());
    rt.update();
    cr.verify("1");
}

#[test]
fn dedup_method() {
    let mut rt = Runtime::new();
    let mut cr = CallRecorder::new();

    let st = State::new(3);
    let _e = st.to_signal().dedup().subscribe(|x| call!("{x}"));
    rt.update();
    cr.verify("3");

    st.set(3, rt.ac());
    rt.update();
    cr.verify(());
}

#[test]
fn from_value() {
    let mut rt = Runtime::new();
    let s = Signal::from_value(42);
    assert_eq!(s.get(&mut rt.sc()), 42);
}

#[test]
async fn to_stream() {
    let mut rt = Runtime::new();
    let mut cr = CallRecorder::new();

    let s = State::new(5);
    let _task = spawn_local(
        s.to_signal()
            .to_stream()
            .for_each(|x| async move { call!("{x}") }),
    );
    wait_for_idle().await;
    cr.verify("5");

    s.set(10, rt.ac());
    rt.update();
    wait_for_idle().await;
    cr.verify("10");

    s.set(11, rt.ac());
    s.set(12, rt.ac());
    rt.update();
    wait_for_idle().await;
    cr.verify("12");
}

#[test]
#[should_panic(expected = "detect cyclic dependency")]
fn cyclic() {
    let mut rt = Runtime::new();

    let s0 = Rc::new(RefCell::new(Signal::from_value(0)));
    let s = Signal::new({
        let s0 = s0.clone();
        move |sc| s0.borrow().get(sc)
    });
    s0.borrow_mut().clone_from(&s);

    s.get(&mut rt.sc());
}
