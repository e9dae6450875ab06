use assert_call::{call, CallRecorder};

use crate::{core::Runtime, effect, Signal, State};

#[test]
fn test_effect() {
    let mut rt = Runtime::new();
    let mut cr = CallRecorder::new();
    let s = State::new(10);

    let s0 = s.to_signal();
    let e = effect(move |sc| call!("{}", s0.get(sc)));
    cr.verify(());

    rt.update();
    cr.verify("10");

    rt.update();
    cr.verify(()); // not called again because state did not change

    s.set(20, rt.ac());
    rt.update();
    cr.verify("20"); // called again because state changed

    s.set(30, rt.ac());
    drop(e);
    rt.update();
    cr.verify(()); // not called again because effect was dropped
}

#[test]
fn effect_skips_when_dedup_signal_is_unchanged() {
    let mut rt = Runtime::new();
    let mut cr = CallRecorder::new();
    let s = State::new(3);
    let s0 = s.clone();
    let parity = Signal::new_dedup(move |sc| s0.get(sc) % 2);
    let _e = effect(move |sc| call!("{}", parity.get(sc)));
    rt.update();
    cr.verify("1");

    s.set(5, rt.ac());
    rt.update();
    cr.verify(());

    s.set(6, rt.ac());
    rt.update();
    cr.verify("0");
}

#[test]
fn effect_tracks_only_last_dependencies() {
    let mut rt = Runtime::new();
    let mut cr = CallRecorder::new();
    let flag = State::new(true);
    let a = State::new(1);
    let b = State::new(2);
    let _e = effect({
        let flag = flag.clone();
        let a = a.clone();
        let b = b.clone();
        move |sc| {
            if flag.get(sc) {
                call!("a {}", a.get(sc))
            } else {
                call!("b {}", b.get(sc))
            }
        }
    });
    rt.update();
    cr.verify("a 1");

    flag.set(false, rt.ac());
    rt.update();
    cr.verify("b 2");

    a.set(10, rt.ac());
    rt.update();
    cr.verify(());

    b.set(20, rt.ac());
    rt.update();
    cr.verify("b 20");
}
