use signal_state::{core::Runtime, Field, Patch, SignalState, StateFields};

#[derive(Clone, Debug, PartialEq, StateFields)]
pub struct Settings {
    pub r#type: String,
    pub volume: u8,
    muted: bool,
}

#[test]
fn field_constants() {
    let field: Field<Settings, String> = Settings::TYPE;
    assert_eq!(field.name(), "type");
    assert_eq!(Settings::VOLUME.index(), 1);
    assert_eq!(Settings::MUTED.name(), "muted");
    assert_eq!(Settings::FIELD_NAMES, ["type", "volume", "muted"]);
}

#[test]
fn derived_state_round_trip() {
    let mut rt = Runtime::new();
    let s = SignalState::new();
    s.initialize(Settings {
        r#type: "speaker".to_string(),
        volume: 3,
        muted: false,
    })
    .unwrap();
    s.patch(Patch::new().set(Settings::MUTED, true), rt.ac())
        .unwrap();
    let snapshot = s.snapshot(&mut rt.sc()).unwrap();
    assert_eq!(snapshot.r#type, "speaker");
    assert_eq!(snapshot.volume, 3);
    assert!(snapshot.muted);
}

#[test]
fn derive_trybuild() {
    let t = trybuild::TestCases::new();
    t.pass("tests/pass/*.rs");
    t.compile_fail("tests/compile_fail/*.rs");
}
