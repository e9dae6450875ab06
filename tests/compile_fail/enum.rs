use signal_state::StateFields;

#[derive(Clone, StateFields)]
enum Mode {
    On,
    Off,
}

fn main() {
    let _ = [Mode::On, Mode::Off];
}
