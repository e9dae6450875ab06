use signal_state::StateFields;

#[derive(Clone, StateFields)]
struct Wrapper<T> {
    value: T,
}

fn main() {
    let _ = Wrapper { value: 0u8 }.value;
}
