use signal_state::StateFields;

#[derive(Clone, StateFields)]
struct Pair(u32, u32);

fn main() {
    let Pair(a, b) = Pair(1, 2);
    let _ = a + b;
}
