use proc_macro::TokenStream;

mod state_fields_impl;

/// Implements `StateFields` for a struct with named fields.
///
/// An associated constant of type `Field<Self, FieldType>` is generated for each field.
/// Its name is the field name in upper case.
///
/// # Examples
///
/// ```ignore
/// #[derive(Clone, StateFields)]
/// struct Person {
///     first_name: String,
///     last_name: String,
/// }
///
/// let s = SignalState::<Person>::new();
/// let first_name = s.select(Person::FIRST_NAME)?;
/// ```
#[proc_macro_derive(StateFields)]
pub fn derive_state_fields(input: TokenStream) -> TokenStream {
    match state_fields_impl::derive_state_fields(input.into()) {
        Ok(s) => s,
        Err(e) => e.to_compile_error(),
    }
    .into()
}
