use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{ext::IdentExt, parse2, Data, DeriveInput, Error, Fields, LitStr, Result};

pub fn derive_state_fields(input: TokenStream) -> Result<TokenStream> {
    let input: DeriveInput = parse2(input)?;
    if !input.generics.params.is_empty() {
        return Err(Error::new_spanned(
            &input.generics,
            "`StateFields` cannot be derived for generic types",
        ));
    }
    let Data::Struct(data) = &input.data else {
        return Err(Error::new_spanned(
            &input.ident,
            "`StateFields` can only be derived for structs",
        ));
    };
    let Fields::Named(fields) = &data.fields else {
        return Err(Error::new_spanned(
            &data.fields,
            "`StateFields` can only be derived for structs with named fields",
        ));
    };

    let self_ident = &input.ident;
    let len = fields.named.len();
    let mut consts = Vec::new();
    let mut names = Vec::new();
    let mut pushes = Vec::new();
    let mut reads = Vec::new();
    let mut writes = Vec::new();
    for (index, field) in fields.named.iter().enumerate() {
        let Some(ident) = &field.ident else {
            return Err(Error::new_spanned(field, "unnamed field"));
        };
        let vis = &field.vis;
        let ty = &field.ty;
        let name_str = ident.unraw().to_string();
        let name = LitStr::new(&name_str, ident.span());
        let key = format_ident!("{}", name_str.to_uppercase(), span = ident.span());
        consts.push(quote! {
            #vis const #key: ::signal_state::Field<#self_ident, #ty> =
                ::signal_state::Field::new(#index, #name);
        });
        names.push(name);
        pushes.push(quote!(cells.push(Self::#key, self.#ident);));
        reads.push(quote!(#ident: cells.get(Self::#key, sc),));
        writes.push(quote!(cells.set(Self::#key, self.#ident, ac);));
    }

    Ok(quote! {
        #[automatically_derived]
        impl #self_ident {
            #(#consts)*
        }
        #[automatically_derived]
        #[allow(unused_variables, unused_mut)]
        impl ::signal_state::StateFields for #self_ident {
            const FIELD_NAMES: &'static [&'static str] = &[#(#names),*];
            fn into_cells(self) -> ::signal_state::FieldCells<Self> {
                let mut cells = ::signal_state::FieldCells::with_capacity(#len);
                #(#pushes)*
                cells
            }
            fn read_cells(
                cells: &::signal_state::FieldCells<Self>,
                sc: &mut ::signal_state::SignalContext,
            ) -> Self {
                Self {
                    #(#reads)*
                }
            }
            fn write_cells(
                self,
                cells: &::signal_state::FieldCells<Self>,
                ac: &mut ::signal_state::ActionContext,
            ) {
                #(#writes)*
            }
        }
    })
}
