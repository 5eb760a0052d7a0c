use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, Error, ItemFn};

pub fn game(attr: TokenStream, input: TokenStream) -> TokenStream {
    if !attr.is_empty() {
        return Error::new(
            proc_macro2::Span::call_site(),
            "`#[game]` does not take any arguments",
        )
        .into_compile_error()
        .into();
    }

    let input = parse_macro_input!(input as ItemFn);

    if !input.sig.inputs.is_empty() {
        return Error::new_spanned(
            &input.sig.inputs,
            "the game constructor cannot take any arguments",
        )
        .into_compile_error()
        .into();
    }

    let ident = &input.sig.ident;

    let expanded = quote! {
        #input

        #[no_mangle]
        pub extern "C" fn simulo__start() {
            ::simulo::__private::start_with(#ident);
        }
    };

    TokenStream::from(expanded)
}
