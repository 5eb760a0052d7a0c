use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::spanned::Spanned;
use syn::{parse_macro_input, Error, FnArg, ForeignItemFn, Pat, Result};

pub fn guest_only(_attr: TokenStream, input: TokenStream) -> TokenStream {
    let item = parse_macro_input!(input as ForeignItemFn);

    let cfg_predicate = quote! { target_arch = "wasm32" };

    let binding_function = expand_binding_function(item.clone());
    let native_function = match expand_native_function(item) {
        Ok(tokens) => tokens,
        Err(err) => return err.into_compile_error().into(),
    };

    quote! {
        #[cfg(#cfg_predicate)]
        #binding_function
        #[cfg(not(#cfg_predicate))]
        #native_function
    }
    .into()
}

fn expand_binding_function(item: ForeignItemFn) -> TokenStream2 {
    quote! {
        extern "C" {
            #item
        }
    }
}

fn expand_native_function(item: ForeignItemFn) -> Result<TokenStream2> {
    let attrs = item.attrs;
    let vis = item.vis;
    let ident = item.sig.ident;
    let inputs = item.sig.inputs;
    let output = item.sig.output;

    let mut args = Vec::with_capacity(inputs.len());
    for input in &inputs {
        match input {
            FnArg::Typed(arg) => match &*arg.pat {
                Pat::Ident(pat) => args.push(pat.ident.clone()),
                pat => {
                    return Err(Error::new(
                        pat.span(),
                        "host imports only accept plain identifiers as arguments",
                    ))
                }
            },
            FnArg::Receiver(recv) => {
                return Err(Error::new(recv.span(), "host imports cannot take `self`"));
            }
        }
    }

    Ok(quote! {
        #(#attrs)*
        #vis unsafe extern "C" fn #ident(#inputs) #output {
            self::native::#ident(#(#args),*)
        }
    })
}
