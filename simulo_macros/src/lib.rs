use proc_macro::TokenStream;

mod game;
mod guest_only;

/// Declares a host import.
///
/// On `wasm32` the function becomes an `extern "C"` import. On every other
/// target it becomes an `unsafe extern "C"` function forwarding to the
/// function of the same name in the `native` module next to the import.
#[proc_macro_attribute]
pub fn guest_only(attr: TokenStream, input: TokenStream) -> TokenStream {
    crate::guest_only::guest_only(attr, input)
}

/// Marks the constructor of the root game object and exports
/// `simulo__start` for it.
#[proc_macro_attribute]
pub fn game(attr: TokenStream, input: TokenStream) -> TokenStream {
    crate::game::game(attr, input)
}
