use core::panic::PanicInfo;

#[panic_handler]
fn panic_handler(info: &PanicInfo) -> ! {
    crate::error!("{}", info);
    core::arch::wasm32::unreachable();
}
