//! Panic hook for crash reporting

use backtrace::Backtrace;
use chrono::Local;
use std::any::Any;
use std::panic::PanicHookInfo;

/// Initialize the panic hook for crash reporting
pub fn init_panic_hook() {
    std::panic::set_hook(Box::new(panic_handler));
    tracing::debug!("Panic hook initialized");
}

fn panic_handler(info: &PanicHookInfo) {
    let thread = std::thread::current();
    let location = info
        .location()
        .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()))
        .unwrap_or_else(|| "<unknown>".to_string());

    let report = crash_report(
        thread.name().unwrap_or("<unnamed>"),
        &location,
        &payload_message(info.payload()),
        &format!("{:?}", Backtrace::new()),
    );

    // stderr first; tracing may already be gone
    eprintln!("{}", report);
    tracing::error!("{}", report);

    let dump_filename = format!("file_shelf_crash_{}.txt", Local::now().format("%Y%m%d_%H%M%S"));
    let dump_path = std::env::temp_dir().join(&dump_filename);

    if let Err(e) = std::fs::write(&dump_path, &report) {
        eprintln!("Failed to write crash dump: {}", e);
    }

    #[cfg(windows)]
    show_error_dialog(&dump_path, &payload_message(info.payload()));
}

/// Text of a panic payload (`&str` or `String`)
fn payload_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "<unknown>".to_string())
}

/// Build the crash report written to stderr, the log and the dump file
pub fn crash_report(thread: &str, location: &str, message: &str, backtrace: &str) -> String {
    format!(
        "=== CRITICAL PANIC ===\n\
         Timestamp: {}\n\
         Thread: {}\n\
         Location: {}\n\
         Payload: {}\n\n\
         Stack Trace:\n{}",
        Local::now().to_rfc3339(),
        thread,
        location,
        message,
        backtrace
    )
}

#[cfg(windows)]
fn show_error_dialog(dump_path: &std::path::Path, message: &str) {
    use windows::core::HSTRING;
    use windows::Win32::UI::WindowsAndMessaging::{MessageBoxW, MB_ICONERROR, MB_OK};

    let msg = format!(
        "An unexpected error occurred.\n\n\
         Crash report: {}\n\n\
         Error: {}",
        dump_path.display(),
        message
    );

    unsafe {
        MessageBoxW(
            None,
            &HSTRING::from(msg),
            &HSTRING::from("FileShelf - Fatal Error"),
            MB_ICONERROR | MB_OK,
        );
    }
}
