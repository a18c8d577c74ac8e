//! Operating system services needed by the pacing core: the monotonic clock
//! and whatever the OS can tell us about the display's refresh period.

pub mod time;

#[cfg(target_os = "windows")]
#[path = "win32/mod.rs"]
mod platform_impl;

#[cfg(unix)]
#[path = "unix/mod.rs"]
mod platform_impl;
