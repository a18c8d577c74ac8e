use windows::Win32::{
    Foundation::HWND,
    Graphics::Dwm::{DwmGetCompositionTimingInfo, DWM_TIMING_INFO},
    System::Performance::{QueryPerformanceCounter, QueryPerformanceFrequency},
};

use crate::system::time::NANOSECONDS_PER_SECOND;

lazy_static::lazy_static! {
    static ref QPF_FREQUENCY: i64 = {
        let mut freq = 0;
        // Cannot fail on Windows XP or later.
        let _ = unsafe { QueryPerformanceFrequency(&mut freq) };
        freq.max(1)
    };
}

pub fn now_nanoseconds() -> i64 {
    let mut ticks = 0;
    // Cannot fail on Windows XP or later.
    let _ = unsafe { QueryPerformanceCounter(&mut ticks) };
    qpc_to_nanoseconds(ticks)
}

pub fn qpc_to_nanoseconds(ticks: i64) -> i64 {
    mul_div_i64(ticks, NANOSECONDS_PER_SECOND, *QPF_FREQUENCY)
}

/// Asks the desktop compositor for its composition rate, which tracks the
/// primary monitor's refresh rate.
pub fn display_refresh_period_nanoseconds() -> Option<i64> {
    let mut info = DWM_TIMING_INFO {
        cbSize: std::mem::size_of::<DWM_TIMING_INFO>() as u32,
        ..Default::default()
    };

    if let Err(e) = unsafe { DwmGetCompositionTimingInfo(HWND(0), &mut info) } {
        tracing::debug!("DwmGetCompositionTimingInfo failed: {e:?}");
        return None;
    }

    let period = i64::try_from(info.qpcRefreshPeriod).ok()?;
    (period > 0).then(|| qpc_to_nanoseconds(period))
}

/// Scale without overflow as long as the result and n * d do not overflow.
fn mul_div_i64(v: i64, n: i64, d: i64) -> i64 {
    let q = v / d;
    let r = v % d;

    q * n + r * n / d
}
