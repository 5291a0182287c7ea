//! Clock formatting for the simulated day.
//!
//! All times in this crate are integer seconds since midnight of the
//! operating day. The simulation clock starts at `0`.

/// Formats seconds since midnight as `HH:MM:SS`.
///
/// Hours are not wrapped, so times past midnight render as `24:10:00`.
///
/// # Example
/// ```
/// use u_transit::models::format_clock;
///
/// assert_eq!(format_clock(3_725), "01:02:05");
/// ```
pub fn format_clock(seconds: i64) -> String {
    let sign = if seconds < 0 { "-" } else { "" };
    let seconds = seconds.abs();
    format!(
        "{sign}{:02}:{:02}:{:02}",
        seconds / 3600,
        seconds % 3600 / 60,
        seconds % 60
    )
}
