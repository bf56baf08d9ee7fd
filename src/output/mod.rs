mod build;
mod style;

pub use build::{print_log_lines, print_phase, print_summary};
pub use style::{accent, command, configure, failure, muted, number, success, warning};

pub fn format_duration_ms(ms: i64) -> String {
    if ms < 1000 {
        return format!("{ms}ms");
    }

    let secs = ms / 1000;
    if secs < 60 {
        if ms.rem_euclid(1000) == 0 {
            return format!("{secs}s");
        }
        return format!("{:.3}s", ms as f64 / 1000.0);
    }

    let (minutes, seconds) = (secs / 60, secs % 60);
    if seconds == 0 {
        format!("{minutes}m")
    } else {
        format!("{minutes}m{seconds}s")
    }
}
