use crate::model::{BuildState, PhaseView};
use crate::output::{accent, failure, format_duration_ms, muted, number, success};
use std::io::Write;

pub fn print_phase(mut w: impl Write, phase: &PhaseView) -> std::io::Result<()> {
    writeln!(
        w,
        "Phase: {} - {}",
        accent(&phase.phase_type),
        muted(&phase.status)
    )
}

/// Log lines are written verbatim, one per output line.
pub fn print_log_lines(mut w: impl Write, lines: &[String]) -> std::io::Result<()> {
    for line in lines {
        writeln!(w, "{line}")?;
    }
    w.flush()
}

pub fn print_summary(mut w: impl Write, state: &BuildState) -> std::io::Result<()> {
    let status = if state.status.is_success() {
        success(state.status.as_str())
    } else {
        failure(state.status.as_str())
    };

    match state.elapsed_ms() {
        Some(ms) => writeln!(
            w,
            "build {} finished: {} in {}",
            state.id,
            status,
            number(&format_duration_ms(ms))
        ),
        None => writeln!(w, "build {} finished: {}", state.id, status),
    }
}
