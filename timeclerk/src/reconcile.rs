//! The reconciliation decision core.
//!
//! Pure functions only: no I/O, no remote calls. Given the text observed in
//! a timesheet cell and the desired hour value, [`HourReconciler::decide`]
//! classifies the entry into no-op / add / edit. Everything numeric about
//! hours lives here as well: cell parsing, tolerance comparison, and the
//! renderings the remote application uses for hour values.

/// Absolute tolerance for hour equality, absorbing float/display rounding.
pub const HOURS_EPSILON: f64 = 1e-6;

/// What the remote cell held at decision time. Observed fresh on every
/// decision, never cached across calls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CellState {
    Empty,
    Populated(f64),
}

/// The minimal remote action needed to make a cell match the desired value.
#[derive(Debug, Clone, PartialEq)]
pub enum ReconciliationOutcome {
    /// No remote action needed.
    Skip(&'static str),
    /// Write `hours` into an empty cell.
    Add(f64),
    /// Replace the existing value with the new one.
    Edit { old: f64, new: f64 },
}

/// Decides the minimal action for one (cell, desired-hours) pair.
#[derive(Debug, Clone, Copy, Default)]
pub struct HourReconciler;

impl HourReconciler {
    pub fn new() -> Self {
        Self
    }

    /// Classify the observed cell text against the desired hours.
    ///
    /// The outcome is derived solely from the arguments; it has no memory
    /// of prior runs.
    pub fn decide(&self, observed_cell_text: &str, desired_hours: f64) -> ReconciliationOutcome {
        match observe(observed_cell_text) {
            CellState::Empty => {
                // Zero-hour entries are never written.
                if desired_hours > 0.0 {
                    ReconciliationOutcome::Add(desired_hours)
                } else {
                    ReconciliationOutcome::Skip("nothing to add")
                }
            }
            CellState::Populated(old) => {
                if hours_equal(old, desired_hours) {
                    ReconciliationOutcome::Skip("already matches")
                } else {
                    ReconciliationOutcome::Edit {
                        old,
                        new: desired_hours,
                    }
                }
            }
        }
    }
}

/// Interpret cell text: numeric means populated, anything else (including
/// the remote application's layout spacers) means empty.
pub fn observe(cell_text: &str) -> CellState {
    match parse_cell_hours(cell_text) {
        Some(value) => CellState::Populated(value),
        None => CellState::Empty,
    }
}

/// Parse an hour value out of cell text.
///
/// Accepts unsigned integers and decimals: ASCII digits with at most one
/// `.`. Signs, exponents, blanks and spacer glyphs are all non-numeric.
pub fn parse_cell_hours(cell_text: &str) -> Option<f64> {
    let text = cell_text.trim();
    if text.is_empty() || text == "." {
        return None;
    }
    let mut seen_dot = false;
    for c in text.chars() {
        if c == '.' {
            if seen_dot {
                return None;
            }
            seen_dot = true;
        } else if !c.is_ascii_digit() {
            return None;
        }
    }
    text.parse().ok()
}

/// Equality under the absolute tolerance.
pub fn hours_equal(a: f64, b: f64) -> bool {
    (a - b).abs() < HOURS_EPSILON
}

/// The integer portion of an hour value, as the remote renders it in
/// whole-hour entry links: `8.5` gives `"8"`.
pub fn render_hours_integer(hours: f64) -> String {
    format!("{}", hours.trunc() as i64)
}

/// The two-decimal rendering the remote uses in entry lists: `8` gives
/// `"8.00"`.
pub fn render_hours_two_decimal(hours: f64) -> String {
    format!("{hours:.2}")
}

/// The text typed into the hour field: integer when whole, otherwise the
/// shortest decimal form (`6.5`, not `6.50`).
pub fn render_hours_input(hours: f64) -> String {
    if hours_equal(hours, hours.round()) {
        format!("{}", hours.round() as i64)
    } else {
        let text = format!("{hours:.2}");
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}
