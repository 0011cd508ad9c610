//! Terminal rendering of the sky and status lines.

use star_diary_core::{Entry, RecorderStatus, User};

use std::io::Write;

use tracing::warn;

const CANVAS_COLUMNS: usize = 48;
const CANVAS_ROWS: usize = 12;

/// How a star should be drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StarMark {
    /// Nothing special.
    Plain,
    /// Freshly created.
    New,
    /// Playing or loading.
    Active,
}

impl StarMark {
    fn glyph(self) -> char {
        match self {
            StarMark::Plain => '*',
            StarMark::New => '+',
            StarMark::Active => '@',
        }
    }
}

/// Writes everything the user sees.
pub struct SkyView<W: Write> {
    out: W,
}

impl<W: Write> SkyView<W> {
    /// Render into `out`.
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// The underlying writer.
    #[cfg(test)]
    pub(crate) fn into_inner(self) -> W {
        self.out
    }

    /// Draw the canvas and the numbered list.
    ///
    /// `mark` decides how each entry is highlighted.
    pub(crate) fn render_sky(&mut self, entries: &[Entry], mark: impl Fn(&Entry) -> StarMark) {
        if entries.is_empty() {
            self.line("The sky is empty. Use 'record' to make your first star.");
            return;
        }

        let mut canvas = vec![vec![' '; CANVAS_COLUMNS]; CANVAS_ROWS];
        for entry in entries {
            let (column, row) = cell(entry);
            canvas[row][column] = mark(entry).glyph();
        }

        let border = format!("+{}+", "-".repeat(CANVAS_COLUMNS));
        self.line(&border);
        for row in canvas {
            let row: String = row.into_iter().collect();
            self.line(&format!("|{}|", row));
        }
        self.line(&border);

        for (index, entry) in entries.iter().enumerate() {
            let suffix = match mark(entry) {
                StarMark::Plain => "",
                StarMark::New => "  (new)",
                StarMark::Active => "  (playing)",
            };
            self.line(&format!(
                "{:>3}. {} at ({:.1}, {:.1}){}",
                index + 1,
                entry.label(),
                entry.position.x,
                entry.position.y,
                suffix
            ));
        }
    }

    /// The record control's status line.
    pub(crate) fn status(&mut self, status: RecorderStatus) {
        self.line(&format!("~ {}", status.message()));
    }

    /// Who is signed in.
    pub(crate) fn whoami(&mut self, user: Option<&User>) {
        match user {
            Some(user) => {
                let email = user.email.as_deref().unwrap_or("(no email)");
                self.line(&format!("Signed in as {}", email));
            }
            None => self.line("Not signed in. Use 'signup' or 'signin'."),
        }
    }

    /// An error the user should read.
    pub(crate) fn error(&mut self, message: &str) {
        self.line(&format!("! {}", message));
    }

    /// Plain informational text.
    pub(crate) fn line(&mut self, text: &str) {
        if let Err(e) = writeln!(self.out, "{}", text).and_then(|()| self.out.flush()) {
            warn!(error = %e, "Failed to write to terminal");
        }
    }
}

/// Canvas cell for an entry's position.
pub(crate) fn cell(entry: &Entry) -> (usize, usize) {
    let scale = |percent: f64, cells: usize| {
        let max = (cells - 1) as f64;
        (percent.clamp(0.0, 100.0) / 100.0 * max).round() as usize
    };
    (
        scale(entry.position.x, CANVAS_COLUMNS),
        scale(entry.position.y, CANVAS_ROWS),
    )
}
