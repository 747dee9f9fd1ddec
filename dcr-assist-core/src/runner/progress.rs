use crate::plan::SessionRole;

/// Position of one script within a run, used for the report summaries.
pub(super) struct StepProgress<'a> {
    position: usize,
    total: usize,
    script: &'a str,
}

impl<'a> StepProgress<'a> {
    /// `index` is zero-based; summaries count from one.
    pub(super) fn new(index: usize, total: usize, script: &'a str) -> Self {
        Self {
            position: index + 1,
            total: total.max(1),
            script,
        }
    }

    pub(super) fn prepared(&self) -> String {
        format!("{} Prepared {}", self.marker(), self.script)
    }

    pub(super) fn ran(&self, role: SessionRole, statements: usize) -> String {
        format!(
            "{} Ran {} on {role} ({statements} statements)",
            self.marker(),
            self.script
        )
    }

    fn marker(&self) -> String {
        format!("[{}/{}]", self.position, self.total)
    }
}
