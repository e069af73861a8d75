use importdoc_types::Finding;

/// Sink for the single-line findings a session emits.
///
/// The CLI prints them as they arrive; tests collect them into a `Vec`.
pub trait Reporter {
    fn emit(&mut self, finding: &Finding);
}

impl Reporter for Vec<Finding> {
    fn emit(&mut self, finding: &Finding) {
        self.push(finding.clone());
    }
}

impl<R: Reporter + ?Sized> Reporter for &mut R {
    fn emit(&mut self, finding: &Finding) {
        (**self).emit(finding);
    }
}

impl<R: Reporter + ?Sized> Reporter for Box<R> {
    fn emit(&mut self, finding: &Finding) {
        (**self).emit(finding);
    }
}

/// Discards everything. Used when only the final report is wanted.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentReporter;

impl Reporter for SilentReporter {
    fn emit(&mut self, _finding: &Finding) {}
}
