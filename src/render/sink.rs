//! Output sink trait: the only way text leaves the core.

/// Presentation collaborator that receives rendered output.
///
/// All calls happen on the driver thread, in final display order.
pub trait OutputSink {
    /// Show one rendered unit (a grapheme cluster) of the current response.
    fn emit_text(&mut self, unit: &str);

    /// Show informational text outside any response.
    fn emit_info(&mut self, text: &str);

    /// Show an error. Nothing from the failed response follows it.
    fn report_error(&mut self, message: &str);

    /// A response started; chrome may show an in-progress indicator.
    fn session_started(&mut self) {}

    /// The current response finished rendering, failed, or was superseded.
    fn session_closed(&mut self);
}

impl<S: OutputSink + ?Sized> OutputSink for &mut S {
    fn emit_text(&mut self, unit: &str) {
        (**self).emit_text(unit);
    }

    fn emit_info(&mut self, text: &str) {
        (**self).emit_info(text);
    }

    fn report_error(&mut self, message: &str) {
        (**self).report_error(message);
    }

    fn session_started(&mut self) {
        (**self).session_started();
    }

    fn session_closed(&mut self) {
        (**self).session_closed();
    }
}

impl<S: OutputSink + ?Sized> OutputSink for Box<S> {
    fn emit_text(&mut self, unit: &str) {
        (**self).emit_text(unit);
    }

    fn emit_info(&mut self, text: &str) {
        (**self).emit_info(text);
    }

    fn report_error(&mut self, message: &str) {
        (**self).report_error(message);
    }

    fn session_started(&mut self) {
        (**self).session_started();
    }

    fn session_closed(&mut self) {
        (**self).session_closed();
    }
}
