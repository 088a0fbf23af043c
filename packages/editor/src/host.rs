use crate::position::BufferPosition;

/// Callbacks into the surrounding application
pub trait EditorHost {
    /// Open the variable picker anchored at a cursor position
    fn open_picker(&mut self, anchor: BufferPosition);

    /// Receive the canonical raw source after every change
    fn content_changed(&mut self, raw: &str);
}

/// Host that ignores every callback
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHost;

impl EditorHost for NoopHost {
    fn open_picker(&mut self, _anchor: BufferPosition) {}

    fn content_changed(&mut self, _raw: &str) {}
}

impl<H: EditorHost + ?Sized> EditorHost for &mut H {
    fn open_picker(&mut self, anchor: BufferPosition) {
        (**self).open_picker(anchor)
    }

    fn content_changed(&mut self, raw: &str) {
        (**self).content_changed(raw)
    }
}
