use crate::render::RenderedMessage;

/// Where messages are painted and where input is read from.
///
/// Painting only ever appends, so the newest message is always the one in
/// view.
pub trait ChatSurface {
    fn paint(&mut self, message: RenderedMessage);

    /// Shows a transient indicator while a request is in flight
    fn show_thinking(&mut self, text: &str);

    fn clear_thinking(&mut self);

    /// Enables or disables the prompt and both submission triggers
    fn set_input_enabled(&mut self, enabled: bool);
}
