/// A single inbound frame from the event channel
///
/// The feed makes no assumption about the payload beyond text/binary;
/// interpreting the content is the handler's job.
#[derive(Debug, Clone)]
pub enum Frame {
    Text(String),
    Binary(Vec<u8>),
}

impl Frame {
    /// Get the frame as text, if it is text
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Frame::Text(s) => Some(s),
            Frame::Binary(_) => None,
        }
    }

    /// Get the frame as binary, if it is binary
    pub fn as_binary(&self) -> Option<&[u8]> {
        match self {
            Frame::Text(_) => None,
            Frame::Binary(b) => Some(b),
        }
    }

    /// Check if the frame is text
    pub fn is_text(&self) -> bool {
        matches!(self, Frame::Text(_))
    }
}
