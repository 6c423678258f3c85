use crate::error::ParseError;

/// Converts between input text and the IR the passes operate on.
///
/// `print` is total: every value `parse` can produce must print.
pub trait Codec: Send + Sync {
    type Ir;

    fn parse(&self, text: &str) -> Result<Self::Ir, ParseError>;

    fn print(&self, ir: &Self::Ir) -> String;
}
