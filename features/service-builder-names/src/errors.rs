/// Errors when reading parameter names out of a signature
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SignatureError {
    /// A parameter list or comment was opened but never closed
    #[error("Unterminated '{0}' in signature")]
    Unterminated(char),
    /// A parameter is not a plain identifier
    #[error("'{0}' is not a valid parameter name")]
    InvalidParameter(String),
}
