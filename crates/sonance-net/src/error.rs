/// Errors produced while encoding or decoding wire messages.
#[derive(Debug, thiserror::Error)]
pub enum NetError {
    #[error("malformed message: {0}")]
    Json(#[from] serde_json::Error),

    #[error("expected message type {expected}, got {found}")]
    UnexpectedType { expected: u8, found: u8 },

    #[error("sample name is {0} bytes, limit is {max}", max = crate::MAX_SAMPLE_NAME)]
    SampleNameTooLong(usize),

    #[error("sound message has no sample name")]
    EmptySample,
}
