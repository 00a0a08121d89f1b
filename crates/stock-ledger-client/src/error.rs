//! Client error types.

/// Errors that can occur when using the stock-ledger client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server returned an error response.
    #[error("API error: {code} - {message}")]
    Api {
        /// Error code.
        code: String,
        /// Error message.
        message: String,
        /// HTTP status code.
        status: u16,
    },

    /// A movement referenced an unregistered product.
    #[error("unknown product: {product_id}")]
    UnknownProduct {
        /// The offending product id.
        product_id: String,
    },

    /// The submitted batch contained no movements.
    #[error("empty batch")]
    EmptyBatch,

    /// The requested batch was never applied.
    #[error("batch not found: {batch_id}")]
    BatchNotFound {
        /// The batch id.
        batch_id: String,
    },

    /// The batch has already been reversed.
    #[error("batch {batch_id} already reversed by {reversed_by}")]
    AlreadyReversed {
        /// The original batch id.
        batch_id: String,
        /// The reversing batch id.
        reversed_by: String,
    },
}
