use parse_display::Display;
use signal_state::SignalStateError;

#[non_exhaustive]
#[derive(Display, Debug, Clone, PartialEq)]
pub enum ShopError {
    #[display("product {product_id} not found")]
    ProductNotFound { product_id: u32 },
    #[display("invalid catalog: {0}")]
    InvalidCatalog(String),
    #[display("{0}")]
    State(SignalStateError),
}

impl std::error::Error for ShopError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ShopError::State(e) => Some(e),
            _ => None,
        }
    }
}

impl From<SignalStateError> for ShopError {
    fn from(e: SignalStateError) -> Self {
        ShopError::State(e)
    }
}

impl From<serde_json::Error> for ShopError {
    fn from(e: serde_json::Error) -> Self {
        ShopError::InvalidCatalog(e.to_string())
    }
}

pub type Result<T, E = ShopError> = std::result::Result<T, E>;
