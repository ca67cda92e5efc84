use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    #[error("Invalid status '{0}'. Valid values: abierto/open, pendiente/pending, cerrado/closed")]
    InvalidStatus(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Not logged in. Run `saldo login` first")]
    NotAuthenticated,

    #[error("Session error: {0}")]
    Session(#[from] std::io::Error),

    #[error("Store error: {0}")]
    Store(#[from] anyhow::Error),
}
