use tokio_util::sync::CancellationToken;

/// Scope of one started signal, seen from the producer side.
///
/// Ends when the signal terminates or when the consumer disposes it.
#[derive(Debug, Clone)]
pub struct Lifetime {
    token: CancellationToken,
}

impl Lifetime {
    pub(crate) fn new() -> Self {
        Self {
            token: CancellationToken::new(),
        }
    }

    pub fn is_ended(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once the lifetime has ended.
    pub async fn ended(&self) {
        self.token.cancelled().await
    }

    pub(crate) fn end(&self) {
        self.token.cancel();
    }

    pub(crate) fn disposable(&self) -> Disposable {
        Disposable {
            token: self.token.clone(),
        }
    }
}

/// Consumer-side handle that ends a signal's [`Lifetime`] early.
#[derive(Debug, Clone)]
pub struct Disposable {
    token: CancellationToken,
}

impl Disposable {
    pub fn dispose(&self) {
        self.token.cancel();
    }

    pub fn is_disposed(&self) -> bool {
        self.token.is_cancelled()
    }
}
