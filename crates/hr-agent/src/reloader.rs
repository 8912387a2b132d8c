//! Reload primitive.

use std::future::Future;

use crate::detector::IdentifierChange;

/// Action performed once the server's build identifier changes.
///
/// Reloading is terminal: the agent stops after calling it.
pub trait Reloader {
    type Error;

    fn reload(
        &mut self,
        change: &IdentifierChange,
    ) -> impl Future<Output = Result<(), Self::Error>>;
}

impl<F, E> Reloader for F
where
    F: FnMut(&IdentifierChange) -> Result<(), E>,
{
    type Error = E;

    async fn reload(&mut self, change: &IdentifierChange) -> Result<(), E> {
        self(change)
    }
}
