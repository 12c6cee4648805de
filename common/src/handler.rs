//! [`Handler`] abstractions.

use std::future::Future;

/// Executable handler.
///
/// Serves as the single seam for services, databases and other backends:
/// a concrete implementor handles the provided arguments and resolves into
/// either [`Handler::Ok`] or [`Handler::Err`].
pub trait Handler<Args = ()> {
    /// Type of successful [`Handler`] result.
    type Ok;

    /// Type of this [`Handler`] error.
    type Err;

    /// Executes this [`Handler`] with the provided arguments.
    fn execute(
        &self,
        args: Args,
    ) -> impl Future<Output = Result<Self::Ok, Self::Err>>;
}
