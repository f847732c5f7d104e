mod paced;
#[cfg(feature = "async-tokio")]
mod runtime;
mod sleep_provider;

#[cfg_attr(docsrs, doc(cfg(feature = "futures")))]
pub use paced::*;
#[cfg_attr(docsrs, doc(cfg(feature = "async-tokio")))]
#[cfg(feature = "async-tokio")]
pub use runtime::*;
#[cfg_attr(docsrs, doc(cfg(feature = "futures")))]
pub use sleep_provider::*;
