//! Declarative macros for ergonomic effect construction
//!
//! `async_effect!` removes the boilerplate of boxing an async block into an
//! effect, which every network call in a reducer needs.

/// Create an `Effect::Future` from an async block
///
/// # Example
///
/// ```rust,ignore
/// use expohub_core::async_effect;
///
/// async_effect! {
///     match api.send_otp(&phone_number).await {
///         Ok(()) => Some(SessionAction::OtpSent),
///         Err(error) => Some(SessionAction::OtpSendFailed { error: error.to_string() }),
///     }
/// }
/// ```
#[macro_export]
macro_rules! async_effect {
    ($($body:tt)*) => {
        $crate::effect::Effect::Future(
            ::std::boxed::Box::pin(async move { $($body)* })
        )
    };
}
