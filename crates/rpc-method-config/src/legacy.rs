//! Compatibility setters for callers still on the untyped calling convention.

use std::fmt::Display;

use crate::settings::InvocationSettings;

impl InvocationSettings {
    /// Set the mock fallback from any displayable value.
    ///
    /// `None` is ignored and leaves a previously set mock in place. Anything
    /// else is stringified here and forwarded to
    /// [`set_mock`](InvocationSettings::set_mock).
    ///
    /// # Migration
    ///
    /// ```rust,ignore
    /// // Before
    /// settings.set_mock_legacy(Some(true));
    ///
    /// // After
    /// settings.set_mock("true");
    /// ```
    #[deprecated(since = "0.1.0", note = "Use `InvocationSettings::set_mock` instead.")]
    pub fn set_mock_legacy<T: Display>(&mut self, mock: Option<T>) -> &mut Self {
        let Some(mock) = mock else {
            return self;
        };
        let mock = mock.to_string();
        tracing::warn!(mock = %mock, "Deprecated mock setter used");
        self.set_mock(mock)
    }
}
