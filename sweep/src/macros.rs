//! Shorthands for building and returning [`crate::error::SweepError`]s.

/// Creates a [`crate::error::SweepError`] from a kind, a static description and an
/// optional detail.
#[macro_export]
macro_rules! sweep_error {
    ($kind:expr, $desc:expr) => {
        $crate::error::SweepError::from(($kind, $desc))
    };
    ($kind:expr, $desc:expr, $detail:expr) => {
        $crate::error::SweepError::from(($kind, $desc, $detail.to_string()))
    };
}

/// Returns early with a [`crate::error::SweepError`].
#[macro_export]
macro_rules! bail {
    ($kind:expr, $desc:expr) => {
        return Err($crate::sweep_error!($kind, $desc))
    };
    ($kind:expr, $desc:expr, $detail:expr) => {
        return Err($crate::sweep_error!($kind, $desc, $detail))
    };
}
