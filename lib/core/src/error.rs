//! Error handling foundation for Chip's Parlour.
//!
//! Only the `Result` alias lives here. Each crate defines its own error
//! enums and wraps them in rootcause reports, attaching context with
//! `.context()` as errors cross layers.

use rootcause::Report;

/// A Result type alias using rootcause's Report for error handling.
pub type Result<T, C = ()> = std::result::Result<T, Report<C>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_type_works() {
        let ok: Result<&str> = Ok("guest");
        assert_eq!(ok.expect("should be ok"), "guest");
    }
}
