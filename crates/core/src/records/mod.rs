//! Income and expense records.
//!
//! Request payloads arrive as `*Input` (every field optional) and leave as a
//! validated `*Draft` or the full list of field errors. Nothing is rejected
//! on the first problem, so clients see every mistake at once.

mod checks;
mod expense;
mod income;

#[cfg(test)]
mod tests;

pub use expense::{ExpenseDraft, ExpenseInput};
pub use income::{IncomeDraft, IncomeInput};

use helptax_shared::FieldError;
use rust_decimal::Decimal;

use crate::tax::percentage_of;

/// Maximum number of items accepted by one bulk request.
pub const MAX_BATCH_SIZE: usize = 500;

/// Anything carrying a taxable base.
///
/// Implemented by drafts here and by stored rows in the persistence layer, so
/// the same arithmetic backs responses and summaries.
pub trait TaxLine {
    /// Base amount before taxes.
    fn base(&self) -> Decimal;

    /// VAT percentage.
    fn vat_percent(&self) -> u32;

    /// Withholding percentage; expenses carry none.
    fn withholding_percent(&self) -> u32 {
        0
    }

    /// VAT amount, exact.
    fn vat_amount(&self) -> Decimal {
        percentage_of(self.base(), self.vat_percent())
    }

    /// Withholding amount, exact.
    fn withholding_amount(&self) -> Decimal {
        percentage_of(self.base(), self.withholding_percent())
    }

    /// Base plus VAT.
    fn total(&self) -> Decimal {
        self.base() + self.vat_amount()
    }
}

/// A payload that validates into a draft.
pub trait Validate {
    /// Validated form.
    type Draft;

    /// Checks every field.
    ///
    /// # Errors
    ///
    /// Returns one `FieldError` per failing field.
    fn validate(&self) -> Result<Self::Draft, Vec<FieldError>>;
}

/// Validates a whole batch, tagging each error with its item index.
///
/// Either every item is valid or nothing is returned but errors.
///
/// # Errors
///
/// Returns all field errors of all items, or a single error on `field` when
/// the batch exceeds [`MAX_BATCH_SIZE`].
pub fn validate_batch<T: Validate>(
    field: &str,
    items: &[T],
) -> Result<Vec<T::Draft>, Vec<FieldError>> {
    if items.len() > MAX_BATCH_SIZE {
        return Err(vec![FieldError::new(
            field,
            format!("at most {MAX_BATCH_SIZE} items per request"),
        )]);
    }

    let mut drafts = Vec::with_capacity(items.len());
    let mut errors = Vec::new();

    for (index, item) in items.iter().enumerate() {
        match item.validate() {
            Ok(draft) => drafts.push(draft),
            Err(item_errors) => errors.extend(item_errors.into_iter().map(|e| e.at(index))),
        }
    }

    if errors.is_empty() {
        Ok(drafts)
    } else {
        Err(errors)
    }
}
