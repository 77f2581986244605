//! Sickness absence rate calculation.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::{PublicationError, PublicationResult};
use crate::reference::RATE_DECIMAL_PLACES;

/// Calculates the sickness absence rate as a percentage.
///
/// The rate is `100 * days_lost / days_available`, rounded half-to-even to
/// two decimal places and always carried with a scale of two.
///
/// # Errors
///
/// Returns [`PublicationError::DivisionUndefined`] when `days_available`
/// is zero.
///
/// # Example
///
/// ```
/// use absence_rates::calculation::absence_rate;
/// use rust_decimal::Decimal;
///
/// let rate = absence_rate(Decimal::new(35, 0), Decimal::new(950, 0)).unwrap();
/// assert_eq!(rate.to_string(), "3.68");
/// ```
pub fn absence_rate(days_lost: Decimal, days_available: Decimal) -> PublicationResult<Decimal> {
    if days_available.is_zero() {
        return Err(PublicationError::DivisionUndefined { days_lost });
    }

    let mut rate = (days_lost * Decimal::ONE_HUNDRED / days_available)
        .round_dp_with_strategy(RATE_DECIMAL_PLACES, RoundingStrategy::MidpointNearestEven);
    rate.rescale(RATE_DECIMAL_PLACES);
    Ok(rate)
}
