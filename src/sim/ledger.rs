//! Running ledger of energy and money flows.

use std::fmt::{Display, Formatter};

use crate::units::{Currency, Energy, Money, UnitError};

/// Cumulative energy flows and revenues of one simulation run.
///
/// All energy fields only grow over a run. Revenues carry a sign: importing
/// costs money (negative `import_revenue`), exporting earns money.
/// Every operation returns a new ledger.
#[derive(Clone, Debug, PartialEq)]
pub struct EnergySystem {
    pub produced: Energy,
    pub charged: Energy,
    pub discharged: Energy,
    pub consumed: Energy,
    pub imported: Energy,
    pub exported: Energy,
    pub import_revenue: Money,
    pub export_revenue: Money,
}

impl EnergySystem {
    /// Empty ledger in euro.
    pub const INIT: Self = Self::init(Currency::EUR);

    /// Empty ledger booking revenues in `currency`.
    pub const fn init(currency: Currency) -> Self {
        Self {
            produced: Energy::ZERO,
            charged: Energy::ZERO,
            discharged: Energy::ZERO,
            consumed: Energy::ZERO,
            imported: Energy::ZERO,
            exported: Energy::ZERO,
            import_revenue: Money::zero(currency),
            export_revenue: Money::zero(currency),
        }
    }

    pub const fn currency(&self) -> Currency {
        self.import_revenue.currency()
    }

    /// Energy not yet accounted for in this slot.
    ///
    /// Positive means surplus is available, negative means a deficit.
    pub fn current_energy(&self) -> Energy {
        self.produced - self.charged + self.discharged - self.consumed + self.imported
            - self.exported
    }

    /// Net revenue of grid usage: export earnings plus (negative) import costs.
    pub fn energy_revenue(&self) -> Money {
        // Both revenues share the ledger currency, enforced on every booking.
        Money::new(
            self.import_revenue.amount() + self.export_revenue.amount(),
            self.currency(),
        )
    }

    #[must_use]
    pub fn produce(&self, energy: Energy) -> Self {
        Self { produced: self.produced + energy, ..self.clone() }
    }

    #[must_use]
    pub fn charge(&self, energy: Energy) -> Self {
        Self { charged: self.charged + energy, ..self.clone() }
    }

    #[must_use]
    pub fn discharge(&self, energy: Energy) -> Self {
        Self { discharged: self.discharged + energy, ..self.clone() }
    }

    #[must_use]
    pub fn consume(&self, energy: Energy) -> Self {
        Self { consumed: self.consumed + energy, ..self.clone() }
    }

    /// Books energy bought from the grid at the given total `cost`.
    ///
    /// # Errors
    ///
    /// Returns [`UnitError::CurrencyMismatch`] if `cost` is not in the ledger currency.
    pub fn import_energy(&self, energy: Energy, cost: Money) -> Result<Self, UnitError> {
        Ok(Self {
            imported: self.imported + energy,
            import_revenue: self.import_revenue.checked_sub(cost)?,
            ..self.clone()
        })
    }

    /// Books energy sold to the grid for the given total `revenue`.
    ///
    /// # Errors
    ///
    /// Returns [`UnitError::CurrencyMismatch`] if `revenue` is not in the ledger currency.
    pub fn export_energy(&self, energy: Energy, revenue: Money) -> Result<Self, UnitError> {
        Ok(Self {
            exported: self.exported + energy,
            export_revenue: self.export_revenue.checked_add(revenue)?,
            ..self.clone()
        })
    }

    /// Field-wise difference, used to report the flows of a single slot.
    ///
    /// # Errors
    ///
    /// Returns [`UnitError::CurrencyMismatch`] if the ledgers use different currencies.
    pub fn subtract(&self, other: &Self) -> Result<Self, UnitError> {
        Ok(Self {
            produced: self.produced - other.produced,
            charged: self.charged - other.charged,
            discharged: self.discharged - other.discharged,
            consumed: self.consumed - other.consumed,
            imported: self.imported - other.imported,
            exported: self.exported - other.exported,
            import_revenue: self.import_revenue.checked_sub(other.import_revenue)?,
            export_revenue: self.export_revenue.checked_sub(other.export_revenue)?,
        })
    }
}

impl Default for EnergySystem {
    fn default() -> Self {
        Self::INIT
    }
}

impl Display for EnergySystem {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "produced {}, consumed {}, charged {}, discharged {}, imported {}, exported {}, revenue {}",
            self.produced,
            self.consumed,
            self.charged,
            self.discharged,
            self.imported,
            self.exported,
            self.energy_revenue(),
        )
    }
}
