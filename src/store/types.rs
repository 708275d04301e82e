use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Dimension of an assumption value. Validation branches on this to decide
/// which domain checks apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Unit {
    /// Dollars (prices, rates per billing unit, fixed monthly costs).
    Currency,
    /// Dimensionless fraction; 0.08 = 8%.
    Percent,
    /// Plain counts (units, operations, allowances).
    Count,
    /// Byte-denominated magnitudes (MB sizes, GB allowances, KB records).
    BytesScale,
    /// Time-denominated values (milliseconds, months).
    Duration,
}

/// One named input parameter. Immutable per run; a store is a closed
/// mapping built once and read everywhere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assumption {
    pub key: String,
    pub value: Decimal,
    pub unit: Unit,
}
