use serde::{Deserialize, Serialize};

use crate::values::Price;

/// Closing prices of consecutive candles, oldest first
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandleSeries {
    closes: Vec<Price>,
}

impl CandleSeries {
    pub fn new(closes: Vec<Price>) -> Self {
        Self { closes }
    }

    pub fn closes(&self) -> &[Price] {
        &self.closes
    }

    pub fn last(&self) -> Option<Price> {
        self.closes.last().copied()
    }

    pub fn len(&self) -> usize {
        self.closes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.closes.is_empty()
    }
}

impl From<Vec<Price>> for CandleSeries {
    fn from(closes: Vec<Price>) -> Self {
        Self::new(closes)
    }
}
