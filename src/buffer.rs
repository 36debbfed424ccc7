use rust_decimal::Decimal;
use std::collections::VecDeque;

/// Labels and prices for one symbol, capped at `capacity` while polling.
#[derive(Debug, Clone)]
pub struct RollingSeries {
    capacity: usize,
    labels: VecDeque<String>,
    prices: VecDeque<Decimal>,
}

impl RollingSeries {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            labels: VecDeque::with_capacity(capacity + 1),
            prices: VecDeque::with_capacity(capacity + 1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Appends a point, evicting the oldest once the window is full.
    pub fn push(&mut self, label: String, price: Decimal) {
        self.labels.push_back(label);
        self.prices.push_back(price);

        while self.labels.len() > self.capacity {
            self.labels.pop_front();
            self.prices.pop_front();
        }
    }

    /// Swaps in a full historical result. The window cap does not apply here.
    pub fn replace<I>(&mut self, points: I)
    where
        I: IntoIterator<Item = (String, Decimal)>,
    {
        let (labels, prices): (VecDeque<String>, VecDeque<Decimal>) = points.into_iter().unzip();
        self.labels = labels;
        self.prices = prices;
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    pub fn labels(&self) -> &VecDeque<String> {
        &self.labels
    }

    pub fn prices(&self) -> &VecDeque<Decimal> {
        &self.prices
    }
}
