// What the shopper is currently trying on, and how gestures change it
//
// Up to three products at once, no duplicates, in the order they were picked.
// Swipes walk through the recommendation list.

use crate::catalog::Product;
use crate::session::detection::{Direction, GestureEvent, GestureKind};

/// How many products fit on the mirror at once
pub const MAX_SELECTED: usize = 3;

/// What a gesture asks the try-on view to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureCommand {
    NextProduct,
    PreviousProduct,
    /// Just update the on-screen hint
    Instruction(&'static str),
}

impl GestureCommand {
    /// Map a detected gesture to a command. Taps, holds and vertical swipes do nothing.
    pub fn from_gesture(gesture: &GestureEvent) -> Option<Self> {
        match (gesture.kind, gesture.direction) {
            (GestureKind::Wave, _) => Some(GestureCommand::Instruction(
                "Great! Now try swiping to change items",
            )),
            (GestureKind::Swipe, Some(Direction::Left)) => Some(GestureCommand::NextProduct),
            (GestureKind::Swipe, Some(Direction::Right)) => Some(GestureCommand::PreviousProduct),
            (GestureKind::Pinch, _) => Some(GestureCommand::Instruction("Pinch to adjust fit")),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TryOnSelection {
    products: Vec<Product>,
    capacity: usize,
}

impl TryOnSelection {
    /// Selection holding at most `capacity` products, never more than `MAX_SELECTED`
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.min(MAX_SELECTED);
        Self {
            products: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Add a product if there's room and it isn't already selected
    pub fn add(&mut self, product: Product) -> bool {
        if self.is_full() || self.contains(&product.id) {
            return false;
        }
        self.products.push(product);
        true
    }

    pub fn remove(&mut self, product_id: &str) -> bool {
        let before = self.products.len();
        self.products.retain(|p| p.id != product_id);
        self.products.len() != before
    }

    pub fn contains(&self, product_id: &str) -> bool {
        self.products.iter().any(|p| p.id == product_id)
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn ids(&self) -> Vec<&str> {
        self.products.iter().map(|p| p.id.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.products.len() >= self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.products.clear();
    }

    pub fn total_price(&self) -> f64 {
        self.products.iter().map(|p| p.price).sum()
    }

    /// Move to the next (or previous) recommendation
    ///
    /// The position is the first recommendation that's already selected.
    /// With a single product selected it gets swapped out; otherwise the new
    /// product is appended if there's room.
    ///
    /// # Returns
    /// * `true` if the selection changed
    pub fn step(&mut self, forward: bool, recommendations: &[Product]) -> bool {
        if recommendations.is_empty() {
            return false;
        }

        let last = recommendations.len() - 1;
        let current = recommendations.iter().position(|p| self.contains(&p.id));
        let index = match (current, forward) {
            (Some(i), true) => (i + 1) % recommendations.len(),
            (None, true) => 0,
            (Some(0), false) | (None, false) => last,
            (Some(i), false) => i - 1,
        };

        let target = recommendations[index].clone();

        if self.products.len() == 1 {
            let changed = self.products[0].id != target.id;
            self.products = vec![target];
            changed
        } else {
            self.add(target)
        }
    }

    /// Apply a gesture command. Instructions don't touch the selection.
    pub fn apply(&mut self, command: GestureCommand, recommendations: &[Product]) -> bool {
        match command {
            GestureCommand::NextProduct => self.step(true, recommendations),
            GestureCommand::PreviousProduct => self.step(false, recommendations),
            GestureCommand::Instruction(_) => false,
        }
    }
}

impl Default for TryOnSelection {
    fn default() -> Self {
        Self::new(MAX_SELECTED)
    }
}
