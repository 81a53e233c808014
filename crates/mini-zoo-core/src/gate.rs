//! Simple arithmetic check that keeps small children out of grown-up menus

use rand::Rng;

/// Shown after a wrong answer
pub const WRONG_ANSWER: &str = "Not quite! Try again.";

const MAX_DIGITS: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentalGate {
    a: u8,
    b: u8,
    answer: String,
    error: Option<&'static str>,
}

impl ParentalGate {
    /// Random `a + b` with both operands in 1..=9
    pub fn new<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::with_operands(rng.gen_range(1..=9), rng.gen_range(1..=9))
    }

    pub fn with_operands(a: u8, b: u8) -> Self {
        Self {
            a,
            b,
            answer: String::new(),
            error: None,
        }
    }

    pub fn question(&self) -> String {
        format!("What is {} + {}?", self.a, self.b)
    }

    pub fn operands(&self) -> (u8, u8) {
        (self.a, self.b)
    }

    pub fn push_digit(&mut self, digit: char) {
        if digit.is_ascii_digit() && self.answer.len() < MAX_DIGITS {
            self.answer.push(digit);
            self.error = None;
        }
    }

    pub fn pop_digit(&mut self) {
        self.answer.pop();
    }

    pub fn answer(&self) -> &str {
        &self.answer
    }

    /// Check the typed answer; a wrong one clears it and sets the error
    pub fn submit(&mut self) -> bool {
        let expected = u16::from(self.a) + u16::from(self.b);
        if self.answer.parse::<u16>().ok() == Some(expected) {
            self.error = None;
            return true;
        }
        self.answer.clear();
        self.error = Some(WRONG_ANSWER);
        false
    }

    pub fn error(&self) -> Option<&'static str> {
        self.error
    }
}
