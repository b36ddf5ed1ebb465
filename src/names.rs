//! Display name sources
//!
//! Names are cosmetic. They are injected so populations are reproducible.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// First names drawn by [`RandomNames`].
pub const FIRST_NAMES: &[&str] = &[
    "Aino", "Alex", "Anna", "Ben", "Carla", "Chris", "Daniel", "Elena", "Emil", "Eva", "Frank",
    "Grace", "Hanna", "Henry", "Ida", "Jack", "James", "Johanna", "John", "Julia", "Kai", "Laura",
    "Leo", "Linda", "Lucas", "Maria", "Mark", "Mary", "Mia", "Mikko", "Nina", "Oliver", "Olivia",
    "Oscar", "Paul", "Robert", "Sara", "Sofia", "Thomas", "Veera",
];

/// Source of user display names.
pub trait NameSource {
    /// Produce the next display name.
    fn next_name(&mut self) -> String;
}

/// Uniform draws from [`FIRST_NAMES`] with a seeded RNG.
#[derive(Debug, Clone)]
pub struct RandomNames {
    rng: StdRng,
}

impl RandomNames {
    /// Create a name source seeded with `seed`.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl NameSource for RandomNames {
    fn next_name(&mut self) -> String {
        FIRST_NAMES
            .choose(&mut self.rng)
            .copied()
            .unwrap_or("User")
            .to_string()
    }
}

/// Cycles through a fixed list of names.
#[derive(Debug, Clone)]
pub struct FixedNames {
    names: Vec<String>,
    next: usize,
}

impl FixedNames {
    /// Create a source cycling through `names`; an empty list yields `"User"`.
    #[must_use]
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
            next: 0,
        }
    }
}

impl NameSource for FixedNames {
    fn next_name(&mut self) -> String {
        if self.names.is_empty() {
            return "User".to_string();
        }
        let name = self.names[self.next % self.names.len()].clone();
        self.next += 1;
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_names_reproducible() {
        let mut a = RandomNames::seeded(9);
        let mut b = RandomNames::seeded(9);
        for _ in 0..20 {
            let name = a.next_name();
            assert_eq!(name, b.next_name());
            assert!(FIRST_NAMES.contains(&name.as_str()));
        }
    }

    #[test]
    fn test_fixed_names_cycle() {
        let mut names = FixedNames::new(["Ada", "Bo"]);
        assert_eq!(names.next_name(), "Ada");
        assert_eq!(names.next_name(), "Bo");
        assert_eq!(names.next_name(), "Ada");
    }

    #[test]
    fn test_fixed_names_empty() {
        let mut names = FixedNames::new(Vec::<String>::new());
        assert_eq!(names.next_name(), "User");
    }
}
