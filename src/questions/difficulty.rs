use crate::models::Difficulty;

const EASY_BRANDS: &[&str] = &[
    "Ferrari",
    "BMW",
    "Mercedes-Benz",
    "Audi",
    "Tesla",
    "Ford",
    "Toyota",
    "Honda",
    "Porsche",
];

const MEDIUM_BRANDS: &[&str] = &[
    "Lamborghini",
    "McLaren",
    "Jeep",
    "Volkswagen",
    "Nissan",
    "Range Rover",
    "Land Rover",
];

/// Static difficulty label; anything not listed is hard.
pub fn difficulty_for(brand: &str) -> Difficulty {
    if EASY_BRANDS.contains(&brand) {
        Difficulty::Easy
    } else if MEDIUM_BRANDS.contains(&brand) {
        Difficulty::Medium
    } else {
        Difficulty::Hard
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_tables() {
        assert_eq!(difficulty_for("Ferrari"), Difficulty::Easy);
        assert_eq!(difficulty_for("Range Rover"), Difficulty::Medium);
        assert_eq!(difficulty_for("Dacia"), Difficulty::Hard);
        // exact names only
        assert_eq!(difficulty_for("ferrari"), Difficulty::Hard);
    }
}
