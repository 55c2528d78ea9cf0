use rand::{seq::SliceRandom, Rng};

use super::{difficulty_for, shuffle};
use crate::{catalog::Catalog, models::Question};

/// The one brand whose decoys are misspellings of itself.
pub const JOKE_BRAND: &str = "Gabin";
pub const JOKE_OPTIONS: [&str; 4] = ["Gabin", "Gabun", "Gabine", "Gabon"];

const WRONG_OPTIONS_PER_QUESTION: usize = 3;

/// Builds an ordered, randomized set of up to `count` questions.
///
/// Brands without an image are skipped, and brand names that differ only in
/// case count as one brand. Each brand is the answer to at most one question.
/// A brand with no other brand to use as a wrong answer is left out. When
/// fewer than `count` brands are playable the set is shorter than requested;
/// it is never padded with repeats.
pub fn build_question_set<R: Rng + ?Sized>(
    catalog: &Catalog,
    count: usize,
    rng: &mut R,
) -> Vec<Question> {
    let mut eligible: Vec<&str> = Vec::new();
    for (brand, record) in catalog {
        if record.has_image() && !eligible.iter().any(|seen| seen.eq_ignore_ascii_case(brand)) {
            eligible.push(brand.as_str());
        }
    }

    // The joke brand never shows up as somebody else's wrong answer.
    let decoys: Vec<&str> = eligible
        .iter()
        .copied()
        .filter(|brand| !is_joke_brand(brand))
        .collect();

    let playable: Vec<&str> = eligible
        .iter()
        .copied()
        .filter(|brand| is_joke_brand(brand) || decoys.len() > 1)
        .collect();

    let picked: Vec<&str> = shuffle(&playable, rng).into_iter().take(count).collect();

    picked
        .into_iter()
        .enumerate()
        .map(|(index, brand)| {
            let options = if is_joke_brand(brand) {
                shuffle(&JOKE_OPTIONS[..], rng)
                    .into_iter()
                    .map(String::from)
                    .collect()
            } else {
                build_options(brand, &decoys, rng)
            };

            Question {
                id: index as u32 + 1,
                image_url: catalog[brand].image_url.clone(),
                correct_answer: brand.to_string(),
                options,
                difficulty: difficulty_for(brand),
            }
        })
        .collect()
}

fn is_joke_brand(brand: &str) -> bool {
    brand.eq_ignore_ascii_case(JOKE_BRAND)
}

fn build_options<R: Rng + ?Sized>(correct: &str, decoys: &[&str], rng: &mut R) -> Vec<String> {
    let pool: Vec<&str> = decoys
        .iter()
        .copied()
        .filter(|brand| !brand.eq_ignore_ascii_case(correct))
        .collect();

    let mut options = vec![correct];
    options.extend(pool.choose_multiple(rng, WRONG_OPTIONS_PER_QUESTION).copied());

    shuffle(&options, rng).into_iter().map(String::from).collect()
}
