use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Per-attempt question order. Uniform Fisher–Yates shuffle when the
/// exam randomizes questions, seeded so a given seed always yields the
/// same permutation; catalog order otherwise.
pub(crate) fn attempt_question_order(
    question_ids: Vec<String>,
    randomize: bool,
    seed: u64,
) -> Vec<String> {
    if !randomize {
        return question_ids;
    }

    let mut ordered = question_ids;
    let mut rng = StdRng::seed_from_u64(seed);
    ordered.shuffle(&mut rng);
    ordered
}

pub(crate) fn random_seed() -> u64 {
    rand::random::<u64>()
}
