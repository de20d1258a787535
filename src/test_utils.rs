use rand::{SeedableRng, rngs::StdRng, seq::SliceRandom};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

pub fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_test_writer())
        .with(EnvFilter::from_default_env())
        .try_init();
}

/// `0, step, 2 * step, ..` up to `count` keys, in a seeded random order.
pub fn shuffled_keys(count: u64, step: u64, seed: u64) -> Vec<u64> {
    let mut keys = (0..count).map(|k| k * step).collect::<Vec<_>>();
    keys.shuffle(&mut StdRng::seed_from_u64(seed));
    keys
}
