//! Random channel initialization.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use crate::bands::{available_channels, BANDS};
use crate::model::ApConfiguration;
use crate::optimizers::{ChannelMap, ChannelOptimizer, OptimizerContext};

/// Algorithm identifier.
pub const ALGORITHM_ID: &str = "random";

/// Puts every device of the zone on one random channel per band.
///
/// A device is assigned a channel for each band in its latest radio
/// configuration list. All devices share the same channel on a band.
#[derive(Debug, Clone)]
pub struct RandomChannelInitializer {
    context: OptimizerContext,
    seed: Option<u64>,
}

impl RandomChannelInitializer {
    /// Create the initializer with an OS-seeded RNG.
    pub fn new(context: OptimizerContext) -> Self {
        Self { context, seed: None }
    }

    /// Use a fixed seed so runs are reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_rng(&mut rand::rng()),
        }
    }
}

impl ChannelOptimizer for RandomChannelInitializer {
    fn algorithm_id(&self) -> &'static str {
        ALGORITHM_ID
    }

    fn compute_channel_map(&self) -> ChannelMap {
        let mut rng = self.rng();
        let mut channel_map = ChannelMap::new();

        for band in BANDS {
            let channels = available_channels(band);
            if channels.is_empty() {
                continue;
            }
            let channel = channels[rng.random_range(0..channels.len())];
            info!(band, channel, "Selected random channel");

            for serial in self.context.zone_devices() {
                let Some(radios) = self.context.model().device_status().get(&serial) else {
                    debug!(device = %serial, "No radio config, skipping");
                    continue;
                };
                if !ApConfiguration::radio_bands(&radios).contains(band) {
                    continue;
                }
                channel_map
                    .entry(serial)
                    .or_default()
                    .insert(band.to_string(), channel);
            }
        }

        channel_map
    }
}
