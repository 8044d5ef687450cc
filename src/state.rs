use std::sync::Arc;

use crate::{config::Config, lottery::LotteryService, serializer::WriteSerializer};

pub struct State {
    pub config: Config,
    pub lottery: LotteryService,
}

impl State {
    pub fn new() -> Arc<Self> {
        let config = Config::load();

        // One serializer per process; every store serializes through it under
        // its own store id.
        let serializer = Arc::new(WriteSerializer::new());
        let lottery = LotteryService::new(&config, serializer);

        Arc::new(Self { config, lottery })
    }
}
