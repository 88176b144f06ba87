// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Caesar Market Impact Suite ("The Sweep")

pub mod types;
pub mod parse;
pub mod book;
pub mod sweep;
pub mod swap;
pub mod rebuy;
pub mod depth;
pub mod ladder;
pub mod simulation;

pub use types::*;
pub use book::ListingBook;
pub use simulation::MarketSimulation;

use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = console)]
    fn log(s: &str);
}

// ─── WASM Interface ──────────────────────────────────────────────────────────

#[wasm_bindgen]
impl MarketSimulation {
    /// Pool figures arrive as the aggregator sends them: numeric-like
    /// strings, parsed permissively. A snapshot that cannot seed finite
    /// reserves still constructs; simulations against it report unavailable.
    #[wasm_bindgen(constructor)]
    pub fn new(
        base_price_usd: &str,
        quote_price_usd: &str,
        liquidity_usd: &str,
        fdv_usd: &str,
    ) -> Self {
        #[cfg(target_arch = "wasm32")]
        std::panic::set_hook(Box::new(console_error_panic_hook::hook));

        MarketSimulation::from_parts(
            PoolSnapshot::from_raw(base_price_usd, quote_price_usd, liquidity_usd, fdv_usd),
            &[],
            FeeSchedule::default(),
        )
    }

    /// Replace the listing book with a JS array of `{ id | tokenId, price,
    /// source }` objects. Returns how many listings carried a usable price.
    pub fn load_listings(&mut self, listings: JsValue) -> u32 {
        let parsed: Vec<Listing> = serde_wasm_bindgen::from_value(listings).unwrap_or_default();
        self.set_listings(&parsed);
        self.book.len() as u32
    }

    pub fn set_fee_rates(&mut self, primary: f64, secondary: f64, tertiary: f64) {
        self.fees = FeeSchedule {
            primary_rate: primary,
            secondary_rate: secondary,
            tertiary_rate: tertiary,
        };
    }

    pub fn set_floor_reference(&mut self, floor: Option<f64>) {
        self.set_reference_floor(floor);
    }

    pub fn available(&self) -> bool {
        self.is_available()
    }

    pub fn count(&self) -> u32 {
        self.listing_count() as u32
    }

    pub fn simulate_volume(&self, eth: f64) -> JsValue {
        let outcome = self.simulate_core(BudgetMode::Volume, eth);
        serde_wasm_bindgen::to_value(&outcome).unwrap_or(JsValue::NULL)
    }

    pub fn simulate_count(&self, nfts: f64) -> JsValue {
        let outcome = self.simulate_core(BudgetMode::Count, nfts);
        serde_wasm_bindgen::to_value(&outcome).unwrap_or(JsValue::NULL)
    }

    pub fn simulate_ceiling(&self, target_price: f64) -> JsValue {
        let outcome = self.simulate_core(BudgetMode::Ceiling, target_price);
        serde_wasm_bindgen::to_value(&outcome).unwrap_or(JsValue::NULL)
    }

    pub fn ladder(&self) -> JsValue {
        let rows = self.ladder_core(None);
        serde_wasm_bindgen::to_value(&rows).unwrap_or(JsValue::NULL)
    }

    pub fn ladder_with_inventory(&self, total_inventory: u32) -> JsValue {
        let rows = self.ladder_core(Some(total_inventory));
        serde_wasm_bindgen::to_value(&rows).unwrap_or(JsValue::NULL)
    }

    pub fn depth(&self, step_percent: f64) -> JsValue {
        let view = self.depth_core(step_percent);
        serde_wasm_bindgen::to_value(&view).unwrap_or(JsValue::NULL)
    }
}
